//! Core business logic - framework-agnostic catalogue loading and product selection.

/// Catalogue file parsing and (re)loading
pub mod catalogue;
/// Product table store operations
pub mod product;
/// Strategy-based product selection
pub mod selection;
/// Consumer-facing shop service
pub mod shop;
/// Shopping strategy definitions
pub mod strategy;
/// Key/value catalogue bookkeeping
pub mod system_state;
