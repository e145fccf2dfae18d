//! Selection engine - reduces one category's products to a single pick.
//!
//! The reduction is a plain function over a slice so it can be tested without a
//! database. Ties are broken in favour of the first product in slice order, which
//! for store queries is insertion order.

use super::strategy::StrategyKind;
use crate::entities::product;
use rand::{Rng, seq::SliceRandom};
use serde::Serialize;

/// A product together with the strategy that selected it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Selection {
    /// The chosen product
    pub product: product::Model,
    /// Strategy that produced this pick
    pub strategy: StrategyKind,
}

/// Picks one product from `products` according to `strategy`.
///
/// Returns `None` only when `products` is empty. `rng` is consulted only by
/// [`StrategyKind::Random`].
pub fn select<'a, R: Rng + ?Sized>(
    products: &'a [product::Model],
    strategy: StrategyKind,
    rng: &mut R,
) -> Option<&'a product::Model> {
    match strategy {
        StrategyKind::Cheapest => first_extreme(products, |p| p.price, |a, b| a < b),
        StrategyKind::MostExpensive => first_extreme(products, |p| p.price, |a, b| a > b),
        StrategyKind::BestValue => first_extreme(products, |p| p.reference_price, |a, b| a < b),
        StrategyKind::Random => products.choose(rng),
    }
}

/// First element whose key no later element strictly beats.
fn first_extreme<K, B>(products: &[product::Model], key: K, beats: B) -> Option<&product::Model>
where
    K: Fn(&product::Model) -> f64,
    B: Fn(f64, f64) -> bool,
{
    products.iter().fold(None, |best, candidate| match best {
        Some(current) if !beats(key(candidate), key(current)) => Some(current),
        _ => Some(candidate),
    })
}
