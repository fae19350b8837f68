//! Free-text search and featured ranking.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chequealo_core::ShopId;

use crate::models::{ListedShop, Shop};

/// How featured shops are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeaturedStrategy {
    /// `average_rating * log10(review_count + 1)`, so volume counts.
    #[default]
    Weighted,
    /// Highest average rating among shops with at least one review.
    TopRated,
}

impl FromStr for FeaturedStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted" => Ok(Self::Weighted),
            "top_rated" => Ok(Self::TopRated),
            _ => Err(format!("invalid featured strategy: {s}")),
        }
    }
}

impl fmt::Display for FeaturedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weighted => write!(f, "weighted"),
            Self::TopRated => write!(f, "top_rated"),
        }
    }
}

/// Featured ranking strategy and how many shops to feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturedPolicy {
    pub strategy: FeaturedStrategy,
    pub count: usize,
}

impl Default for FeaturedPolicy {
    fn default() -> Self {
        Self {
            strategy: FeaturedStrategy::Weighted,
            count: 5,
        }
    }
}

/// Shops whose name, city or address contains `query`, ignoring case.
///
/// A blank query matches everything. Input order is preserved.
#[must_use]
pub fn search<'a>(shops: &'a [Shop], query: &str) -> Vec<&'a Shop> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return shops.iter().collect();
    }

    shops
        .iter()
        .filter(|shop| {
            [&shop.name, &shop.city, &shop.address]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)] // review counts are far below 2^52
fn weighted_score(shop: &Shop) -> f64 {
    shop.average_rating * (shop.review_count as f64 + 1.0).log10()
}

/// Ids of the featured shops, best first, at most `policy.count`.
///
/// Shops without reviews are never featured. Ties keep input order.
#[must_use]
pub fn rank_featured(shops: &[Shop], policy: FeaturedPolicy) -> Vec<ShopId> {
    let mut scored: Vec<(ShopId, f64)> = shops
        .iter()
        .filter(|shop| shop.review_count > 0)
        .map(|shop| {
            let score = match policy.strategy {
                FeaturedStrategy::Weighted => weighted_score(shop),
                FeaturedStrategy::TopRated => shop.average_rating,
            };
            (shop.id, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(policy.count)
        .map(|(id, _)| id)
        .collect()
}

/// The default listing: search matches, featured first, then by rating.
///
/// Featured shops are ranked over the full list, so a search never promotes
/// a shop that would not be featured on the unfiltered page.
#[must_use]
pub fn listing<'a>(shops: &'a [Shop], query: &str, policy: FeaturedPolicy) -> Vec<ListedShop<'a>> {
    let featured: HashSet<ShopId> = rank_featured(shops, policy).into_iter().collect();

    let mut listed: Vec<ListedShop<'a>> = search(shops, query)
        .into_iter()
        .map(|shop| ListedShop {
            shop,
            featured: featured.contains(&shop.id),
            distance_km: None,
        })
        .collect();

    listed.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| b.shop.average_rating.total_cmp(&a.shop.average_rating))
    });
    listed
}
