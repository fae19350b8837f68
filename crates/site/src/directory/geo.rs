//! Shop coordinates and the "near me" ordering.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use chequealo_core::Coordinates;

use super::search::search;
use crate::models::{ListedShop, Shop};

/// `@lat,lng` as used by map links, including `place/<name>/@lat,lng,zoom`.
static AT_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(-?\d{1,3}(?:\.\d+)?),\s*(-?\d{1,3}(?:\.\d+)?)").expect("Invalid regex")
});

/// A bare `lat,lng` pair, as found in `?q=` and `?ll=`.
static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d{1,3}(?:\.\d+)?)\s*,\s*(-?\d{1,3}(?:\.\d+)?)\s*$")
        .expect("Invalid regex")
});

fn coordinates_from(captures: &regex::Captures<'_>) -> Option<Coordinates> {
    let latitude = captures.get(1)?.as_str().parse().ok()?;
    let longitude = captures.get(2)?.as_str().parse().ok()?;
    Coordinates::new(latitude, longitude).ok()
}

/// Extract coordinates from a map link.
///
/// Recognises `@lat,lng` anywhere in the link and the `q` / `ll` query
/// parameters holding `lat,lng`. Out-of-range values are rejected.
#[must_use]
pub fn parse_map_link(link: &str) -> Option<Coordinates> {
    let link = link.trim();

    if let Some(found) = AT_COORDS_RE
        .captures_iter(link)
        .find_map(|captures| coordinates_from(&captures))
    {
        return Some(found);
    }

    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .filter(|(key, _)| key == "q" || key == "ll")
        .find_map(|(_, value)| {
            PAIR_RE
                .captures(&value)
                .and_then(|captures| coordinates_from(&captures))
        })
}

/// Where a shop is, preferring its map link over the stored fields.
#[must_use]
pub fn shop_coordinates(shop: &Shop) -> Option<Coordinates> {
    shop.map_link
        .as_deref()
        .and_then(parse_map_link)
        .or_else(|| match (shop.latitude, shop.longitude) {
            (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude).ok(),
            _ => None,
        })
}

/// Search matches that have a location, nearest first.
///
/// Featured ranking does not apply here; every entry carries its distance.
#[must_use]
pub fn near_me<'a>(shops: &'a [Shop], query: &str, origin: Coordinates) -> Vec<ListedShop<'a>> {
    let mut listed: Vec<ListedShop<'a>> = search(shops, query)
        .into_iter()
        .filter_map(|shop| {
            let at = shop_coordinates(shop)?;
            Some(ListedShop {
                shop,
                featured: false,
                distance_km: Some(origin.distance_to(&at)),
            })
        })
        .collect();

    listed.sort_by(|a, b| {
        a.distance_km
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
    });
    listed
}
