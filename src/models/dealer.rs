//! Dealer identifiers and inventory filters
//!
//! Dealers, reviews and inventory items are owned by external services and
//! handled as opaque JSON. Only the request-side types live here.

use serde::Deserialize;
use std::fmt;

/// A validated dealer identifier. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DealerId(u64);

impl DealerId {
    /// Parse an identifier taken from a request path.
    ///
    /// Absent, zero and non-numeric identifiers yield `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw?.trim().parse::<u64>().ok().filter(|id| *id != 0).map(Self)
    }
}

impl fmt::Display for DealerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inventory filter query parameters.
///
/// A key given without a value (`?year`) deserializes to `Some("")`. A key
/// given twice is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InventoryQuery {
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub mileage: Option<String>,
    pub price: Option<String>,
}

/// The single inventory filter applied to a dealer's cars.
///
/// At most one filter is sent downstream. When several query parameters are
/// present, the first in the order year, make, model, mileage, price wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryFilter {
    Year(String),
    Make(String),
    Model(String),
    MaxMileage(String),
    Price(String),
    All,
}

impl InventoryFilter {
    /// Pick the filter from request query parameters.
    ///
    /// Presence of a key is enough to select it, even with an empty value.
    pub fn from_query(query: InventoryQuery) -> Self {
        let InventoryQuery {
            year,
            make,
            model,
            mileage,
            price,
        } = query;

        year.map(Self::Year)
            .or_else(|| make.map(Self::Make))
            .or_else(|| model.map(Self::Model))
            .or_else(|| mileage.map(Self::MaxMileage))
            .or_else(|| price.map(Self::Price))
            .unwrap_or(Self::All)
    }

    /// Endpoint path on the inventory search service
    pub fn endpoint(&self, dealer_id: DealerId) -> String {
        let (route, value) = match self {
            Self::Year(v) => ("carsbyyear", v),
            Self::Make(v) => ("carsbymake", v),
            Self::Model(v) => ("carsbymodel", v),
            Self::MaxMileage(v) => ("carsbymaxmileage", v),
            Self::Price(v) => ("carsbyprice", v),
            Self::All => return format!("/cars/{}", dealer_id),
        };
        format!("/{}/{}/{}", route, dealer_id, urlencoding::encode(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KEYS: [&str; 5] = ["year", "make", "model", "mileage", "price"];

    fn query(pairs: &[(&str, &str)]) -> InventoryQuery {
        let mut query = InventoryQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "year" => query.year = value,
                "make" => query.make = value,
                "model" => query.model = value,
                "mileage" => query.mileage = value,
                "price" => query.price = value,
                other => panic!("unknown key {}", other),
            }
        }
        query
    }

    #[test]
    fn test_dealer_id_parse() {
        assert_eq!(DealerId::parse(Some("15")).map(|id| id.to_string()), Some("15".to_string()));
        assert_eq!(DealerId::parse(None), None);
        assert_eq!(DealerId::parse(Some("0")), None);
        assert_eq!(DealerId::parse(Some("")), None);
        assert_eq!(DealerId::parse(Some("abc")), None);
        assert_eq!(DealerId::parse(Some("-3")), None);
    }

    #[test]
    fn test_no_filter_lists_all_cars() {
        let filter = InventoryFilter::from_query(InventoryQuery::default());
        let id = DealerId::parse(Some("7")).unwrap();

        assert_eq!(filter, InventoryFilter::All);
        assert_eq!(filter.endpoint(id), "/cars/7");
    }

    #[test]
    fn test_filter_endpoints() {
        let id = DealerId::parse(Some("3")).unwrap();
        let cases = [
            ("year", "2021", "/carsbyyear/3/2021"),
            ("make", "Audi", "/carsbymake/3/Audi"),
            ("model", "A4", "/carsbymodel/3/A4"),
            ("mileage", "50000", "/carsbymaxmileage/3/50000"),
            ("price", "20000", "/carsbyprice/3/20000"),
        ];
        for (key, value, expected) in cases {
            let filter = InventoryFilter::from_query(query(&[(key, value)]));
            assert_eq!(filter.endpoint(id), expected);
        }
    }

    #[test]
    fn test_filter_value_is_escaped() {
        let id = DealerId::parse(Some("3")).unwrap();
        let filter = InventoryFilter::from_query(query(&[("make", "Mercedes Benz/AMG")]));
        assert_eq!(filter.endpoint(id), "/carsbymake/3/Mercedes%20Benz%2FAMG");
    }

    #[test]
    fn test_empty_value_still_selects_filter() {
        let filter = InventoryFilter::from_query(query(&[("make", ""), ("price", "1")]));
        assert_eq!(filter, InventoryFilter::Make(String::new()));
    }

    #[test]
    fn test_year_beats_everything() {
        let filter = InventoryFilter::from_query(query(&[
            ("price", "1"),
            ("mileage", "2"),
            ("model", "3"),
            ("make", "4"),
            ("year", "2020"),
        ]));
        assert_eq!(filter, InventoryFilter::Year("2020".to_string()));
    }

    proptest! {
        #[test]
        fn prop_first_present_key_in_priority_order_wins(
            present in proptest::collection::vec(any::<bool>(), 5),
        ) {
            let values: Vec<(&str, String)> = KEYS
                .iter()
                .zip(&present)
                .filter(|(_, on)| **on)
                .map(|(key, _)| (*key, format!("{}-value", key)))
                .collect();
            let pairs: Vec<(&str, &str)> =
                values.iter().map(|(key, value)| (*key, value.as_str())).collect();

            let id = DealerId::parse(Some("1")).unwrap();
            let endpoint = InventoryFilter::from_query(query(&pairs)).endpoint(id);

            match present.iter().position(|on| *on) {
                Some(idx) => {
                    let expected = format!("/1/{}-value", KEYS[idx]);
                    prop_assert!(endpoint.ends_with(&expected));
                }
                None => prop_assert_eq!(endpoint, "/cars/1"),
            }
        }
    }
}
