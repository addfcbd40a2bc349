//! Named query operations sent to the directory's query endpoint.
//!
//! The endpoint accepts a JSON array of operations and answers with an array
//! of `{data, errors}` envelopes in the same order. Restaurants and generic
//! places live under different root fields; asking a restaurant ID for
//! `placeDetail` (or vice versa) yields a typed `NOT_FOUND` error.

use placegrab_core::{EntityType, PlaceIdentifier};
use serde::Serialize;
use serde_json::{json, Value};

/// Which part of the record an operation feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OperationKind {
    BaseInfo,
    Menu,
    ReviewKeywords,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Operation {
    pub operation_name: &'static str,
    pub variables: Value,
    pub query: &'static str,
    #[serde(skip)]
    pub kind: OperationKind,
}

const RESTAURANT_BASE: &str = "query getRestaurant($input: RestaurantInput) {
  restaurant(input: $input) {
    base { id name category description microReviews }
  }
}";

const RESTAURANT_MENUS: &str = "query getRestaurantMenus($input: RestaurantInput) {
  restaurant(input: $input) {
    menus { name price description recommend }
  }
}";

const PLACE_BASE: &str = "query getPlaceDetail($input: PlaceDetailInput) {
  placeDetail(input: $input) {
    base { id name category description microReviews }
  }
}";

const PLACE_MENUS: &str = "query getPlaceMenus($input: PlaceDetailInput) {
  placeDetail(input: $input) {
    menus { name price description recommend }
  }
}";

const REVIEW_STATS: &str = "query getVisitorReviewStats($businessId: String, $businessType: String) {
  visitorReviewStats(input: { businessId: $businessId, businessType: $businessType }) {
    analysis {
      votedKeyword { details { code displayName count } }
    }
  }
}";

/// Root field holding `base`/`menus` for an entity type.
pub(super) fn detail_root(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Restaurant => "restaurant",
        EntityType::Generic => "placeDetail",
    }
}

/// The operation batch for one listing.
pub(super) fn operations_for(id: &PlaceIdentifier) -> Vec<Operation> {
    let input = json!({
        "input": {
            "id": id.canonical_id,
            "isNx": false,
            "deviceType": "mobile",
        }
    });

    let (base, menus, base_name, menus_name) = match id.entity_type {
        EntityType::Restaurant => (
            RESTAURANT_BASE,
            RESTAURANT_MENUS,
            "getRestaurant",
            "getRestaurantMenus",
        ),
        EntityType::Generic => (PLACE_BASE, PLACE_MENUS, "getPlaceDetail", "getPlaceMenus"),
    };

    vec![
        Operation {
            operation_name: base_name,
            variables: input.clone(),
            query: base,
            kind: OperationKind::BaseInfo,
        },
        Operation {
            operation_name: menus_name,
            variables: input,
            query: menus,
            kind: OperationKind::Menu,
        },
        Operation {
            operation_name: "getVisitorReviewStats",
            variables: json!({
                "businessId": id.canonical_id,
                "businessType": id.entity_type.path_segment(),
            }),
            query: REVIEW_STATS,
            kind: OperationKind::ReviewKeywords,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier(entity_type: EntityType) -> PlaceIdentifier {
        PlaceIdentifier {
            raw_url: "https://naver.me/x".to_owned(),
            canonical_id: "1826027582".to_owned(),
            entity_type,
            canonical_url: format!(
                "https://m.place.naver.com/{}/1826027582/home",
                entity_type.path_segment()
            ),
        }
    }

    #[test]
    fn restaurant_batch_uses_restaurant_root() {
        let ops = operations_for(&identifier(EntityType::Restaurant));
        let names: Vec<_> = ops.iter().map(|op| op.operation_name).collect();
        assert_eq!(
            names,
            vec!["getRestaurant", "getRestaurantMenus", "getVisitorReviewStats"]
        );
        assert!(ops[0].query.contains("restaurant(input: $input)"));
        assert_eq!(ops[2].variables["businessType"], "restaurant");
    }

    #[test]
    fn generic_batch_uses_place_detail_root() {
        let ops = operations_for(&identifier(EntityType::Generic));
        assert_eq!(ops[0].operation_name, "getPlaceDetail");
        assert!(ops[1].query.contains("placeDetail(input: $input)"));
        assert_eq!(ops[0].variables["input"]["id"], "1826027582");
    }

    #[test]
    fn serialized_operation_omits_kind() {
        let ops = operations_for(&identifier(EntityType::Restaurant));
        let body = serde_json::to_value(&ops).unwrap();
        let first = &body[0];
        assert_eq!(first["operationName"], "getRestaurant");
        assert!(first.get("kind").is_none());
        assert!(first["query"].as_str().unwrap().starts_with("query getRestaurant"));
    }
}
