use rust_decimal::Decimal;

use super::*;

fn named(name: &str, category: &str) -> PlaceRecord {
    PlaceRecord {
        name: Some(name.to_string()),
        category: Some(category.to_string()),
        ..PlaceRecord::default()
    }
}

#[test]
fn record_with_name_and_category_is_minimally_valid() {
    assert!(named("Test Bistro", "Korean").is_minimally_valid());
}

#[test]
fn blank_category_does_not_count_as_present() {
    let record = named("Test Bistro", "   ");
    assert!(!record.is_minimally_valid());
    assert!(!record.has(RequiredField::Category));
}

#[test]
fn custom_gate_can_require_photos() {
    let record = named("Test Bistro", "Korean");
    let gate = [RequiredField::Name, RequiredField::Photos];
    assert!(!record.satisfies(&gate));

    let with_photo = PlaceRecord {
        photos: vec!["https://ldb-phinf.pstatic.net/a.jpg".to_string()],
        ..record
    };
    assert!(with_photo.satisfies(&gate));
}

#[test]
fn default_record_is_empty() {
    assert!(PlaceRecord::default().is_empty());
    assert!(!named("a", "b").is_empty());
}

#[test]
fn populated_fields_follow_declaration_order() {
    let record = PlaceRecord {
        phone: Some("02-123-4567".to_string()),
        name: Some("Cafe".to_string()),
        review_keywords: vec!["cozy".to_string()],
        ..PlaceRecord::default()
    };
    assert_eq!(
        record.populated_fields(),
        vec![
            RequiredField::Name,
            RequiredField::Phone,
            RequiredField::ReviewKeywords
        ]
    );
}

#[test]
fn price_parses_grouped_amount_with_currency_suffix() {
    assert_eq!(
        MenuPrice::parse("12,000원"),
        Some(MenuPrice::Amount(Decimal::from(12_000)))
    );
    assert_eq!(
        MenuPrice::parse(" 9500 "),
        Some(MenuPrice::Amount(Decimal::from(9_500)))
    );
}

#[test]
fn price_keeps_free_text() {
    assert_eq!(
        MenuPrice::parse("변동"),
        Some(MenuPrice::Text("변동".to_string()))
    );
    assert_eq!(MenuPrice::parse("  "), None);
}

#[test]
fn entity_type_round_trips_through_path_segment() {
    for entity in [EntityType::Generic, EntityType::Restaurant] {
        assert_eq!(
            EntityType::from_path_segment(entity.path_segment()),
            Some(entity)
        );
    }
    assert_eq!(EntityType::from_path_segment("hospital"), None);
}

#[test]
fn failed_result_always_needs_manual_input() {
    let result = ExtractionResult::failed("all strategies exhausted", None);
    assert!(!result.success);
    assert!(result.needs_manual_input);
    assert!(result.data.is_none());
    assert!(result.method.is_none());
}

#[test]
fn failed_result_drops_empty_partial_record() {
    let result = ExtractionResult::failed("boom", Some(PlaceRecord::default()));
    assert!(result.data.is_none());

    let partial = PlaceRecord {
        name: Some("Half".to_string()),
        ..PlaceRecord::default()
    };
    let result = ExtractionResult::failed("boom", Some(partial.clone()));
    assert_eq!(result.data, Some(partial));
}

#[test]
fn result_serializes_with_camel_case_and_kebab_method() {
    let result = ExtractionResult::succeeded(
        named("Test Bistro", "Korean"),
        ExtractionMethod::StructuredQuery,
    );
    let json = serde_json::to_value(&result).expect("serialize result");

    assert_eq!(json["success"], true);
    assert_eq!(json["method"], "structured-query");
    assert_eq!(json["needsManualInput"], false);
    assert_eq!(json["data"]["name"], "Test Bistro");
    assert!(json["data"]["menuItems"].as_array().unwrap().is_empty());
    assert!(json.get("error").is_none());
}

#[test]
fn menu_price_serializes_tagged() {
    let item = MenuItem {
        name: "Bibimbap".to_string(),
        price: MenuPrice::parse("11,000"),
        description: None,
    };
    let json = serde_json::to_value(&item).expect("serialize item");
    assert_eq!(json["price"]["amount"], "11000");
    assert!(json.get("description").is_none());
}
