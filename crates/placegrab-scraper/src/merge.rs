//! Field-level merge of partial records.
//!
//! A later strategy only fills fields that are still empty in the working
//! record; a populated field is never overwritten, even with a different
//! value.

use placegrab_core::{PlaceRecord, RequiredField};

fn fill_text(slot: &mut Option<String>, incoming: Option<String>) -> bool {
    let empty = slot.as_deref().is_none_or(|s| s.trim().is_empty());
    match incoming {
        Some(value) if empty && !value.trim().is_empty() => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}

fn fill_list<T>(slot: &mut Vec<T>, incoming: Vec<T>) -> bool {
    if slot.is_empty() && !incoming.is_empty() {
        *slot = incoming;
        true
    } else {
        false
    }
}

/// Copies every field of `incoming` that is empty in `working`. Returns the
/// fields that were filled, in declaration order.
pub(crate) fn fill_empty(working: &mut PlaceRecord, incoming: PlaceRecord) -> Vec<RequiredField> {
    let PlaceRecord {
        name,
        category,
        description,
        phone,
        menu_items,
        review_keywords,
        photos,
    } = incoming;

    let mut filled = Vec::new();
    let mut note = |field: RequiredField, changed: bool| {
        if changed {
            filled.push(field);
        }
    };

    note(RequiredField::Name, fill_text(&mut working.name, name));
    note(RequiredField::Category, fill_text(&mut working.category, category));
    note(
        RequiredField::Description,
        fill_text(&mut working.description, description),
    );
    note(RequiredField::Phone, fill_text(&mut working.phone, phone));
    note(
        RequiredField::MenuItems,
        fill_list(&mut working.menu_items, menu_items),
    );
    note(
        RequiredField::ReviewKeywords,
        fill_list(&mut working.review_keywords, review_keywords),
    );
    note(RequiredField::Photos, fill_list(&mut working.photos, photos));
    filled
}

/// Merges only `photos` from `incoming`; every other field is ignored.
pub(crate) fn fill_photos(working: &mut PlaceRecord, incoming: PlaceRecord) -> Vec<RequiredField> {
    if fill_list(&mut working.photos, incoming.photos) {
        vec![RequiredField::Photos]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placegrab_core::{MenuItem, MenuPrice};

    fn record(name: Option<&str>, category: Option<&str>, description: Option<&str>) -> PlaceRecord {
        PlaceRecord {
            name: name.map(str::to_owned),
            category: category.map(str::to_owned),
            description: description.map(str::to_owned),
            ..PlaceRecord::default()
        }
    }

    #[test]
    fn populated_fields_are_never_overwritten() {
        let mut working = record(Some("Test Bistro"), None, Some("From the query API"));
        let incoming = record(Some("Other Name"), Some("Korean"), Some("From the page"));

        let filled = fill_empty(&mut working, incoming);

        assert_eq!(working.name.as_deref(), Some("Test Bistro"));
        assert_eq!(working.description.as_deref(), Some("From the query API"));
        assert_eq!(working.category.as_deref(), Some("Korean"));
        assert_eq!(filled, vec![RequiredField::Category]);
    }

    #[test]
    fn blank_text_counts_as_empty() {
        let mut working = record(Some("  "), None, None);
        fill_empty(&mut working, record(Some("Real Name"), None, None));
        assert_eq!(working.name.as_deref(), Some("Real Name"));
    }

    #[test]
    fn blank_incoming_value_does_not_fill() {
        let mut working = PlaceRecord::default();
        let filled = fill_empty(&mut working, record(Some(" "), None, None));
        assert!(working.name.is_none());
        assert!(filled.is_empty());
    }

    #[test]
    fn lists_fill_only_when_empty() {
        let dish = |name: &str| MenuItem {
            name: name.to_owned(),
            price: MenuPrice::parse("10000"),
            description: None,
        };
        let mut working = PlaceRecord {
            menu_items: vec![dish("A")],
            ..PlaceRecord::default()
        };
        let incoming = PlaceRecord {
            menu_items: vec![dish("B"), dish("C")],
            review_keywords: vec!["친절해요".to_owned()],
            ..PlaceRecord::default()
        };

        let filled = fill_empty(&mut working, incoming);

        assert_eq!(working.menu_items, vec![dish("A")]);
        assert_eq!(working.review_keywords, vec!["친절해요"]);
        assert_eq!(filled, vec![RequiredField::ReviewKeywords]);
    }

    #[test]
    fn fill_photos_ignores_every_other_field() {
        let mut working = record(Some("Kept"), None, None);
        let incoming = PlaceRecord {
            name: Some("Ignored".to_owned()),
            category: Some("Ignored".to_owned()),
            photos: vec!["https://ldb-phinf.pstatic.net/a.jpg".to_owned()],
            ..PlaceRecord::default()
        };
        let filled = fill_photos(&mut working, incoming);
        assert_eq!(working.name.as_deref(), Some("Kept"));
        assert!(working.category.is_none());
        assert_eq!(working.photos.len(), 1);
        assert_eq!(filled, vec![RequiredField::Photos]);
    }
}
