//! Business-profile types produced by one extraction run.
//!
//! Everything here is request-scoped: a [`PlaceIdentifier`] is derived once
//! from the caller's URL, strategies produce partial [`PlaceRecord`]s, and the
//! orchestrator folds them into a single [`ExtractionResult`].

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coarse listing classification taken from the URL path. The upstream query
/// schema is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Generic,
    Restaurant,
}

impl EntityType {
    /// Path segment used by the mobile canonical page, e.g. `/restaurant/123/home`.
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            EntityType::Generic => "place",
            EntityType::Restaurant => "restaurant",
        }
    }

    /// Maps a URL path segment to an entity type. Unknown segments are `None`.
    #[must_use]
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "place" => Some(EntityType::Generic),
            "restaurant" => Some(EntityType::Restaurant),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Generic => write!(f, "generic"),
            EntityType::Restaurant => write!(f, "restaurant"),
        }
    }
}

/// Normalized identity of the listing a caller pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceIdentifier {
    /// The URL exactly as the caller supplied it.
    pub raw_url: String,
    /// Numeric business ID shared by every URL shape for the same listing.
    pub canonical_id: String,
    pub entity_type: EntityType,
    /// Mobile canonical page, e.g. `https://m.place.naver.com/restaurant/1826027582/home`.
    pub canonical_url: String,
}

/// A menu price as the directory reports it.
///
/// Most listings publish a plain amount (`"12,000"`), but free text such as
/// `"변동"` (market price) is common enough that it is kept rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuPrice {
    Amount(Decimal),
    Text(String),
}

impl MenuPrice {
    /// Parses a raw price string. Thousands separators, whitespace and a
    /// trailing currency unit (`원`, `won`, `KRW`) are stripped before trying a
    /// numeric parse; anything left non-numeric is kept as text.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let compact: String = trimmed
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        let numeric = compact
            .trim_end_matches('원')
            .trim_end_matches("KRW")
            .trim_end_matches("won");

        match numeric.parse::<Decimal>() {
            Ok(amount) if !amount.is_sign_negative() => Some(MenuPrice::Amount(amount)),
            _ => Some(MenuPrice::Text(trimmed.to_string())),
        }
    }
}

impl fmt::Display for MenuPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuPrice::Amount(amount) => write!(f, "{amount}"),
            MenuPrice::Text(text) => write!(f, "{text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<MenuPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fields a record can be required to carry before it counts as usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    Category,
    Description,
    Phone,
    MenuItems,
    ReviewKeywords,
    Photos,
}

impl RequiredField {
    /// The gate used when no rules file overrides it.
    pub const DEFAULT_GATE: [RequiredField; 2] = [RequiredField::Name, RequiredField::Category];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Category => "category",
            RequiredField::Description => "description",
            RequiredField::Phone => "phone",
            RequiredField::MenuItems => "menu_items",
            RequiredField::ReviewKeywords => "review_keywords",
            RequiredField::Photos => "photos",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business profile, possibly partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub review_keywords: Vec<String>,
    /// Image URLs, de-duplicated and capped by the photo rules.
    #[serde(default)]
    pub photos: Vec<String>,
}

impl PlaceRecord {
    /// Returns `true` when `field` carries a non-blank value.
    #[must_use]
    pub fn has(&self, field: RequiredField) -> bool {
        fn present(value: Option<&String>) -> bool {
            value.is_some_and(|v| !v.trim().is_empty())
        }

        match field {
            RequiredField::Name => present(self.name.as_ref()),
            RequiredField::Category => present(self.category.as_ref()),
            RequiredField::Description => present(self.description.as_ref()),
            RequiredField::Phone => present(self.phone.as_ref()),
            RequiredField::MenuItems => !self.menu_items.is_empty(),
            RequiredField::ReviewKeywords => !self.review_keywords.is_empty(),
            RequiredField::Photos => !self.photos.is_empty(),
        }
    }

    /// Returns `true` when every field in `gate` is present.
    #[must_use]
    pub fn satisfies(&self, gate: &[RequiredField]) -> bool {
        gate.iter().all(|field| self.has(*field))
    }

    /// Completeness check against the default gate (name + category).
    #[must_use]
    pub fn is_minimally_valid(&self) -> bool {
        self.satisfies(&RequiredField::DEFAULT_GATE)
    }

    /// Names of the populated fields, in declaration order.
    #[must_use]
    pub fn populated_fields(&self) -> Vec<RequiredField> {
        [
            RequiredField::Name,
            RequiredField::Category,
            RequiredField::Description,
            RequiredField::Phone,
            RequiredField::MenuItems,
            RequiredField::ReviewKeywords,
            RequiredField::Photos,
        ]
        .into_iter()
        .filter(|field| self.has(*field))
        .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.populated_fields().is_empty()
    }
}

/// Which strategy produced the record that first passed the completeness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    StructuredQuery,
    EmbeddedState,
    RenderedDom,
}

impl ExtractionMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::StructuredQuery => "structured-query",
            ExtractionMethod::EmbeddedState => "embedded-state",
            ExtractionMethod::RenderedDom => "rendered-dom",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `extract` call, in the shape the hosting application stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PlaceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ExtractionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `true` exactly when `success` is `false`; the caller shows a manual form.
    pub needs_manual_input: bool,
}

impl ExtractionResult {
    #[must_use]
    pub fn succeeded(data: PlaceRecord, method: ExtractionMethod) -> Self {
        Self {
            success: true,
            data: Some(data),
            method: Some(method),
            error: None,
            needs_manual_input: false,
        }
    }

    /// A failed result. Any partial fields gathered before the failure are kept
    /// so the manual-entry form can be pre-filled; an empty record is omitted.
    #[must_use]
    pub fn failed(error: impl Into<String>, partial: Option<PlaceRecord>) -> Self {
        Self {
            success: false,
            data: partial.filter(|record| !record.is_empty()),
            method: None,
            error: Some(error.into()),
            needs_manual_input: true,
        }
    }
}

#[cfg(test)]
#[path = "place_test.rs"]
mod tests;
