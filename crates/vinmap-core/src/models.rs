//! Data models for vinmap.
//!
//! A wine record is stored as one schema-less document; these types are the
//! typed view of that document. Field names are camelCase on the wire.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// RATING
// =============================================================================

/// Tasting score on the 1-5 scale (sweetness, acidity, body).
///
/// Out-of-range values cannot be constructed; deserializing one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw score.
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::Validation(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    /// Force a raw score into range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for Rating {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        Rating::new(value).map_err(|e| e.to_string())
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// COUNTRY
// =============================================================================

/// Producing countries shown on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    France,
    Italy,
    Spain,
    Usa,
    Chile,
    Argentina,
    Australia,
    NewZealand,
    Germany,
    Portugal,
    SouthAfrica,
    Korea,
    Japan,
}

/// Marker placement for a country on the world map (percent of width/height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapMarker {
    pub x: f32,
    pub y: f32,
    pub color: &'static str,
}

impl Country {
    pub const ALL: [Country; 13] = [
        Country::France,
        Country::Italy,
        Country::Spain,
        Country::Usa,
        Country::Chile,
        Country::Argentina,
        Country::Australia,
        Country::NewZealand,
        Country::Germany,
        Country::Portugal,
        Country::SouthAfrica,
        Country::Korea,
        Country::Japan,
    ];

    /// Lower-case code used in documents and prompts.
    pub fn code(&self) -> &'static str {
        match self {
            Country::France => "france",
            Country::Italy => "italy",
            Country::Spain => "spain",
            Country::Usa => "usa",
            Country::Chile => "chile",
            Country::Argentina => "argentina",
            Country::Australia => "australia",
            Country::NewZealand => "newzealand",
            Country::Germany => "germany",
            Country::Portugal => "portugal",
            Country::SouthAfrica => "southafrica",
            Country::Korea => "korea",
            Country::Japan => "japan",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Country::France => "France",
            Country::Italy => "Italy",
            Country::Spain => "Spain",
            Country::Usa => "USA",
            Country::Chile => "Chile",
            Country::Argentina => "Argentina",
            Country::Australia => "Australia",
            Country::NewZealand => "New Zealand",
            Country::Germany => "Germany",
            Country::Portugal => "Portugal",
            Country::SouthAfrica => "South Africa",
            Country::Korea => "Korea",
            Country::Japan => "Japan",
        }
    }

    pub fn marker(&self) -> MapMarker {
        let (x, y, color) = match self {
            Country::France => (49.0, 30.0, "#DC2626"),
            Country::Italy => (51.0, 32.0, "#059669"),
            Country::Spain => (48.0, 35.0, "#D97706"),
            Country::Usa => (29.0, 35.0, "#2563EB"),
            Country::Chile => (34.5, 68.0, "#7C3AED"),
            Country::Argentina => (36.0, 72.0, "#DB2777"),
            Country::Australia => (77.0, 67.0, "#0891B2"),
            Country::NewZealand => (81.0, 80.0, "#65A30D"),
            Country::Germany => (51.0, 30.0, "#F59E0B"),
            Country::Portugal => (47.0, 36.0, "#EC4899"),
            Country::SouthAfrica => (53.0, 69.0, "#8B5CF6"),
            Country::Korea => (72.0, 34.0, "#10B981"),
            Country::Japan => (74.0, 34.0, "#EF4444"),
        };
        MapMarker { x, y, color }
    }

    /// Comma-separated list of every code, for prompts and error messages.
    pub fn code_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == needle)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "unknown country '{}', expected one of: {}",
                    s,
                    Self::code_list()
                ))
            })
    }
}

// =============================================================================
// WINE CATEGORY
// =============================================================================

/// Coarse classification of a wine, distinct from the free-text wine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WineCategory {
    Red,
    White,
    #[serde(rename = "Rosé")]
    Rose,
    Sparkling,
    Natural,
}

impl WineCategory {
    pub const ALL: [WineCategory; 5] = [
        WineCategory::Red,
        WineCategory::White,
        WineCategory::Rose,
        WineCategory::Sparkling,
        WineCategory::Natural,
    ];

    /// Canonical label as stored in documents.
    pub fn label(&self) -> &'static str {
        match self {
            WineCategory::Red => "Red",
            WineCategory::White => "White",
            WineCategory::Rose => "Rosé",
            WineCategory::Sparkling => "Sparkling",
            WineCategory::Natural => "Natural",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            WineCategory::Red => "#DC2626",
            WineCategory::White => "#F59E0B",
            WineCategory::Rose => "#EC4899",
            WineCategory::Sparkling => "#8B5CF6",
            WineCategory::Natural => "#EA580C",
        }
    }

    /// Exact match against a canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

impl fmt::Display for WineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WineCategory {
    type Err = Error;

    /// Lenient parse for operator input: case-insensitive, "rose" accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(WineCategory::Red),
            "white" => Ok(WineCategory::White),
            "rosé" | "rose" => Ok(WineCategory::Rose),
            "sparkling" => Ok(WineCategory::Sparkling),
            "natural" => Ok(WineCategory::Natural),
            _ => Err(Error::Validation(format!(
                "unknown wine category '{}', expected Red, White, Rosé, Sparkling or Natural",
                s
            ))),
        }
    }
}

// =============================================================================
// WINE
// =============================================================================

/// A persisted wine record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wine {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub winery: String,
    #[serde(default)]
    pub winery_info: String,
    pub country: Country,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<String>,
    /// Older documents carry the type under `type`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::category",
        skip_serializing_if = "Option::is_none"
    )]
    pub wine_category: Option<WineCategory>,
    #[serde(default)]
    pub sweetness: Rating,
    #[serde(default)]
    pub acidity: Rating,
    #[serde(default)]
    pub body: Rating,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<String>,
    #[serde(default, with = "lenient::price")]
    pub price: Option<u32>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, with = "lenient::date")]
    pub date: Option<NaiveDate>,
    /// Records written without a timestamp sort as the oldest.
    #[serde(default = "missing_timestamp", with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn default_in_stock() -> bool {
    true
}

fn missing_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Wine {
    /// Build a record from a create request.
    pub fn from_new(id: Uuid, new: NewWine, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            winery: new.winery,
            winery_info: new.winery_info,
            country: new.country,
            wine_type: new.wine_type,
            legacy_type: None,
            wine_category: new.wine_category,
            sweetness: new.sweetness,
            acidity: new.acidity,
            body: new.body,
            description: new.description,
            reviews: new.reviews,
            price: new.price,
            in_stock: new.in_stock,
            image: new.image,
            date: new.date,
            timestamp: new.timestamp.unwrap_or(now),
        }
    }

    /// Declared type as found on the record (`type` first, then `wineType`).
    pub fn declared_type(&self) -> &str {
        self.legacy_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.wine_type.as_deref())
            .unwrap_or("")
    }

    /// Apply a partial update in place. Present fields overwrite; an explicit
    /// null clears an optional field.
    pub fn apply(&mut self, update: &WineUpdate) {
        if let Some(v) = &update.name {
            self.name = v.clone();
        }
        if let Some(v) = &update.winery {
            self.winery = v.clone();
        }
        if let Some(v) = &update.winery_info {
            self.winery_info = v.clone();
        }
        if let Some(v) = update.country {
            self.country = v;
        }
        if let Some(v) = &update.wine_type {
            self.wine_type = v.clone();
        }
        if let Some(v) = update.wine_category {
            self.wine_category = v;
        }
        if let Some(v) = update.sweetness {
            self.sweetness = v;
        }
        if let Some(v) = update.acidity {
            self.acidity = v;
        }
        if let Some(v) = update.body {
            self.body = v;
        }
        if let Some(v) = &update.description {
            self.description = v.clone();
        }
        if let Some(v) = &update.reviews {
            self.reviews = v.clone();
        }
        if let Some(v) = update.price {
            self.price = v;
        }
        if let Some(v) = update.in_stock {
            self.in_stock = v;
        }
        if let Some(v) = &update.image {
            self.image = v.clone();
        }
        if let Some(v) = update.date {
            self.date = v;
        }
    }

    /// Document body as stored (everything except the id).
    pub fn to_document(&self) -> Result<serde_json::Value> {
        let mut doc = serde_json::to_value(self)?;
        if let Some(map) = doc.as_object_mut() {
            map.remove("id");
        }
        Ok(doc)
    }

    /// Rebuild a record from its id and stored document.
    pub fn from_document(id: Uuid, doc: serde_json::Value) -> Result<Self> {
        let mut doc = doc;
        match doc.as_object_mut() {
            Some(map) => {
                map.insert("id".to_string(), serde_json::Value::String(id.to_string()));
            }
            None => {
                return Err(Error::Serialization(format!(
                    "wine document {} is not an object",
                    id
                )))
            }
        }
        Ok(serde_json::from_value(doc)?)
    }
}

/// Request for creating a new wine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWine {
    pub name: String,
    #[serde(default)]
    pub winery: String,
    #[serde(default)]
    pub winery_info: String,
    pub country: Country,
    #[serde(default)]
    pub wine_type: Option<String>,
    #[serde(default)]
    pub wine_category: Option<WineCategory>,
    #[serde(default)]
    pub sweetness: Rating,
    #[serde(default)]
    pub acidity: Rating,
    #[serde(default)]
    pub body: Rating,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reviews: Option<String>,
    #[serde(default, with = "lenient::price")]
    pub price: Option<u32>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "lenient::opt_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for NewWine {
    fn default() -> Self {
        Self {
            name: String::new(),
            winery: String::new(),
            winery_info: String::new(),
            country: Country::France,
            wine_type: None,
            wine_category: None,
            sweetness: Rating::default(),
            acidity: Rating::default(),
            body: Rating::default(),
            description: String::new(),
            reviews: None,
            price: None,
            in_stock: true,
            image: None,
            date: None,
            timestamp: None,
        }
    }
}

impl NewWine {
    /// Entry-point checks beyond what the types already enforce.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Wine name is required".to_string()));
        }
        validate_price(self.price)
    }
}

/// Partial update; absent fields are left untouched.
///
/// Optional fields are doubly optional: `None` leaves the field alone,
/// `Some(None)` (an explicit JSON `null`) clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winery_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
    #[serde(
        default,
        deserialize_with = "lenient::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub wine_type: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "lenient::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub wine_category: Option<Option<WineCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweetness: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acidity: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub reviews: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "lenient::nullable_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "lenient::nullable_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Option<NaiveDate>>,
}

impl WineUpdate {
    /// Update that only sets the category (used by the backfill).
    pub fn category(category: WineCategory) -> Self {
        Self {
            wine_category: Some(Some(category)),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("Wine name cannot be empty".to_string()));
            }
        }
        validate_price(self.price.flatten())
    }

    pub fn is_empty(&self) -> bool {
        *self == WineUpdate::default()
    }

    /// JSON merge patch for the document store. Cleared fields are written
    /// as `null`.
    pub fn to_patch(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn validate_price(price: Option<u32>) -> Result<()> {
    match price {
        Some(0) => Err(Error::Validation(
            "price must be a positive integer".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Serde helpers that accept the loose shapes older documents were written in
/// (prices as strings, empty-string dates and categories, millisecond timestamps).
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::WineCategory;

    /// Present-but-null becomes `Some(None)`; absence is left to `default`.
    pub fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(d).map(Some)
    }

    pub fn nullable_price<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<u32>>, D::Error> {
        price::deserialize(d).map(Some)
    }

    pub fn nullable_date<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<chrono::NaiveDate>>, D::Error> {
        date::deserialize(d).map(Some)
    }

    /// Stored categories: blank or unrecognised labels read as uncategorised.
    pub fn category<'de, D: Deserializer<'de>>(d: D) -> Result<Option<WineCategory>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        })
    }

    pub mod price {
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub fn serialize<S: Serializer>(v: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
            match v {
                Some(p) => s.serialize_u32(*p),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
            match Option::<Value>::deserialize(d)? {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Number(n)) => n
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .map(Some)
                    .ok_or_else(|| D::Error::custom("price must be a positive integer")),
                Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
                Some(Value::String(s)) => s
                    .trim()
                    .replace(',', "")
                    .parse::<u32>()
                    .map(Some)
                    .map_err(|_| D::Error::custom("price must be a positive integer")),
                Some(_) => Err(D::Error::custom("price must be a positive integer")),
            }
        }
    }

    pub mod date {
        use chrono::NaiveDate;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(v: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match v {
                Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(s) if s.trim().is_empty() => Ok(None),
                Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(Some)
                    .map_err(|e| D::Error::custom(format!("invalid date '{}': {}", s, e))),
            }
        }
    }

    pub mod timestamp {
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub fn serialize<S: Serializer>(v: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_i64(v.timestamp_millis())
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
            let value = Value::deserialize(d)?;
            super::parse_timestamp(&value).map_err(D::Error::custom)
        }
    }

    pub mod opt_timestamp {
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub fn serialize<S: Serializer>(
            v: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match v {
                Some(t) => s.serialize_i64(t.timestamp_millis()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<Value>::deserialize(d)? {
                None | Some(Value::Null) => Ok(None),
                Some(v) => super::parse_timestamp(&v).map(Some).map_err(D::Error::custom),
            }
        }
    }

    fn parse_timestamp(value: &Value) -> Result<chrono::DateTime<chrono::Utc>, String> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
                .ok_or_else(|| format!("invalid millisecond timestamp {}", n)),
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&chrono::Utc))
                .map_err(|e| format!("invalid timestamp '{}': {}", s, e)),
            other => Err(format!("invalid timestamp {}", other)),
        }
    }
}
