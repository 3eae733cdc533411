//! Sweet model and related payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::{fmt::Display, str::FromStr};

/// Sweet entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sweet {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload. Update overwrites all four fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweetRequest {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Restock payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestockRequest {
    pub quantity: Option<i64>,
}

/// Query string of the search endpoint.
///
/// Empty parameters (`?name=&minPrice=`) are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
}

/// Normalised search filters handed to the repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweetFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl SweetFilter {
    /// True when no filter is applied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Check a sweet against every supplied filter.
    ///
    /// Name and category are case-insensitive substring matches, price
    /// bounds are inclusive.
    pub fn matches(&self, sweet: &Sweet) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| {
            needle
                .as_ref()
                .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
        };

        contains(&sweet.name, &self.name)
            && contains(&sweet.category, &self.category)
            && self.min_price.is_none_or(|min| sweet.price >= min)
            && self.max_price.is_none_or(|max| sweet.price <= max)
    }
}

impl From<SearchQuery> for SweetFilter {
    fn from(query: SearchQuery) -> Self {
        let trimmed = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            name: trimmed(query.name),
            category: trimmed(query.category),
            min_price: query.min_price,
            max_price: query.max_price,
        }
    }
}

fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
