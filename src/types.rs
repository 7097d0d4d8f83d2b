//! Configuration and per-kind record contracts.
//!
//! Documents read from the store have no enforced schema. Each record kind
//! below is the single place where a stored document is turned into a typed
//! value: missing fields take their defaults, unreadable timestamps become
//! `None`, and a document that still fails to decode is skipped by the list
//! helpers with a warning.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::day_buckets::Timestamped;
use crate::db::{parse_timestamp, DbDocument, DbError};

/// Application configuration, read from `~/.chefflow/config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Overrides the default `~/.chefflow/chefflow.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Tenant to bind at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_tenant: Option<String>,
    /// Signed-in user; their profile decides the tenant when `default_tenant` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

// =============================================================================
// Field decoding helpers
// =============================================================================

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_timestamp(&value))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('£').parse().ok(),
        _ => None,
    })
}

/// Readings are typed in by hand and kept as text; numbers are accepted too.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Who created a record: older screens store the uid, newer ones a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Uid(String),
    Profile(UserInfo),
}

impl Author {
    pub fn user_id(&self) -> &str {
        match self {
            Author::Uid(uid) => uid,
            Author::Profile(info) => &info.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub full_name: String,
}

impl UserInfo {
    /// Placeholder used when nobody is signed in.
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".into(),
            user_email: "anonymous".into(),
            user_name: "Anonymous User".into(),
            full_name: "Anonymous User".into(),
        }
    }
}

// =============================================================================
// Decoding seam
// =============================================================================

/// A record kind stored as one document per record.
pub trait DocumentRecord: DeserializeOwned {
    /// Decode a stored document; the document id is injected as `id`.
    fn from_document(doc: &DbDocument) -> Result<Self, DbError> {
        let mut data = match &doc.data {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        data.insert("id".to_string(), Value::String(doc.id.clone()));
        Ok(serde_json::from_value(Value::Object(data))?)
    }
}

/// Decode every document, skipping (and logging) the ones that do not fit.
pub fn decode_all<T: DocumentRecord>(docs: Vec<DbDocument>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match T::from_document(&doc) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed document {}: {}", doc.path, e);
                None
            }
        })
        .collect()
}

macro_rules! timestamped {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Timestamped for $ty {
                fn created_at(&self) -> Option<DateTime<Utc>> {
                    self.created_at
                }
            }
            impl DocumentRecord for $ty {}
        )*
    };
}

// =============================================================================
// Record kinds
// =============================================================================

/// An entry on the prep list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Author>,
}

/// A cleaning checklist task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTask {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Author>,
}

/// An item to order from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Author>,
}

/// One fridge temperature reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FridgeTempLog {
    pub id: String,
    #[serde(default)]
    pub fridge: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub temperature: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Author>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTemps {
    #[serde(default, deserialize_with = "lenient_string")]
    pub frozen: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub chilled: String,
}

/// Temperatures checked when a supplier delivery arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTempLog {
    pub id: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub temps: DeliveryTemps,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Author>,
}

/// A recipe filed under one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    #[serde(rename = "recipe name", default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// End-of-shift notes for the next team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handover {
    pub id: String,
    #[serde(default)]
    pub created_by: Option<Author>,
    /// Link to the rendered PDF; empty until uploaded.
    #[serde(default)]
    pub pdf: String,
    #[serde(default)]
    pub problems: bool,
    #[serde(default)]
    pub service_notes: bool,
    #[serde(default)]
    pub stock_issues: bool,
    #[serde(default)]
    pub problems_during_shift_text: String,
    #[serde(default)]
    pub service_notes_text: String,
    #[serde(default)]
    pub stock_issues_text: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A supplier invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_number: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An exported file the staff downloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

timestamped!(
    PrepItem,
    CleaningTask,
    OrderItem,
    FridgeTempLog,
    DeliveryTempLog,
    Recipe,
    Handover,
    Invoice,
    DownloadRecord,
);

/// Fixed documents holding a plain list of names (suppliers, fridges).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedList {
    #[serde(default)]
    pub array: Vec<String>,
}

/// The `recipes/categories` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeCategories {
    #[serde(default)]
    pub names: Vec<String>,
}

/// A document under the top-level `users` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Decode a fixed (non-record) document, defaulting when absent.
pub fn decode_fixed<T: DeserializeOwned + Default>(doc: Option<DbDocument>) -> Result<T, DbError> {
    match doc {
        Some(doc) => Ok(serde_json::from_value(doc.data)?),
        None => Ok(T::default()),
    }
}
