// Prep list: what has to be chopped, portioned and par-cooked before service.

use chrono::{DateTime, TimeZone};
use serde_json::json;

use crate::context::TenantContext;
use crate::day_buckets::{group_by_day_at, DayBuckets};
use crate::db::DocumentDb;
use crate::error::ServiceError;
use crate::paths::collections::PREP_LIST;
use crate::types::{PrepItem, UserInfo};

use super::{list_newest, require_text};

/// Prep items, newest first.
pub fn list_prep_items(db: &DocumentDb, ctx: &TenantContext) -> Result<Vec<PrepItem>, ServiceError> {
    let coll = ctx.collection(PREP_LIST)?;
    list_newest(db, &coll)
}

/// Today's and yesterday's prep lists as of `now`.
pub fn prep_board<Tz: TimeZone>(
    db: &DocumentDb,
    ctx: &TenantContext,
    now: &DateTime<Tz>,
) -> Result<DayBuckets<PrepItem>, ServiceError> {
    let items = list_prep_items(db, ctx)?;
    Ok(group_by_day_at(items, now))
}

/// Add an item to the prep list. Returns the new document id.
pub fn add_prep_item(
    db: &DocumentDb,
    ctx: &TenantContext,
    name: &str,
    author: Option<UserInfo>,
) -> Result<String, ServiceError> {
    let coll = ctx.collection(PREP_LIST)?;
    let name = require_text(name, "Prep item name")?;
    let author = author.unwrap_or_else(UserInfo::anonymous);
    let doc = db.add_document(
        &coll,
        json!({
            "name": name,
            "done": false,
            "urgent": false,
            "createdBy": author,
        }),
    )?;
    Ok(doc.id().to_string())
}

pub fn set_prep_done(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
    done: bool,
) -> Result<(), ServiceError> {
    let doc = ctx.document(PREP_LIST, id)?;
    db.update_document(&doc, json!({ "done": done }))?;
    Ok(())
}

/// Flag or unflag an item as urgent.
pub fn set_prep_urgent(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
    urgent: bool,
) -> Result<(), ServiceError> {
    let doc = ctx.document(PREP_LIST, id)?;
    db.update_document(&doc, json!({ "urgent": urgent }))?;
    Ok(())
}

pub fn delete_prep_item(db: &DocumentDb, ctx: &TenantContext, id: &str) -> Result<bool, ServiceError> {
    let doc = ctx.document(PREP_LIST, id)?;
    Ok(db.delete_document(&doc)?)
}
