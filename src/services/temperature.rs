// Fridge and delivery temperature logs.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use serde_json::json;

use crate::context::TenantContext;
use crate::day_buckets::local_day_range;
use crate::db::{DbError, DocumentDb};
use crate::error::ServiceError;
use crate::paths::collections::{DELIVERY_LOGS, FRIDGE_LOGS};
use crate::types::{decode_all, DeliveryTempLog, DeliveryTemps, DocumentRecord, FridgeTempLog};

use super::{list_newest, require_text};

/// Which reading of a delivery is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTempKind {
    Frozen,
    Chilled,
}

/// Fridge and delivery logs within a date range, newest first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureRecords {
    pub fridge: Vec<FridgeTempLog>,
    pub delivery: Vec<DeliveryTempLog>,
}

/// Readings are stored as typed, but must parse as a number.
fn require_reading(value: &str) -> Result<String, ServiceError> {
    let value = require_text(value, "Temperature")?;
    if value.parse::<f64>().map(|t| t.is_finite()).unwrap_or(false) {
        Ok(value)
    } else {
        Err(ServiceError::Validation(format!(
            "Temperature must be a number, got {value:?}"
        )))
    }
}

// =============================================================================
// Fridge logs
// =============================================================================

pub fn list_fridge_logs(
    db: &DocumentDb,
    ctx: &TenantContext,
) -> Result<Vec<FridgeTempLog>, ServiceError> {
    let coll = ctx.collection(FRIDGE_LOGS)?;
    list_newest(db, &coll)
}

/// Record a reading for `fridge`. Returns the new document id.
pub fn add_fridge_log(
    db: &DocumentDb,
    ctx: &TenantContext,
    fridge: &str,
    temperature: &str,
    user_id: &str,
) -> Result<String, ServiceError> {
    let tenant_id = ctx.require()?;
    let coll = ctx.collection(FRIDGE_LOGS)?;
    let fridge = require_text(fridge, "Fridge")?;
    let temperature = require_reading(temperature)?;

    let doc = db.add_document(
        &coll,
        json!({
            "fridge": fridge,
            "temperature": temperature,
            "createdBy": user_id,
            "restaurantId": tenant_id,
        }),
    )?;
    log::info!("Fridge log saved: {} {} ({})", fridge, temperature, doc.id());
    Ok(doc.id().to_string())
}

pub fn delete_fridge_log(db: &DocumentDb, ctx: &TenantContext, id: &str) -> Result<bool, ServiceError> {
    let doc = ctx.document(FRIDGE_LOGS, id)?;
    Ok(db.delete_document(&doc)?)
}

// =============================================================================
// Delivery logs
// =============================================================================

pub fn list_delivery_logs(
    db: &DocumentDb,
    ctx: &TenantContext,
) -> Result<Vec<DeliveryTempLog>, ServiceError> {
    let coll = ctx.collection(DELIVERY_LOGS)?;
    list_newest(db, &coll)
}

/// Start a delivery check for `supplier` with empty readings.
pub fn add_delivery_log(
    db: &DocumentDb,
    ctx: &TenantContext,
    supplier: &str,
    user_id: &str,
) -> Result<String, ServiceError> {
    let tenant_id = ctx.require()?;
    let coll = ctx.collection(DELIVERY_LOGS)?;
    let supplier = require_text(supplier, "Supplier")?;
    let doc = db.add_document(
        &coll,
        json!({
            "supplier": supplier,
            "createdBy": user_id,
            "restaurantId": tenant_id,
            "temps": DeliveryTemps::default(),
        }),
    )?;
    Ok(doc.id().to_string())
}

/// Record the frozen or chilled reading of a delivery, keeping the other one.
pub fn set_delivery_temp(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
    kind: DeliveryTempKind,
    value: &str,
) -> Result<(), ServiceError> {
    let doc = ctx.document(DELIVERY_LOGS, id)?;
    let value = require_reading(value)?;
    let stored = db
        .get_document(&doc)?
        .ok_or_else(|| DbError::NotFound(doc.path()))?;

    let mut temps = DeliveryTempLog::from_document(&stored)?.temps;
    match kind {
        DeliveryTempKind::Frozen => temps.frozen = value,
        DeliveryTempKind::Chilled => temps.chilled = value,
    }
    db.update_document(&doc, json!({ "temps": temps }))?;
    Ok(())
}

pub fn delete_delivery_log(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
) -> Result<bool, ServiceError> {
    let doc = ctx.document(DELIVERY_LOGS, id)?;
    Ok(db.delete_document(&doc)?)
}

// =============================================================================
// Export range
// =============================================================================

/// All fridge and delivery logs from the start of `start` to the end of `end`,
/// calendar days taken in `tz`.
pub fn temperature_records_between<Tz: TimeZone>(
    db: &DocumentDb,
    ctx: &TenantContext,
    start: NaiveDate,
    end: NaiveDate,
    tz: &Tz,
) -> Result<TemperatureRecords, ServiceError> {
    let fridge_coll = ctx.collection(FRIDGE_LOGS)?;
    let delivery_coll = ctx.collection(DELIVERY_LOGS)?;
    if end < start {
        return Err(ServiceError::Validation(
            "End date is before start date".to_string(),
        ));
    }
    let (from, to) = local_day_range(start, end, tz).ok_or_else(|| {
        ServiceError::Validation(format!("No local midnight for {start} or {end}"))
    })?;

    Ok(TemperatureRecords {
        fridge: decode_all(db.list_created_between(&fridge_coll, &from, &to)?),
        delivery: decode_all(db.list_created_between(&delivery_coll, &from, &to)?),
    })
}
