// Supplier invoices.

use chrono::{NaiveDate, TimeZone};
use serde_json::{json, Value};

use crate::context::TenantContext;
use crate::day_buckets::local_day_range;
use crate::db::DocumentDb;
use crate::error::ServiceError;
use crate::paths::collections::INVOICES;
use crate::types::{decode_all, Invoice};

use super::{list_newest, require_text};

pub fn list_invoices(db: &DocumentDb, ctx: &TenantContext) -> Result<Vec<Invoice>, ServiceError> {
    let coll = ctx.collection(INVOICES)?;
    list_newest(db, &coll)
}

/// Invoices created from the start of `start` to the end of `end` in `tz`.
pub fn list_invoices_between<Tz: TimeZone>(
    db: &DocumentDb,
    ctx: &TenantContext,
    start: NaiveDate,
    end: NaiveDate,
    tz: &Tz,
) -> Result<Vec<Invoice>, ServiceError> {
    let coll = ctx.collection(INVOICES)?;
    if end < start {
        return Err(ServiceError::Validation(
            "End date is before start date".to_string(),
        ));
    }
    let (from, to) = local_day_range(start, end, tz).ok_or_else(|| {
        ServiceError::Validation(format!("No local midnight for {start} or {end}"))
    })?;
    Ok(decode_all(db.list_created_between(&coll, &from, &to)?))
}

/// Invoices from one supplier, newest first.
pub fn list_invoices_from(
    db: &DocumentDb,
    ctx: &TenantContext,
    supplier: &str,
) -> Result<Vec<Invoice>, ServiceError> {
    let coll = ctx.collection(INVOICES)?;
    let docs = db.list_where(&coll, "supplier", &Value::String(supplier.to_string()))?;
    Ok(decode_all(docs))
}

pub fn add_invoice(
    db: &DocumentDb,
    ctx: &TenantContext,
    invoice_number: &str,
    supplier: &str,
    amount: f64,
    link: Option<&str>,
) -> Result<String, ServiceError> {
    let coll = ctx.collection(INVOICES)?;
    let invoice_number = require_text(invoice_number, "Invoice number")?;
    let supplier = require_text(supplier, "Supplier")?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ServiceError::Validation(format!("Invalid amount: {amount}")));
    }
    let doc = db.add_document(
        &coll,
        json!({
            "invoiceNumber": invoice_number,
            "supplier": supplier,
            "amount": amount,
            "link": link,
        }),
    )?;
    Ok(doc.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use chrono::Utc;

    #[test]
    fn test_add_and_filter() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("t").unwrap();
        add_invoice(&db, &ctx, "INV-1", "Daily Dairy Products", 42.5, None).unwrap();
        add_invoice(&db, &ctx, "INV-2", "Global Spices Inc", 10.0, Some("https://x/2.pdf")).unwrap();

        assert_eq!(list_invoices(&db, &ctx).unwrap().len(), 2);
        let dairy = list_invoices_from(&db, &ctx, "Daily Dairy Products").unwrap();
        assert_eq!(dairy.len(), 1);
        assert_eq!(dairy[0].amount, Some(42.5));
        assert!(dairy[0].link.is_none());

        assert!(matches!(
            add_invoice(&db, &ctx, "INV-3", "Global Spices Inc", f64::NAN, None),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_between_is_inclusive_of_whole_days() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("t").unwrap();
        let coll = ctx.collection(INVOICES).unwrap();
        for (id, at) in [
            ("first", "2026-10-01T00:00:00Z"),
            ("last", "2026-10-02T23:59:59.500Z"),
            ("after", "2026-10-03T00:00:00Z"),
        ] {
            db.set_document(&coll.doc(id), json!({"supplier": "s", "createdAt": at}))
                .unwrap();
        }
        let start = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 10, 2).unwrap();
        let ids: Vec<_> = list_invoices_between(&db, &ctx, start, end, &Utc)
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["last", "first"]);
    }
}
