// Order list: stock to reorder from suppliers.

use serde_json::json;

use crate::context::TenantContext;
use crate::db::DocumentDb;
use crate::error::ServiceError;
use crate::paths::collections::ORDER_LIST;
use crate::types::OrderItem;

use super::{list_newest, require_text};

pub fn list_order_items(db: &DocumentDb, ctx: &TenantContext) -> Result<Vec<OrderItem>, ServiceError> {
    let coll = ctx.collection(ORDER_LIST)?;
    list_newest(db, &coll)
}

pub fn add_order_item(
    db: &DocumentDb,
    ctx: &TenantContext,
    name: &str,
    user_id: &str,
) -> Result<String, ServiceError> {
    let coll = ctx.collection(ORDER_LIST)?;
    let name = require_text(name, "Order item")?;
    let doc = db.add_document(
        &coll,
        json!({ "name": name, "completed": false, "createdBy": user_id }),
    )?;
    Ok(doc.id().to_string())
}

/// Mark an item as ordered (or not).
pub fn set_order_completed(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
    completed: bool,
) -> Result<(), ServiceError> {
    let doc = ctx.document(ORDER_LIST, id)?;
    db.update_document(&doc, json!({ "completed": completed }))?;
    Ok(())
}

pub fn delete_order_item(db: &DocumentDb, ctx: &TenantContext, id: &str) -> Result<bool, ServiceError> {
    let doc = ctx.document(ORDER_LIST, id)?;
    Ok(db.delete_document(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_order_items() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("burger-palace").unwrap();
        let buns = add_order_item(&db, &ctx, "Brioche buns", "uid-2").unwrap();
        add_order_item(&db, &ctx, "Cheddar", "uid-2").unwrap();

        set_order_completed(&db, &ctx, &buns, true).unwrap();
        let items = list_order_items(&db, &ctx).unwrap();
        assert_eq!(items.len(), 2);
        let buns_item = items.iter().find(|i| i.id == buns).unwrap();
        assert!(buns_item.completed);

        assert!(delete_order_item(&db, &ctx, &buns).unwrap());
        assert_eq!(list_order_items(&db, &ctx).unwrap().len(), 1);
    }
}
