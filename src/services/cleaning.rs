// Cleaning checklist: recurring tasks ticked off per shift.

use chrono::{DateTime, TimeZone};
use serde_json::json;

use crate::context::TenantContext;
use crate::day_buckets::{group_by_day_at, DayBuckets};
use crate::db::DocumentDb;
use crate::error::ServiceError;
use crate::paths::collections::CLEANING_LIST;
use crate::types::CleaningTask;

use super::{list_newest, require_text};

pub fn list_cleaning_tasks(
    db: &DocumentDb,
    ctx: &TenantContext,
) -> Result<Vec<CleaningTask>, ServiceError> {
    let coll = ctx.collection(CLEANING_LIST)?;
    list_newest(db, &coll)
}

/// Today's and yesterday's tasks as of `now`.
pub fn cleaning_board<Tz: TimeZone>(
    db: &DocumentDb,
    ctx: &TenantContext,
    now: &DateTime<Tz>,
) -> Result<DayBuckets<CleaningTask>, ServiceError> {
    let tasks = list_cleaning_tasks(db, ctx)?;
    Ok(group_by_day_at(tasks, now))
}

/// Add a task on behalf of `user_id`. Returns the new document id.
pub fn add_cleaning_task(
    db: &DocumentDb,
    ctx: &TenantContext,
    name: &str,
    user_id: &str,
) -> Result<String, ServiceError> {
    let tenant_id = ctx.require()?;
    let coll = ctx.collection(CLEANING_LIST)?;
    let name = require_text(name, "Task name")?;
    let doc = db.add_document(
        &coll,
        json!({
            "name": name,
            "done": false,
            "createdBy": user_id,
            "restaurantId": tenant_id,
        }),
    )?;
    Ok(doc.id().to_string())
}

pub fn set_cleaning_done(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
    done: bool,
) -> Result<(), ServiceError> {
    let doc = ctx.document(CLEANING_LIST, id)?;
    db.update_document(&doc, json!({ "done": done }))?;
    Ok(())
}

pub fn delete_cleaning_task(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
) -> Result<bool, ServiceError> {
    let doc = ctx.document(CLEANING_LIST, id)?;
    Ok(db.delete_document(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use chrono::Utc;

    #[test]
    fn test_task_lifecycle() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("joes-cafe").unwrap();

        let id = add_cleaning_task(&db, &ctx, "Degrease fryer", "uid-1").unwrap();
        set_cleaning_done(&db, &ctx, &id, true).unwrap();

        let tasks = list_cleaning_tasks(&db, &ctx).unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].done);
        assert_eq!(tasks[0].created_by.as_ref().unwrap().user_id(), "uid-1");

        let board = cleaning_board(&db, &ctx, &Utc::now()).unwrap();
        assert_eq!(board.today.len(), 1);
        assert!(board.yesterday.is_empty());

        assert!(delete_cleaning_task(&db, &ctx, &id).unwrap());
        assert!(cleaning_board(&db, &ctx, &Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_tasks_stay_with_their_restaurant() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("joes-cafe").unwrap();
        add_cleaning_task(&db, &ctx, "Sanitise boards", "uid-1").unwrap();

        ctx.switch_tenant(Some("golden-dragon")).unwrap();
        assert!(list_cleaning_tasks(&db, &ctx).unwrap().is_empty());
    }
}
