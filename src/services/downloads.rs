// Recently exported files, kept per export kind.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::TenantContext;
use crate::db::DocumentDb;
use crate::error::ServiceError;
use crate::paths::collections::{DOWNLOADS, RECENT_DOWNLOADS};
use crate::paths::CollectionRef;
use crate::types::DownloadRecord;

use super::{list_newest, require_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadKind {
    Invoices,
    Temperature,
}

impl DownloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadKind::Invoices => "invoices",
            DownloadKind::Temperature => "temperature",
        }
    }
}

fn history(ctx: &TenantContext, kind: DownloadKind) -> Result<CollectionRef, ServiceError> {
    Ok(ctx.sub_collection(DOWNLOADS, kind.as_str(), RECENT_DOWNLOADS)?)
}

pub fn record_download(
    db: &DocumentDb,
    ctx: &TenantContext,
    kind: DownloadKind,
    name: &str,
    link: &str,
) -> Result<String, ServiceError> {
    let coll = history(ctx, kind)?;
    let name = require_text(name, "File name")?;
    let link = require_text(link, "Link")?;
    let doc = db.add_document(&coll, json!({ "name": name, "link": link }))?;
    log::debug!("Recorded {} download {}", kind.as_str(), name);
    Ok(doc.id().to_string())
}

/// The latest `limit` downloads of one kind, newest first.
pub fn recent_downloads(
    db: &DocumentDb,
    ctx: &TenantContext,
    kind: DownloadKind,
    limit: usize,
) -> Result<Vec<DownloadRecord>, ServiceError> {
    let coll = history(ctx, kind)?;
    let mut records: Vec<DownloadRecord> = list_newest(db, &coll)?;
    records.truncate(limit);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_kinds_are_kept_apart() {
        let db = test_db();
        let ctx = TenantContext::for_tenant("t").unwrap();
        record_download(&db, &ctx, DownloadKind::Invoices, "oct.zip", "https://x/oct.zip").unwrap();
        record_download(&db, &ctx, DownloadKind::Temperature, "temps.pdf", "https://x/t.pdf").unwrap();
        record_download(&db, &ctx, DownloadKind::Temperature, "temps2.pdf", "https://x/t2.pdf").unwrap();

        let invoices = recent_downloads(&db, &ctx, DownloadKind::Invoices, 10).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].name, "oct.zip");
        assert_eq!(recent_downloads(&db, &ctx, DownloadKind::Temperature, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_history_path() {
        let ctx = TenantContext::for_tenant("t").unwrap();
        assert_eq!(
            history(&ctx, DownloadKind::Invoices).unwrap().path(),
            "restaurants/t/downloads/invoices/recent_downloads"
        );
    }
}
