// Shift handovers.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::TenantContext;
use crate::db::DocumentDb;
use crate::error::ServiceError;
use crate::paths::collections::HANDOVERS;
use crate::types::{decode_all, Handover};

use super::require_text;

/// What the outgoing shift reports. A section's text is only kept when its
/// flag is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoverNotes {
    #[serde(default)]
    pub problems: bool,
    #[serde(default)]
    pub problems_during_shift_text: String,
    #[serde(default)]
    pub service_notes: bool,
    #[serde(default)]
    pub service_notes_text: String,
    #[serde(default)]
    pub stock_issues: bool,
    #[serde(default)]
    pub stock_issues_text: String,
}

fn section(flag: bool, text: &str) -> String {
    if flag {
        text.trim().to_string()
    } else {
        String::new()
    }
}

/// Save a handover. The PDF link is attached later with
/// [`attach_handover_pdf`]. Returns the new document id.
pub fn submit_handover(
    db: &DocumentDb,
    ctx: &TenantContext,
    notes: &HandoverNotes,
    user_id: &str,
) -> Result<String, ServiceError> {
    let coll = ctx.collection(HANDOVERS)?;
    let user_id = require_text(user_id, "User")?;
    let doc = db.add_document(
        &coll,
        json!({
            "createdBy": user_id,
            "pdf": "",
            "problems": notes.problems,
            "problemsDuringShiftText": section(notes.problems, &notes.problems_during_shift_text),
            "serviceNotes": notes.service_notes,
            "serviceNotesText": section(notes.service_notes, &notes.service_notes_text),
            "stockIssues": notes.stock_issues,
            "stockIssuesText": section(notes.stock_issues, &notes.stock_issues_text),
        }),
    )?;
    log::info!("Handover {} submitted by {}", doc.id(), user_id);
    Ok(doc.id().to_string())
}

pub fn attach_handover_pdf(
    db: &DocumentDb,
    ctx: &TenantContext,
    id: &str,
    pdf_url: &str,
) -> Result<(), ServiceError> {
    let doc = ctx.document(HANDOVERS, id)?;
    let pdf_url = require_text(pdf_url, "PDF link")?;
    db.update_document(&doc, json!({ "pdf": pdf_url }))?;
    Ok(())
}

/// Handovers written by `user_id`, newest first, at most `limit` of them.
pub fn list_handovers_by(
    db: &DocumentDb,
    ctx: &TenantContext,
    user_id: &str,
    limit: usize,
) -> Result<Vec<Handover>, ServiceError> {
    let coll = ctx.collection(HANDOVERS)?;
    let docs = db.list_where(&coll, "createdBy", &Value::String(user_id.to_string()))?;
    let mut handovers: Vec<Handover> = decode_all(docs);
    handovers.truncate(limit);
    Ok(handovers)
}
