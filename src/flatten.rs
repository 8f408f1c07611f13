//! Proposal document validation and flattening
//!
//! Walks a parsed upload of the shape
//! `{ "data": { "vendorProposals": { "edges": [ { "node": {...} }, ... ] } } }`,
//! checks that every node carries the seven required fields, and produces one
//! flat record per node. Pure transformation, no I/O.
//!
//! Validation is fail-fast at the batch level: the first missing field in the
//! first faulty record aborts the whole document, so a malformed upload never
//! produces a partially populated store.

use serde_json::Value;

use crate::error::IngestError;

/// One validated proposal, flattened for persistence.
///
/// String source values are copied verbatim; non-string scalar leaves
/// (`0`, `false`) pass validation and are stored as their JSON rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatProposal {
    pub id: String,
    pub status: String,
    pub job_posting_id: String,
    pub job_title: String,
    pub job_description: String,
    pub team_name: String,
    pub cover_letter: String,
}

/// Resolve a dotted path against a nested value.
///
/// Descends key by key; a missing key, a non-object intermediate, or an
/// explicit null anywhere along the path all count as "not found".
fn nested_lookup<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    let mut value = node;
    for key in path.split('.') {
        value = value.get(key)?;
    }
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn require<'a>(
    node: &'a Value,
    field: &'static str,
    record: usize,
) -> Result<&'a Value, IngestError> {
    nested_lookup(node, field).ok_or(IngestError::MissingField { field, record })
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate a parsed proposal document and flatten it into persistable records.
///
/// Returns the flat records in input order, or the first error encountered:
/// `Structure` if the top-level edges path is absent (checked once, before any
/// per-record work) or an edge has no `node`, `MissingField` naming the first
/// unresolved required path in the earliest faulty record. No partial results.
pub fn extract_proposals(document: &Value) -> Result<Vec<FlatProposal>, IngestError> {
    let edges = document
        .pointer("/data/vendorProposals/edges")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            IngestError::Structure("expected data.vendorProposals.edges".to_string())
        })?;

    let mut proposals = Vec::with_capacity(edges.len());
    for (record, edge) in edges.iter().enumerate() {
        let node = edge.get("node").filter(|n| !n.is_null()).ok_or_else(|| {
            IngestError::Structure(format!("edge {} has no node", record))
        })?;

        // Field order here is the required-field order; evaluation is
        // top-to-bottom, so the earliest missing field is the one reported.
        let proposal = FlatProposal {
            id: text_value(require(node, "id", record)?),
            status: text_value(require(node, "status.status", record)?),
            job_posting_id: text_value(require(node, "marketplaceJobPosting.id", record)?),
            job_title: text_value(require(node, "marketplaceJobPosting.content.title", record)?),
            job_description: text_value(require(
                node,
                "marketplaceJobPosting.content.description",
                record,
            )?),
            team_name: text_value(require(
                node,
                "marketplaceJobPosting.ownership.team.name",
                record,
            )?),
            cover_letter: text_value(require(node, "proposalCoverLetter", record)?),
        };
        proposals.push(proposal);
    }

    Ok(proposals)
}
