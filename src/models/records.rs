//! Document records read from the remote database.
//!
//! Field sets mirror the dashboard's collection schemas. Every record
//! carries the store's document envelope (`$id`, `$createdAt`,
//! `$updatedAt`) via [`DocumentMeta`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Document Meta ==
/// The document store's envelope attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Server-assigned document id
    #[serde(rename = "$id")]
    pub id: String,
    /// Creation time, set by the server
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update time, set by the server
    #[serde(rename = "$updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// == Call Record ==
/// One logged cold call.
///
/// `objections`, `pain_points`, and `follow_up_actions` arrive as
/// JSON-encoded string lists inside string attributes; the `*_list`
/// methods decode them, tolerating plain-text values from older rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub caller_name: Option<String>,
    #[serde(default)]
    pub recipients: Option<String>,
    #[serde(default)]
    pub call_outcome: Option<String>,
    /// 1 (cold) through 10 (ready to buy)
    #[serde(default)]
    pub interest_level: Option<u8>,
    #[serde(default)]
    pub objections: Option<String>,
    #[serde(default)]
    pub pain_points: Option<String>,
    #[serde(default)]
    pub follow_up_actions: Option<String>,
    #[serde(default)]
    pub call_summary: Option<String>,
    #[serde(default)]
    pub call_duration_estimate: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    /// Team member who claimed this call, if anyone
    #[serde(default)]
    pub claimed_by: Option<String>,
}

impl CallRecord {
    /// Decoded objection list.
    pub fn objection_list(&self) -> Vec<String> {
        decode_list_field(self.objections.as_deref())
    }

    /// Decoded pain-point list.
    pub fn pain_point_list(&self) -> Vec<String> {
        decode_list_field(self.pain_points.as_deref())
    }

    /// Decoded follow-up action list.
    pub fn follow_up_list(&self) -> Vec<String> {
        decode_list_field(self.follow_up_actions.as_deref())
    }
}

/// Decodes a JSON-list-in-a-string attribute.
///
/// A value that is not a JSON array is kept as a single-element list, so
/// rows written before the list encoding still render.
pub fn decode_list_field(raw: Option<&str>) -> Vec<String> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Vec::new(),
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(items) => items,
        Err(_) => vec![raw.to_string()],
    }
}

// == Company Record ==
/// A company being called on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    #[serde(default)]
    pub owner_name: Option<String>,
    pub company_name: String,
    #[serde(default)]
    pub company_location: Option<String>,
    #[serde(default)]
    pub google_maps_link: Option<String>,
}

// == Transcript Record ==
/// The transcript of one call; one-to-one with [`CallRecord`] by `call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub call_id: String,
    pub transcript: String,
}

// == Team Member Record ==
/// Dashboard access role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// One member of the calling team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberRecord {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub name: String,
    pub email: String,
    pub role: Role,
}

// == Alert Record ==
/// A reminder one team member sets for another about some entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub created_by: String,
    pub target_user: String,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(default)]
    pub entity_label: Option<String>,
    /// ISO datetime the alert should fire at
    #[serde(default)]
    pub alert_time: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_dismissed: bool,
}
