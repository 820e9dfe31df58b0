//! Write payloads sent to the remote database.
//!
//! Optional attributes are skipped when absent, so a patch only touches
//! the fields the caller set.

use serde::Serialize;

use crate::models::Role;

// == Call Payloads ==
/// Attributes of a call being created.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_points: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_actions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_duration_estimate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

/// Partial update of an existing call; unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_points: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_actions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
}

// == Company Payloads ==
/// Attributes of a company being created.
#[derive(Debug, Clone, Serialize)]
pub struct NewCompany {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_link: Option<String>,
}

/// Partial update of a company.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_link: Option<String>,
}

// == Roster Payload ==
/// A member being added to the team roster.
#[derive(Debug, Clone, Serialize)]
pub struct NewTeamMember {
    pub name: String,
    pub email: String,
    pub role: Role,
}

// == Alert Payload ==
/// An alert one member sets for another.
#[derive(Debug, Clone, Serialize)]
pub struct NewAlert {
    pub created_by: String,
    pub target_user: String,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
