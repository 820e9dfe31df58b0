//! Data models for the dashboard's document collections
//!
//! `records` holds what the remote database returns, `payloads` what the
//! resource stores send on writes.

pub mod payloads;
pub mod records;

// Re-export public types
pub use payloads::{CallPatch, CompanyPatch, NewAlert, NewCall, NewCompany, NewTeamMember};
pub use records::{
    decode_list_field, AlertRecord, CallRecord, CompanyRecord, DocumentMeta, Role,
    TeamMemberRecord, TranscriptRecord,
};
