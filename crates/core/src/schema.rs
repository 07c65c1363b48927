//! Schema-driven parsing for inbound submissions.
//!
//! Request bodies are parsed from raw bytes rather than through the
//! framework's JSON extractor so malformed payloads surface as a 400 with
//! field-level detail instead of a bare rejection.

use validator::{Validate, ValidationErrors};

use crate::error::{Error, Result};
use crate::events::NewEvent;
use crate::limits::MAX_BODY_BYTES;
use crate::session::{NewSession, SessionPatch};

/// Rejects oversized bodies before deserialization.
pub fn validate_body_size(raw: &[u8]) -> Result<()> {
    if raw.len() > MAX_BODY_BYTES {
        return Err(Error::validation(format!(
            "body {}KB exceeds {}KB limit",
            raw.len() / 1024,
            MAX_BODY_BYTES / 1024
        )));
    }
    Ok(())
}

/// Parses and validates an event submission.
pub fn parse_event(raw: &[u8]) -> Result<NewEvent> {
    validate_body_size(raw)?;
    let event: NewEvent =
        serde_json::from_slice(raw).map_err(|e| Error::validation(e.to_string()))?;
    event.validate().map_err(collect_field_errors)?;
    Ok(event)
}

/// Parses and validates a session creation.
pub fn parse_session(raw: &[u8]) -> Result<NewSession> {
    validate_body_size(raw)?;
    let session: NewSession =
        serde_json::from_slice(raw).map_err(|e| Error::validation(e.to_string()))?;
    session.validate().map_err(collect_field_errors)?;
    Ok(session)
}

/// Parses and validates a partial session update.
pub fn parse_session_patch(raw: &[u8]) -> Result<SessionPatch> {
    validate_body_size(raw)?;
    let patch: SessionPatch =
        serde_json::from_slice(raw).map_err(|e| Error::validation(e.to_string()))?;
    patch.validate().map_err(collect_field_errors)?;
    Ok(patch)
}

/// Flattens validator output into per-field messages.
fn collect_field_errors(errors: ValidationErrors) -> Error {
    let mut details = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs {
            let msg = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            details.push(format!("{field}: {msg}"));
        }
    }
    if details.is_empty() {
        details.push("invalid payload".to_string());
    }
    Error::Validation(details)
}
