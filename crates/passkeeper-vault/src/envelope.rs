// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Portable backup envelope and payload shapes.
//!
//! An export is a JSON envelope whose `encrypted` field holds the
//! base64 AES-256-CBC ciphertext of a JSON payload. Typed serde parsing is
//! the structural validation: a shape or version mismatch surfaces as
//! [`PassKeeperError::Validation`] before anything touches the database.
//! The salt that opens the envelope travels out of band, never inside it.

use serde::{Deserialize, Serialize};

use passkeeper_core::PassKeeperError;

/// Envelope format version. Bump only with a migration story for old files.
pub const FORMAT_VERSION: &str = "1.0";

/// Outer envelope written to `.pkex` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub encrypted: String,
    pub iv: String,
    pub version: String,
    pub timestamp: String,
}

/// Decrypted payload: everything a user owns, stripped of ids and
/// timestamps so the destination assigns its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportPayload {
    #[serde(default)]
    pub categories: Vec<ExportedCategory>,
    #[serde(default)]
    pub passwords: Vec<ExportedCredential>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedCategory {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A credential as it travels: `password` stays ciphertext under the
/// source user's salt, with the per-record `iv` it was encrypted under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedCredential {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
    pub iv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

/// Categories are referenced by name across vaults; ids are local.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
}

impl ExportEnvelope {
    /// Parse and version-check an envelope. Runs before any decryption.
    pub fn parse(json: &str) -> Result<Self, PassKeeperError> {
        let envelope: ExportEnvelope = serde_json::from_str(json)
            .map_err(|e| PassKeeperError::Validation(format!("malformed envelope: {e}")))?;
        if envelope.version != FORMAT_VERSION {
            return Err(PassKeeperError::Validation(format!(
                "unsupported envelope version '{}', expected '{FORMAT_VERSION}'",
                envelope.version
            )));
        }
        Ok(envelope)
    }

    pub fn to_json(&self) -> Result<String, PassKeeperError> {
        serde_json::to_string(self)
            .map_err(|e| PassKeeperError::Internal(format!("envelope serialization failed: {e}")))
    }
}

impl ExportPayload {
    /// Parse the decrypted payload. A successful decryption with a wrong
    /// shape still aborts here, before the import transaction opens.
    pub fn parse(json: &str) -> Result<Self, PassKeeperError> {
        serde_json::from_str(json)
            .map_err(|e| PassKeeperError::Validation(format!("malformed payload: {e}")))
    }

    pub fn to_json(&self) -> Result<String, PassKeeperError> {
        serde_json::to_string(self)
            .map_err(|e| PassKeeperError::Internal(format!("payload serialization failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_roundtrips_through_json() {
        let envelope = ExportEnvelope {
            encrypted: "b64-blob".into(),
            iv: "b64-iv".into(),
            version: FORMAT_VERSION.into(),
            timestamp: "2026-08-30T12:00:00+00:00".into(),
        };
        let parsed = ExportEnvelope::parse(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(parsed.encrypted, "b64-blob");
        assert_eq!(parsed.version, FORMAT_VERSION);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let json = r#"{"encrypted":"x","iv":"y","version":"2.0","timestamp":"t"}"#;
        let err = ExportEnvelope::parse(json).unwrap_err();
        assert!(matches!(err, PassKeeperError::Validation(_)));
        assert!(err.to_string().contains("2.0"));
    }

    #[test]
    fn missing_fields_are_a_validation_error() {
        let err = ExportEnvelope::parse(r#"{"encrypted":"x"}"#).unwrap_err();
        assert!(matches!(err, PassKeeperError::Validation(_)));

        let err = ExportPayload::parse(r#"{"passwords":[{"title":"no secret"}]}"#).unwrap_err();
        assert!(matches!(err, PassKeeperError::Validation(_)));
    }

    #[test]
    fn payload_tolerates_absent_collections_and_optionals() {
        let payload = ExportPayload::parse("{}").unwrap();
        assert!(payload.categories.is_empty());
        assert!(payload.passwords.is_empty());

        let payload = ExportPayload::parse(
            r#"{"passwords":[{"title":"GitHub","password":"ct","iv":"iv"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.passwords.len(), 1);
        assert!(payload.passwords[0].username.is_none());
        assert!(!payload.passwords[0].favorite);
        assert!(payload.passwords[0].category.is_none());
    }

    #[test]
    fn non_json_input_is_a_validation_error() {
        assert!(matches!(
            ExportEnvelope::parse("not json at all"),
            Err(PassKeeperError::Validation(_))
        ));
    }
}
