//! Topic derivation and identifier validation
//!
//! Topics must be preserved bit-exact for compatibility with deployed
//! subscribers: `{device}/status/{channel}` carries channel transitions,
//! `{device}/debug/alive` and `{device}/debug/version` carry liveness.
//! No leading slash, no canonicalization; the device and channel names are
//! validated at configuration time instead.

use thiserror::Error;

/// Build the retained status topic for one channel: `{device}/status/{channel}`.
pub fn status_topic(device: &str, channel: &str) -> String {
    format!("{device}/status/{channel}")
}

/// Build the liveness topic: `{device}/debug/alive`.
pub fn alive_topic(device: &str) -> String {
    format!("{device}/debug/alive")
}

/// Build the firmware-version topic: `{device}/debug/version`.
pub fn version_topic(device: &str) -> String {
    format!("{device}/debug/version")
}

/// Validate a device or channel name.
///
/// Names become topic segments, so the accepted alphabet excludes `/` and
/// the MQTT wildcard characters by construction.
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '.' && ch != '_' && ch != '-' {
            return Err(ValidationError::InvalidIdentifierChar(ch));
        }
    }

    Ok(())
}

/// Validation errors for topic identifiers
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("identifier cannot be empty")]
    EmptyIdentifier,
    #[error("identifier contains invalid character: '{0}'")]
    InvalidIdentifierChar(char),
}
