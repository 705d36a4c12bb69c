/// Core types used throughout the domain layer
///
/// This module defines the ID wrappers and the verification evidence types
/// shared by Habit, CompletionLog and the storage layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Longest image URL we accept as photo evidence
const MAX_IMAGE_URL_LEN: usize = 2048;

/// Longest note text we accept as text evidence
const MAX_EVIDENCE_TEXT_LEN: usize = 1000;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where a log ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a completion log
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub Uuid);

impl LogId {
    /// Generate a new random log ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a log ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How a completion was verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    Photo,
    Text,
}

impl VerificationKind {
    /// Name used in the database and over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationKind::Photo => "photo",
            VerificationKind::Text => "text",
        }
    }

    /// Parse a kind name. `note` is accepted as an alias for `text`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "photo" => Ok(VerificationKind::Photo),
            "text" | "note" => Ok(VerificationKind::Text),
            other => Err(DomainError::InvalidVerification(format!(
                "Unknown verification type '{}'. Valid options: photo, text",
                other
            ))),
        }
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evidence that a habit was performed
///
/// The evidence is opaque to the streak logic: a photo is only ever an URL
/// pointing at an image someone else uploaded, and a note is free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Verification {
    Photo { image_url: String },
    Text { text: String },
}

impl Verification {
    /// Build photo evidence, validating the URL
    pub fn photo(image_url: impl Into<String>) -> Result<Self, DomainError> {
        let image_url = image_url.into().trim().to_string();

        if image_url.is_empty() {
            return Err(DomainError::InvalidVerification(
                "Photo verification requires an image URL".to_string()
            ));
        }
        if !(image_url.starts_with("https://") || image_url.starts_with("http://")) {
            return Err(DomainError::InvalidVerification(
                "Image URL must start with http:// or https://".to_string()
            ));
        }
        if image_url.len() > MAX_IMAGE_URL_LEN {
            return Err(DomainError::InvalidVerification(format!(
                "Image URL cannot be longer than {} characters",
                MAX_IMAGE_URL_LEN
            )));
        }

        Ok(Verification::Photo { image_url })
    }

    /// Build text evidence, validating the note
    pub fn text(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into().trim().to_string();

        if text.is_empty() {
            return Err(DomainError::InvalidVerification(
                "Please enter a note to verify your habit".to_string()
            ));
        }
        if text.chars().count() > MAX_EVIDENCE_TEXT_LEN {
            return Err(DomainError::InvalidVerification(format!(
                "Verification note cannot be longer than {} characters",
                MAX_EVIDENCE_TEXT_LEN
            )));
        }

        Ok(Verification::Text { text })
    }

    pub fn kind(&self) -> VerificationKind {
        match self {
            Verification::Photo { .. } => VerificationKind::Photo,
            Verification::Text { .. } => VerificationKind::Text,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Verification::Photo { image_url } => Some(image_url),
            Verification::Text { .. } => None,
        }
    }

    pub fn text_evidence(&self) -> Option<&str> {
        match self {
            Verification::Text { text } => Some(text),
            Verification::Photo { .. } => None,
        }
    }
}
