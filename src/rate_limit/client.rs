//! Client identity used as the rate limiting key.

use std::fmt;

use crate::error::{F1Error, Result};

// == Client Id ==
/// Non-empty, trimmed client identifier.
///
/// The only way to build one is `ClientId::parse`, so the limiter never sees
/// a missing identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Validates a raw identifier, typically taken from a request header.
    ///
    /// Returns `F1Error::MissingClientId` if it is absent or blank.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            Some(id) if !id.is_empty() => Ok(Self(id.to_string())),
            _ => Err(F1Error::MissingClientId),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
