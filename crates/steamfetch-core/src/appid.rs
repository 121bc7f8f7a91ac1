//! Steam application identifier.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Matches a bare numeric ID or the `app/<id>` segment of a store URL.
static APP_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:app/|^)(\d+)").expect("valid app id pattern"));

/// Steam's numeric application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(u32);

impl AppId {
    /// Wrap an already-validated numeric ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Parse an app ID from user input.
    ///
    /// Accepts a bare numeric ID (`"740"`) or a Steam store URL
    /// (`"https://store.steampowered.com/app/740/CSGO_Dedicated_Server/"`).
    /// Zero is rejected; Steam does not assign it.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        let captures = APP_ID_PATTERN
            .captures(trimmed)
            .ok_or_else(|| CoreError::InvalidTarget(trimmed.to_string()))?;
        let id: u32 = captures[1]
            .parse()
            .map_err(|_| CoreError::InvalidTarget(trimmed.to_string()))?;
        if id == 0 {
            return Err(CoreError::InvalidTarget(trimmed.to_string()));
        }
        Ok(Self(id))
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
