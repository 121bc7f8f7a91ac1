//! SteamCMD output grammar.
//!
//! SteamCMD's textual output is an external contract that changes only with
//! client releases, so this module is the single place allowed to interpret
//! it. Everything downstream consumes the parsed [`LineEvent`]s and never
//! looks at raw text.
//!
//! Recognized shapes:
//!
//! ```text
//! Update state (0x61) downloading, progress: 42.05 (4146838956 / 9862206627)
//! Success! App '740' fully installed.
//! ERROR! Failed to install app '740' (No subscription)
//! FAILED login with result code Invalid Password
//! ```
//!
//! The decimal percentage printed by SteamCMD is ignored; the two byte
//! counts are authoritative and the percentage is recomputed from their
//! ratio. A line matching nothing is [`LineEvent::Other`] and goes to the
//! job log verbatim. No line ever decides the job outcome by itself; the
//! process exit code does that.

use std::sync::LazyLock;

use regex::Regex;

// ==========================================================================
// Patterns
// ==========================================================================

/// `progress: <pct> (<downloaded>/<total>)`, with or without spaces around
/// the slash. Older client builds print the counts without padding.
static PROGRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"progress: \d+\.\d+ \((\d+) ?/ ?(\d+)\)").expect("valid progress pattern"));

/// `Success! App '<id>' fully installed.`
static APP_INSTALLED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Success! App '(\d+)' fully installed").expect("valid install pattern"));

// ==========================================================================
// Events
// ==========================================================================

/// One classified line of SteamCMD output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Byte counts from a download progress line.
    Progress { downloaded_bytes: u64, total_bytes: u64 },
    /// The client's own success marker for a finished install.
    AppInstalled { app_id: u32 },
    /// A line the client flagged as an error. Recorded as failure detail
    /// but not terminal by itself.
    ErrorMarker { message: String },
    /// A failed login attempt.
    LoginFailure { reason: String },
    /// Anything unrecognized.
    Other,
}

/// Classify a single line of SteamCMD output.
#[must_use]
pub fn parse_line(line: &str) -> LineEvent {
    if let Some(captures) = PROGRESS.captures(line) {
        let downloaded = captures[1].parse::<u64>();
        let total = captures[2].parse::<u64>();
        if let (Ok(downloaded_bytes), Ok(total_bytes)) = (downloaded, total) {
            return LineEvent::Progress {
                downloaded_bytes,
                total_bytes,
            };
        }
    }

    if let Some(captures) = APP_INSTALLED.captures(line) {
        if let Ok(app_id) = captures[1].parse::<u32>() {
            return LineEvent::AppInstalled { app_id };
        }
    }

    let trimmed = line.trim();
    if trimmed.starts_with("ERROR!") {
        return LineEvent::ErrorMarker {
            message: trimmed.to_string(),
        };
    }
    if trimmed.contains("FAILED") && trimmed.to_ascii_lowercase().contains("login") {
        return LineEvent::LoginFailure {
            reason: trimmed.to_string(),
        };
    }

    LineEvent::Other
}
