//! Expected-reply table.
//!
//! The platform never says where a reply ends, and it may interleave
//! unsolicited status lines with the answer. Each command therefore carries
//! a static "looks complete" predicate and a line-selection rule, both keyed
//! by the command verb.
//!
//! | Verb | Expected marker |
//! |------|-----------------|
//! | `DARWINSTATUS` | `DARWIN_STATUS` |
//! | `INFOACCOUNT` | `INFOACCOUNT` |
//! | `INFOAVAILABILITY` | `AVAILABILITY` |
//! | `INFOSTOCKS`, `GETPOSITION` | `STOCK` |
//! | `ORDERLIST`, `ORDERLISTPENDING` | `ORDER` |
//! | `ACQAZ`, `VENAZ`, `ACQMARKET`, `VENMARKET`, `REVORD`, `REVALL`, `MODORD`, `CONFORD` | `TRAD` |
//!
//! A reply containing [`ERROR_MARKER`] completes any command.

// ============================================================================
// Imports
// ============================================================================

use super::{ERROR_MARKER, ORDER_ACK_MARKER, STATUS_MARKER, STATUS_PROBE};

// ============================================================================
// ExpectedReply
// ============================================================================

/// What a command's reply looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedReply {
    /// Marker the answering line starts with (or contains).
    prefix: Option<&'static str>,
    /// Command-specific secondary marker tried before the last-line fallback.
    fallback: Option<&'static str>,
    /// Whether this is the status probe (longer deadline).
    status_probe: bool,
}

impl ExpectedReply {
    /// Looks up the expected reply for raw command text.
    ///
    /// Only the first whitespace-delimited token is considered.
    #[must_use]
    pub fn for_command(command: &str) -> Self {
        let verb = command.split_whitespace().next().unwrap_or_default();
        Self::for_verb(verb)
    }

    /// Looks up the expected reply for a command verb.
    #[must_use]
    pub fn for_verb(verb: &str) -> Self {
        let (prefix, fallback) = match verb {
            STATUS_PROBE => (Some(STATUS_MARKER), Some(STATUS_MARKER)),
            "INFOACCOUNT" => (Some("INFOACCOUNT"), None),
            "INFOAVAILABILITY" => (Some("AVAILABILITY"), Some("AVAIL")),
            "INFOSTOCKS" | "GETPOSITION" => (Some("STOCK"), None),
            "ORDERLIST" | "ORDERLISTPENDING" => (Some("ORDER"), None),
            "ACQAZ" | "VENAZ" | "ACQMARKET" | "VENMARKET" | "REVORD" | "REVALL" | "MODORD"
            | "CONFORD" => (Some(ORDER_ACK_MARKER), None),
            _ => (None, None),
        };

        Self {
            prefix,
            fallback,
            status_probe: verb == STATUS_PROBE,
        }
    }

    /// Returns the expected marker, if the command has one.
    #[inline]
    #[must_use]
    pub const fn prefix(&self) -> Option<&'static str> {
        self.prefix
    }

    /// Returns `true` for the status probe.
    #[inline]
    #[must_use]
    pub const fn is_status_probe(&self) -> bool {
        self.status_probe
    }

    /// Returns `true` once `text` holds a reply to this command.
    ///
    /// An error marker anywhere completes immediately. Otherwise the
    /// expected marker must appear on a newline-terminated line, so a marker
    /// split across two reads does not end accumulation early. Commands
    /// without a marker complete on their first full line.
    #[must_use]
    pub fn is_complete(&self, text: &str) -> bool {
        if text.contains(ERROR_MARKER) {
            return true;
        }

        text.split_inclusive('\n')
            .filter(|line| line.ends_with('\n'))
            .any(|line| match self.prefix {
                Some(prefix) => line.contains(prefix),
                None => !line.trim().is_empty(),
            })
    }

    /// Picks the single line that answers this command.
    ///
    /// A lone non-empty line is returned as is. With several lines the
    /// precedence is: starts with the expected marker, contains it, starts
    /// with the error marker, contains the command fallback marker, and
    /// finally the last non-empty line. Error and status lines thus win over
    /// unrelated trailing chatter.
    #[must_use]
    pub fn select_line<'a>(&self, text: &'a str) -> &'a str {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();

        match lines.as_slice() {
            [] => "",
            [only] => *only,
            _ => self
                .prefix
                .and_then(|prefix| {
                    lines
                        .iter()
                        .find(|line| line.starts_with(prefix))
                        .or_else(|| lines.iter().find(|line| line.contains(prefix)))
                })
                .or_else(|| lines.iter().find(|line| line.starts_with(ERROR_MARKER)))
                .or_else(|| {
                    self.fallback
                        .and_then(|marker| lines.iter().find(|line| line.contains(marker)))
                })
                .or_else(|| lines.last())
                .copied()
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
