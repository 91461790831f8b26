//! Status reason phrases.

use std::collections::HashMap;

use http::StatusCode;

/// Maps a status code onto its human reason phrase.
pub trait StatusTexts: Send + Sync {
    fn reason(&self, status: StatusCode) -> Option<String>;
}

/// Reason phrases from the `http` crate's canonical table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalReasons;

impl StatusTexts for CanonicalReasons {
    fn reason(&self, status: StatusCode) -> Option<String> {
        status.canonical_reason().map(str::to_string)
    }
}

/// An explicit table, injected whole. Codes missing from the table have no
/// reason phrase.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    reasons: HashMap<u16, String>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reason(mut self, code: u16, reason: impl Into<String>) -> Self {
        self.reasons.insert(code, reason.into());
        self
    }
}

impl FromIterator<(u16, String)> for StatusTable {
    fn from_iter<I: IntoIterator<Item = (u16, String)>>(iter: I) -> Self {
        Self {
            reasons: iter.into_iter().collect(),
        }
    }
}

impl StatusTexts for StatusTable {
    fn reason(&self, status: StatusCode) -> Option<String> {
        self.reasons.get(&status.as_u16()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_reasons() {
        assert_eq!(
            CanonicalReasons.reason(StatusCode::NOT_FOUND).as_deref(),
            Some("Not Found")
        );
        assert_eq!(
            CanonicalReasons
                .reason(StatusCode::PRECONDITION_FAILED)
                .as_deref(),
            Some("Precondition Failed")
        );
    }

    #[test]
    fn table_only_knows_its_entries() {
        let table = StatusTable::new().with_reason(404, "Nope");
        assert_eq!(table.reason(StatusCode::NOT_FOUND).as_deref(), Some("Nope"));
        assert!(table.reason(StatusCode::OK).is_none());
    }
}
