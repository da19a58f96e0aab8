//! Failure records.

use std::fmt;

use chrono::NaiveDate;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The site's region could not be resolved.
    UnresolvedRegion,
    /// The plan cannot run on the product.
    NotApplicable,
    /// The availability query failed.
    Availability,
    /// A batch produced nothing.
    BatchFailed,
    /// A single date failed during per-date fallback.
    DateMissing,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::UnresolvedRegion => "unresolved_region",
            FailureKind::NotApplicable => "not_applicable",
            FailureKind::Availability => "availability",
            FailureKind::BatchFailed => "batch_failed",
            FailureKind::DateMissing => "date_missing",
        };
        f.write_str(name)
    }
}

/// One entry for the failure log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub site: String,
    pub date: Option<NaiveDate>,
    pub proc_code: Option<u64>,
    pub kind: FailureKind,
    pub message: String,
}

impl FailureRecord {
    pub fn new(site: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            date: None,
            proc_code: None,
            kind,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: u64) -> Self {
        self.proc_code = Some(code);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// `SITE <id> [CODE <code>] [DATE <date>]`, used as the log identifier.
    pub fn identifier(&self) -> String {
        let mut id = format!("SITE {}", self.site);
        if let Some(code) = self.proc_code {
            id.push_str(&format!(" CODE {}", code));
        }
        if let Some(date) = self.date {
            id.push_str(&format!(" DATE {}", date));
        }
        id
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.identifier(), self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_includes_optional_parts() {
        let record = FailureRecord::new("lake", FailureKind::BatchFailed, "timed out");
        assert_eq!(record.identifier(), "SITE lake");

        let record = record
            .with_code(20109001)
            .with_date(NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());
        assert_eq!(record.identifier(), "SITE lake CODE 20109001 DATE 2021-01-02");
        assert_eq!(
            record.to_string(),
            "SITE lake CODE 20109001 DATE 2021-01-02 [batch_failed]: timed out"
        );
    }
}
