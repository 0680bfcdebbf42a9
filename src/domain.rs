use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QcError;

/// A sequence accession taken from one line of a delta file, with
/// surrounding whitespace removed. May be empty for blank lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn from_line(line: &str) -> Self {
        Self(line.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of the table the delta file is copied into. It is spliced into SQL
/// text, so only plain identifiers (optionally schema-qualified) are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StagingRelation(String);

impl StagingRelation {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn schema(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(schema, _)| schema)
    }

    pub fn table(&self) -> &str {
        self.0.rsplit_once('.').map_or(self.0.as_str(), |(_, table)| table)
    }
}

impl fmt::Display for StagingRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StagingRelation {
    type Err = QcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = !normalized.is_empty()
            && normalized.split('.').all(|part| {
                !part.is_empty()
                    && !part.starts_with(|ch: char| ch.is_ascii_digit())
                    && part.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            });
        if !is_valid {
            return Err(QcError::InvalidRelation(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn identifier_strips_whitespace() {
        let id = Identifier::from_line("  AB012345\t\r\n");
        assert_eq!(id.as_str(), "AB012345");
        assert!(!id.is_blank());
    }

    #[test]
    fn blank_line_is_blank_identifier() {
        assert!(Identifier::from_line("   \n").is_blank());
    }

    #[test]
    fn parse_relation_valid() {
        let rel: StagingRelation = "mgd.pss_qc_tmp".parse().unwrap();
        assert_eq!(rel.as_str(), "mgd.pss_qc_tmp");
        assert_eq!(rel.schema(), Some("mgd"));
        assert_eq!(rel.table(), "pss_qc_tmp");

        let bare: StagingRelation = "pss_qc_tmp".parse().unwrap();
        assert_eq!(bare.schema(), None);
        assert_eq!(bare.table(), "pss_qc_tmp");
    }

    #[test]
    fn parse_relation_rejects_sql() {
        let err = "tmp; drop table x".parse::<StagingRelation>().unwrap_err();
        assert_matches!(err, QcError::InvalidRelation(_));
        assert!("1tmp".parse::<StagingRelation>().is_err());
        assert!("mgd.".parse::<StagingRelation>().is_err());
    }
}
