use std::io::{self, Write};

use serde::Serialize;

use crate::catalog::{CatalogScope, CatalogSession};
use crate::domain::StagingRelation;
use crate::error::QcError;
use crate::outcome::QcCounts;

pub const REPORT_WIDTH: usize = 80;
pub const ID_COLUMN_WIDTH: usize = 20;
pub const ID_COLUMN_HEADER: &str = "Sequence ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Secondary,
    Invalid,
}

impl ReportKind {
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Secondary => "Secondary Sequence Report",
            ReportKind::Invalid => "Invalid Sequence ID Report",
        }
    }

    // The secondary report has always carried a space after the id column;
    // downstream diffs depend on it.
    fn column_suffix(self) -> &'static str {
        match self {
            ReportKind::Secondary => " ",
            ReportKind::Invalid => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub rows: Vec<String>,
}

impl Report {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn counts(&self) -> QcCounts {
        match self.kind {
            ReportKind::Secondary => QcCounts::nonfatal(self.row_count()),
            ReportKind::Invalid => QcCounts::fatal(self.row_count()),
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W, timestamp: &str) -> io::Result<()> {
        let suffix = self.kind.column_suffix();
        writeln!(writer, "{:^width$}", self.kind.title(), width = REPORT_WIDTH)?;
        writeln!(
            writer,
            "{:^width$}\n",
            format!("({timestamp})"),
            width = REPORT_WIDTH
        )?;
        writeln!(
            writer,
            "{:<width$}{suffix}",
            ID_COLUMN_HEADER,
            width = ID_COLUMN_WIDTH
        )?;
        writeln!(writer, "{}", "-".repeat(ID_COLUMN_WIDTH))?;
        for row in &self.rows {
            writeln!(writer, "{:<width$}{suffix}", row, width = ID_COLUMN_WIDTH)?;
        }
        write!(writer, "\nNumber of Rows: {}\n", self.row_count())
    }

    pub fn render(&self, timestamp: &str) -> io::Result<String> {
        let mut out = Vec::new();
        self.write_to(&mut out, timestamp)?;
        String::from_utf8(out).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

/// Staged identifiers that exist in the catalog only as non-preferred
/// (secondary) accessions.
pub fn secondary_report<S: CatalogSession>(
    session: &S,
    relation: &StagingRelation,
    scope: &CatalogScope,
) -> Result<Report, QcError> {
    Ok(Report {
        kind: ReportKind::Secondary,
        rows: session.secondary_ids(relation, scope)?,
    })
}

/// Staged identifiers with no catalog entry at all within the scope.
pub fn invalid_report<S: CatalogSession>(
    session: &S,
    relation: &StagingRelation,
    scope: &CatalogScope,
) -> Result<Report, QcError> {
    Ok(Report {
        kind: ReportKind::Invalid,
        rows: session.invalid_ids(relation, scope)?,
    })
}

pub fn report_timestamp() -> String {
    chrono::Local::now().format("%c").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_report_layout() {
        let report = Report {
            kind: ReportKind::Invalid,
            rows: vec!["A1".to_string(), "b2".to_string()],
        };
        let text = report.render("ts").unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[0].len(), 80);
        assert_eq!(lines[0].trim(), "Invalid Sequence ID Report");
        assert_eq!(lines[0].find('I'), Some(27));
        assert_eq!(lines[1].trim(), "(ts)");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Sequence ID         ");
        assert_eq!(lines[4], "--------------------");
        assert_eq!(lines[5], "A1                  ");
        assert_eq!(lines[6], "b2                  ");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "Number of Rows: 2");
        assert_eq!(lines[9], "");
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn secondary_rows_carry_trailing_space() {
        let report = Report {
            kind: ReportKind::Secondary,
            rows: vec!["Y2".to_string()],
        };
        let text = report.render("ts").unwrap();
        assert!(text.contains("Sequence ID          \n"));
        assert!(text.contains(&format!("{:<20} \n", "Y2")));
        assert_eq!(report.counts(), QcCounts::nonfatal(1));
    }

    #[test]
    fn long_identifier_is_not_truncated() {
        let long = "NM_0000000000000000001";
        let report = Report {
            kind: ReportKind::Invalid,
            rows: vec![long.to_string()],
        };
        assert!(report.render("ts").unwrap().contains(&format!("{long}\n")));
    }

    #[test]
    fn empty_report_counts_zero() {
        let report = Report {
            kind: ReportKind::Invalid,
            rows: Vec::new(),
        };
        let text = report.render("ts").unwrap();
        assert!(text.ends_with("--------------------\n\nNumber of Rows: 0\n"));
        assert_eq!(report.counts(), QcCounts::default());
    }
}
