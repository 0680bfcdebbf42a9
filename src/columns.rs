use std::io::BufRead;

use camino::Utf8Path;
use serde::Serialize;

use crate::error::QcError;
use crate::fs_util;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortLine {
    pub line_number: usize,
    pub columns: Vec<String>,
}

impl ShortLine {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnCheck {
    pub expected: usize,
    pub short_lines: Vec<ShortLine>,
}

impl ColumnCheck {
    pub fn passed(&self) -> bool {
        self.short_lines.is_empty()
    }
}

/// Flags every tab-delimited line with fewer than `expected` fields.
pub fn check_columns<R: BufRead>(
    reader: R,
    expected: usize,
    path: &Utf8Path,
) -> Result<ColumnCheck, QcError> {
    let mut short_lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| fs_util::read_error(path, err))?;
        let columns: Vec<String> = line.split('\t').map(str::to_string).collect();
        if columns.len() < expected {
            short_lines.push(ShortLine {
                line_number: idx + 1,
                columns,
            });
        }
    }
    Ok(ColumnCheck {
        expected,
        short_lines,
    })
}

pub fn check_file(path: &Utf8Path, expected: usize) -> Result<ColumnCheck, QcError> {
    let reader = fs_util::open_input(path)?;
    check_columns(reader, expected, path)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reports_short_lines_with_numbers() {
        let check = check_columns(
            Cursor::new("a\tb\tc\na\tb\n\na\tb\tc\td\n"),
            3,
            Utf8Path::new("f"),
        )
        .unwrap();
        assert!(!check.passed());
        let numbers: Vec<usize> = check.short_lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert_eq!(check.short_lines[0].column_count(), 2);
        assert_eq!(check.short_lines[1].column_count(), 1);
    }
}
