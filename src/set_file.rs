use std::io::{BufRead, Write};

use camino::Utf8Path;
use serde::Serialize;

use crate::domain::Identifier;
use crate::error::QcError;
use crate::fs_util;

#[derive(Debug, Clone, Serialize)]
pub struct SetFileResult {
    pub path: String,
    pub rows: usize,
}

/// Writes one `id<TAB>id` row per non-blank input line.
pub fn write_set_rows<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    input: &Utf8Path,
    output: &Utf8Path,
) -> Result<usize, QcError> {
    let mut rows = 0;
    for line in reader.lines() {
        let line = line.map_err(|err| fs_util::read_error(input, err))?;
        let id = Identifier::from_line(&line);
        if id.is_blank() {
            continue;
        }
        writeln!(writer, "{id}\t{id}").map_err(|err| fs_util::write_error(output, err))?;
        rows += 1;
    }
    Ok(rows)
}

pub fn write_set_file(input: &Utf8Path, output: &Utf8Path) -> Result<SetFileResult, QcError> {
    let reader = fs_util::open_input(input)?;
    let mut writer = fs_util::create_output(output)?;
    let rows = write_set_rows(reader, &mut writer, input, output)?;
    fs_util::close(writer, output)?;
    Ok(SetFileResult {
        path: output.to_string(),
        rows,
    })
}
