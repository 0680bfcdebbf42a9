use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};

use camino::Utf8Path;

use crate::error::QcError;

pub fn open_input(path: &Utf8Path) -> Result<BufReader<File>, QcError> {
    let file =
        File::open(path.as_std_path()).map_err(|_| QcError::InputOpen(path.to_path_buf()))?;
    Ok(BufReader::new(file))
}

pub fn create_output(path: &Utf8Path) -> Result<BufWriter<File>, QcError> {
    let file =
        File::create(path.as_std_path()).map_err(|_| QcError::OutputOpen(path.to_path_buf()))?;
    Ok(BufWriter::new(file))
}

pub fn open_report(path: &Utf8Path) -> Result<BufWriter<File>, QcError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_std_path())
        .map_err(|_| QcError::ReportOpen(path.to_path_buf()))?;
    Ok(BufWriter::new(file))
}

/// Flushes and closes a buffered file, surfacing errors `Drop` would hide.
pub fn close(mut writer: BufWriter<File>, path: &Utf8Path) -> Result<(), QcError> {
    writer.flush().map_err(|err| write_error(path, err))?;
    let file = writer
        .into_inner()
        .map_err(|err| write_error(path, err.into_error()))?;
    file.sync_all().map_err(|err| write_error(path, err))
}

pub fn write_error(path: &Utf8Path, err: io::Error) -> QcError {
    QcError::Filesystem(format!("write {path}: {err}"))
}

pub fn read_error(path: &Utf8Path, err: io::Error) -> QcError {
    QcError::Filesystem(format!("read {path}: {err}"))
}
