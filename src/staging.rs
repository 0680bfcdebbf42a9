use std::fs::File;
use std::io::{BufRead, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempPath;

use crate::bulk::{BulkLoadRequest, BulkLoader};
use crate::catalog::CatalogSession;
use crate::domain::Identifier;
use crate::error::QcError;
use crate::fs_util;

/// Reads every line of a delta file. Blank lines are kept as empty
/// identifiers; only the set-file path drops them.
pub fn read_delta<R: BufRead>(reader: R, path: &Utf8Path) -> Result<Vec<Identifier>, QcError> {
    reader
        .lines()
        .map(|line| {
            line.map(|raw| Identifier::from_line(&raw))
                .map_err(|err| fs_util::read_error(path, err))
        })
        .collect()
}

pub fn write_staging_artifact<W: Write>(
    writer: &mut W,
    identifiers: &[Identifier],
) -> std::io::Result<()> {
    for id in identifiers {
        writer.write_all(id.as_str().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// The intermediate file handed to the bulk loader. Without a configured
/// path it is a temporary file removed when this value is dropped.
pub struct StagingArtifact {
    path: Utf8PathBuf,
    writer: Option<BufWriter<File>>,
    _temp: Option<TempPath>,
}

impl StagingArtifact {
    pub fn create(path: Option<&Utf8Path>) -> Result<Self, QcError> {
        if let Some(path) = path {
            return Ok(Self {
                path: path.to_path_buf(),
                writer: Some(fs_util::create_output(path)?),
                _temp: None,
            });
        }

        let (file, temp) = tempfile::Builder::new()
            .prefix("pss-qc-")
            .suffix(".bcp")
            .tempfile()
            .map_err(|err| QcError::Filesystem(format!("create staging file: {err}")))?
            .into_parts();
        let path = Utf8PathBuf::from_path_buf(temp.to_path_buf())
            .map_err(|_| QcError::Filesystem("invalid staging file path".to_string()))?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            _temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Writes all identifiers and closes the file so the loader sees
    /// complete content.
    pub fn write_and_close(&mut self, identifiers: &[Identifier]) -> Result<usize, QcError> {
        let mut writer = self.writer.take().ok_or_else(|| {
            QcError::Filesystem(format!("staging file {} already closed", self.path))
        })?;
        write_staging_artifact(&mut writer, identifiers)
            .map_err(|err| fs_util::write_error(&self.path, err))?;
        fs_util::close(writer, &self.path)?;
        Ok(identifiers.len())
    }
}

/// Runs the bulk load. Any non-zero status is a hard stop, as is a load
/// that succeeded somewhere the session cannot see.
pub fn load_staging<S: CatalogSession, L: BulkLoader>(
    session: &mut S,
    loader: &L,
    request: &BulkLoadRequest,
) -> Result<(), QcError> {
    let status = loader.load(session, request)?;
    if !status.success() {
        return Err(QcError::BulkLoad {
            relation: request.relation.to_string(),
            status: status.0,
        });
    }
    if !session.has_relation(&request.relation)? {
        return Err(QcError::StagingNotVisible(request.relation.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn read_delta_keeps_blank_lines() {
        let ids = read_delta(Cursor::new(" A1 \n\nb2"), Utf8Path::new("delta.txt")).unwrap();
        let values: Vec<&str> = ids.iter().map(Identifier::as_str).collect();
        assert_eq!(values, vec!["A1", "", "b2"]);
    }

    #[test]
    fn trailing_newline_adds_no_record() {
        let ids = read_delta(Cursor::new("A1\nb2\n"), Utf8Path::new("delta.txt")).unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn artifact_is_newline_delimited() {
        let ids = vec![Identifier::from_line("A1"), Identifier::from_line(" ")];
        let mut out = Vec::new();
        write_staging_artifact(&mut out, &ids).unwrap();
        assert_eq!(out, b"A1\n\n");
    }

    #[test]
    fn temporary_artifact_removed_on_drop() {
        let mut artifact = StagingArtifact::create(None).unwrap();
        let path = artifact.path().to_path_buf();
        artifact
            .write_and_close(&[Identifier::from_line("A1")])
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A1\n");
        drop(artifact);
        assert!(!path.as_std_path().exists());
    }
}
