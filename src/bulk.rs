use std::fs;
use std::path::PathBuf;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};

use crate::catalog::CatalogSession;
use crate::config::QcConfig;
use crate::domain::StagingRelation;
use crate::error::QcError;

pub const FIELD_DELIMITER: &str = "\t";
pub const ROW_DELIMITER: &str = "\n";
pub const BCPIN_SCRIPT: &str = "bin/bcpin.csh";
pub const CATALOG_DB_ENV: &str = "PSS_CATALOG_DB";

#[derive(Debug, Clone)]
pub struct BulkLoadRequest {
    pub server: String,
    pub database: String,
    pub relation: StagingRelation,
    pub staging_file: Utf8PathBuf,
    pub field_delimiter: String,
    pub row_delimiter: String,
    pub schema: String,
    /// Catalog file the session reads from. The external loader must write
    /// the staging relation there for the reporters to see it.
    pub catalog_db: Option<Utf8PathBuf>,
}

impl BulkLoadRequest {
    pub fn from_config(config: &QcConfig, staging_file: &Utf8Path) -> Self {
        Self {
            server: config.target.server.clone(),
            database: config.target.database.clone(),
            relation: config.relation.clone(),
            staging_file: staging_file.to_path_buf(),
            field_delimiter: FIELD_DELIMITER.to_string(),
            row_delimiter: ROW_DELIMITER.to_string(),
            schema: config.target.schema.clone(),
            catalog_db: config.catalog_db.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkLoadStatus(pub i32);

impl BulkLoadStatus {
    pub const SUCCESS: BulkLoadStatus = BulkLoadStatus(0);

    pub fn success(&self) -> bool {
        self.0 == 0
    }
}

/// Loads a staging file into the staging relation. Implementations return
/// the loader's status rather than an error for a failed load so the caller
/// decides how to stop.
pub trait BulkLoader {
    fn load<S: CatalogSession>(
        &self,
        session: &mut S,
        request: &BulkLoadRequest,
    ) -> Result<BulkLoadStatus, QcError>;
}

/// Runs an external bulk-copy wrapper such as `bcpin.csh`.
#[derive(Debug, Clone)]
pub struct CommandBulkLoader {
    program: PathBuf,
}

impl CommandBulkLoader {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_utils_dir(utils: &Utf8Path) -> Result<Self, QcError> {
        let program = utils.join(BCPIN_SCRIPT);
        if !program.as_std_path().exists() {
            return Err(QcError::MissingTool(program.to_string()));
        }
        Ok(Self::new(program.into_std_path_buf()))
    }

    pub fn args(request: &BulkLoadRequest) -> Vec<String> {
        vec![
            request.server.clone(),
            request.database.clone(),
            request.relation.to_string(),
            "/".to_string(),
            request.staging_file.to_string(),
            escape_delimiter(&request.field_delimiter),
            escape_delimiter(&request.row_delimiter),
            request.schema.clone(),
        ]
    }

    pub fn command(&self, request: &BulkLoadRequest) -> Command {
        let mut command = Command::new(&self.program);
        command.args(Self::args(request));
        if let Some(catalog_db) = &request.catalog_db {
            command.env(CATALOG_DB_ENV, catalog_db.as_std_path());
        }
        command
    }
}

impl BulkLoader for CommandBulkLoader {
    fn load<S: CatalogSession>(
        &self,
        _session: &mut S,
        request: &BulkLoadRequest,
    ) -> Result<BulkLoadStatus, QcError> {
        let output = self
            .command(request)
            .output()
            .map_err(|err| {
                QcError::BulkLoadSpawn(format!("{}: {err}", self.program.display()))
            })?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            tracing::warn!(loader = %self.program.display(), "{stderr}");
        }
        Ok(BulkLoadStatus(output.status.code().unwrap_or(-1)))
    }
}

/// Copies the staging file into the session directly, for catalogs the
/// external wrapper cannot reach (and for tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCopyLoader;

impl BulkLoader for SessionCopyLoader {
    fn load<S: CatalogSession>(
        &self,
        session: &mut S,
        request: &BulkLoadRequest,
    ) -> Result<BulkLoadStatus, QcError> {
        let content = fs::read_to_string(request.staging_file.as_std_path())
            .map_err(|_| QcError::InputOpen(request.staging_file.clone()))?;
        let rows = split_rows(&content, &request.row_delimiter, &request.field_delimiter);
        session.copy_in(&request.relation, &rows)?;
        Ok(BulkLoadStatus::SUCCESS)
    }
}

/// Either loader, picked at startup from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredLoader {
    Command(CommandBulkLoader),
    Session(SessionCopyLoader),
}

impl ConfiguredLoader {
    pub fn from_config(config: &QcConfig) -> Result<Self, QcError> {
        match &config.bulk_utils {
            Some(utils) => Ok(Self::Command(CommandBulkLoader::from_utils_dir(utils)?)),
            None => Ok(Self::Session(SessionCopyLoader)),
        }
    }
}

impl BulkLoader for ConfiguredLoader {
    fn load<S: CatalogSession>(
        &self,
        session: &mut S,
        request: &BulkLoadRequest,
    ) -> Result<BulkLoadStatus, QcError> {
        match self {
            Self::Command(loader) => loader.load(session, request),
            Self::Session(loader) => loader.load(session, request),
        }
    }
}

fn escape_delimiter(value: &str) -> String {
    value.replace('\t', "\\t").replace('\n', "\\n")
}

fn split_rows(content: &str, row_delimiter: &str, field_delimiter: &str) -> Vec<String> {
    content
        .split_terminator(row_delimiter)
        .map(|row| match row.split_once(field_delimiter) {
            Some((first, _)) => first.to_string(),
            None => row.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rows_keeps_empty_rows() {
        let rows = split_rows("A1\n\nb2\n", "\n", "\t");
        assert_eq!(rows, vec!["A1", "", "b2"]);
    }

    #[test]
    fn split_rows_takes_first_field() {
        let rows = split_rows("A1\tignored\nb2", "\n", "\t");
        assert_eq!(rows, vec!["A1", "b2"]);
    }

    #[test]
    fn command_args_match_bcpin_interface() {
        let request = BulkLoadRequest {
            server: "db1".to_string(),
            database: "mgd".to_string(),
            relation: "pss_qc_tmp".parse().unwrap(),
            staging_file: Utf8PathBuf::from("/data/pss.bcp"),
            field_delimiter: FIELD_DELIMITER.to_string(),
            row_delimiter: ROW_DELIMITER.to_string(),
            schema: "mgd".to_string(),
            catalog_db: None,
        };
        assert_eq!(
            CommandBulkLoader::args(&request),
            vec![
                "db1",
                "mgd",
                "pss_qc_tmp",
                "/",
                "/data/pss.bcp",
                "\\t",
                "\\n",
                "mgd"
            ]
        );
    }

    #[test]
    fn command_exports_catalog_path() {
        let request = BulkLoadRequest {
            server: "db1".to_string(),
            database: "mgd".to_string(),
            relation: "pss_qc_tmp".parse().unwrap(),
            staging_file: Utf8PathBuf::from("/data/pss.bcp"),
            field_delimiter: FIELD_DELIMITER.to_string(),
            row_delimiter: ROW_DELIMITER.to_string(),
            schema: "mgd".to_string(),
            catalog_db: Some(Utf8PathBuf::from("/data/catalog.db")),
        };
        let command = CommandBulkLoader::new("bcpin.csh").command(&request);
        let envs: Vec<_> = command.get_envs().collect();
        assert_eq!(
            envs,
            vec![(
                std::ffi::OsStr::new(CATALOG_DB_ENV),
                Some(std::ffi::OsStr::new("/data/catalog.db"))
            )]
        );
    }
}
