use camino::Utf8PathBuf;

use crate::catalog::CatalogScope;
use crate::domain::StagingRelation;
use crate::error::QcError;

pub const DEFAULT_TEMP_TABLE: &str = "pss_qc_tmp";
pub const DEFAULT_DB_SERVER: &str = "localhost";
pub const DEFAULT_DB_NAME: &str = "mgd";
pub const DEFAULT_DB_SCHEMA: &str = "mgd";
pub const SEQUENCE_ENTITY_TYPE: i64 = 19;
pub const DEFAULT_SOURCE_DATABASES: [i64; 2] = [9, 27];

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub invalid: Utf8PathBuf,
    pub secondary: Utf8PathBuf,
}

#[derive(Debug, Clone)]
pub struct DatabaseTarget {
    pub server: String,
    pub database: String,
    pub schema: String,
}

#[derive(Debug, Clone)]
pub struct QcConfig {
    pub live_run: bool,
    pub relation: StagingRelation,
    pub staging_file: Option<Utf8PathBuf>,
    pub reports: ReportPaths,
    pub set_output: Option<Utf8PathBuf>,
    pub bulk_utils: Option<Utf8PathBuf>,
    pub target: DatabaseTarget,
    pub catalog_db: Option<Utf8PathBuf>,
    pub scope: CatalogScope,
}

impl QcConfig {
    pub fn require_catalog_db(&self) -> Result<&Utf8PathBuf, QcError> {
        self.catalog_db
            .as_ref()
            .ok_or_else(|| QcError::MissingEnv("PSS_CATALOG_DB".to_string()))
    }

    pub fn require_set_output(&self) -> Result<&Utf8PathBuf, QcError> {
        self.set_output
            .as_ref()
            .ok_or_else(|| QcError::MissingEnv("INPUT_FILE_SET".to_string()))
    }
}

/// Paths for the standalone set-file generator. Command-line values take
/// precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct SetFilePaths {
    pub input: Option<Utf8PathBuf>,
    pub output: Option<Utf8PathBuf>,
}

impl SetFilePaths {
    pub fn with_overrides(self, input: Option<Utf8PathBuf>, output: Option<Utf8PathBuf>) -> Self {
        Self {
            input: input.or(self.input),
            output: output.or(self.output),
        }
    }

    pub fn require_input(&self) -> Result<&Utf8PathBuf, QcError> {
        self.input
            .as_ref()
            .ok_or_else(|| QcError::MissingEnv("INPUT_FILE_DEFAULT".to_string()))
    }

    pub fn require_output(&self) -> Result<&Utf8PathBuf, QcError> {
        self.output
            .as_ref()
            .ok_or_else(|| QcError::MissingEnv("INPUT_FILE_SET".to_string()))
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn from_env() -> Result<QcConfig, QcError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<QcConfig, QcError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));
        let required = |key: &str| get(key).ok_or_else(|| QcError::MissingEnv(key.to_string()));

        let live_run = get("LIVE_RUN").map(|value| value.trim() == "1").unwrap_or(false);
        let relation: StagingRelation = get("TEMP_TABLE")
            .unwrap_or_else(|| DEFAULT_TEMP_TABLE.to_string())
            .parse()?;

        let reports = ReportPaths {
            invalid: Utf8PathBuf::from(required("INVALID_SEQUENCE_RPT")?),
            secondary: Utf8PathBuf::from(required("SEC_SEQUENCE_RPT")?),
        };

        let target = DatabaseTarget {
            server: get("PG_DBSERVER").unwrap_or_else(|| DEFAULT_DB_SERVER.to_string()),
            database: get("PG_DBNAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            schema: get("PG_DBSCHEMA").unwrap_or_else(|| DEFAULT_DB_SCHEMA.to_string()),
        };

        let entity_type = match get("PSS_MGI_TYPE") {
            Some(value) => parse_key("PSS_MGI_TYPE", &value)?,
            None => SEQUENCE_ENTITY_TYPE,
        };
        let source_databases = match get("PSS_LOGICAL_DBS") {
            Some(value) => parse_key_list("PSS_LOGICAL_DBS", &value)?,
            None => DEFAULT_SOURCE_DATABASES.to_vec(),
        };

        Ok(QcConfig {
            live_run,
            relation,
            staging_file: get("INPUT_FILE_BCP").map(Utf8PathBuf::from),
            reports,
            set_output: get("INPUT_FILE_SET").map(Utf8PathBuf::from),
            bulk_utils: get("PG_DBUTILS").map(Utf8PathBuf::from),
            target,
            catalog_db: get("PSS_CATALOG_DB").map(Utf8PathBuf::from),
            scope: CatalogScope {
                entity_type,
                source_databases,
            },
        })
    }
}

impl ConfigLoader {
    pub fn set_file_from_env() -> SetFilePaths {
        Self::set_file_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn set_file_from_lookup<F>(lookup: F) -> SetFilePaths
    where
        F: Fn(&str) -> Option<String>,
    {
        SetFilePaths {
            input: non_blank(lookup("INPUT_FILE_DEFAULT")).map(Utf8PathBuf::from),
            output: non_blank(lookup("INPUT_FILE_SET")).map(Utf8PathBuf::from),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_key(name: &str, value: &str) -> Result<i64, QcError> {
    value.trim().parse().map_err(|_| QcError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_key_list(name: &str, value: &str) -> Result<Vec<i64>, QcError> {
    value.split(',').map(|part| parse_key(name, part)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_list_trims_parts() {
        assert_eq!(parse_key_list("X", " 9, 27 ").unwrap(), vec![9, 27]);
        assert!(parse_key_list("X", "9,,27").is_err());
    }
}
