use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum QcError {
    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },

    #[error("invalid staging relation name: {0}")]
    InvalidRelation(String),

    #[error("cannot open input file: {0}")]
    InputOpen(Utf8PathBuf),

    #[error("cannot open output file: {0}")]
    OutputOpen(Utf8PathBuf),

    #[error("cannot open report file: {0}")]
    ReportOpen(Utf8PathBuf),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("bulk load into {relation} failed with status {status}")]
    #[diagnostic(help("no reports were generated; check the staging file and loader output"))]
    BulkLoad { relation: String, status: i32 },

    #[error("staging relation {0} is not visible to the catalog session after loading")]
    #[diagnostic(help("the bulk loader must write into the catalog named by PSS_CATALOG_DB"))]
    StagingNotVisible(String),

    #[error("failed to start bulk loader: {0}")]
    BulkLoadSpawn(String),

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("cannot open catalog database: {0}")]
    CatalogOpen(Utf8PathBuf),

    #[error("catalog query failed: {0}")]
    Catalog(String),
}

impl From<rusqlite::Error> for QcError {
    fn from(err: rusqlite::Error) -> Self {
        QcError::Catalog(err.to_string())
    }
}
