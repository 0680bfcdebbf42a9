use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;

use crate::bulk::{BulkLoadRequest, BulkLoader};
use crate::catalog::CatalogSession;
use crate::config::QcConfig;
use crate::error::QcError;
use crate::fs_util;
use crate::outcome::{HasCounts, Outcome, QcCounts};
use crate::report::{Report, invalid_report, secondary_report};
use crate::set_file::{SetFileResult, write_set_file};
use crate::staging::{StagingArtifact, load_staging, read_delta};

#[derive(Debug, Clone, Serialize)]
pub struct QcSummary {
    pub input: String,
    pub staged_rows: usize,
    pub secondary: Report,
    pub invalid: Report,
    pub counts: QcCounts,
    pub outcome: Outcome,
    pub set_file: Option<SetFileResult>,
}

impl HasCounts for QcSummary {
    fn counts(&self) -> QcCounts {
        self.counts
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct QcPipeline<L: BulkLoader> {
    config: QcConfig,
    loader: L,
}

impl<L: BulkLoader> QcPipeline<L> {
    pub fn new(config: QcConfig, loader: L) -> Self {
        Self { config, loader }
    }

    pub fn config(&self) -> &QcConfig {
        &self.config
    }

    /// Runs one QC pass over `input`. The session is released before
    /// returning on success and dropped (closing it) on any error.
    pub fn run<S: CatalogSession>(
        &self,
        mut session: S,
        input: &Utf8Path,
        timestamp: &str,
        sink: &dyn ProgressSink,
    ) -> Result<QcSummary, QcError> {
        let started = Instant::now();
        let config = &self.config;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Init; server={} database={}",
                config.target.server, config.target.database
            ),
            elapsed: None,
        });

        let reader = fs_util::open_input(input)?;
        let mut staging = StagingArtifact::create(config.staging_file.as_deref())?;
        let mut invalid_out = fs_util::open_report(&config.reports.invalid)?;
        let mut secondary_out = fs_util::open_report(&config.reports.secondary)?;

        sink.event(ProgressEvent {
            message: format!("phase=Stage; writing bcp file {}", staging.path()),
            elapsed: None,
        });
        let identifiers = read_delta(reader, input)?;
        let staged_rows = staging.write_and_close(&identifiers)?;

        sink.event(ProgressEvent {
            message: format!("phase=Load; loading {staged_rows} rows into {}", config.relation),
            elapsed: None,
        });
        let request = BulkLoadRequest::from_config(config, staging.path());
        load_staging(&mut session, &self.loader, &request)?;

        sink.event(ProgressEvent {
            message: "phase=Report; secondary sequence report".to_string(),
            elapsed: None,
        });
        let secondary = secondary_report(&session, &config.relation, &config.scope)?;
        secondary
            .write_to(&mut secondary_out, timestamp)
            .map_err(|err| fs_util::write_error(&config.reports.secondary, err))?;

        sink.event(ProgressEvent {
            message: "phase=Report; invalid sequence id report".to_string(),
            elapsed: None,
        });
        let invalid = invalid_report(&session, &config.relation, &config.scope)?;
        invalid
            .write_to(&mut invalid_out, timestamp)
            .map_err(|err| fs_util::write_error(&config.reports.invalid, err))?;

        fs_util::close(invalid_out, &config.reports.invalid)?;
        fs_util::close(secondary_out, &config.reports.secondary)?;
        drop(staging);

        let counts = secondary.counts() + invalid.counts();

        // Runs whatever the outcome, fatal included.
        let set_file = if config.live_run {
            let output = config.require_set_output()?;
            sink.event(ProgressEvent {
                message: format!("phase=SetFile; writing {output}"),
                elapsed: None,
            });
            Some(write_set_file(input, output)?)
        } else {
            None
        };

        session.release()?;

        let outcome = Outcome::classify(counts);
        sink.event(ProgressEvent {
            message: format!(
                "phase=Done; fatal={} nonfatal={} outcome={outcome:?}",
                counts.fatal, counts.nonfatal
            ),
            elapsed: Some(started.elapsed()),
        });

        Ok(QcSummary {
            input: input.to_string(),
            staged_rows,
            secondary,
            invalid,
            counts,
            outcome,
            set_file,
        })
    }
}
