use std::ops::Add;

use serde::Serialize;

use crate::error::QcError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QcCounts {
    pub fatal: usize,
    pub nonfatal: usize,
}

impl QcCounts {
    pub fn fatal(count: usize) -> Self {
        Self {
            fatal: count,
            nonfatal: 0,
        }
    }

    pub fn nonfatal(count: usize) -> Self {
        Self {
            fatal: 0,
            nonfatal: count,
        }
    }
}

impl Add for QcCounts {
    type Output = QcCounts;

    fn add(self, other: QcCounts) -> QcCounts {
        QcCounts {
            fatal: self.fatal + other.fatal,
            nonfatal: self.nonfatal + other.nonfatal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Clean,
    NonFatal,
    Fatal,
    Exceptional,
}

impl Outcome {
    pub fn classify(counts: QcCounts) -> Self {
        if counts.fatal > 0 {
            Outcome::Fatal
        } else if counts.nonfatal > 0 {
            Outcome::NonFatal
        } else {
            Outcome::Clean
        }
    }

    pub fn from_run<T: HasCounts>(result: &Result<T, QcError>) -> Self {
        match result {
            Ok(value) => Self::classify(value.counts()),
            Err(_) => Outcome::Exceptional,
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Clean => 0,
            Outcome::Exceptional => 1,
            Outcome::NonFatal => 2,
            Outcome::Fatal => 3,
        }
    }
}

pub trait HasCounts {
    fn counts(&self) -> QcCounts;
}

impl HasCounts for QcCounts {
    fn counts(&self) -> QcCounts {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_table() {
        assert_eq!(Outcome::classify(QcCounts::default()).exit_code(), 0);
        assert_eq!(Outcome::classify(QcCounts::nonfatal(4)).exit_code(), 2);
        assert_eq!(Outcome::classify(QcCounts::fatal(1)).exit_code(), 3);
        assert_eq!(
            Outcome::classify(QcCounts::fatal(1) + QcCounts::nonfatal(7)).exit_code(),
            3
        );
    }

    #[test]
    fn error_overrides_counts() {
        let result: Result<QcCounts, QcError> =
            Err(QcError::MissingEnv("SEC_SEQUENCE_RPT".to_string()));
        assert_eq!(Outcome::from_run(&result), Outcome::Exceptional);
        assert_eq!(Outcome::Exceptional.exit_code(), 1);
    }
}
