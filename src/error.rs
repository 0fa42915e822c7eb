use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SurvivalError` and maps other errors to
/// convert to a `SurvivalError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SurvivalError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    /// A per-period death probability outside of `[0, 1]` (or NaN).
    InvalidMortalityProbability(f64),
    /// A cohort must contain at least one patient.
    InvalidPopulationSize,
    /// A simulation horizon must span at least one period.
    InvalidHorizon,
    /// `cohort_id * pop_size + index` does not fit in a patient id.
    PatientIdOverflow {
        cohort_id: u64,
        pop_size: usize,
    },
    AlreadySimulated,
    /// Nobody died within the horizon, so there is no mean survival time.
    NoDeaths,
    ReportError(String),
    ConfigError(String),
    SurvivalError(String),
}

impl From<io::Error> for SurvivalError {
    fn from(error: io::Error) -> Self {
        SurvivalError::IoError(error)
    }
}

impl From<serde_json::Error> for SurvivalError {
    fn from(error: serde_json::Error) -> Self {
        SurvivalError::JsonError(error)
    }
}

impl From<csv::Error> for SurvivalError {
    fn from(error: csv::Error) -> Self {
        SurvivalError::CsvError(error)
    }
}

impl From<String> for SurvivalError {
    fn from(error: String) -> Self {
        SurvivalError::SurvivalError(error)
    }
}

impl From<&str> for SurvivalError {
    fn from(error: &str) -> Self {
        SurvivalError::SurvivalError(error.to_string())
    }
}

impl std::error::Error for SurvivalError {}

impl Display for SurvivalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SurvivalError::InvalidMortalityProbability(p) => {
                write!(f, "Error: mortality probability must be in [0, 1], got {p}")
            }
            SurvivalError::InvalidPopulationSize => {
                write!(f, "Error: population size must be positive")
            }
            SurvivalError::InvalidHorizon => {
                write!(f, "Error: time horizon must be at least one period")
            }
            SurvivalError::PatientIdOverflow {
                cohort_id,
                pop_size,
            } => write!(
                f,
                "Error: patient ids for cohort {cohort_id} with {pop_size} patients overflow u64"
            ),
            SurvivalError::AlreadySimulated => {
                write!(f, "Error: cohort has already been simulated")
            }
            SurvivalError::NoDeaths => {
                write!(f, "Error: no deaths were recorded within the time horizon")
            }
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_str_and_string() {
        let e: SurvivalError = "boom".into();
        assert!(matches!(e, SurvivalError::SurvivalError(ref s) if s == "boom"));
        let e: SurvivalError = String::from("bang").into();
        assert!(matches!(e, SurvivalError::SurvivalError(ref s) if s == "bang"));
    }

    #[test]
    fn converts_from_io_error() {
        let e: SurvivalError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(e, SurvivalError::IoError(_)));
    }

    #[test]
    fn display_parameter_errors() {
        assert_eq!(
            SurvivalError::InvalidMortalityProbability(1.5).to_string(),
            "Error: mortality probability must be in [0, 1], got 1.5"
        );
        assert_eq!(
            SurvivalError::InvalidPopulationSize.to_string(),
            "Error: population size must be positive"
        );
    }
}
