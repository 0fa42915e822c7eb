use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cohort::Cohort;
use crate::error::SurvivalError;
use crate::horizon::{HazardWindow, Period, TimeHorizon};

/// Annual probability of death.
pub const MORTALITY_PROB: f64 = 0.1;
/// Years to simulate.
pub const TIME_STEPS: Period = 100;
pub const POP_SIZE: usize = 5000;
pub const COHORT_ID: u64 = 1;

/// The four scalar model parameters plus the hazard window rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    pub cohort_id: u64,
    pub pop_size: usize,
    pub mortality_prob: f64,
    pub time_steps: Period,
    #[serde(default)]
    pub hazard_window: HazardWindow,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            cohort_id: COHORT_ID,
            pop_size: POP_SIZE,
            mortality_prob: MORTALITY_PROB,
            time_steps: TIME_STEPS,
            hazard_window: HazardWindow::default(),
        }
    }
}

impl Parameters {
    /// Reads parameters from a JSON file and validates them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not a valid parameters object, or
    /// holds values that [`Parameters::validate`] rejects.
    pub fn load(path: &Path) -> Result<Self, SurvivalError> {
        debug!("loading parameters from {}", path.display());
        let file = File::open(path).map_err(|e| {
            SurvivalError::ConfigError(format!("could not open {}: {e}", path.display()))
        })?;
        let parameters: Parameters = serde_json::from_reader(BufReader::new(file))?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Checks every value the way the simulation will use it.
    ///
    /// # Errors
    ///
    /// Returns the first construction error of the cohort or the horizon.
    pub fn validate(&self) -> Result<(), SurvivalError> {
        self.build_cohort()?;
        self.time_horizon()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SurvivalError::InvalidHorizon`] if `time_steps` is zero.
    pub fn time_horizon(&self) -> Result<TimeHorizon, SurvivalError> {
        Ok(TimeHorizon::new(self.time_steps)?.with_window(self.hazard_window))
    }

    /// # Errors
    ///
    /// See [`Cohort::new`].
    pub fn build_cohort(&self) -> Result<Cohort, SurvivalError> {
        Cohort::new(self.cohort_id, self.pop_size, self.mortality_prob)
    }
}
