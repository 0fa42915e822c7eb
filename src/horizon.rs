//! The simulation horizon and the rule for which periods carry a hazard of death.
//!
//! Periods are numbered from 1. Whether a patient can die in the last period, `horizon`, is
//! decided by [`HazardWindow`]:
//!
//! * [`HazardWindow::BeforeHorizon`] (the default): draws are made for periods
//!   `1..horizon`, so every death happens strictly before `horizon`. A patient simulated with a
//!   horizon of 1 cannot die.
//! * [`HazardWindow::ThroughHorizon`]: draws are made for periods `1..=horizon`.

use serde::{Deserialize, Serialize};

use crate::error::SurvivalError;

/// A period index. Period 0 is the start of the simulation.
pub type Period = u32;

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum HazardWindow {
    #[default]
    BeforeHorizon,
    ThroughHorizon,
}

impl HazardWindow {
    /// The last period in which a death can be drawn for the given number of time steps.
    #[must_use]
    pub fn last_hazard_period(self, time_steps: Period) -> Period {
        match self {
            HazardWindow::BeforeHorizon => time_steps.saturating_sub(1),
            HazardWindow::ThroughHorizon => time_steps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeHorizon {
    time_steps: Period,
    window: HazardWindow,
}

impl TimeHorizon {
    /// Creates a horizon using the default hazard window.
    ///
    /// # Errors
    ///
    /// Returns [`SurvivalError::InvalidHorizon`] if `time_steps` is zero.
    pub fn new(time_steps: Period) -> Result<Self, SurvivalError> {
        if time_steps == 0 {
            return Err(SurvivalError::InvalidHorizon);
        }
        Ok(Self {
            time_steps,
            window: HazardWindow::default(),
        })
    }

    #[must_use]
    pub fn with_window(mut self, window: HazardWindow) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn time_steps(&self) -> Period {
        self.time_steps
    }

    #[must_use]
    pub fn window(&self) -> HazardWindow {
        self.window
    }

    #[must_use]
    pub fn last_hazard_period(&self) -> Period {
        self.window.last_hazard_period(self.time_steps)
    }
}
