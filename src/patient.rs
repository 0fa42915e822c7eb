//! A single patient and its alive/dead state machine.
//!
//! A patient starts [`HealthState::Alive`] and is advanced one period at a time. In each period
//! inside the hazard window it makes exactly one draw from its own [`RandomStream`]; a draw
//! below the mortality probability moves it to [`HealthState::Dead`] and no further draws are
//! made. Simulating consumes the patient and yields an immutable [`PatientRecord`].

use std::fmt::{self, Display};

use log::trace;
use serde::Serialize;

use crate::error::SurvivalError;
use crate::horizon::{Period, TimeHorizon};
use crate::random::{PatientRng, RandomStream, SeedPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PatientId(pub u64);

impl Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A per-period probability of death, checked to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct MortalityProbability(f64);

impl MortalityProbability {
    /// # Errors
    ///
    /// Returns [`SurvivalError::InvalidMortalityProbability`] if `value` is NaN or outside of
    /// `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, SurvivalError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SurvivalError::InvalidMortalityProbability(value))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for MortalityProbability {
    type Error = SurvivalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The survival time only exists for dead patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthState {
    Alive,
    Dead { survival_time: Period },
}

impl HealthState {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        matches!(self, HealthState::Alive)
    }

    #[must_use]
    pub fn survival_time(&self) -> Option<Period> {
        match self {
            HealthState::Alive => None,
            HealthState::Dead { survival_time } => Some(*survival_time),
        }
    }
}

#[derive(Debug)]
pub struct Patient<S = PatientRng> {
    id: PatientId,
    mortality_prob: MortalityProbability,
    health_state: HealthState,
    stream: S,
}

impl Patient<PatientRng> {
    /// Creates a patient whose stream is derived from `seeds` and the patient id.
    ///
    /// # Errors
    ///
    /// Returns [`SurvivalError::InvalidMortalityProbability`] if `mortality_prob` is not a
    /// probability.
    pub fn new(
        id: PatientId,
        mortality_prob: f64,
        seeds: &SeedPolicy,
    ) -> Result<Self, SurvivalError> {
        let mortality_prob = MortalityProbability::try_from(mortality_prob)?;
        Ok(Self::from_parts(id, mortality_prob, seeds.stream_for(id)))
    }
}

impl<S: RandomStream> Patient<S> {
    /// Creates a patient that draws from the given stream.
    ///
    /// # Errors
    ///
    /// Returns [`SurvivalError::InvalidMortalityProbability`] if `mortality_prob` is not a
    /// probability.
    pub fn with_stream(
        id: PatientId,
        mortality_prob: f64,
        stream: S,
    ) -> Result<Self, SurvivalError> {
        let mortality_prob = MortalityProbability::try_from(mortality_prob)?;
        Ok(Self::from_parts(id, mortality_prob, stream))
    }

    pub(crate) fn from_parts(
        id: PatientId,
        mortality_prob: MortalityProbability,
        stream: S,
    ) -> Self {
        Self {
            id,
            mortality_prob,
            health_state: HealthState::Alive,
            stream,
        }
    }

    #[must_use]
    pub fn id(&self) -> PatientId {
        self.id
    }

    #[must_use]
    pub fn mortality_prob(&self) -> MortalityProbability {
        self.mortality_prob
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        self.health_state
    }

    /// Runs the patient through the hazard window of `horizon` and returns the final state.
    /// A patient still alive at the end is right-censored and has no survival time.
    #[must_use]
    pub fn simulate(mut self, horizon: &TimeHorizon) -> PatientRecord {
        let mut draws = 0;
        for period in 1..=horizon.last_hazard_period() {
            draws += 1;
            if self.stream.next_uniform() < self.mortality_prob.value() {
                trace!("patient {} died in period {period}", self.id);
                self.health_state = HealthState::Dead {
                    survival_time: period,
                };
                break;
            }
        }

        PatientRecord {
            id: self.id,
            health_state: self.health_state,
            draws,
        }
    }
}

/// The terminal state of a simulated patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: PatientId,
    pub health_state: HealthState,
    /// Number of draws taken from the patient's stream.
    pub draws: u32,
}

impl PatientRecord {
    #[must_use]
    pub fn survival_time(&self) -> Option<Period> {
        self.health_state.survival_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::horizon::HazardWindow;

    /// Replays a fixed list of draws and panics if more are requested.
    struct ScriptedStream {
        draws: std::vec::IntoIter<f64>,
    }

    impl ScriptedStream {
        fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec().into_iter(),
            }
        }
    }

    impl RandomStream for ScriptedStream {
        fn next_uniform(&mut self) -> f64 {
            self.draws.next().expect("stream exhausted")
        }
    }

    fn horizon(time_steps: Period) -> TimeHorizon {
        TimeHorizon::new(time_steps).unwrap()
    }

    #[test]
    fn rejects_invalid_probabilities() {
        let seeds = SeedPolicy::default();
        for p in [-0.1, 1.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Patient::new(PatientId(0), p, &seeds),
                Err(SurvivalError::InvalidMortalityProbability(_))
            ));
        }
        assert!(Patient::new(PatientId(0), 0.0, &seeds).is_ok());
        assert!(Patient::new(PatientId(0), 1.0, &seeds).is_ok());
    }

    #[test]
    fn new_patient_is_alive() {
        let patient = Patient::new(PatientId(5), 0.5, &SeedPolicy::default()).unwrap();
        assert_eq!(patient.id(), PatientId(5));
        assert!(patient.health_state().is_alive());
        assert_eq!(patient.health_state().survival_time(), None);
    }

    #[test]
    fn dies_at_first_draw_below_probability() {
        let stream = ScriptedStream::new(&[0.9, 0.7, 0.2]);
        let patient = Patient::with_stream(PatientId(0), 0.3, stream).unwrap();
        let record = patient.simulate(&horizon(10));
        assert_eq!(record.health_state, HealthState::Dead { survival_time: 3 });
        assert_eq!(record.survival_time(), Some(3));
        // The scripted stream would panic on a fourth draw.
        assert_eq!(record.draws, 3);
    }

    #[test]
    fn draw_equal_to_probability_survives() {
        let stream = ScriptedStream::new(&[0.3, 0.3]);
        let record = Patient::with_stream(PatientId(0), 0.3, stream)
            .unwrap()
            .simulate(&horizon(3));
        assert_eq!(record.survival_time(), None);
        assert_eq!(record.draws, 2);
    }

    #[test]
    fn zero_probability_never_dies() {
        let seeds = SeedPolicy::default();
        for id in 0..100 {
            let record = Patient::new(PatientId(id), 0.0, &seeds)
                .unwrap()
                .simulate(&horizon(50));
            assert_eq!(record.survival_time(), None);
            assert_eq!(record.draws, 49);
        }
    }

    #[test]
    fn certain_death_before_horizon() {
        let seeds = SeedPolicy::default();
        for id in 0..100 {
            let record = Patient::new(PatientId(id), 1.0, &seeds)
                .unwrap()
                .simulate(&horizon(10));
            assert_eq!(record.survival_time(), Some(1));
            assert_eq!(record.draws, 1);
        }
    }

    #[test]
    fn certain_death_through_horizon() {
        let through = horizon(1).with_window(HazardWindow::ThroughHorizon);
        let record = Patient::new(PatientId(0), 1.0, &SeedPolicy::default())
            .unwrap()
            .simulate(&through);
        assert_eq!(record.survival_time(), Some(1));
    }

    #[test]
    fn no_hazard_window_with_single_period() {
        let record = Patient::new(PatientId(0), 1.0, &SeedPolicy::default())
            .unwrap()
            .simulate(&horizon(1));
        assert_eq!(record.survival_time(), None);
        assert_eq!(record.draws, 0);
    }

    #[test]
    fn death_at_horizon_only_through_horizon() {
        let draws = [0.9, 0.9, 0.1];
        let before = Patient::with_stream(PatientId(0), 0.5, ScriptedStream::new(&draws))
            .unwrap()
            .simulate(&horizon(3));
        assert_eq!(before.survival_time(), None);
        assert_eq!(before.draws, 2);

        let through = Patient::with_stream(PatientId(0), 0.5, ScriptedStream::new(&draws))
            .unwrap()
            .simulate(&horizon(3).with_window(HazardWindow::ThroughHorizon));
        assert_eq!(through.survival_time(), Some(3));
    }

    #[test]
    fn same_id_and_seed_reproduces_result() {
        let seeds = SeedPolicy::Fixed { base_seed: 7 };
        for id in 0..50 {
            let first = Patient::new(PatientId(id), 0.1, &seeds)
                .unwrap()
                .simulate(&horizon(100));
            let second = Patient::new(PatientId(id), 0.1, &seeds)
                .unwrap()
                .simulate(&horizon(100));
            assert_eq!(first, second);
        }
    }
}
