//! The cohort driver.
//!
//! A [`Cohort`] creates its patients lazily while it simulates, streams every terminal
//! [`PatientRecord`] into a [`CohortOutcomes`], and keeps only the outcomes. Patient `index` of
//! cohort `id` always has patient id `id * pop_size + index`, and with a fixed [`SeedPolicy`]
//! its stream depends only on that id, so the sequential and parallel drivers produce the same
//! outcomes.
//!
//! A cohort is simulated exactly once: a second call to `simulate` is rejected with
//! [`SurvivalError::AlreadySimulated`].

use std::time::Instant;

use humantime::format_duration;
use log::{debug, info};

use crate::error::SurvivalError;
use crate::horizon::TimeHorizon;
use crate::outcomes::CohortOutcomes;
use crate::patient::{MortalityProbability, Patient, PatientId, PatientRecord};
use crate::random::SeedPolicy;

#[derive(Debug)]
pub struct Cohort {
    id: u64,
    pop_size: usize,
    mortality_prob: MortalityProbability,
    seed_policy: SeedPolicy,
    outcomes: Option<CohortOutcomes>,
}

impl Cohort {
    /// Creates a cohort of `pop_size` patients sharing the per-period death probability
    /// `mortality_prob`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pop_size` is zero, `mortality_prob` is not in `[0, 1]`, or the
    /// patient ids of this cohort do not fit in a `u64`.
    pub fn new(id: u64, pop_size: usize, mortality_prob: f64) -> Result<Self, SurvivalError> {
        let mortality_prob = MortalityProbability::try_from(mortality_prob)?;
        if pop_size == 0 {
            return Err(SurvivalError::InvalidPopulationSize);
        }
        let overflow = || SurvivalError::PatientIdOverflow {
            cohort_id: id,
            pop_size,
        };
        let n = u64::try_from(pop_size).map_err(|_| overflow())?;
        id.checked_mul(n)
            .and_then(|base| base.checked_add(n - 1))
            .ok_or_else(overflow)?;

        debug!("created cohort {id} with {pop_size} patients (p={})", mortality_prob.value());
        Ok(Self {
            id,
            pop_size,
            mortality_prob,
            seed_policy: SeedPolicy::default(),
            outcomes: None,
        })
    }

    #[must_use]
    pub fn with_seed_policy(mut self, seed_policy: SeedPolicy) -> Self {
        self.seed_policy = seed_policy;
        self
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn pop_size(&self) -> usize {
        self.pop_size
    }

    #[must_use]
    pub fn mortality_prob(&self) -> MortalityProbability {
        self.mortality_prob
    }

    #[must_use]
    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }

    /// The id of the patient at position `index`. Ids are unique across cohorts of the same
    /// size.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than the population size.
    #[must_use]
    pub fn patient_id(&self, index: usize) -> PatientId {
        assert!(index < self.pop_size, "patient index {index} out of range");
        // Cannot overflow, checked in `Cohort::new`.
        PatientId(self.id * self.pop_size as u64 + index as u64)
    }

    fn create_patient(&self, index: usize) -> Patient {
        let id = self.patient_id(index);
        Patient::from_parts(id, self.mortality_prob, self.seed_policy.stream_for(id))
    }

    fn simulate_patient(&self, index: usize, horizon: &TimeHorizon) -> PatientRecord {
        self.create_patient(index).simulate(horizon)
    }

    /// Simulates every patient in order and returns the finalized outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`SurvivalError::AlreadySimulated`] if the cohort has been simulated before.
    pub fn simulate(&mut self, horizon: &TimeHorizon) -> Result<&CohortOutcomes, SurvivalError> {
        self.check_not_simulated()?;
        let start = Instant::now();

        let outcomes = (0..self.pop_size).fold(CohortOutcomes::new(), |mut outcomes, index| {
            outcomes.record(&self.simulate_patient(index, horizon));
            outcomes
        });

        Ok(self.store_outcomes(outcomes, start))
    }

    /// Simulates the patients on the rayon thread pool. Records are collected in patient order
    /// and extracted by a single writer, so the outcomes equal those of
    /// [`Cohort::simulate`] for a fixed seed policy.
    ///
    /// # Errors
    ///
    /// Returns [`SurvivalError::AlreadySimulated`] if the cohort has been simulated before.
    #[cfg(feature = "parallel")]
    pub fn simulate_parallel(
        &mut self,
        horizon: &TimeHorizon,
    ) -> Result<&CohortOutcomes, SurvivalError> {
        use rayon::prelude::*;

        self.check_not_simulated()?;
        let start = Instant::now();

        let this = &*self;
        let records: Vec<PatientRecord> = (0..this.pop_size)
            .into_par_iter()
            .map(|index| this.simulate_patient(index, horizon))
            .collect();

        let mut outcomes = CohortOutcomes::new();
        outcomes.extract(&records);
        Ok(self.store_outcomes(outcomes, start))
    }

    /// The outcomes, present once the cohort has been simulated.
    #[must_use]
    pub fn outcomes(&self) -> Option<&CohortOutcomes> {
        self.outcomes.as_ref()
    }

    #[must_use]
    pub fn into_outcomes(self) -> Option<CohortOutcomes> {
        self.outcomes
    }

    fn check_not_simulated(&self) -> Result<(), SurvivalError> {
        if self.outcomes.is_some() {
            return Err(SurvivalError::AlreadySimulated);
        }
        Ok(())
    }

    fn store_outcomes(&mut self, mut outcomes: CohortOutcomes, start: Instant) -> &CohortOutcomes {
        let mean = outcomes.finalize(self.pop_size);
        info!(
            "simulated cohort {} ({} patients, {} deaths) in {}",
            self.id,
            self.pop_size,
            outcomes.deaths(),
            format_duration(start.elapsed())
        );
        match mean {
            Some(mean) => debug!("cohort {} mean survival time: {mean}", self.id),
            None => debug!("cohort {}: no deaths within the horizon", self.id),
        }
        self.outcomes.insert(outcomes)
    }
}
