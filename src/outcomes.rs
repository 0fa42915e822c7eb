use crate::error::SurvivalError;
use crate::horizon::Period;
use crate::patient::PatientRecord;
use crate::sample_path::SamplePath;

/// Cohort-level results built from simulated patients.
///
/// Records are added with [`CohortOutcomes::record`] or [`CohortOutcomes::extract`] and the
/// summary statistics are computed once by [`CohortOutcomes::finalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortOutcomes {
    /// Survival times of the patients that died, in processing order.
    survival_times: Vec<Period>,
    patients_processed: usize,
    initial_pop_size: usize,
    mean_survival_time: Option<f64>,
    living_count: SamplePath,
}

impl CohortOutcomes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &PatientRecord) {
        self.patients_processed += 1;
        if let Some(survival_time) = record.survival_time() {
            self.survival_times.push(survival_time);
        }
    }

    /// Appends the survival time of every patient that died, in iteration order.
    pub fn extract<'a>(&mut self, records: impl IntoIterator<Item = &'a PatientRecord>) {
        for record in records {
            self.record(record);
        }
    }

    /// Computes the mean survival time and rebuilds the living-count path starting from
    /// `initial_pop_size`. Returns the mean, which is `None` when nobody died.
    #[allow(clippy::cast_precision_loss)]
    pub fn finalize(&mut self, initial_pop_size: usize) -> Option<f64> {
        debug_assert!(self.survival_times.len() <= initial_pop_size);
        self.initial_pop_size = initial_pop_size;

        self.mean_survival_time = if self.survival_times.is_empty() {
            None
        } else {
            let total: u64 = self.survival_times.iter().map(|&t| u64::from(t)).sum();
            Some(total as f64 / self.survival_times.len() as f64)
        };

        let mut living_count = SamplePath::new(initial_pop_size);
        for &survival_time in &self.survival_times {
            living_count.record_decrement(survival_time);
        }
        self.living_count = living_count;

        self.mean_survival_time
    }

    #[must_use]
    pub fn survival_times(&self) -> &[Period] {
        &self.survival_times
    }

    #[must_use]
    pub fn mean_survival_time(&self) -> Option<f64> {
        self.mean_survival_time
    }

    /// # Errors
    ///
    /// Returns [`SurvivalError::NoDeaths`] if no patient died within the horizon.
    pub fn require_mean_survival_time(&self) -> Result<f64, SurvivalError> {
        self.mean_survival_time.ok_or(SurvivalError::NoDeaths)
    }

    #[must_use]
    pub fn living_count(&self) -> &SamplePath {
        &self.living_count
    }

    #[must_use]
    pub fn initial_pop_size(&self) -> usize {
        self.initial_pop_size
    }

    #[must_use]
    pub fn patients_processed(&self) -> usize {
        self.patients_processed
    }

    #[must_use]
    pub fn deaths(&self) -> usize {
        self.survival_times.len()
    }

    /// Patients still alive at the end of the horizon.
    #[must_use]
    pub fn censored(&self) -> usize {
        self.patients_processed - self.deaths()
    }

    /// Fraction of the initial population alive at `time`, `None` for an empty population.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn survival_probability(&self, time: Period) -> Option<f64> {
        if self.initial_pop_size == 0 {
            return None;
        }
        Some(self.living_count.value_at(time) as f64 / self.initial_pop_size as f64)
    }
}
