//! A discrete-time stochastic mortality simulator.
//!
//! A [`Cohort`] of independent patients is followed period by period. In every period each
//! living patient dies with the same constant probability. The individual outcomes are
//! aggregated into cohort statistics by [`CohortOutcomes`]:
//! * the survival time of every patient who died within the horizon,
//! * the mean survival time, absent when nobody died,
//! * the number of living patients over time, a step function that starts at the population
//!   size and drops by one at every death.
//!
//! Each patient draws from its own random stream. With a fixed [`SeedPolicy`] the stream of a
//! patient depends only on the base seed and the patient id, so results are reproducible and do
//! not depend on the order (or the thread) in which patients are simulated.
//!
//! ```
//! use survival_model::{Cohort, TimeHorizon};
//!
//! let mut cohort = Cohort::new(1, 5000, 0.1).unwrap();
//! let outcomes = cohort.simulate(&TimeHorizon::new(100).unwrap()).unwrap();
//! let mean = outcomes.mean_survival_time().unwrap();
//! assert!(mean > 1.0 && mean < 100.0);
//! ```
//!
//! The [`runner`], [`parameters`] and [`report`] modules provide the command line entry point,
//! JSON parameter files and CSV output on top of the simulation core.
pub mod cohort;
pub mod error;
pub mod hashing;
pub mod horizon;
pub mod log;
pub mod outcomes;
pub mod parameters;
pub mod patient;
pub mod random;
pub mod report;
pub mod runner;
pub mod sample_path;

pub use cohort::Cohort;
pub use error::SurvivalError;
pub use horizon::{HazardWindow, Period, TimeHorizon};
pub use outcomes::CohortOutcomes;
pub use patient::{HealthState, MortalityProbability, Patient, PatientId, PatientRecord};
pub use random::{PatientRng, RandomStream, SeedPolicy};
pub use sample_path::{SamplePath, StepPoint};

// Re-exports for use by models that inject their own streams.
pub use rand;
