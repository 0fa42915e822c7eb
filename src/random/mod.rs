//! Per-patient random number streams.
//!
//! Every patient owns its own generator. Nothing is shared between patients, so the draws one
//! patient makes never depend on how many draws another patient made or on the order in which
//! patients are simulated.
//!
//! Two seeding modes are supported through [`SeedPolicy`]:
//! * [`SeedPolicy::Fixed`]: the stream for a patient is a pure function of the base seed and the
//!   patient id. Re-running a model with the same base seed reproduces every patient exactly.
//! * [`SeedPolicy::Entropy`]: each stream is seeded from the thread-local entropy source and
//!   results vary from run to run.

use log::trace;

use crate::hashing::hash_patient_seed;
use crate::patient::PatientId;
use crate::rand::rngs::SmallRng;
use crate::rand::{Rng, RngCore, SeedableRng};

/// The generator type handed to patients built by a [`SeedPolicy`].
pub type PatientRng = SmallRng;

/// A source of independent uniform draws.
pub trait RandomStream {
    /// Returns the next draw, uniform on `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore> RandomStream for R {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// How patient streams are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    Fixed { base_seed: u64 },
    Entropy,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::Fixed { base_seed: 0 }
    }
}

impl SeedPolicy {
    /// Creates the stream for the given patient.
    #[must_use]
    pub fn stream_for(&self, patient_id: PatientId) -> PatientRng {
        match *self {
            SeedPolicy::Fixed { base_seed } => {
                let seed = hash_patient_seed(base_seed, patient_id.0);
                trace!("creating RNG (seed={seed}) for patient {patient_id}");
                SmallRng::seed_from_u64(seed)
            }
            SeedPolicy::Entropy => SmallRng::from_rng(&mut crate::rand::rng()),
        }
    }

    #[must_use]
    pub fn is_reproducible(&self) -> bool {
        matches!(self, SeedPolicy::Fixed { .. })
    }
}
