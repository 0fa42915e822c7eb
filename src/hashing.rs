//! Deterministic hashing used to derive per-patient random seeds.
//!
//! Patient ids are consecutive integers, so they are hashed together with the base seed before
//! being handed to `SeedableRng::seed_from_u64`. The hash is stable across runs and platforms,
//! which keeps the `patient id -> seed` mapping independent of the order in which patients are
//! simulated.

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Mixes a patient id into a base seed.
pub fn hash_patient_seed(base_seed: u64, patient_id: u64) -> u64 {
    xxh3_64_with_seed(&patient_id.to_le_bytes(), base_seed)
}
