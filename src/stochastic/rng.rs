//! Random-number helpers for the Monte-Carlo cross-check.
//!
//! A thread-local `Xoshiro256PlusPlus` feeding `statrs`'s inverse-CDF transform for
//! normal draws. The "single owned generator, no hidden globals" rule that binds the
//! tree/pricer/DE core (see `optimize::DifferentialEvolution`, which owns its RNG)
//! does not bind this ambient, rayon-parallel cross-check module, which the core
//! never calls into.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use statrs::distribution::{ContinuousCDF, Normal};
use std::cell::RefCell;

thread_local! {
    static RNG: RefCell<Xoshiro256PlusPlus> = RefCell::new(Xoshiro256PlusPlus::from_entropy());
}

/// Reseeds the calling thread's random generator. Intended to be called once
/// before a deterministic simulation run; paths generated with `rayon` land on
/// whichever worker thread picks up the task, so determinism across runs also
/// requires pinning the same thread pool size.
pub fn seed_thread_rng(seed: u64) {
    RNG.with(|rng| {
        *rng.borrow_mut() = Xoshiro256PlusPlus::seed_from_u64(seed);
    });
}

/// A single standard normal draw via the inverse-CDF transform.
pub fn generate_normal() -> f64 {
    RNG.with(|rng| {
        let u: f64 = rand::Rng::gen(&mut *rng.borrow_mut());
        let normal = Normal::new(0.0, 1.0).unwrap();
        normal.inverse_cdf(u)
    })
}

/// `n` standard normal draws, reusing one `Normal` distribution across the batch.
pub fn generate_normals(n: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(n);
    RNG.with(|rng| {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng_mut = rng.borrow_mut();
        for _ in 0..n {
            let u: f64 = rand::Rng::gen(&mut *rng_mut);
            result.push(normal.inverse_cdf(u));
        }
    });
    result
}

/// A single draw from `Normal(mean, std_dev)`.
pub fn generate_normal_with(mean: f64, std_dev: f64) -> f64 {
    RNG.with(|rng| {
        let u: f64 = rand::Rng::gen(&mut *rng.borrow_mut());
        let normal = Normal::new(mean, std_dev).unwrap();
        normal.inverse_cdf(u)
    })
}

/// A single uniform draw on `[0, 1)`.
pub fn generate_uniform() -> f64 {
    RNG.with(|rng| rand::Rng::gen(&mut *rng.borrow_mut()))
}
