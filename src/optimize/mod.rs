//! Differential evolution (DE/rand/1/bin) global optimiser (C6).
//!
//! Grounded on `Optimisers/DifferentialEvolution.{h,cpp}`: target/donor/trial
//! vectors, a Fisher-Yates-style partial shuffle to draw three distinct donor
//! indices, component-wise box clamping, binomial crossover with one guaranteed
//! crossover dimension, and greedy per-slot replacement.
//!
//! Two deviations from the original, both recorded in DESIGN.md: the original's
//! `setSeed` assigns to a locally shadowed generator and never
//! actually reseeds the member RNG; this implementation seeds its owned generator
//! for real, since bit-for-bit determinism from a given seed is required here. And
//! rather than re-evaluating the objective for every population member every
//! generation unconditionally, this implementation caches each slot's objective
//! value and only re-evaluates the trial vector, replacing the cached value on a
//! successful greedy update — the final returned value is still the true objective
//! of the final best vector, just reached with fewer evaluations.

use crate::error::{PricingError, Result};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// A closed box constraint `[low, high]` on one parameter component.
#[derive(Debug, Clone, Copy)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low < high) {
            return Err(PricingError::InvalidInput(format!(
                "bound low ({low}) must be strictly less than high ({high})"
            )));
        }
        Ok(Bound { low, high })
    }

    fn clamp(self, value: f64) -> f64 {
        value.clamp(self.low, self.high)
    }

    fn sample(self, rng: &mut Xoshiro256PlusPlus) -> f64 {
        rng.gen_range(self.low..=self.high)
    }
}

/// The outcome of a completed optimisation run.
#[derive(Debug, Clone)]
pub struct OptimisationResult {
    pub best_params: Vec<f64>,
    pub best_value: f64,
    pub generations_run: usize,
}

/// Differential evolution over a fixed-dimension, box-constrained parameter space.
pub struct DifferentialEvolution<F>
where
    F: Fn(&[f64]) -> f64,
{
    objective: F,
    bounds: Vec<Bound>,
    population_size: usize,
    mutation_factor: f64,
    crossover_rate: f64,
    max_generations: usize,
    tolerance: f64,
    rng: Xoshiro256PlusPlus,
}

impl<F> DifferentialEvolution<F>
where
    F: Fn(&[f64]) -> f64,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        objective: F,
        bounds: Vec<Bound>,
        population_size: usize,
        mutation_factor: f64,
        crossover_rate: f64,
        max_generations: usize,
        tolerance: f64,
        seed: u64,
    ) -> Result<Self> {
        if bounds.is_empty() {
            return Err(PricingError::InvalidInput(
                "bounds must describe at least one parameter".to_string(),
            ));
        }
        if population_size < 4 {
            return Err(PricingError::InvalidInput(
                "population_size must be at least 4 (donor sampling needs 3 distinct peers)"
                    .to_string(),
            ));
        }
        if !(mutation_factor > 0.0) {
            return Err(PricingError::InvalidInput(
                "mutation_factor must be strictly positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&crossover_rate) {
            return Err(PricingError::InvalidInput(
                "crossover_rate must be in [0, 1]".to_string(),
            ));
        }
        Ok(DifferentialEvolution {
            objective,
            bounds,
            population_size,
            mutation_factor,
            crossover_rate,
            max_generations,
            tolerance,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        })
    }

    /// Runs the optimisation to completion (either `max_generations` elapse, or the
    /// population's objective spread falls within `tolerance`), returning the best
    /// parameter vector found and its true objective value.
    pub fn optimise(&mut self) -> OptimisationResult {
        let dims = self.bounds.len();
        let mut population: Vec<Vec<f64>> = (0..self.population_size)
            .map(|_| {
                self.bounds
                    .iter()
                    .map(|bound| bound.sample(&mut self.rng))
                    .collect()
            })
            .collect();
        let mut values: Vec<f64> = population.iter().map(|p| (self.objective)(p)).collect();

        let mut generations_run = 0;
        for _generation in 0..self.max_generations {
            generations_run += 1;
            for i in 0..self.population_size {
                let [a, b, c] = self.sample_distinct_peers(i);
                let donor: Vec<f64> = (0..dims)
                    .map(|d| {
                        let v = population[a][d]
                            + self.mutation_factor * (population[b][d] - population[c][d]);
                        self.bounds[d].clamp(v)
                    })
                    .collect();

                let guaranteed_dim = self.rng.gen_range(0..dims);
                let trial: Vec<f64> = (0..dims)
                    .map(|d| {
                        if d == guaranteed_dim || self.rng.gen::<f64>() < self.crossover_rate {
                            donor[d]
                        } else {
                            population[i][d]
                        }
                    })
                    .collect();

                let trial_value = (self.objective)(&trial);
                if trial_value < values[i] {
                    population[i] = trial;
                    values[i] = trial_value;
                }
            }

            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            tracing::trace!(generation = generations_run, best = min, "DE generation complete");
            if min <= self.tolerance {
                break;
            }
        }

        tracing::debug!(
            generations_run,
            population_size = self.population_size,
            "DE optimisation finished"
        );

        let (best_index, &best_value) = values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .expect("population_size >= 4 guarantees a non-empty population");
        OptimisationResult {
            best_params: population[best_index].clone(),
            best_value,
            generations_run,
        }
    }

    /// Draws three indices distinct from `exclude` and from each other via a
    /// partial Fisher-Yates shuffle of `0..population_size`.
    fn sample_distinct_peers(&mut self, exclude: usize) -> [usize; 3] {
        let mut candidates: Vec<usize> = (0..self.population_size).filter(|&i| i != exclude).collect();
        for i in 0..3 {
            let j = self.rng.gen_range(i..candidates.len());
            candidates.swap(i, j);
        }
        [candidates[0], candidates[1], candidates[2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_undersized_population() {
        let result = DifferentialEvolution::new(
            |p: &[f64]| p[0] * p[0],
            vec![Bound::new(-1.0, 1.0).unwrap()],
            3,
            0.8,
            0.9,
            10,
            1e-6,
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_inverted_bound() {
        assert!(Bound::new(1.0, -1.0).is_err());
    }

    // Sphere function, minimum at the origin.
    #[test]
    fn minimises_sphere_function() {
        let mut de = DifferentialEvolution::new(
            |p: &[f64]| p.iter().map(|x| x * x).sum(),
            vec![Bound::new(-5.0, 5.0).unwrap(), Bound::new(-5.0, 5.0).unwrap()],
            30,
            0.8,
            0.9,
            200,
            1e-10,
            42,
        )
        .unwrap();
        let result = de.optimise();
        assert!(result.best_value < 1e-3);
        assert!(result.best_params.iter().all(|x| x.abs() < 0.2));
    }

    // Same seed, same objective => identical result (determinism requirement).
    #[test]
    fn is_deterministic_given_a_seed() {
        let make = || {
            DifferentialEvolution::new(
                |p: &[f64]| p.iter().map(|x| (x - 1.0).powi(2)).sum(),
                vec![Bound::new(-5.0, 5.0).unwrap()],
                10,
                0.8,
                0.9,
                50,
                1e-12,
                7,
            )
            .unwrap()
        };
        let mut de1 = make();
        let mut de2 = make();
        let r1 = de1.optimise();
        let r2 = de2.optimise();
        assert_eq!(r1.best_params, r2.best_params);
        assert_eq!(r1.best_value, r2.best_value);
    }

    // Scenario S5: 2-D Ackley function, minimum 0 at the origin. The scenario's
    // population size of 10,000 is impractical for a unit test's runtime; a much
    // smaller population is used here, since what is under test is that the
    // optimiser converges to the basin around the origin given these F/CR/seed
    // settings, not the exact population size.
    #[test]
    fn scenario_s5_minimises_ackley_function() {
        fn ackley(p: &[f64]) -> f64 {
            let n = p.len() as f64;
            let sum_sq: f64 = p.iter().map(|x| x * x).sum();
            let sum_cos: f64 = p.iter().map(|x| (2.0 * std::f64::consts::PI * x).cos()).sum();
            -20.0 * (-0.2 * (sum_sq / n).sqrt()).exp() - (sum_cos / n).exp()
                + 20.0
                + std::f64::consts::E
        }

        let mut de = DifferentialEvolution::new(
            ackley,
            vec![Bound::new(-5.0, 5.0).unwrap(), Bound::new(-5.0, 5.0).unwrap()],
            50,
            0.5,
            0.1,
            2000,
            3e-3,
            0,
        )
        .unwrap();
        let result = de.optimise();
        let l_inf = result.best_params.iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
        assert!(l_inf < 0.5, "L-infinity norm was {l_inf}");
    }
}
