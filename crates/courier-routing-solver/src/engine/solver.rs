// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Time-bounded multi-restart driver.
//!
//! The first construction attempt seeds the incumbent unconditionally, so
//! a solution is always returned even with a zero time budget. Further
//! restarts run until the wall-clock deadline, each one a fresh randomized
//! construction optionally followed by route stacking; only a strictly
//! lower total replaces the incumbent.

use crate::{
    construction::greedy::RandomizedGreedy,
    engine::{err::SolverError, incumbent::SharedIncumbent},
    stacking::StackingSearch,
    support::rng::SeedSequencer,
};
use courier_routing_model::{problem::prob::ProblemInstance, solution::sol::Solution};
use parking_lot::Mutex;
use rand::Rng;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    pub time_limit: Duration,
    pub seed: u64,
    pub workers: usize,
    pub stacking: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(1),
            seed: 0,
            workers: 1,
            stacking: true,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_stacking(mut self, stacking: bool) -> Self {
        self.stacking = stacking;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Solver;

impl Solver {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(level = "info", skip(self, instance))]
    pub fn solve(
        &self,
        instance: &ProblemInstance,
        config: &SolverConfig,
    ) -> Result<Solution, SolverError> {
        let deadline = Instant::now() + config.time_limit;
        let seeder = SeedSequencer::new(config.seed);

        // A stall on the first attempt is structural (some delivery fits
        // no courier) and would recur on every restart, so it aborts the
        // whole solve.
        let mut main_rng = seeder.rng_for_worker(0);
        let first = self.attempt(instance, config, &mut main_rng)?;
        let incumbent = SharedIncumbent::new(first);

        let failure: Mutex<Option<SolverError>> = Mutex::new(None);
        let workers = config.workers.max(1);
        if workers == 1 {
            self.restart_loop(instance, config, &incumbent, &mut main_rng, deadline, &failure);
        } else {
            std::thread::scope(|scope| {
                for tid in 0..workers {
                    let mut rng = seeder.rng_for_worker(tid as u64 + 1);
                    let incumbent = &incumbent;
                    let failure = &failure;
                    scope.spawn(move || {
                        self.restart_loop(instance, config, incumbent, &mut rng, deadline, failure);
                    });
                }
            });
        }

        if let Some(err) = failure.into_inner() {
            return Err(err);
        }
        Ok(incumbent.into_inner())
    }

    fn restart_loop<R: Rng>(
        &self,
        instance: &ProblemInstance,
        config: &SolverConfig,
        incumbent: &SharedIncumbent,
        rng: &mut R,
        deadline: Instant,
        failure: &Mutex<Option<SolverError>>,
    ) {
        let mut restarts = 0u64;
        while Instant::now() < deadline {
            match self.attempt(instance, config, rng) {
                Ok(candidate) => {
                    incumbent.try_update(&candidate);
                    restarts += 1;
                }
                Err(e) => {
                    let mut slot = failure.lock();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    return;
                }
            }
        }
        tracing::debug!(restarts, "restart loop finished");
    }

    fn attempt<R: Rng>(
        &self,
        instance: &ProblemInstance,
        config: &SolverConfig,
        rng: &mut R,
    ) -> Result<Solution, SolverError> {
        let mut solution = RandomizedGreedy::new().build(instance, rng)?;
        if config.stacking {
            StackingSearch::new().improve_all(instance, &mut solution)?;
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::err::ConstructionError;
    use courier_routing_model::{
        common::{CourierId, DeliveryId},
        problem::{courier::Courier, delivery::Delivery, matrix::TravelMatrix},
        validation::FeasibilityChecker,
    };

    fn instance() -> ProblemInstance {
        let coords = [0.0_f64, 1.0, 2.0, -1.0, -2.0];
        let rows = coords
            .iter()
            .map(|&a| coords.iter().map(|&b| (a - b).abs()).collect())
            .collect();
        ProblemInstance::new(
            vec![
                Courier::new(CourierId::new(1), 0, 10),
                Courier::new(CourierId::new(2), 2, 10),
            ],
            vec![
                Delivery::new(DeliveryId::new(1), 5, 1, 2, 0.0),
                Delivery::new(DeliveryId::new(2), 5, 3, 4, 0.0),
                Delivery::new(DeliveryId::new(3), 2, 2, 0, 1.0),
                Delivery::new(DeliveryId::new(4), 1, 4, 1, 0.0),
            ],
            TravelMatrix::from_rows(rows).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_solve_returns_feasible_solution() {
        let instance = instance();
        let config = SolverConfig::default()
            .with_time_limit(Duration::from_millis(50))
            .with_seed(1);
        let sol = Solver::new().solve(&instance, &config).unwrap();
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.is_feasible(), "{report}");
    }

    #[test]
    fn test_zero_budget_still_returns_a_solution() {
        let instance = instance();
        let config = SolverConfig::default()
            .with_time_limit(Duration::ZERO)
            .with_seed(3);
        let sol = Solver::new().solve(&instance, &config).unwrap();
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.is_feasible(), "{report}");
    }

    #[test]
    fn test_zero_budget_replays_deterministically() {
        let instance = instance();
        let config = SolverConfig::default()
            .with_time_limit(Duration::ZERO)
            .with_seed(5);
        let a = Solver::new().solve(&instance, &config).unwrap();
        let b = Solver::new().solve(&instance, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stacking_never_worsens_the_single_attempt() {
        let instance = instance();
        let base = SolverConfig::default()
            .with_time_limit(Duration::ZERO)
            .with_seed(8);
        let stacked = Solver::new()
            .solve(&instance, &base.with_stacking(true))
            .unwrap();
        let plain = Solver::new()
            .solve(&instance, &base.with_stacking(false))
            .unwrap();
        assert!(stacked.total_delivery_time() <= plain.total_delivery_time());
    }

    #[test]
    fn test_solve_propagates_structural_stall() {
        let instance = ProblemInstance::new(
            vec![Courier::new(CourierId::new(1), 0, 3)],
            vec![Delivery::new(DeliveryId::new(1), 99, 1, 0, 0.0)],
            TravelMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap(),
        )
        .unwrap();
        let config = SolverConfig::default().with_time_limit(Duration::ZERO);
        let err = Solver::new().solve(&instance, &config).unwrap_err();
        assert_eq!(
            err,
            SolverError::Construction(ConstructionError::Stalled { remaining: 1 })
        );
    }

    #[test]
    fn test_multiple_workers_produce_a_feasible_incumbent() {
        let instance = instance();
        let config = SolverConfig::default()
            .with_time_limit(Duration::from_millis(30))
            .with_workers(4)
            .with_seed(2);
        let sol = Solver::new().solve(&instance, &config).unwrap();
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.is_feasible(), "{report}");
    }
}
