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

//! Per-courier exhaustive route stacking.
//!
//! With a courier's delivery set fixed, every pickup/dropoff interleaving
//! is a permutation of the deliveries crossed with a balanced bracket
//! sequence. For small routes the full cross product is enumerated and
//! the cheapest capacity-feasible interleaving replaces the plan; the
//! courier's delivery set never changes and its attributed time never
//! increases. Larger routes are left untouched.

pub mod catalan;

use crate::stacking::catalan::{cached_bracket_sequences, MAX_EXHAUSTIVE_DELIVERIES};
use courier_routing_model::{
    problem::prob::ProblemInstance,
    solution::{err::SolutionUpdateError, sol::Solution},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackingSearch;

impl StackingSearch {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Stacks every courier's route in turn.
    pub fn improve_all(
        &self,
        instance: &ProblemInstance,
        solution: &mut Solution,
    ) -> Result<(), SolutionUpdateError> {
        for courier in 0..instance.courier_count() {
            self.improve_courier(instance, solution, courier)?;
        }
        Ok(())
    }

    /// Replaces the plan of `courier` with its cheapest capacity-feasible
    /// interleaving.
    ///
    /// Routes with fewer than two deliveries have nothing to reorder, and
    /// routes with [`MAX_EXHAUSTIVE_DELIVERIES`] or more are deliberately
    /// left unchanged. Ties keep the later-enumerated candidate, so the
    /// selected route identity depends on enumeration order.
    pub fn improve_courier(
        &self,
        instance: &ProblemInstance,
        solution: &mut Solution,
        courier: usize,
    ) -> Result<(), SolutionUpdateError> {
        let k = solution.assigned_count(courier);
        if k <= 1 || k >= MAX_EXHAUSTIVE_DELIVERIES {
            return Ok(());
        }

        let deliveries = solution.deliveries_in_route(courier);
        let mut best_route = solution.plan(courier).to_vec();
        let mut best_cost = solution.attributed_time(courier);
        let mut candidate = vec![0i32; best_route.len()];
        let mut perm: Vec<usize> = (0..k).collect();

        loop {
            for brackets in cached_bracket_sequences(k) {
                for (slot, &b) in brackets.iter().enumerate() {
                    candidate[slot] = if b > 0 {
                        deliveries[perm[b as usize - 1]] as i32 + 1
                    } else {
                        -(deliveries[perm[(-b) as usize - 1]] as i32 + 1)
                    };
                }
                if !self.capacity_feasible(instance, courier, &candidate[..2 * k]) {
                    continue;
                }
                let cost = self.attributed_time_of(instance, courier, &candidate[..2 * k]);
                if cost <= best_cost {
                    best_cost = cost;
                    best_route.copy_from_slice(&candidate);
                }
            }
            if !next_permutation(&mut perm) {
                break;
            }
        }

        tracing::trace!(
            courier,
            k,
            old_cost = solution.attributed_time(courier),
            new_cost = best_cost,
            "stacked route"
        );
        solution.commit_reroute(courier, &best_route, instance)
    }

    fn capacity_feasible(
        &self,
        instance: &ProblemInstance,
        courier: usize,
        route: &[i32],
    ) -> bool {
        let capacity = instance.couriers()[courier].capacity();
        let deliveries = instance.deliveries();
        let mut load = 0i64;
        for &entry in route {
            let d = entry.unsigned_abs() as usize - 1;
            if entry > 0 {
                load += deliveries[d].demand();
                if load > capacity {
                    return false;
                }
            } else {
                load -= deliveries[d].demand();
            }
        }
        true
    }

    /// Sum of completion times of `courier`'s dropoffs along `route`.
    fn attributed_time_of(
        &self,
        instance: &ProblemInstance,
        courier: usize,
        route: &[i32],
    ) -> f64 {
        let deliveries = instance.deliveries();
        let mut current_time = 0.0;
        let mut current_location = instance.couriers()[courier].start_location();
        let mut attributed = 0.0;
        for &entry in route {
            if entry > 0 {
                let d = &deliveries[entry as usize - 1];
                current_time = (current_time
                    + instance.travel(current_location, d.pickup_location()))
                .max(d.release_time());
                current_location = d.pickup_location();
            } else {
                let d = &deliveries[(-entry) as usize - 1];
                current_time += instance.travel(current_location, d.dropoff_location());
                current_location = d.dropoff_location();
                attributed += current_time;
            }
        }
        attributed
    }
}

/// Advances `perm` to its lexicographic successor; false once exhausted.
fn next_permutation(perm: &mut [usize]) -> bool {
    if perm.len() < 2 {
        return false;
    }
    let mut i = perm.len() - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = perm.len() - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}
