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

//! Independent feasibility audit of a [`Solution`] against its
//! [`ProblemInstance`].
//!
//! The checker re-derives every figure from the routing plans alone and
//! compares against the recorded bookkeeping. It collects every violation
//! it finds instead of stopping at the first one, so a report is a full
//! diagnosis of what is wrong with a solution.

pub mod err;

use crate::{
    common::{CourierId, DeliveryId},
    problem::prob::ProblemInstance,
    solution::sol::Solution,
};
use err::Violation;

/// Relative tolerance for comparing the recorded grand total against the
/// recomputed sum of completion times.
const TOTAL_TOLERANCE: f64 = 1e-6;

/// Absolute slack for per-delivery time comparisons, absorbing rounding
/// differences between independent forward simulations.
const TIME_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeasibilityReport {
    violations: Vec<Violation>,
}

impl FeasibilityReport {
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }

    #[inline]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl std::fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.violations.is_empty() {
            return write!(f, "feasible");
        }
        writeln!(f, "{} violation(s):", self.violations.len())?;
        for v in &self.violations {
            writeln!(f, "  {}", v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeasibilityChecker;

impl FeasibilityChecker {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Audits `solution` against `instance` and reports all violations.
    ///
    /// The audit is read-only and idempotent; running it twice on the same
    /// pair yields the same report.
    pub fn check(&self, instance: &ProblemInstance, solution: &Solution) -> FeasibilityReport {
        let mut violations = Vec::new();
        self.check_assignments(instance, solution, &mut violations);
        self.check_release_times(instance, solution, &mut violations);
        self.check_capacities(instance, solution, &mut violations);
        self.check_reachability(instance, solution, &mut violations);
        self.check_total(solution, &mut violations);
        FeasibilityReport { violations }
    }

    /// Every delivery must be assigned to exactly one courier, appear
    /// exactly once as a pickup and once as a dropoff in that courier's
    /// plan (pickup first), and appear in no other plan.
    fn check_assignments(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        violations: &mut Vec<Violation>,
    ) {
        for d in 0..instance.delivery_count() {
            let delivery_id = DeliveryId::from_index(d);
            let reference = d as i32 + 1;
            let assigned = solution.assigned_courier(d);

            if assigned.is_none() {
                violations.push(Violation::UnassignedDelivery {
                    delivery: delivery_id,
                });
            }

            for c in 0..instance.courier_count() {
                let courier_id = CourierId::from_index(c);
                let plan = active_plan(solution, c);
                let is_home = assigned == Some(courier_id);

                if !is_home {
                    if plan.iter().any(|&e| e.abs() == reference) {
                        violations.push(Violation::ForeignPlanReference {
                            delivery: delivery_id,
                            courier: courier_id,
                        });
                    }
                    continue;
                }

                let pickups = plan.iter().filter(|&&e| e == reference).count();
                let dropoffs = plan.iter().filter(|&&e| e == -reference).count();
                if pickups != 1 {
                    violations.push(Violation::PickupCountMismatch {
                        delivery: delivery_id,
                        courier: courier_id,
                        count: pickups,
                    });
                }
                if dropoffs != 1 {
                    violations.push(Violation::DropoffCountMismatch {
                        delivery: delivery_id,
                        courier: courier_id,
                        count: dropoffs,
                    });
                }
                let first_pickup = plan.iter().position(|&e| e == reference);
                let first_dropoff = plan.iter().position(|&e| e == -reference);
                if let (Some(p), Some(q)) = (first_pickup, first_dropoff) {
                    if q < p {
                        violations.push(Violation::DropoffBeforePickup {
                            delivery: delivery_id,
                            courier: courier_id,
                        });
                    }
                }
            }
        }
    }

    /// A delivery cannot complete earlier than its release time plus the
    /// travel time of its final pickup-to-dropoff leg.
    fn check_release_times(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        violations: &mut Vec<Violation>,
    ) {
        for (d, delivery) in instance.deliveries().iter().enumerate() {
            if solution.assigned_courier(d).is_none() {
                continue;
            }
            let earliest = delivery.release_time()
                + instance.travel(delivery.pickup_location(), delivery.dropoff_location());
            let recorded = solution.completion_time(d);
            if recorded + TIME_SLACK < earliest {
                violations.push(Violation::ReleaseTimeViolated {
                    delivery: DeliveryId::from_index(d),
                    completion_time: recorded,
                    earliest_possible: earliest,
                });
            }
        }
    }

    /// The carried load may never exceed the courier's capacity at any
    /// point along the plan.
    fn check_capacities(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        violations: &mut Vec<Violation>,
    ) {
        let deliveries = instance.deliveries();
        for (c, courier) in instance.couriers().iter().enumerate() {
            let mut load: i64 = 0;
            for (slot, &entry) in active_plan(solution, c).iter().enumerate() {
                let d = entry.unsigned_abs() as usize - 1;
                if d >= deliveries.len() {
                    continue;
                }
                if entry > 0 {
                    load += deliveries[d].demand();
                } else {
                    load -= deliveries[d].demand();
                }
                if load > courier.capacity() {
                    violations.push(Violation::CapacityExceeded {
                        courier: CourierId::from_index(c),
                        slot,
                        load,
                        capacity: courier.capacity(),
                    });
                }
            }
        }
    }

    /// Forward-simulates every plan and rejects any recorded completion
    /// time the courier cannot actually achieve.
    fn check_reachability(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        violations: &mut Vec<Violation>,
    ) {
        let deliveries = instance.deliveries();
        for (c, courier) in instance.couriers().iter().enumerate() {
            let mut current_time = 0.0;
            let mut current_location = courier.start_location();
            for &entry in active_plan(solution, c) {
                let d = entry.unsigned_abs() as usize - 1;
                if d >= deliveries.len() {
                    continue;
                }
                if entry > 0 {
                    let pickup = deliveries[d].pickup_location();
                    current_time = (current_time + instance.travel(current_location, pickup))
                        .max(deliveries[d].release_time());
                    current_location = pickup;
                } else {
                    let dropoff = deliveries[d].dropoff_location();
                    current_time += instance.travel(current_location, dropoff);
                    current_location = dropoff;
                    let recorded = solution.completion_time(d);
                    if recorded + TIME_SLACK < current_time {
                        violations.push(Violation::CompletionTimeUnreachable {
                            delivery: DeliveryId::from_index(d),
                            recorded,
                            simulated: current_time,
                        });
                    }
                }
            }
        }
    }

    /// The recorded grand total must equal the sum of completion times of
    /// all assigned deliveries, up to a relative tolerance.
    fn check_total(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        let computed: f64 = (0..solution.delivery_count())
            .filter(|&d| solution.assigned_courier(d).is_some())
            .map(|d| solution.completion_time(d))
            .sum();
        let recorded = solution.total_delivery_time();
        let bound = TOTAL_TOLERANCE * computed.abs().max(1.0);
        if (recorded - computed).abs() > bound {
            violations.push(Violation::TotalMismatch { recorded, computed });
        }
    }
}

/// Active prefix of a courier's plan, trailing unused slots stripped.
fn active_plan(solution: &Solution, courier: usize) -> &[i32] {
    let plan = solution.plan(courier);
    let len = plan.iter().take_while(|&&e| e != 0).count();
    &plan[..len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{courier::Courier, delivery::Delivery, matrix::TravelMatrix};

    // Locations: 0 = depot, 1/2 = pickup/dropoff of d1, 3/4 of d2.
    fn instance(capacity: i64) -> ProblemInstance {
        let rows = vec![
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![1.0, 0.0, 5.0, 6.0, 7.0],
            vec![2.0, 5.0, 0.0, 8.0, 9.0],
            vec![3.0, 6.0, 8.0, 0.0, 10.0],
            vec![4.0, 7.0, 9.0, 10.0, 0.0],
        ];
        ProblemInstance::new(
            vec![
                Courier::new(CourierId::new(1), 0, capacity),
                Courier::new(CourierId::new(2), 0, capacity),
            ],
            vec![
                Delivery::new(DeliveryId::new(1), 1, 1, 2, 0.0),
                Delivery::new(DeliveryId::new(2), 1, 3, 4, 0.0),
            ],
            TravelMatrix::from_rows(rows).unwrap(),
        )
        .unwrap()
    }

    fn feasible_solution(instance: &ProblemInstance) -> Solution {
        let mut sol = Solution::new(instance);
        // Courier 1: 0->1 (1), drop at 2 (+5) => 6.
        // Courier 2: 0->3 (3), drop at 4 (+10) => 13.
        sol.append_move(0, 0, 6.0).unwrap();
        sol.append_move(1, 1, 13.0).unwrap();
        sol
    }

    #[test]
    fn test_feasible_solution_passes() {
        let instance = instance(10);
        let sol = feasible_solution(&instance);
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.is_feasible(), "{report}");
    }

    #[test]
    fn test_check_is_idempotent() {
        let instance = instance(10);
        let mut sol = Solution::new(&instance);
        sol.append_move(0, 0, 6.0).unwrap();
        let checker = FeasibilityChecker::new();
        let first = checker.check(&instance, &sol);
        let second = checker.check(&instance, &sol);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unassigned_deliveries_are_reported() {
        let instance = instance(10);
        let sol = Solution::new(&instance);
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert_eq!(report.violations().len(), 2);
        assert!(report.violations().iter().all(|v| matches!(
            v,
            Violation::UnassignedDelivery { .. }
        )));
    }

    #[test]
    fn test_dropoff_before_pickup_is_reported() {
        let instance = instance(10);
        let sol = Solution::from_parts(
            vec![vec![-1, 1, 0, 0], vec![2, -2, 0, 0]],
            vec![1, 2],
            vec![6.0, 13.0],
            19.0,
        );
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report
            .violations()
            .iter()
            .any(|v| matches!(v, Violation::DropoffBeforePickup { .. })));
    }

    #[test]
    fn test_foreign_plan_reference_is_reported() {
        let instance = instance(10);
        // Delivery 1 is assigned to courier 1 but routed by courier 2.
        let sol = Solution::from_parts(
            vec![vec![0, 0, 0, 0], vec![1, -1, 2, -2]],
            vec![1, 2],
            vec![6.0, 24.0],
            30.0,
        );
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.violations().iter().any(|v| matches!(
            v,
            Violation::ForeignPlanReference {
                delivery,
                courier,
            } if *delivery == DeliveryId::new(1) && *courier == CourierId::new(2)
        )));
        // The home plan misses both events.
        assert!(report
            .violations()
            .iter()
            .any(|v| matches!(v, Violation::PickupCountMismatch { count: 0, .. })));
        assert!(report
            .violations()
            .iter()
            .any(|v| matches!(v, Violation::DropoffCountMismatch { count: 0, .. })));
    }

    #[test]
    fn test_release_time_violation_is_reported() {
        let rows = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let instance = ProblemInstance::new(
            vec![Courier::new(CourierId::new(1), 0, 10)],
            vec![Delivery::new(DeliveryId::new(1), 1, 1, 0, 100.0)],
            TravelMatrix::from_rows(rows).unwrap(),
        )
        .unwrap();
        let sol = Solution::from_parts(vec![vec![1, -1]], vec![1], vec![2.0], 2.0);
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.violations().iter().any(|v| matches!(
            v,
            Violation::ReleaseTimeViolated {
                earliest_possible,
                ..
            } if *earliest_possible == 101.0
        )));
    }

    #[test]
    fn test_capacity_violation_is_reported() {
        // Both deliveries on one courier, picked up together, demand 1 each
        // against capacity 1.
        let instance = instance(1);
        let sol = Solution::from_parts(
            vec![vec![1, 2, -1, -2], vec![0, 0, 0, 0]],
            vec![1, 1],
            vec![15.0, 24.0],
            39.0,
        );
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.violations().iter().any(|v| matches!(
            v,
            Violation::CapacityExceeded {
                slot: 1,
                load: 2,
                capacity: 1,
                ..
            }
        )));
    }

    #[test]
    fn test_unreachable_completion_time_is_reported() {
        let instance = instance(10);
        // Courier 2 cannot finish delivery 2 before t = 13.
        let sol = Solution::from_parts(
            vec![vec![1, -1, 0, 0], vec![2, -2, 0, 0]],
            vec![1, 2],
            vec![6.0, 5.0],
            11.0,
        );
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.violations().iter().any(|v| matches!(
            v,
            Violation::CompletionTimeUnreachable {
                recorded,
                simulated,
                ..
            } if *recorded == 5.0 && *simulated == 13.0
        )));
    }

    #[test]
    fn test_total_mismatch_is_reported() {
        let instance = instance(10);
        let sol = Solution::from_parts(
            vec![vec![1, -1, 0, 0], vec![2, -2, 0, 0]],
            vec![1, 2],
            vec![6.0, 13.0],
            42.0,
        );
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(report.violations().iter().any(|v| matches!(
            v,
            Violation::TotalMismatch {
                recorded,
                computed,
            } if *recorded == 42.0 && *computed == 19.0
        )));
    }

    #[test]
    fn test_unassigned_total_excludes_stale_completion_times() {
        let instance = instance(10);
        // Completion times of unassigned deliveries are stale bookkeeping
        // and must not enter the recomputed total.
        let sol = Solution::from_parts(
            vec![vec![1, -1, 0, 0], vec![0, 0, 0, 0]],
            vec![1, 0],
            vec![6.0, 99.0],
            6.0,
        );
        let report = FeasibilityChecker::new().check(&instance, &sol);
        assert!(!report
            .violations()
            .iter()
            .any(|v| matches!(v, Violation::TotalMismatch { .. })));
    }
}
