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

use crate::{
    common::{CourierId, DeliveryId},
    problem::prob::ProblemInstance,
    solution::err::SolutionUpdateError,
};

/// Mutable per-attempt routing state.
///
/// A routing plan is a fixed-length sequence of 2 * delivery_count signed
/// delivery references: entry `d > 0` means "pick up delivery d here",
/// entry `-d` means "drop off delivery d here", and trailing zeros are
/// unused slots.
///
/// A `Solution` is owned by exactly one in-flight construction attempt.
/// The only mutating operations are [`Solution::append_move`] and
/// [`Solution::commit_reroute`]; all bookkeeping (assignments, completion
/// times, attributed times, grand total) is maintained by them.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    plans: Vec<Vec<i32>>,
    assigned_count: Vec<usize>,
    completion_time: Vec<f64>,
    assigned_courier: Vec<u32>,
    attributed_time: Vec<f64>,
    total_delivery_time: f64,
}

impl Solution {
    pub fn new(instance: &ProblemInstance) -> Self {
        let courier_count = instance.courier_count();
        let delivery_count = instance.delivery_count();
        Self {
            plans: vec![vec![0; 2 * delivery_count]; courier_count],
            assigned_count: vec![0; courier_count],
            completion_time: vec![0.0; delivery_count],
            assigned_courier: vec![0; delivery_count],
            attributed_time: vec![0.0; courier_count],
            total_delivery_time: 0.0,
        }
    }

    pub(crate) fn from_parts(
        plans: Vec<Vec<i32>>,
        assigned_courier: Vec<u32>,
        completion_time: Vec<f64>,
        total_delivery_time: f64,
    ) -> Self {
        let courier_count = plans.len();
        let mut assigned_count = vec![0usize; courier_count];
        for (c, plan) in plans.iter().enumerate() {
            assigned_count[c] = plan.iter().filter(|&&e| e > 0).count();
        }
        let mut attributed_time = vec![0.0f64; courier_count];
        for (d, &courier) in assigned_courier.iter().enumerate() {
            if courier > 0 {
                attributed_time[courier as usize - 1] += completion_time[d];
            }
        }
        Self {
            plans,
            assigned_count,
            completion_time,
            assigned_courier,
            attributed_time,
            total_delivery_time,
        }
    }

    /// Appends a "pick up then immediately drop off" pair for `delivery`
    /// to the plan of `courier`, recording `completion_time` as the
    /// delivery's completion instant.
    pub fn append_move(
        &mut self,
        courier: usize,
        delivery: usize,
        completion_time: f64,
    ) -> Result<(), SolutionUpdateError> {
        if courier >= self.plans.len() {
            return Err(SolutionUpdateError::CourierIndexOutOfBounds {
                index: courier,
                courier_count: self.plans.len(),
            });
        }
        if delivery >= self.assigned_courier.len() {
            return Err(SolutionUpdateError::DeliveryIndexOutOfBounds {
                index: delivery,
                delivery_count: self.assigned_courier.len(),
            });
        }
        if self.assigned_courier[delivery] != 0 {
            return Err(SolutionUpdateError::AlreadyAssigned {
                delivery: DeliveryId::from_index(delivery),
            });
        }

        let slot = 2 * self.assigned_count[courier];
        let reference = delivery as i32 + 1;
        self.plans[courier][slot] = reference;
        self.plans[courier][slot + 1] = -reference;
        self.assigned_count[courier] += 1;
        self.assigned_courier[delivery] = courier as u32 + 1;
        self.completion_time[delivery] = completion_time;
        self.attributed_time[courier] += completion_time;
        self.total_delivery_time += completion_time;
        Ok(())
    }

    /// Replaces the plan of `courier` with `new_route` and refreshes all
    /// bookkeeping for that courier by forward simulation.
    ///
    /// The grand total is adjusted incrementally (old attributed time out,
    /// new attributed time in); it is never recomputed across couriers.
    pub fn commit_reroute(
        &mut self,
        courier: usize,
        new_route: &[i32],
        instance: &ProblemInstance,
    ) -> Result<(), SolutionUpdateError> {
        if courier >= self.plans.len() {
            return Err(SolutionUpdateError::CourierIndexOutOfBounds {
                index: courier,
                courier_count: self.plans.len(),
            });
        }
        if new_route.len() != self.plans[courier].len() {
            return Err(SolutionUpdateError::RouteLengthMismatch {
                expected: self.plans[courier].len(),
                actual: new_route.len(),
            });
        }

        let deliveries = instance.deliveries();
        let event_count = 2 * self.assigned_count[courier];
        let mut current_time = 0.0;
        let mut current_location = instance.couriers()[courier].start_location();
        let mut new_attributed = 0.0;
        let mut new_completion: Vec<(usize, f64)> = Vec::with_capacity(event_count / 2);

        for (slot, &entry) in new_route[..event_count].iter().enumerate() {
            if entry > 0 {
                let d = entry as usize - 1;
                if d >= deliveries.len() {
                    return Err(SolutionUpdateError::MalformedRoute {
                        courier_index: courier,
                        slot,
                    });
                }
                let pickup = deliveries[d].pickup_location();
                current_time = (current_time + instance.travel(current_location, pickup))
                    .max(deliveries[d].release_time());
                current_location = pickup;
            } else if entry < 0 {
                let d = (-entry) as usize - 1;
                if d >= deliveries.len() {
                    return Err(SolutionUpdateError::MalformedRoute {
                        courier_index: courier,
                        slot,
                    });
                }
                let dropoff = deliveries[d].dropoff_location();
                current_time += instance.travel(current_location, dropoff);
                current_location = dropoff;
                new_completion.push((d, current_time));
                new_attributed += current_time;
            } else {
                return Err(SolutionUpdateError::MalformedRoute {
                    courier_index: courier,
                    slot,
                });
            }
        }

        self.plans[courier].copy_from_slice(new_route);
        for &(d, t) in &new_completion {
            self.completion_time[d] = t;
        }
        let old_attributed = self.attributed_time[courier];
        self.attributed_time[courier] = new_attributed;
        self.total_delivery_time = self.total_delivery_time - old_attributed + new_attributed;
        Ok(())
    }

    #[inline]
    pub fn courier_count(&self) -> usize {
        self.plans.len()
    }

    #[inline]
    pub fn delivery_count(&self) -> usize {
        self.assigned_courier.len()
    }

    /// Full routing plan of one courier, trailing zeros included.
    #[inline]
    pub fn plan(&self, courier: usize) -> &[i32] {
        &self.plans[courier]
    }

    #[inline]
    pub fn assigned_count(&self, courier: usize) -> usize {
        self.assigned_count[courier]
    }

    #[inline]
    pub fn attributed_time(&self, courier: usize) -> f64 {
        self.attributed_time[courier]
    }

    #[inline]
    pub fn completion_time(&self, delivery: usize) -> f64 {
        self.completion_time[delivery]
    }

    /// Courier assigned to `delivery`, if any.
    #[inline]
    pub fn assigned_courier(&self, delivery: usize) -> Option<CourierId> {
        match self.assigned_courier[delivery] {
            0 => None,
            id => Some(CourierId::new(id)),
        }
    }

    #[inline]
    pub fn total_delivery_time(&self) -> f64 {
        self.total_delivery_time
    }

    /// Delivery indices carried by `courier`, in pickup order.
    pub fn deliveries_in_route(&self, courier: usize) -> Vec<usize> {
        self.plans[courier]
            .iter()
            .take_while(|&&e| e != 0)
            .filter(|&&e| e > 0)
            .map(|&e| e as usize - 1)
            .collect()
    }

    /// Locations visited by `courier`: start location, then one location
    /// per pickup/dropoff event in plan order.
    pub fn stop_locations(&self, courier: usize, instance: &ProblemInstance) -> Vec<usize> {
        let deliveries = instance.deliveries();
        let mut stops = vec![instance.couriers()[courier].start_location()];
        for &entry in self.plans[courier].iter().take_while(|&&e| e != 0) {
            if entry > 0 {
                stops.push(deliveries[entry as usize - 1].pickup_location());
            } else {
                stops.push(deliveries[(-entry) as usize - 1].dropoff_location());
            }
        }
        stops
    }
}
