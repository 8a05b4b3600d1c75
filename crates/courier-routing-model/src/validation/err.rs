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

use crate::common::{CourierId, DeliveryId};

/// One feasibility finding. The checker reports findings, it never fails
/// early; an infeasible solution yields one entry per violated condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    UnassignedDelivery {
        delivery: DeliveryId,
    },
    PickupCountMismatch {
        delivery: DeliveryId,
        courier: CourierId,
        count: usize,
    },
    DropoffCountMismatch {
        delivery: DeliveryId,
        courier: CourierId,
        count: usize,
    },
    DropoffBeforePickup {
        delivery: DeliveryId,
        courier: CourierId,
    },
    ForeignPlanReference {
        delivery: DeliveryId,
        courier: CourierId,
    },
    ReleaseTimeViolated {
        delivery: DeliveryId,
        completion_time: f64,
        earliest_possible: f64,
    },
    CapacityExceeded {
        courier: CourierId,
        slot: usize,
        load: i64,
        capacity: i64,
    },
    CompletionTimeUnreachable {
        delivery: DeliveryId,
        recorded: f64,
        simulated: f64,
    },
    TotalMismatch {
        recorded: f64,
        computed: f64,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Violation::*;
        match self {
            UnassignedDelivery { delivery } => {
                write!(f, "{} is not assigned to any courier", delivery)
            }
            PickupCountMismatch {
                delivery,
                courier,
                count,
            } => write!(
                f,
                "{} is picked up {} times in the plan of {}, expected exactly once",
                delivery, count, courier
            ),
            DropoffCountMismatch {
                delivery,
                courier,
                count,
            } => write!(
                f,
                "{} is dropped off {} times in the plan of {}, expected exactly once",
                delivery, count, courier
            ),
            DropoffBeforePickup { delivery, courier } => write!(
                f,
                "{} is dropped off before being picked up by {}",
                delivery, courier
            ),
            ForeignPlanReference { delivery, courier } => write!(
                f,
                "{} appears in the plan of {} but is assigned elsewhere",
                delivery, courier
            ),
            ReleaseTimeViolated {
                delivery,
                completion_time,
                earliest_possible,
            } => write!(
                f,
                "{} completes at {} which is earlier than its release time allows ({})",
                delivery, completion_time, earliest_possible
            ),
            CapacityExceeded {
                courier,
                slot,
                load,
                capacity,
            } => write!(
                f,
                "{} carries load {} at slot {} which exceeds its capacity {}",
                courier, load, slot, capacity
            ),
            CompletionTimeUnreachable {
                delivery,
                recorded,
                simulated,
            } => write!(
                f,
                "{} has recorded completion time {} but forward simulation reaches it at {}",
                delivery, recorded, simulated
            ),
            TotalMismatch { recorded, computed } => write!(
                f,
                "total delivery time {} does not equal the sum of completion times {}",
                recorded, computed
            ),
        }
    }
}
