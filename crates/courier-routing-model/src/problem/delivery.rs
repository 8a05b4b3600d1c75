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

use crate::common::DeliveryId;

/// A pickup-and-delivery task with a capacity demand and a release time,
/// the earliest instant at which the pickup may legally happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delivery {
    id: DeliveryId,
    demand: i64,
    pickup_location: usize,
    dropoff_location: usize,
    release_time: f64,
}

impl Delivery {
    #[inline]
    pub fn new(
        id: DeliveryId,
        demand: i64,
        pickup_location: usize,
        dropoff_location: usize,
        release_time: f64,
    ) -> Self {
        Self {
            id,
            demand,
            pickup_location,
            dropoff_location,
            release_time,
        }
    }

    #[inline]
    pub fn id(&self) -> DeliveryId {
        self.id
    }

    #[inline]
    pub fn demand(&self) -> i64 {
        self.demand
    }

    #[inline]
    pub fn pickup_location(&self) -> usize {
        self.pickup_location
    }

    #[inline]
    pub fn dropoff_location(&self) -> usize {
        self.dropoff_location
    }

    #[inline]
    pub fn release_time(&self) -> f64 {
        self.release_time
    }
}

impl std::fmt::Display for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Delivery {} ({} -> {}, demand {}, release {})",
            self.id, self.pickup_location, self.dropoff_location, self.demand, self.release_time
        )
    }
}
