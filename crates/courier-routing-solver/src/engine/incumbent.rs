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

use courier_routing_model::solution::sol::Solution;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Best solution found so far, shared between restart workers.
///
/// The grand total is mirrored in an atomic (as raw f64 bits) so workers
/// can reject hopeless candidates without taking the lock; acceptance is
/// re-checked under the lock, and only a strictly lower total replaces
/// the incumbent.
#[derive(Debug)]
pub struct SharedIncumbent {
    best: Mutex<Solution>,
    best_total: AtomicU64, // f64 bits; avoids locking for simple reads
}

impl SharedIncumbent {
    #[inline]
    pub fn new(initial: Solution) -> Self {
        Self {
            best_total: AtomicU64::new(initial.total_delivery_time().to_bits()),
            best: Mutex::new(initial),
        }
    }

    /// Best-known total without locking the solution.
    #[inline]
    pub fn peek(&self) -> f64 {
        f64::from_bits(self.best_total.load(Ordering::Acquire))
    }

    /// Full cloned snapshot of the incumbent.
    #[inline]
    pub fn snapshot(&self) -> Solution {
        self.best.lock().clone()
    }

    pub fn try_update(&self, candidate: &Solution) -> bool {
        let total = candidate.total_delivery_time();
        if total >= self.peek() {
            return false;
        }

        let mut guard = self.best.lock();
        if total >= guard.total_delivery_time() {
            return false;
        }

        tracing::info!(
            old_total = guard.total_delivery_time(),
            new_total = total,
            "new incumbent"
        );
        *guard = candidate.clone();
        self.best_total.store(total.to_bits(), Ordering::Release);
        true
    }

    #[inline]
    pub fn into_inner(self) -> Solution {
        self.best.into_inner()
    }
}
