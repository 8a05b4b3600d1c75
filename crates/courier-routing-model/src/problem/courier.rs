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

use crate::common::CourierId;

/// An agent that executes an ordered pickup/dropoff event sequence,
/// starting at `start_location` with a fixed `capacity` limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Courier {
    id: CourierId,
    start_location: usize,
    capacity: i64,
}

impl Courier {
    #[inline]
    pub fn new(id: CourierId, start_location: usize, capacity: i64) -> Self {
        Self {
            id,
            start_location,
            capacity,
        }
    }

    #[inline]
    pub fn id(&self) -> CourierId {
        self.id
    }

    #[inline]
    pub fn start_location(&self) -> usize {
        self.start_location
    }

    #[inline]
    pub fn capacity(&self) -> i64 {
        self.capacity
    }
}

impl std::fmt::Display for Courier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Courier {} at location {} with capacity {}",
            self.id, self.start_location, self.capacity
        )
    }
}
