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

use courier_routing_model::solution::err::SolutionUpdateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionError {
    /// No courier can take any of the remaining unassigned deliveries.
    /// With append-only moves this means some delivery's demand exceeds
    /// every courier's capacity, so no restart can succeed either.
    Stalled { remaining: usize },
    Update(SolutionUpdateError),
}

impl From<SolutionUpdateError> for ConstructionError {
    fn from(e: SolutionUpdateError) -> Self {
        Self::Update(e)
    }
}

impl std::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructionError::Stalled { remaining } => write!(
                f,
                "construction stalled: no courier can take any of the {} remaining deliveries",
                remaining
            ),
            ConstructionError::Update(e) => write!(f, "solution update failed: {e}"),
        }
    }
}

impl std::error::Error for ConstructionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConstructionError::Update(e) => Some(e),
            _ => None,
        }
    }
}
