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

use crate::construction::err::ConstructionError;
use courier_routing_model::solution::err::SolutionUpdateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    Construction(ConstructionError),
    Update(SolutionUpdateError),
}

impl From<ConstructionError> for SolverError {
    fn from(e: ConstructionError) -> Self {
        Self::Construction(e)
    }
}

impl From<SolutionUpdateError> for SolverError {
    fn from(e: SolutionUpdateError) -> Self {
        Self::Update(e)
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::Construction(e) => write!(f, "construction failed: {e}"),
            SolverError::Update(e) => write!(f, "local search failed: {e}"),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Construction(e) => Some(e),
            SolverError::Update(e) => Some(e),
        }
    }
}
