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
use std::num::{ParseFloatError, ParseIntError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionUpdateError {
    CourierIndexOutOfBounds {
        index: usize,
        courier_count: usize,
    },
    DeliveryIndexOutOfBounds {
        index: usize,
        delivery_count: usize,
    },
    AlreadyAssigned {
        delivery: DeliveryId,
    },
    RouteLengthMismatch {
        expected: usize,
        actual: usize,
    },
    MalformedRoute {
        courier_index: usize,
        slot: usize,
    },
}

impl std::fmt::Display for SolutionUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SolutionUpdateError::*;
        match self {
            CourierIndexOutOfBounds {
                index,
                courier_count,
            } => write!(
                f,
                "courier index {} out of bounds ({} couriers)",
                index, courier_count
            ),
            DeliveryIndexOutOfBounds {
                index,
                delivery_count,
            } => write!(
                f,
                "delivery index {} out of bounds ({} deliveries)",
                index, delivery_count
            ),
            AlreadyAssigned { delivery } => {
                write!(f, "{} is already assigned to a courier", delivery)
            }
            RouteLengthMismatch { expected, actual } => write!(
                f,
                "replacement route has {} slots, expected {}",
                actual, expected
            ),
            MalformedRoute {
                courier_index,
                slot,
            } => write!(
                f,
                "replacement route for courier index {} is malformed at slot {}",
                courier_index, slot
            ),
        }
    }
}

impl std::error::Error for SolutionUpdateError {}

#[derive(Debug)]
pub enum SolutionIoError {
    Io(std::io::Error),
    MalformedRecord {
        line: usize,
    },
    ParseInt {
        line: usize,
        source: ParseIntError,
    },
    ParseFloat {
        line: usize,
        source: ParseFloatError,
    },
    PlanLengthMismatch {
        courier: u32,
        expected: usize,
        actual: usize,
    },
    MissingTotal,
}

impl From<std::io::Error> for SolutionIoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Display for SolutionIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SolutionIoError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            MalformedRecord { line } => write!(f, "line {line}: malformed record"),
            ParseInt { line, source } => write!(f, "line {line}: parse-int error: {source}"),
            ParseFloat { line, source } => {
                write!(f, "line {line}: parse-float error: {source}")
            }
            PlanLengthMismatch {
                courier,
                expected,
                actual,
            } => write!(
                f,
                "plan of courier {} has {} entries, expected {}",
                courier, actual, expected
            ),
            MissingTotal => write!(f, "missing total record"),
        }
    }
}

impl std::error::Error for SolutionIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolutionIoError::Io(e) => Some(e),
            SolutionIoError::ParseInt { source, .. } => Some(source),
            SolutionIoError::ParseFloat { source, .. } => Some(source),
            _ => None,
        }
    }
}
