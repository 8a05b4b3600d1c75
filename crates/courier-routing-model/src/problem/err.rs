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
use std::num::{ParseFloatError, ParseIntError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TravelMatrixError {
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    InvalidEntry {
        row: usize,
        column: usize,
        value: f64,
    },
}

impl std::fmt::Display for TravelMatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMatrixError::RaggedRow {
                row,
                expected,
                actual,
            } => write!(
                f,
                "travel matrix row {} has {} entries, expected {}",
                row, actual, expected
            ),
            TravelMatrixError::InvalidEntry { row, column, value } => write!(
                f,
                "travel matrix entry ({}, {}) is not a non-negative finite value: {}",
                row, column, value
            ),
        }
    }
}

impl std::error::Error for TravelMatrixError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemError {
    NoCouriers,
    CourierLocationOutOfBounds {
        courier: CourierId,
        location: usize,
        location_count: usize,
    },
    DeliveryLocationOutOfBounds {
        delivery: DeliveryId,
        location: usize,
        location_count: usize,
    },
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::NoCouriers => write!(f, "the instance has no couriers"),
            ProblemError::CourierLocationOutOfBounds {
                courier,
                location,
                location_count,
            } => write!(
                f,
                "{} starts at location {} but the matrix has {} locations",
                courier, location, location_count
            ),
            ProblemError::DeliveryLocationOutOfBounds {
                delivery,
                location,
                location_count,
            } => write!(
                f,
                "{} references location {} but the matrix has {} locations",
                delivery, location, location_count
            ),
        }
    }
}

impl std::error::Error for ProblemError {}

#[derive(Debug)]
pub enum InstanceLoaderError {
    Io(std::io::Error),
    MissingFile {
        directory: String,
        file: &'static str,
    },
    MissingColumn {
        file: String,
        column: String,
    },
    ParseInt {
        file: String,
        line: usize,
        source: ParseIntError,
    },
    ParseFloat {
        file: String,
        line: usize,
        source: ParseFloatError,
    },
    MalformedRecord {
        file: String,
        line: usize,
    },
    InvalidLocationId {
        file: String,
        line: usize,
        value: i64,
    },
    Matrix(TravelMatrixError),
    Problem(ProblemError),
}

impl From<std::io::Error> for InstanceLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<TravelMatrixError> for InstanceLoaderError {
    fn from(e: TravelMatrixError) -> Self {
        Self::Matrix(e)
    }
}

impl From<ProblemError> for InstanceLoaderError {
    fn from(e: ProblemError) -> Self {
        Self::Problem(e)
    }
}

impl std::fmt::Display for InstanceLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use InstanceLoaderError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            MissingFile { directory, file } => {
                write!(f, "missing {file} in instance directory {directory}")
            }
            MissingColumn { file, column } => {
                write!(f, "{file}: missing column {column:?}")
            }
            ParseInt { file, line, source } => {
                write!(f, "{file}, line {line}: parse-int error: {source}")
            }
            ParseFloat { file, line, source } => {
                write!(f, "{file}, line {line}: parse-float error: {source}")
            }
            MalformedRecord { file, line } => {
                write!(f, "{file}, line {line}: malformed record")
            }
            InvalidLocationId { file, line, value } => {
                write!(f, "{file}, line {line}: location ids are 1-based, got {value}")
            }
            Matrix(e) => write!(f, "travel matrix error: {e}"),
            Problem(e) => write!(f, "problem error: {e}"),
        }
    }
}

impl std::error::Error for InstanceLoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InstanceLoaderError::Io(e) => Some(e),
            InstanceLoaderError::ParseInt { source, .. } => Some(source),
            InstanceLoaderError::ParseFloat { source, .. } => Some(source),
            InstanceLoaderError::Matrix(e) => Some(e),
            InstanceLoaderError::Problem(e) => Some(e),
            _ => None,
        }
    }
}
