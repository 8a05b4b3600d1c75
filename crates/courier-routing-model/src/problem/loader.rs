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
    problem::{
        builder::ProblemBuilder,
        courier::Courier,
        delivery::Delivery,
        err::InstanceLoaderError,
        matrix::TravelMatrix,
        prob::ProblemInstance,
    },
};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

const COURIERS_FILE: &str = "couriers.csv";
const DELIVERIES_FILE: &str = "deliveries.csv";
const TRAVEL_TIMES_FILE: &str = "traveltimes.csv";

/// Loads one instance directory holding `couriers.csv`, `deliveries.csv`
/// and `traveltimes.csv` (matched by file-name suffix).
///
/// Location ids are 1-based in the files and normalized to 0-based here.
/// The `Pickup Stacking_Id` column of the delivery table is parsed and
/// ignored; pickup stacking groups play no role in this solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceLoader;

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    pub fn from_dir<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> Result<ProblemInstance, InstanceLoaderError> {
        let dir = dir.as_ref();
        let couriers_path = find_file(dir, COURIERS_FILE)?;
        let deliveries_path = find_file(dir, DELIVERIES_FILE)?;
        let travel_times_path = find_file(dir, TRAVEL_TIMES_FILE)?;

        let couriers =
            self.parse_couriers(BufReader::new(File::open(&couriers_path)?), COURIERS_FILE)?;
        let deliveries = self.parse_deliveries(
            BufReader::new(File::open(&deliveries_path)?),
            DELIVERIES_FILE,
        )?;
        let matrix = self.parse_travel_times(
            BufReader::new(File::open(&travel_times_path)?),
            TRAVEL_TIMES_FILE,
        )?;

        tracing::debug!(
            couriers = couriers.len(),
            deliveries = deliveries.len(),
            locations = matrix.len(),
            "loaded instance from {}",
            dir.display()
        );

        let mut builder = ProblemBuilder::new();
        for c in couriers {
            builder.add_courier(c);
        }
        for d in deliveries {
            builder.add_delivery(d);
        }
        builder.travel_matrix(matrix);
        Ok(builder.build()?)
    }

    pub fn parse_couriers<R: BufRead>(
        &self,
        reader: R,
        file: &str,
    ) -> Result<Vec<Courier>, InstanceLoaderError> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(h) => h?,
            None => return Ok(Vec::new()),
        };
        let cols = HeaderMap::parse(&header);
        let id_col = cols.require(file, "ID")?;
        let loc_col = cols.require(file, "Location")?;
        let cap_col = cols.require(file, "Capacity")?;

        let mut couriers = Vec::new();
        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = i + 2;
            let fields = split_fields(&line);
            let id = parse_int(&fields, id_col, file, line_no)?;
            let location = parse_location(&fields, loc_col, file, line_no)?;
            let capacity = parse_int(&fields, cap_col, file, line_no)?;
            couriers.push(Courier::new(CourierId::new(id as u32), location, capacity));
        }
        Ok(couriers)
    }

    pub fn parse_deliveries<R: BufRead>(
        &self,
        reader: R,
        file: &str,
    ) -> Result<Vec<Delivery>, InstanceLoaderError> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(h) => h?,
            None => return Ok(Vec::new()),
        };
        let cols = HeaderMap::parse(&header);
        let id_col = cols.require(file, "ID")?;
        let cap_col = cols.require(file, "Capacity")?;
        let pickup_col = cols.require(file, "Pickup Loc")?;
        let release_col = cols.require(file, "Time Window Start")?;
        let dropoff_col = cols.require(file, "Dropoff Loc")?;

        let mut deliveries = Vec::new();
        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = i + 2;
            let fields = split_fields(&line);
            let id = parse_int(&fields, id_col, file, line_no)?;
            let demand = parse_int(&fields, cap_col, file, line_no)?;
            let pickup = parse_location(&fields, pickup_col, file, line_no)?;
            let release = parse_float(&fields, release_col, file, line_no)?;
            let dropoff = parse_location(&fields, dropoff_col, file, line_no)?;
            deliveries.push(Delivery::new(
                DeliveryId::new(id as u32),
                demand,
                pickup,
                dropoff,
                release,
            ));
        }
        Ok(deliveries)
    }

    /// Travel-time table: a header row, then one row per location whose
    /// first field is the (1-based) location id.
    pub fn parse_travel_times<R: BufRead>(
        &self,
        reader: R,
        file: &str,
    ) -> Result<TravelMatrix, InstanceLoaderError> {
        let mut rows = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if i == 0 || line.trim().is_empty() {
                continue;
            }
            let line_no = i + 1;
            let fields = split_fields(&line);
            if fields.len() < 2 {
                return Err(InstanceLoaderError::MalformedRecord {
                    file: file.to_string(),
                    line: line_no,
                });
            }
            let mut row = Vec::with_capacity(fields.len() - 1);
            for col in 1..fields.len() {
                row.push(parse_float(&fields, col, file, line_no)?);
            }
            rows.push(row);
        }
        Ok(TravelMatrix::from_rows(rows)?)
    }
}

struct HeaderMap {
    names: Vec<String>,
}

impl HeaderMap {
    fn parse(header: &str) -> Self {
        Self {
            names: split_fields(header)
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn require(&self, file: &str, name: &str) -> Result<usize, InstanceLoaderError> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| InstanceLoaderError::MissingColumn {
                file: file.to_string(),
                column: name.to_string(),
            })
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn field<'a>(
    fields: &[&'a str],
    col: usize,
    file: &str,
    line: usize,
) -> Result<&'a str, InstanceLoaderError> {
    fields
        .get(col)
        .copied()
        .ok_or_else(|| InstanceLoaderError::MalformedRecord {
            file: file.to_string(),
            line,
        })
}

fn parse_int(
    fields: &[&str],
    col: usize,
    file: &str,
    line: usize,
) -> Result<i64, InstanceLoaderError> {
    field(fields, col, file, line)?
        .parse::<i64>()
        .map_err(|source| InstanceLoaderError::ParseInt {
            file: file.to_string(),
            line,
            source,
        })
}

fn parse_float(
    fields: &[&str],
    col: usize,
    file: &str,
    line: usize,
) -> Result<f64, InstanceLoaderError> {
    field(fields, col, file, line)?
        .parse::<f64>()
        .map_err(|source| InstanceLoaderError::ParseFloat {
            file: file.to_string(),
            line,
            source,
        })
}

fn parse_location(
    fields: &[&str],
    col: usize,
    file: &str,
    line: usize,
) -> Result<usize, InstanceLoaderError> {
    let raw = parse_int(fields, col, file, line)?;
    if raw < 1 {
        return Err(InstanceLoaderError::InvalidLocationId {
            file: file.to_string(),
            line,
            value: raw,
        });
    }
    Ok((raw - 1) as usize)
}

fn find_file(dir: &Path, suffix: &'static str) -> Result<std::path::PathBuf, InstanceLoaderError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(suffix) {
            return Ok(entry.path());
        }
    }
    Err(InstanceLoaderError::MissingFile {
        directory: dir.display().to_string(),
        file: suffix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_couriers_reads_header_and_rows() {
        let data = "ID,Location,Capacity\n1,3,10\n2,1,5\n";
        let couriers = InstanceLoader::new()
            .parse_couriers(Cursor::new(data), COURIERS_FILE)
            .unwrap();
        assert_eq!(couriers.len(), 2);
        assert_eq!(*couriers[0].id().value(), 1);
        assert_eq!(couriers[0].start_location(), 2); // 1-based -> 0-based
        assert_eq!(couriers[1].capacity(), 5);
    }

    #[test]
    fn test_parse_couriers_tolerates_column_reordering() {
        let data = "Capacity,ID,Location\n7,1,2\n";
        let couriers = InstanceLoader::new()
            .parse_couriers(Cursor::new(data), COURIERS_FILE)
            .unwrap();
        assert_eq!(couriers[0].capacity(), 7);
        assert_eq!(couriers[0].start_location(), 1);
    }

    #[test]
    fn test_parse_couriers_missing_column() {
        let data = "ID,Capacity\n1,10\n";
        let err = InstanceLoader::new()
            .parse_couriers(Cursor::new(data), COURIERS_FILE)
            .unwrap_err();
        assert!(matches!(err, InstanceLoaderError::MissingColumn { .. }));
    }

    #[test]
    fn test_parse_deliveries_ignores_stacking_id_column() {
        let data = "ID,Capacity,Pickup Loc,Time Window Start,Pickup Stacking_Id,Dropoff Loc\n\
                    1,4,2,30,99,3\n";
        let deliveries = InstanceLoader::new()
            .parse_deliveries(Cursor::new(data), DELIVERIES_FILE)
            .unwrap();
        assert_eq!(deliveries.len(), 1);
        let d = &deliveries[0];
        assert_eq!(d.demand(), 4);
        assert_eq!(d.pickup_location(), 1);
        assert_eq!(d.dropoff_location(), 2);
        assert_eq!(d.release_time(), 30.0);
    }

    #[test]
    fn test_parse_deliveries_rejects_zero_location() {
        let data = "ID,Capacity,Pickup Loc,Time Window Start,Pickup Stacking_Id,Dropoff Loc\n\
                    1,4,0,30,99,3\n";
        let err = InstanceLoader::new()
            .parse_deliveries(Cursor::new(data), DELIVERIES_FILE)
            .unwrap_err();
        assert!(matches!(
            err,
            InstanceLoaderError::InvalidLocationId { value: 0, .. }
        ));
    }

    #[test]
    fn test_parse_travel_times_skips_header_and_id_column() {
        let data = "Locations,1,2\n1,0,7\n2,9,0\n";
        let matrix = InstanceLoader::new()
            .parse_travel_times(Cursor::new(data), TRAVEL_TIMES_FILE)
            .unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.travel(0, 1), 7.0);
        assert_eq!(matrix.travel(1, 0), 9.0);
    }

    #[test]
    fn test_parse_travel_times_rejects_garbage() {
        let data = "Locations,1,2\n1,0,x\n2,9,0\n";
        let err = InstanceLoader::new()
            .parse_travel_times(Cursor::new(data), TRAVEL_TIMES_FILE)
            .unwrap_err();
        assert!(matches!(err, InstanceLoaderError::ParseFloat { line: 2, .. }));
    }
}
