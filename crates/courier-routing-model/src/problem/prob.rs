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

use crate::problem::{
    courier::Courier, delivery::Delivery, err::ProblemError, matrix::TravelMatrix,
};

/// Immutable description of one routing instance: couriers, deliveries,
/// travel times, and a precomputed nearest-delivery ranking per location.
///
/// The ranking at location `l` lists every delivery index, sorted ascending
/// by travel time from `l` to the delivery's pickup location. Ties keep
/// delivery-index order (stable sort), so the ranking is deterministic.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    couriers: Vec<Courier>,
    deliveries: Vec<Delivery>,
    matrix: TravelMatrix,
    nearest_deliveries: Vec<Vec<usize>>,
}

impl ProblemInstance {
    pub fn new(
        couriers: Vec<Courier>,
        deliveries: Vec<Delivery>,
        matrix: TravelMatrix,
    ) -> Result<Self, ProblemError> {
        if couriers.is_empty() {
            return Err(ProblemError::NoCouriers);
        }
        let location_count = matrix.len();
        for c in &couriers {
            if c.start_location() >= location_count {
                return Err(ProblemError::CourierLocationOutOfBounds {
                    courier: c.id(),
                    location: c.start_location(),
                    location_count,
                });
            }
        }
        for d in &deliveries {
            let worst = d.pickup_location().max(d.dropoff_location());
            if worst >= location_count {
                return Err(ProblemError::DeliveryLocationOutOfBounds {
                    delivery: d.id(),
                    location: worst,
                    location_count,
                });
            }
        }

        let nearest_deliveries = Self::rank_deliveries(&deliveries, &matrix);
        Ok(Self {
            couriers,
            deliveries,
            matrix,
            nearest_deliveries,
        })
    }

    fn rank_deliveries(deliveries: &[Delivery], matrix: &TravelMatrix) -> Vec<Vec<usize>> {
        let mut rankings = Vec::with_capacity(matrix.len());
        for loc in 0..matrix.len() {
            let mut order: Vec<usize> = (0..deliveries.len()).collect();
            order.sort_by(|&a, &b| {
                let ta = matrix.travel(loc, deliveries[a].pickup_location());
                let tb = matrix.travel(loc, deliveries[b].pickup_location());
                ta.total_cmp(&tb)
            });
            rankings.push(order);
        }
        rankings
    }

    #[inline]
    pub fn couriers(&self) -> &[Courier] {
        &self.couriers
    }

    #[inline]
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    #[inline]
    pub fn courier_count(&self) -> usize {
        self.couriers.len()
    }

    #[inline]
    pub fn delivery_count(&self) -> usize {
        self.deliveries.len()
    }

    #[inline]
    pub fn location_count(&self) -> usize {
        self.matrix.len()
    }

    #[inline]
    pub fn matrix(&self) -> &TravelMatrix {
        &self.matrix
    }

    #[inline]
    pub fn travel(&self, from: usize, to: usize) -> f64 {
        self.matrix.travel(from, to)
    }

    /// Delivery indices sorted ascending by travel time from `location`
    /// to their pickup locations.
    #[inline]
    pub fn nearest_deliveries(&self, location: usize) -> &[usize] {
        &self.nearest_deliveries[location]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CourierId, DeliveryId};

    fn courier(id: u32, loc: usize, cap: i64) -> Courier {
        Courier::new(CourierId::new(id), loc, cap)
    }

    fn delivery(id: u32, pickup: usize, dropoff: usize) -> Delivery {
        Delivery::new(DeliveryId::new(id), 1, pickup, dropoff, 0.0)
    }

    fn matrix_3() -> TravelMatrix {
        TravelMatrix::from_rows(vec![
            vec![0.0, 5.0, 2.0],
            vec![5.0, 0.0, 9.0],
            vec![2.0, 9.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_empty_courier_set() {
        let err = ProblemInstance::new(vec![], vec![], matrix_3()).unwrap_err();
        assert_eq!(err, ProblemError::NoCouriers);
    }

    #[test]
    fn test_new_rejects_courier_location_out_of_bounds() {
        let err = ProblemInstance::new(vec![courier(1, 3, 10)], vec![], matrix_3()).unwrap_err();
        assert!(matches!(
            err,
            ProblemError::CourierLocationOutOfBounds { location: 3, .. }
        ));
    }

    #[test]
    fn test_new_rejects_delivery_location_out_of_bounds() {
        let err = ProblemInstance::new(
            vec![courier(1, 0, 10)],
            vec![delivery(1, 0, 5)],
            matrix_3(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProblemError::DeliveryLocationOutOfBounds { location: 5, .. }
        ));
    }

    #[test]
    fn test_nearest_deliveries_sorted_by_pickup_travel_time() {
        // From location 0: pickups at 2 (travel 2), 1 (travel 5), 0 (travel 0).
        let instance = ProblemInstance::new(
            vec![courier(1, 0, 10)],
            vec![delivery(1, 1, 0), delivery(2, 2, 0), delivery(3, 0, 1)],
            matrix_3(),
        )
        .unwrap();
        assert_eq!(instance.nearest_deliveries(0), &[2, 1, 0]);
    }

    #[test]
    fn test_nearest_deliveries_ties_keep_index_order() {
        let instance = ProblemInstance::new(
            vec![courier(1, 0, 10)],
            // Both pickups at location 1, identical travel time from anywhere.
            vec![delivery(1, 1, 2), delivery(2, 1, 0)],
            matrix_3(),
        )
        .unwrap();
        assert_eq!(instance.nearest_deliveries(0), &[0, 1]);
        assert_eq!(instance.nearest_deliveries(2), &[0, 1]);
    }
}
