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
    prob::ProblemInstance,
};

#[derive(Debug, Default)]
pub struct ProblemBuilder {
    couriers: Vec<Courier>,
    deliveries: Vec<Delivery>,
    matrix: Option<TravelMatrix>,
}

impl ProblemBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_courier(&mut self, courier: Courier) -> &mut Self {
        self.couriers.push(courier);
        self
    }

    #[inline]
    pub fn add_delivery(&mut self, delivery: Delivery) -> &mut Self {
        self.deliveries.push(delivery);
        self
    }

    #[inline]
    pub fn travel_matrix(&mut self, matrix: TravelMatrix) -> &mut Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn build(self) -> Result<ProblemInstance, ProblemError> {
        let matrix = self.matrix.unwrap_or_else(TravelMatrix::empty);
        ProblemInstance::new(self.couriers, self.deliveries, matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CourierId, DeliveryId};

    #[test]
    fn test_builder_collects_parts() {
        let mut b = ProblemBuilder::new();
        b.add_courier(Courier::new(CourierId::new(1), 0, 5));
        b.add_delivery(Delivery::new(DeliveryId::new(1), 1, 0, 1, 0.0));
        b.travel_matrix(
            TravelMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap(),
        );
        let instance = b.build().unwrap();
        assert_eq!(instance.courier_count(), 1);
        assert_eq!(instance.delivery_count(), 1);
        assert_eq!(instance.location_count(), 2);
    }
}
