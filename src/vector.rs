use alloc::vec::Vec;

use crate::utils::FromU32;

/// Read access to a weight vector.
pub trait WeightVector {
    /// Gets the weight at `index`.
    fn get_weight(&self, index: usize) -> f64;

    /// Sums the weights at the given positions.
    #[inline(always)]
    fn sum_weights(&self, positions: &[u32]) -> f64 {
        positions
            .iter()
            .map(|&p| self.get_weight(usize::from_u32(p)))
            .sum()
    }
}

/// Write access to a weight vector.
pub trait WeightVectorMut: WeightVector {
    /// Adds `value` to the weight at `index`.
    fn add_weight(&mut self, index: usize, value: f64);

    /// Adds `value` to the weight at every given position.
    #[inline(always)]
    fn add_weights(&mut self, positions: &[u32], value: f64) {
        for &p in positions {
            self.add_weight(usize::from_u32(p), value);
        }
    }
}

impl WeightVector for [f64] {
    #[inline(always)]
    fn get_weight(&self, index: usize) -> f64 {
        self[index]
    }
}

impl WeightVectorMut for [f64] {
    #[inline(always)]
    fn add_weight(&mut self, index: usize, value: f64) {
        self[index] += value;
    }
}

impl WeightVector for Vec<f64> {
    #[inline(always)]
    fn get_weight(&self, index: usize) -> f64 {
        self[index]
    }
}

impl WeightVectorMut for Vec<f64> {
    #[inline(always)]
    fn add_weight(&mut self, index: usize, value: f64) {
        self[index] += value;
    }
}
