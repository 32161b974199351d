//! Rolling memory of recent alignment samples.

use crate::{axis::AlignmentVector, Error, Result};
use std::collections::VecDeque;

/// Fixed-capacity FIFO of alignment vectors
#[derive(Debug, Clone)]
pub struct SampleMemory {
    capacity: usize,
    samples: VecDeque<AlignmentVector>,
}

impl SampleMemory {
    /// Create an empty memory holding at most `capacity` samples
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidInput("Memory capacity must be greater than 0".to_string()));
        }
        Ok(Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        })
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, sample: AlignmentVector) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Element-wise mean of the stored samples, `None` when empty
    #[must_use]
    pub fn mean(&self) -> Option<AlignmentVector> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: AlignmentVector = self.samples.iter().sum();
        Some(sum / self.samples.len() as f64)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
