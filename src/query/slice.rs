//! Array slice arithmetic (`[start:stop:step]`).

use super::error::SelectorError;

/// A slice descriptor with optional bounds and a non-zero step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    start: Option<i64>,
    stop: Option<i64>,
    step: i64,
}

impl Default for Slice {
    /// The full slice `[:]`.
    fn default() -> Self {
        Self {
            start: None,
            stop: None,
            step: 1,
        }
    }
}

impl Slice {
    /// Creates a slice, rejecting a step of zero.
    pub fn new(start: Option<i64>, stop: Option<i64>, step: i64) -> Result<Self, SelectorError> {
        if step == 0 {
            return Err(SelectorError::ZeroSliceStep);
        }
        Ok(Self { start, stop, step })
    }

    pub fn start(&self) -> Option<i64> {
        self.start
    }

    pub fn stop(&self) -> Option<i64> {
        self.stop
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Normalized start bound for a container of `size` elements.
    ///
    /// Negative bounds count from the end. The result is capped at `size` but
    /// may still be negative; [`Slice::indices`] clamps it per direction.
    pub fn get_start(&self, size: usize) -> i64 {
        let len = size as i64;
        match self.start {
            Some(start) => normalize(start, len),
            None if self.step >= 0 => 0,
            None => len,
        }
    }

    /// Normalized stop bound for a container of `size` elements.
    pub fn get_stop(&self, size: usize) -> i64 {
        let len = size as i64;
        match self.stop {
            Some(stop) => normalize(stop, len),
            None if self.step >= 0 => len,
            None => -1,
        }
    }

    /// Indices selected from a container of `size` elements, in visiting order.
    pub fn indices(&self, size: usize) -> SliceIndices {
        let len = size as i64;
        let mut start = self.get_start(size);
        let mut stop = self.get_stop(size);

        if self.step > 0 {
            start = start.max(0);
            stop = stop.min(len);
        } else {
            start = start.min(len - 1);
            stop = stop.max(-1);
        }

        SliceIndices {
            next: Some(start),
            stop,
            step: self.step,
            len,
        }
    }
}

fn normalize(bound: i64, len: i64) -> i64 {
    let bound = if bound >= 0 {
        bound
    } else {
        len.saturating_add(bound)
    };
    bound.min(len)
}

/// Iterator over the indices a [`Slice`] visits.
#[derive(Debug, Clone)]
pub struct SliceIndices {
    next: Option<i64>,
    stop: i64,
    step: i64,
    len: i64,
}

impl Iterator for SliceIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let i = self.next?;
            let in_range = if self.step > 0 {
                i < self.stop
            } else {
                i > self.stop
            };
            if !in_range {
                self.next = None;
                return None;
            }
            self.next = i.checked_add(self.step);
            // Negative steps can start from a clamped bound outside the array.
            if i >= 0 && i < self.len {
                return Some(i as usize);
            }
        }
    }
}
