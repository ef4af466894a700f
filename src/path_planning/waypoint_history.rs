//! Rolling buffer of the road-relative points already sent to the path
//! follower.

use std::collections::VecDeque;

/// Previously emitted `(s, d)` points not yet driven over, oldest first.
///
/// The two coordinate sequences are always pushed and popped together, so
/// they have the same length at all times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointHistory {
    s: VecDeque<f64>,
    d: VecDeque<f64>,
}

impl WaypointHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the `consumed` oldest points, stopping early once empty
    pub fn trim(&mut self, consumed: usize) {
        for _ in 0..consumed {
            if self.s.pop_front().is_none() || self.d.pop_front().is_none() {
                break;
            }
        }
    }

    /// Keep at most `cap` points, dropping the newest ones
    pub fn truncate(&mut self, cap: usize) {
        self.s.truncate(cap);
        self.d.truncate(cap);
    }

    pub fn append(&mut self, s: f64, d: f64) {
        self.s.push_back(s);
        self.d.push_back(d);
    }

    pub fn front(&self) -> Option<(f64, f64)> {
        Some((*self.s.front()?, *self.d.front()?))
    }

    pub fn back(&self) -> Option<(f64, f64)> {
        Some((*self.s.back()?, *self.d.back()?))
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn clear(&mut self) {
        self.s.clear();
        self.d.clear();
    }

    /// Longitudinal coordinates, oldest first
    pub fn s_values(&self) -> &VecDeque<f64> {
        &self.s
    }

    /// Lateral coordinates, oldest first
    pub fn d_values(&self) -> &VecDeque<f64> {
        &self.d
    }
}
