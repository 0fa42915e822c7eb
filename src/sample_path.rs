//! An event-driven step function of a population count over time.
//!
//! The path starts at an initial value at time 0 and every recorded event lowers it by one at
//! the event's time. Simultaneous events are kept as separate unit steps, so
//! `value_at(t) == initial_value - (number of events at or before t)` holds for every `t`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::horizon::Period;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct StepPoint {
    pub time: Period,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplePath {
    initial_value: usize,
    /// Number of unit decrements registered at each time.
    decrements: BTreeMap<Period, usize>,
    total_decrements: usize,
}

impl SamplePath {
    #[must_use]
    pub fn new(initial_value: usize) -> Self {
        Self {
            initial_value,
            decrements: BTreeMap::new(),
            total_decrements: 0,
        }
    }

    /// Registers a `-1` step at `time`.
    pub fn record_decrement(&mut self, time: Period) {
        *self.decrements.entry(time).or_insert(0) += 1;
        self.total_decrements += 1;
    }

    #[must_use]
    pub fn initial_value(&self) -> usize {
        self.initial_value
    }

    #[must_use]
    pub fn total_decrements(&self) -> usize {
        self.total_decrements
    }

    #[must_use]
    pub fn value_at(&self, time: Period) -> usize {
        let removed: usize = self.decrements.range(..=time).map(|(_, n)| n).sum();
        self.initial_value.saturating_sub(removed)
    }

    /// The path as a list of points: the initial value at time 0 followed by one point per unit
    /// step, in time order. Steps at the same time produce repeated time coordinates.
    #[must_use]
    pub fn step_points(&self) -> Vec<StepPoint> {
        let mut points = Vec::with_capacity(self.total_decrements + 1);
        let mut count = self.initial_value;
        points.push(StepPoint { time: 0, count });
        for (&time, &n) in &self.decrements {
            for _ in 0..n {
                count = count.saturating_sub(1);
                points.push(StepPoint { time, count });
            }
        }
        points
    }

    /// The value of the path at every period in `[0, horizon]`.
    #[must_use]
    pub fn dense(&self, horizon: Period) -> Vec<usize> {
        let mut values = Vec::with_capacity(horizon as usize + 1);
        let mut steps = self.decrements.iter().peekable();
        let mut count = self.initial_value;
        for time in 0..=horizon {
            while let Some((_, n)) = steps.next_if(|&(&t, _)| t <= time) {
                count = count.saturating_sub(*n);
            }
            values.push(count);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_with(initial_value: usize, times: &[Period]) -> SamplePath {
        let mut path = SamplePath::new(initial_value);
        for &t in times {
            path.record_decrement(t);
        }
        path
    }

    #[test]
    fn empty_path_is_constant() {
        let path = SamplePath::new(4);
        assert_eq!(path.value_at(0), 4);
        assert_eq!(path.value_at(1000), 4);
        assert_eq!(path.step_points(), vec![StepPoint { time: 0, count: 4 }]);
        assert_eq!(path.dense(2), vec![4, 4, 4]);
    }

    #[test]
    fn simultaneous_steps_stack() {
        let path = path_with(3, &[2, 2, 5]);
        assert_eq!(path.value_at(0), 3);
        assert_eq!(path.value_at(1), 3);
        assert_eq!(path.value_at(2), 1);
        assert_eq!(path.value_at(4), 1);
        assert_eq!(path.value_at(5), 0);
        assert_eq!(path.total_decrements(), 3);
    }

    #[test]
    fn step_points_keep_ties() {
        let path = path_with(3, &[5, 2, 2]);
        assert_eq!(
            path.step_points(),
            vec![
                StepPoint { time: 0, count: 3 },
                StepPoint { time: 2, count: 2 },
                StepPoint { time: 2, count: 1 },
                StepPoint { time: 5, count: 0 },
            ]
        );
    }

    #[test]
    fn dense_matches_point_queries() {
        let times = [1, 3, 3, 3, 7, 9, 9];
        let path = path_with(10, &times);
        let dense = path.dense(12);
        assert_eq!(dense.len(), 13);
        for (t, value) in dense.iter().enumerate() {
            let t = t as Period;
            assert_eq!(*value, path.value_at(t));
            let expected = 10 - times.iter().filter(|&&s| s <= t).count();
            assert_eq!(*value, expected);
        }
    }

    #[test]
    fn dense_ignores_steps_past_horizon() {
        let path = path_with(2, &[1, 8]);
        assert_eq!(path.dense(3), vec![2, 1, 1, 1]);
    }
}
