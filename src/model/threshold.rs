//! Threshold Model
//!
//! Alert boundaries per metric and the evaluation of readings against them.

use super::vitals::{Metric, RawReading};

/// Outcome of evaluating a value against a `BoundaryPair`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThresholdState {
    Normal,
    Violated,
}

/// Which side of a `BoundaryPair` an edit applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryEdge {
    Lower,
    Upper,
}

/// Lower and upper alert boundary of one metric.
///
/// Both values are always finite. Edits produce a new pair instead of
/// mutating an existing one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundaryPair {
    min: f64,
    max: f64,
}

impl BoundaryPair {
    pub(crate) const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Builds a pair, rejecting non-finite values.
    pub fn try_new(min: f64, max: f64) -> Option<Self> {
        (min.is_finite() && max.is_finite()).then_some(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn get(&self, edge: BoundaryEdge) -> f64 {
        match edge {
            BoundaryEdge::Lower => self.min,
            BoundaryEdge::Upper => self.max,
        }
    }

    /// Returns a copy with `edge` replaced by `value`, or `None` if `value` is not finite.
    pub fn with_edge(&self, edge: BoundaryEdge, value: f64) -> Option<Self> {
        match edge {
            BoundaryEdge::Lower => Self::try_new(value, self.max),
            BoundaryEdge::Upper => Self::try_new(self.min, value),
        }
    }

    /// Boundaries are closed: touching either one counts as a violation.
    pub fn evaluate(&self, value: f64) -> ThresholdState {
        if value >= self.max || value <= self.min {
            ThresholdState::Violated
        } else {
            ThresholdState::Normal
        }
    }

    pub fn is_violated_by(&self, value: f64) -> bool {
        self.evaluate(value) == ThresholdState::Violated
    }
}

/// Alert boundaries for every metric.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Boundaries {
    pairs: [BoundaryPair; 3],
}

impl Default for Boundaries {
    fn default() -> Self {
        Self {
            pairs: Metric::ALL.map(|metric| metric.default_boundaries()),
        }
    }
}

impl Boundaries {
    pub fn get(&self, metric: Metric) -> BoundaryPair {
        self.pairs[metric.index()]
    }

    /// Returns a copy with the pair of `metric` replaced.
    pub fn with_pair(&self, metric: Metric, pair: BoundaryPair) -> Self {
        let mut pairs = self.pairs;
        pairs[metric.index()] = pair;
        Self { pairs }
    }

    /// Metrics of `reading` that fall outside their boundaries.
    pub fn violations(&self, reading: &RawReading) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|metric| self.get(*metric).is_violated_by(metric.value_of(reading)))
            .collect()
    }
}
