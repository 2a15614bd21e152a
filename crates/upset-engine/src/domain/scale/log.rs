//! Logarithmic scale over `[1, max]`
//!
//! Positions follow `log(v) / log(max)`; values at or below 1 map to the start
//! of the range. Candidate ticks thin out geometrically: 1-2-5 per decade,
//! 1-5 per decade, every decade, then every second, third, … decade.

use crate::domain::scale::NumericScale;
use crate::domain::scale::ticks::{TickGenerator, TickOptions};

#[derive(Clone, Debug, PartialEq)]
pub struct LogScale {
    max: f64,
    range: (f64, f64),
    options: TickOptions,
}

impl LogScale {
    /// A non-finite or sub-unit `max` collapses the domain to `[1, 1]`
    pub fn new(max: f64, range: (f64, f64), options: TickOptions) -> Self {
        Self {
            max: if max.is_finite() { max.max(1.0) } else { 1.0 },
            range,
            options,
        }
    }

    /// Powers `m · 10^e` for every mantissa `m` and every `decade_step`-th exponent, up to max
    fn sequence(&self, mantissas: &[f64], decade_step: usize) -> Vec<f64> {
        let decades = (self.max.log10() + 1e-9).floor() as i32;
        let mut values = Vec::new();
        for exponent in (0..=decades).step_by(decade_step.max(1)) {
            let base = 10f64.powi(exponent);
            values.extend(
                mantissas
                    .iter()
                    .map(|m| m * base)
                    .filter(|&v| v <= self.max * (1.0 + 1e-12)),
            );
        }
        values
    }
}

impl TickGenerator for LogScale {
    fn domain_max(&self) -> f64 {
        self.max
    }

    fn position(&self, value: f64) -> f64 {
        if value <= 1.0 || self.max <= 1.0 {
            return self.range.0;
        }
        self.range.0 + (value.ln() / self.max.ln()) * (self.range.1 - self.range.0)
    }

    fn candidates(&self, options: &TickOptions) -> Vec<Vec<f64>> {
        if self.max <= 1.0 {
            return vec![vec![1.0]];
        }

        let decades = self.max.log10().floor() as usize;
        let mut candidates = vec![
            self.sequence(&[1.0, 2.0, 5.0], 1),
            self.sequence(&[1.0, 5.0], 1),
        ];
        for decade_step in 1..=decades.max(1) {
            candidates.push(self.sequence(&[1.0], decade_step));
        }

        candidates
            .into_iter()
            .filter(|values| values.len() <= options.max_count + 1)
            .collect()
    }

    fn endpoints(&self) -> (f64, f64) {
        (1.0, self.max.max(1.0))
    }
}

impl NumericScale for LogScale {
    fn range(&self) -> (f64, f64) {
        self.range
    }

    fn tick_options(&self) -> &TickOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scale::ticks::Orientation;

    fn vertical() -> TickOptions {
        TickOptions::default().with_orientation(Orientation::Vertical)
    }

    #[test]
    fn test_position() {
        let scale = LogScale::new(1000.0, (0.0, 300.0), vertical());
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(1.0), 0.0);
        assert!((scale.map(10.0) - 100.0).abs() < 1e-9);
        assert!((scale.map(1000.0) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_candidates_thin_out() {
        let scale = LogScale::new(1000.0, (0.0, 300.0), vertical().with_max_count(100));
        let candidates = scale.candidates(scale.tick_options());
        assert_eq!(
            candidates[0],
            vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0]
        );
        assert_eq!(candidates[2], vec![1.0, 10.0, 100.0, 1000.0]);
        assert!(candidates.windows(2).all(|w| w[0].len() >= w[1].len()));
    }

    #[test]
    fn test_dense_ticks_when_room() {
        let scale = LogScale::new(100.0, (0.0, 1000.0), vertical());
        let values: Vec<f64> = scale.ticks().iter().map(|t| t.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0]);
    }

    #[test]
    fn test_crowded_axis_uses_decades() {
        let scale = LogScale::new(10_000.0, (0.0, 80.0), vertical());
        let values: Vec<f64> = scale.ticks().iter().map(|t| t.value).collect();
        assert_eq!(values, vec![1.0, 10.0, 100.0, 1000.0, 10_000.0]);
    }

    #[test]
    fn test_degenerate_domain() {
        let scale = LogScale::new(1.0, (0.0, 100.0), vertical());
        let ticks = scale.ticks();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].value, 1.0);
    }

    #[test]
    fn test_non_finite_max_collapses() {
        for max in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, -5.0] {
            let scale = LogScale::new(max, (0.0, 100.0), vertical());
            let values: Vec<f64> = scale.ticks().iter().map(|t| t.value).collect();
            assert_eq!(values, vec![1.0], "max {}", max);
        }
    }

    #[test]
    fn test_huge_max_is_bounded() {
        let scale = LogScale::new(1e12, (0.0, 100.0), vertical());
        let candidates = scale.candidates(&vertical().with_max_count(100));
        assert_eq!(candidates[0].len(), 3 * 12 + 1);
        assert_eq!(candidates[0].last(), Some(&1e12));
    }
}
