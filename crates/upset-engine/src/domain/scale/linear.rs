//! Linear scale over `[0, max]`

use crate::domain::scale::NumericScale;
use crate::domain::scale::ticks::{TickGenerator, TickOptions};

#[derive(Clone, Debug, PartialEq)]
pub struct LinearScale {
    max: f64,
    range: (f64, f64),
    options: TickOptions,
}

impl LinearScale {
    pub fn new(max: f64, range: (f64, f64), options: TickOptions) -> Self {
        Self {
            max: if max.is_finite() { max.max(0.0) } else { 0.0 },
            range,
            options,
        }
    }

    /// Inverse of [`NumericScale::map`]
    pub fn invert(&self, position: f64) -> f64 {
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            return 0.0;
        }
        (position - self.range.0) / span * self.max
    }

    /// Nice intervals: 1×, 2×, 5× the decade below the maximum and the next decade
    pub fn nice_intervals(max: f64) -> [f64; 4] {
        let decade = 10f64.powf(max.log10().floor() - 1.0);
        [decade, 2.0 * decade, 5.0 * decade, 10.0 * decade]
    }
}

impl TickGenerator for LinearScale {
    fn domain_max(&self) -> f64 {
        self.max
    }

    fn position(&self, value: f64) -> f64 {
        if self.max <= 0.0 {
            return self.range.0;
        }
        self.range.0 + (value / self.max) * (self.range.1 - self.range.0)
    }

    fn candidates(&self, options: &TickOptions) -> Vec<Vec<f64>> {
        if self.max <= 0.0 {
            return vec![vec![0.0]];
        }

        Self::nice_intervals(self.max)
            .into_iter()
            .filter(|&step| !options.integer_only || step >= 1.0 - 1e-9)
            .filter_map(|step| {
                let intervals = (self.max / step + 1e-9).floor() as usize;
                (intervals <= options.max_count)
                    .then(|| (0..=intervals).map(|i| i as f64 * step).collect())
            })
            .collect()
    }
}

impl NumericScale for LinearScale {
    fn range(&self) -> (f64, f64) {
        self.range
    }

    fn tick_options(&self) -> &TickOptions {
        &self.options
    }
}
