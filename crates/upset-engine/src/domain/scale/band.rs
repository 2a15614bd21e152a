//! Band scale: ordered keys → equal-width pixel bands
//!
//! Inner and outer padding are the same fraction of a step; the bands are
//! centered in the range. A reversed range lays the keys out from the end.

use crate::constants::DEFAULT_BAND_PADDING;

#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    pub fn new<I, S>(domain: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into_iter().map(Into::into).collect(),
            range,
            padding: DEFAULT_BAND_PADDING,
        }
    }

    /// Padding as a fraction of the step, clamped to `[0, 1]`
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.clamp(0.0, 1.0);
        self
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Distance between the starts of two consecutive bands
    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let span = (self.range.1 - self.range.0).abs();
        span / (n + self.padding).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start of the band of the `index`-th key
    pub fn map_index(&self, index: usize) -> Option<f64> {
        let n = self.domain.len();
        if index >= n {
            return None;
        }

        let (lo, hi, reversed) = if self.range.1 < self.range.0 {
            (self.range.1, self.range.0, true)
        } else {
            (self.range.0, self.range.1, false)
        };
        let step = self.step();
        let start = lo + (hi - lo - step * (n as f64 - self.padding)) * 0.5;
        let slot = if reversed { n - 1 - index } else { index };
        Some(start + step * slot as f64)
    }

    /// Start of the band of `key`
    pub fn map(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|k| k == key)?;
        self.map_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_without_padding() {
        let scale = BandScale::new(["a", "b", "c", "d"], (0.0, 100.0)).with_padding(0.0);
        assert!(close(scale.step(), 25.0));
        assert!(close(scale.bandwidth(), 25.0));
        assert!(close(scale.map("a").unwrap(), 0.0));
        assert!(close(scale.map("d").unwrap(), 75.0));
    }

    #[test]
    fn test_padding_centers_bands() {
        let scale = BandScale::new(["a", "b", "c"], (0.0, 120.0)).with_padding(0.2);
        // step = 120 / 3.2, bands are symmetric within the range
        let step = 120.0 / 3.2;
        assert!(close(scale.step(), step));
        assert!(close(scale.bandwidth(), step * 0.8));

        let first = scale.map("a").unwrap();
        let last = scale.map("c").unwrap() + scale.bandwidth();
        assert!(close(first, 120.0 - last));
        assert!(close(first, step * 0.2));
    }

    #[test]
    fn test_reversed_range() {
        let scale = BandScale::new(["a", "b"], (100.0, 0.0)).with_padding(0.0);
        assert!(close(scale.map("a").unwrap(), 50.0));
        assert!(close(scale.map("b").unwrap(), 0.0));
    }

    #[test]
    fn test_unknown_key_and_empty_domain() {
        let scale = BandScale::new(["a"], (0.0, 10.0));
        assert_eq!(scale.map("z"), None);
        assert_eq!(scale.map_index(1), None);

        let empty = BandScale::new(Vec::<String>::new(), (0.0, 10.0));
        assert!(close(empty.step(), 10.0));
        assert_eq!(empty.map_index(0), None);
    }

    #[test]
    fn test_padding_clamped() {
        let scale = BandScale::new(["a"], (0.0, 10.0)).with_padding(3.0);
        assert_eq!(scale.padding(), 1.0);
        assert!(close(scale.bandwidth(), 0.0));
    }
}
