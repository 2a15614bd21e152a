//! Collision-avoiding tick placement
//!
//! A [`TickGenerator`] supplies candidate tick value lists ordered from densest
//! to sparsest, plus the value → pixel mapping. [`place_ticks`] picks the first
//! candidate whose labels do not overlap:
//!
//! 1. every candidate at full density;
//! 2. every candidate with only every second tick labeled (the others become
//!    unlabeled minor ticks), as long as two labels remain;
//! 3. the first and last value of the domain only.
//!
//! Finally the domain maximum is appended if its label fits after the last label.

use crate::constants::{
    CHAR_WIDTH_FACTOR, DEFAULT_FONT_SIZE, DEFAULT_MAX_TICK_COUNT, LINE_HEIGHT_FACTOR,
};

/// Orientation of the tick labels' axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Labels side by side; extent is the estimated text width
    #[default]
    Horizontal,
    /// Labels stacked; extent is the line height
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOptions {
    pub orientation: Orientation,
    /// Font size hint in pixels
    pub font_size: f64,
    /// Upper bound on the number of tick intervals of a candidate
    pub max_count: usize,
    /// Only integral tick values (cardinality axes)
    pub integer_only: bool,
}

impl Default for TickOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            font_size: DEFAULT_FONT_SIZE,
            max_count: DEFAULT_MAX_TICK_COUNT,
            integer_only: true,
        }
    }
}

impl TickOptions {
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn with_integer_only(mut self, integer_only: bool) -> Self {
        self.integer_only = integer_only;
        self
    }

    /// Extent of a label along the axis
    pub fn label_extent(&self, label: &str) -> f64 {
        match self.orientation {
            Orientation::Horizontal => {
                label.chars().count() as f64 * self.font_size * CHAR_WIDTH_FACTOR
            }
            Orientation::Vertical => self.font_size * LINE_HEIGHT_FACTOR,
        }
    }
}

/// A tick; `label` is None for unlabeled minor ticks
#[derive(Clone, Debug, PartialEq)]
pub struct NumericTick {
    pub value: f64,
    pub label: Option<String>,
}

impl NumericTick {
    pub fn labeled(value: f64, label: String) -> Self {
        Self {
            value,
            label: Some(label),
        }
    }

    pub fn minor(value: f64) -> Self {
        Self { value, label: None }
    }
}

/// Source of candidate ticks for [`place_ticks`]
pub trait TickGenerator {
    fn domain_max(&self) -> f64;

    /// Pixel position of a value
    fn position(&self, value: f64) -> f64;

    /// Candidate tick value lists, densest first, each strictly increasing
    fn candidates(&self, options: &TickOptions) -> Vec<Vec<f64>>;

    /// First and last value of the endpoint fallback
    fn endpoints(&self) -> (f64, f64) {
        (0.0, self.domain_max())
    }

    fn format(&self, value: f64) -> String {
        format_tick(value)
    }
}

/// Format a tick value: integers without decimals, others with at most six
pub fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        return format!("{}", value.round() as i64);
    }
    let s = format!("{:.6}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Run the collision-avoiding search for `generator`
pub fn place_ticks<G>(generator: &G, options: &TickOptions) -> Vec<NumericTick>
where
    G: TickGenerator + ?Sized,
{
    let candidates = generator.candidates(options);

    for values in &candidates {
        let ticks = with_stride(generator, values, 1);
        if fits(generator, options, &ticks) {
            return append_max(generator, options, ticks);
        }
    }

    for values in &candidates {
        let ticks = with_stride(generator, values, 2);
        if label_count(&ticks) >= 2 && fits(generator, options, &ticks) {
            return append_max(generator, options, ticks);
        }
    }

    let (first, last) = generator.endpoints();
    let mut ticks = vec![NumericTick::labeled(first, generator.format(first))];
    if last > first {
        let end = NumericTick::labeled(last, generator.format(last));
        if fits(generator, options, &[ticks[0].clone(), end.clone()]) {
            ticks.push(end);
        } else {
            ticks.push(NumericTick::minor(last));
        }
    }
    ticks
}

fn with_stride<G>(generator: &G, values: &[f64], stride: usize) -> Vec<NumericTick>
where
    G: TickGenerator + ?Sized,
{
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i % stride == 0 {
                NumericTick::labeled(v, generator.format(v))
            } else {
                NumericTick::minor(v)
            }
        })
        .collect()
}

fn label_count(ticks: &[NumericTick]) -> usize {
    ticks.iter().filter(|t| t.label.is_some()).count()
}

/// Check that no two consecutive labels overlap
fn fits<G>(generator: &G, options: &TickOptions, ticks: &[NumericTick]) -> bool
where
    G: TickGenerator + ?Sized,
{
    let labeled: Vec<(f64, f64)> = ticks
        .iter()
        .filter_map(|t| {
            let label = t.label.as_ref()?;
            Some((generator.position(t.value), options.label_extent(label)))
        })
        .collect();

    labeled
        .windows(2)
        .all(|w| !overlaps(w[0], w[1]))
}

fn overlaps((pos_a, extent_a): (f64, f64), (pos_b, extent_b): (f64, f64)) -> bool {
    (pos_b - pos_a).abs() < (extent_a + extent_b) / 2.0
}

fn append_max<G>(generator: &G, options: &TickOptions, mut ticks: Vec<NumericTick>) -> Vec<NumericTick>
where
    G: TickGenerator + ?Sized,
{
    let max = generator.domain_max();
    let Some(last) = ticks.last() else {
        return ticks;
    };
    if last.value >= max - 1e-9 {
        return ticks;
    }

    let label = generator.format(max);
    let max_slot = (generator.position(max), options.label_extent(&label));
    let fits_after_last_label = ticks
        .iter()
        .rev()
        .find_map(|t| t.label.as_ref().map(|l| (generator.position(t.value), options.label_extent(l))))
        .is_none_or(|prev| !overlaps(prev, max_slot));

    if fits_after_last_label {
        ticks.push(NumericTick::labeled(max, label));
    }
    ticks
}
