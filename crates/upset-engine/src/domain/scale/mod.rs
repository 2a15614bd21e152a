//! Scales mapping cardinalities and keys to pixel positions
//!
//! Numeric scales share the collision-avoiding tick search of [`ticks`]; any
//! type implementing [`TickGenerator`] can reuse it.

pub mod band;
pub mod linear;
pub mod log;
pub mod ticks;

pub use band::BandScale;
pub use linear::LinearScale;
pub use log::LogScale;
pub use ticks::{NumericTick, Orientation, TickGenerator, TickOptions, place_ticks};

/// A numeric scale over the domain `[0, max]`
pub trait NumericScale: TickGenerator {
    /// Pixel range `(start, end)`; `end` is where the domain maximum lands
    fn range(&self) -> (f64, f64);

    fn tick_options(&self) -> &TickOptions;

    fn map(&self, value: f64) -> f64 {
        self.position(value)
    }

    fn ticks(&self) -> Vec<NumericTick> {
        place_ticks(self, self.tick_options())
    }
}
