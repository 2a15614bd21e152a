//! Engine tunables
//!
//! Note: per-call settings live in the option structs of each module; the values
//! here are their defaults and the fixed limits of the algorithms.

// =============================================================================
// Combination naming
// =============================================================================

/// Separator joining set names of intersection-like combinations
pub const INTERSECTION_SEPARATOR: &str = "∩";

/// Separator joining set names of union combinations
pub const UNION_SEPARATOR: &str = "∪";

/// Name of the degree-0 combination (the empty subset of sets)
pub const EMPTY_COMBINATION_NAME: &str = "∅";

// =============================================================================
// Enumeration
// =============================================================================

/// Largest number of sets the bitmask enumeration handles (a subset fits in a u32)
pub const BITMASK_MAX_SETS: usize = 31;

/// Minimum number of subsets before materialization is split across rayon workers
pub const PARALLEL_THRESHOLD: usize = 64;

/// Number of materialized subsets between two progress callbacks
pub const PROGRESS_INTERVAL: usize = 1024;

// =============================================================================
// Scales
// =============================================================================

/// Default upper bound on the number of tick intervals
pub const DEFAULT_MAX_TICK_COUNT: usize = 10;

/// Default font size hint (px) used to estimate label extents
pub const DEFAULT_FONT_SIZE: f64 = 10.0;

/// Estimated glyph width as a fraction of the font size (horizontal labels)
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Line height as a fraction of the font size (vertical labels)
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Default padding fraction of band scales
pub const DEFAULT_BAND_PADDING: f64 = 0.1;

// =============================================================================
// Karnaugh grid
// =============================================================================

/// Largest number of sets laid out on a Karnaugh grid (2^16 cells)
pub const KARNAUGH_MAX_SETS: usize = 16;

// =============================================================================
// Dump format
// =============================================================================

/// Dump format version
pub const DUMP_FORMAT_VERSION: u32 = 1;

/// File extension of dump files
pub const DUMP_FILE_EXTENSION: &str = "upset.json";
