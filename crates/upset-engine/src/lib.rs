//! upset-engine - Combinatorial data model of UpSet, Venn and Karnaugh-map plots
//!
//! This crate provides functionality to:
//! - Extract named sets from elements tagged with set membership
//! - Enumerate and materialize combinations of sets (intersections, unions,
//!   distinct intersections, custom aggregations)
//! - Compute numeric/band scales with collision-avoiding ticks and
//!   Karnaugh-map grid layouts
//! - Encode and decode index-based dumps of the whole data model

pub mod constants;
pub mod error;
pub mod domain;
pub mod infra;
pub mod app;

// Re-export commonly used types
pub use app::codec::{EncodeOptions, Snapshot, decode, encode};
pub use app::generator::{
    estimate_combinations, generate_combinations, generate_combinations_with_progress,
};
pub use constants::*;
pub use domain::combination::{
    Aggregation, Combination, CombinationKind, CombinationRequest, ElementFilter,
    ElementMembership, SortBy, SortDirection, SortKey,
};
pub use domain::extract::{extract_sets, extract_sets_from_json};
pub use domain::grid::{GridBox, GridCell, GridLayout, grid_layout};
pub use domain::powerset::{PowerSet, PowerSetOptions, power_set};
pub use domain::query::{Query, QueryTarget, SetRef, query_overlaps};
pub use domain::scale::{BandScale, LinearScale, LogScale, NumericScale, NumericTick, TickOptions};
pub use domain::set::{ElemId, SetDef, SetId, SetList};
pub use error::{Result, UpSetError};
