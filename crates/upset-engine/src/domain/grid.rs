//! Karnaugh-map grid layout
//!
//! The first ⌈n/2⌉ sets span the columns, the remaining ⌊n/2⌋ the rows. Each
//! axis enumerates its group's memberships in reflected Gray code order, so
//! two neighboring cells (including the wrap-around neighbors at the edges)
//! differ in exactly one set. Within a group the first set is the most
//! significant Gray bit and gets the outermost label band.
//!
//! Membership masks use bit `i` for the set at position `i`.

use crate::constants::KARNAUGH_MAX_SETS;
use crate::domain::combination::Combination;
use crate::error::{InvalidRequest, Result};

/// Pixel box the grid and its labels have to fit in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridBox {
    pub width: f64,
    pub height: f64,
    /// Thickness of one label band
    pub label_band: f64,
}

impl Default for GridBox {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            label_band: 20.0,
        }
    }
}

impl GridBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_label_band(mut self, label_band: f64) -> Self {
        self.label_band = label_band;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub col: usize,
    pub row: usize,
    pub mask: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAxis {
    Columns,
    Rows,
}

/// A run of consecutive cells in which one set has the same membership
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSpan {
    /// Set position
    pub set: usize,
    pub member: bool,
    /// First cell index along the axis
    pub first: usize,
    pub count: usize,
    /// Offset of the label band across the axis (0 = outermost)
    pub band_offset: f64,
    /// Pixel start along the axis
    pub start: f64,
    pub length: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    pub sets: usize,
    pub col_sets: Vec<usize>,
    pub row_sets: Vec<usize>,
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f64,
    /// Top-left corner of the first cell
    pub origin: (f64, f64),
    label_band: f64,
}

/// Lay out `n` sets in `area`
///
/// # Errors
///
/// `TooManySets` when `n` exceeds the supported number of sets.
pub fn grid_layout(n: usize, area: GridBox) -> Result<GridLayout> {
    if n > KARNAUGH_MAX_SETS {
        return Err(InvalidRequest::TooManySets {
            sets: n,
            max: KARNAUGH_MAX_SETS,
        }
        .into());
    }

    let col_group = n.div_ceil(2);
    let col_sets: Vec<usize> = (0..col_group).collect();
    let row_sets: Vec<usize> = (col_group..n).collect();
    let cols = 1usize << col_sets.len();
    let rows = 1usize << row_sets.len();

    let origin = (
        row_sets.len() as f64 * area.label_band,
        col_sets.len() as f64 * area.label_band,
    );
    let avail_w = (area.width - origin.0).max(0.0);
    let avail_h = (area.height - origin.1).max(0.0);
    let cell_size = (avail_w / cols as f64).min(avail_h / rows as f64);

    Ok(GridLayout {
        sets: n,
        col_sets,
        row_sets,
        cols,
        rows,
        cell_size,
        origin,
        label_band: area.label_band,
    })
}

fn gray(i: usize) -> usize {
    i ^ (i >> 1)
}

fn gray_inverse(mut g: usize) -> usize {
    let mut i = 0;
    while g != 0 {
        i ^= g;
        g >>= 1;
    }
    i
}

impl GridLayout {
    /// Gray code of a group's memberships; the group's first set is the MSB
    fn group_code(group: &[usize], mask: u32) -> usize {
        group
            .iter()
            .fold(0, |code, &set| (code << 1) | ((mask >> set) & 1) as usize)
    }

    fn group_mask(group: &[usize], code: usize) -> u32 {
        let width = group.len();
        group
            .iter()
            .enumerate()
            .filter(|(j, _)| (code >> (width - 1 - j)) & 1 == 1)
            .fold(0, |mask, (_, &set)| mask | (1 << set))
    }

    /// Cell of a membership mask; None if it names a set outside the layout
    pub fn cell_of_mask(&self, mask: u32) -> Option<GridCell> {
        if self.sets < 32 && mask >> self.sets != 0 {
            return None;
        }
        Some(GridCell {
            col: gray_inverse(Self::group_code(&self.col_sets, mask)),
            row: gray_inverse(Self::group_code(&self.row_sets, mask)),
            mask,
        })
    }

    /// Cell of a subset given as set positions
    pub fn cell_of(&self, subset: &[usize]) -> Option<GridCell> {
        let mut mask = 0u32;
        for &set in subset {
            if set >= self.sets {
                return None;
            }
            mask |= 1 << set;
        }
        self.cell_of_mask(mask)
    }

    /// Cell of a combination's constituent sets
    pub fn place(&self, combination: &Combination) -> Option<GridCell> {
        let subset: Vec<usize> = combination.sets.iter().map(|s| s.index()).collect();
        self.cell_of(&subset)
    }

    /// Membership mask of the cell at `(col, row)`
    pub fn subset_of(&self, col: usize, row: usize) -> Option<u32> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(Self::group_mask(&self.col_sets, gray(col)) | Self::group_mask(&self.row_sets, gray(row)))
    }

    /// All cells, row by row
    pub fn cells(&self) -> Vec<GridCell> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| (col, row)))
            .map(|(col, row)| GridCell {
                col,
                row,
                mask: Self::group_mask(&self.col_sets, gray(col))
                    | Self::group_mask(&self.row_sets, gray(row)),
            })
            .collect()
    }

    /// Top-left pixel corner of a cell
    pub fn cell_origin(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin.0 + col as f64 * self.cell_size,
            self.origin.1 + row as f64 * self.cell_size,
        )
    }

    /// Member / non-member label spans of every set on one axis, outermost band first
    pub fn labels(&self, axis: GridAxis) -> Vec<LabelSpan> {
        let (group, cells, axis_origin) = match axis {
            GridAxis::Columns => (&self.col_sets, self.cols, self.origin.0),
            GridAxis::Rows => (&self.row_sets, self.rows, self.origin.1),
        };
        let width = group.len();

        let mut spans = Vec::new();
        for (depth, &set) in group.iter().enumerate() {
            let bit = width - 1 - depth;
            let member_at = |i: usize| (gray(i) >> bit) & 1 == 1;

            let mut first = 0;
            while first < cells {
                let member = member_at(first);
                let count = (first..cells).take_while(|&i| member_at(i) == member).count();
                spans.push(LabelSpan {
                    set,
                    member,
                    first,
                    count,
                    band_offset: depth as f64 * self.label_band,
                    start: axis_origin + first as f64 * self.cell_size,
                    length: count as f64 * self.cell_size,
                });
                first += count;
            }
        }
        spans
    }
}
