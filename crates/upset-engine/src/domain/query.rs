//! Selections and queries
//!
//! A selection or query points at a set or a combination by position in the
//! respective list, or (queries only) lists elements directly.

use crate::domain::bitmap::ElemBitmap;
use crate::domain::combination::Combination;
use crate::domain::set::{ElemId, SetList};
use crate::error::{MalformedInput, Result};

/// Reference to a set or a combination by list position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetRef {
    Set(usize),
    Combination(usize),
}

impl SetRef {
    /// Elements of the referenced set or combination, if the position exists
    pub fn elems<'a>(&self, sets: &'a SetList, combinations: &'a [Combination]) -> Option<&'a [ElemId]> {
        match *self {
            Self::Set(i) => sets.as_slice().get(i).map(|s| s.elems.as_slice()),
            Self::Combination(i) => combinations.get(i).map(|c| c.elems.as_slice()),
        }
    }

    /// Check the reference against the lists, naming `location` on failure
    pub fn validate(&self, sets: &SetList, combinations: &[Combination], location: &str) -> Result<()> {
        let (index, len) = match *self {
            Self::Set(i) => (i, sets.len()),
            Self::Combination(i) => (i, combinations.len()),
        };
        if index >= len {
            return Err(MalformedInput::IndexOutOfRange {
                location: location.to_string(),
                index,
                len,
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryTarget {
    Ref(SetRef),
    Elems(Vec<ElemId>),
}

/// A highlighted subset of the universe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub color: String,
    pub target: QueryTarget,
}

impl Query {
    pub fn new(name: impl Into<String>, color: impl Into<String>, target: QueryTarget) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            target,
        }
    }

    /// Elements matched by the query
    pub fn elems<'a>(&'a self, sets: &'a SetList, combinations: &'a [Combination]) -> Option<&'a [ElemId]> {
        match &self.target {
            QueryTarget::Ref(r) => r.elems(sets, combinations),
            QueryTarget::Elems(elems) => Some(elems),
        }
    }
}

/// For each combination, how many of its elements the query matches
///
/// # Errors
///
/// `IndexOutOfRange` if the query references a missing set/combination or an
/// element outside the universe.
pub fn query_overlaps(query: &Query, sets: &SetList, combinations: &[Combination]) -> Result<Vec<usize>> {
    if let QueryTarget::Ref(r) = &query.target {
        r.validate(sets, combinations, &format!("query '{}'", query.name))?;
    }
    let elems = query.elems(sets, combinations).unwrap_or_default();

    let universe = sets.universe_len();
    if let Some((pos, bad)) = elems.iter().enumerate().find(|(_, e)| e.index() >= universe) {
        return Err(MalformedInput::IndexOutOfRange {
            location: format!("query '{}' element {}", query.name, pos),
            index: bad.index(),
            len: universe,
        }
        .into());
    }

    let matched = ElemBitmap::from_elems(universe, elems);
    Ok(combinations
        .iter()
        .map(|c| c.elems.iter().filter(|&&e| matched.is_set(e)).count())
        .collect())
}
