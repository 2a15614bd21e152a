//! Sets and identifiers
//!
//! Elements are owned by the caller; the engine refers to them by [`ElemId`],
//! the index of the element in the caller's slice. Sets live in a [`SetList`]
//! arena and are referred to by [`SetId`].

use crate::error::{MalformedInput, Result};
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::Index;

/// Index of an element in the caller's element slice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElemId(pub u32);

impl ElemId {
    /// Create an id from a slice index
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a set in its [`SetList`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetId(pub u32);

impl SetId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named set of elements
///
/// Elements keep the order in which they were first seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetDef {
    pub id: SetId,
    pub name: String,
    pub elems: Vec<ElemId>,
}

impl SetDef {
    pub fn cardinality(&self) -> usize {
        self.elems.len()
    }
}

/// Ordered, name-unique collection of sets over a universe of `universe_len` elements
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetList {
    sets: Vec<SetDef>,
    by_name: FxHashMap<String, SetId>,
    universe_len: usize,
}

impl SetList {
    /// Create an empty list over a universe of `universe_len` elements
    pub fn new(universe_len: usize) -> Self {
        Self {
            sets: Vec::new(),
            by_name: FxHashMap::default(),
            universe_len,
        }
    }

    /// Build a list from `(name, elems)` pairs
    pub fn from_sets<N, I>(universe_len: usize, sets: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<ElemId>)>,
    {
        let mut list = Self::new(universe_len);
        for (name, elems) in sets {
            list.push(name, elems)?;
        }
        Ok(list)
    }

    /// Append a set
    ///
    /// Repeated element ids are kept once, at their first position.
    ///
    /// # Errors
    ///
    /// `DuplicateSetName` if the name is taken, `IndexOutOfRange` if an element
    /// id does not address the universe.
    pub fn push(&mut self, name: impl Into<String>, elems: Vec<ElemId>) -> Result<SetId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(MalformedInput::DuplicateSetName(name).into());
        }

        let mut seen = crate::domain::bitmap::ElemBitmap::new(self.universe_len);
        let mut unique = Vec::with_capacity(elems.len());
        for (pos, elem) in elems.into_iter().enumerate() {
            if elem.index() >= self.universe_len {
                return Err(MalformedInput::IndexOutOfRange {
                    location: format!("set '{}' element {}", name, pos),
                    index: elem.index(),
                    len: self.universe_len,
                }
                .into());
            }
            if seen.insert(elem) {
                unique.push(elem);
            }
        }

        let id = SetId::new(self.sets.len());
        self.by_name.insert(name.clone(), id);
        self.sets.push(SetDef {
            id,
            name,
            elems: unique,
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of elements in the universe (including elements in no set)
    pub fn universe_len(&self) -> usize {
        self.universe_len
    }

    pub fn get(&self, id: SetId) -> Option<&SetDef> {
        self.sets.get(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&SetDef> {
        self.by_name.get(name).map(|&id| &self.sets[id.index()])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SetDef> {
        self.sets.iter()
    }

    pub fn as_slice(&self) -> &[SetDef] {
        &self.sets
    }

    /// Number of sets each element belongs to, indexed by element id
    pub fn membership_degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.universe_len];
        for set in &self.sets {
            for elem in &set.elems {
                degrees[elem.index()] += 1;
            }
        }
        degrees
    }
}

impl Index<SetId> for SetList {
    type Output = SetDef;

    fn index(&self, id: SetId) -> &SetDef {
        &self.sets[id.index()]
    }
}

impl<'a> IntoIterator for &'a SetList {
    type Item = &'a SetDef;
    type IntoIter = std::slice::Iter<'a, SetDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

/// Shorthand for building element id lists in tests and examples
pub fn elem_ids(indices: &[u32]) -> Vec<ElemId> {
    indices.iter().map(|&i| ElemId(i)).collect()
}
