//! Combinations of sets
//!
//! This module defines the combination model, the aggregation strategies that
//! decide which elements a subset of sets contributes, the request options of
//! the generator, and the per-subset materialization.

use crate::constants::{
    EMPTY_COMBINATION_NAME, INTERSECTION_SEPARATOR, UNION_SEPARATOR,
};
use crate::domain::bitmap::ElemBitmap;
use crate::domain::powerset::Enumeration;
use crate::domain::set::{ElemId, SetId, SetList};
use crate::error::{InvalidRequest, Result, UpSetError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Kinds and aggregation strategies
// =============================================================================

/// Combination semantics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombinationKind {
    Intersection,
    Union,
    DistinctIntersection,
    Composite,
}

impl CombinationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intersection => "intersection",
            Self::Union => "union",
            Self::DistinctIntersection => "distinctIntersection",
            Self::Composite => "composite",
        }
    }
}

impl fmt::Display for CombinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CombinationKind {
    type Err = UpSetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "intersection" => Ok(Self::Intersection),
            "union" => Ok(Self::Union),
            "distinctintersection" | "distinct" => Ok(Self::DistinctIntersection),
            "composite" => Ok(Self::Composite),
            _ => Err(InvalidRequest::UnknownKind(s.to_string()).into()),
        }
    }
}

/// What the engine knows about one element while evaluating one subset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementMembership {
    pub elem: ElemId,
    /// Number of sets of the subset containing the element
    pub hits: usize,
    /// Size of the subset
    pub degree: usize,
    /// Number of sets overall containing the element
    pub memberships: usize,
}

/// Elementwise predicate of a composite combination
pub trait ElementFilter: Send + Sync {
    fn includes(&self, membership: &ElementMembership) -> bool;
}

impl<F> ElementFilter for F
where
    F: Fn(&ElementMembership) -> bool + Send + Sync,
{
    fn includes(&self, membership: &ElementMembership) -> bool {
        self(membership)
    }
}

/// Aggregation strategy applied to every enumerated subset
#[derive(Clone)]
pub enum Aggregation {
    Intersection,
    Union,
    DistinctIntersection,
    /// Caller-defined elementwise aggregation, named with `separator`
    Custom {
        separator: String,
        filter: Arc<dyn ElementFilter>,
    },
}

impl Aggregation {
    pub fn custom(separator: impl Into<String>, filter: impl ElementFilter + 'static) -> Self {
        Self::Custom {
            separator: separator.into(),
            filter: Arc::new(filter),
        }
    }

    pub fn kind(&self) -> CombinationKind {
        match self {
            Self::Intersection => CombinationKind::Intersection,
            Self::Union => CombinationKind::Union,
            Self::DistinctIntersection => CombinationKind::DistinctIntersection,
            Self::Custom { .. } => CombinationKind::Composite,
        }
    }

    pub fn separator(&self) -> &str {
        match self {
            Self::Intersection | Self::DistinctIntersection => INTERSECTION_SEPARATOR,
            Self::Union => UNION_SEPARATOR,
            Self::Custom { separator, .. } => separator,
        }
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { separator, .. } => f
                .debug_struct("Custom")
                .field("separator", separator)
                .finish_non_exhaustive(),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

impl TryFrom<CombinationKind> for Aggregation {
    type Error = UpSetError;

    /// Composite has no built-in semantics and cannot be converted
    fn try_from(kind: CombinationKind) -> Result<Self> {
        match kind {
            CombinationKind::Intersection => Ok(Self::Intersection),
            CombinationKind::Union => Ok(Self::Union),
            CombinationKind::DistinctIntersection => Ok(Self::DistinctIntersection),
            CombinationKind::Composite => {
                Err(InvalidRequest::UnknownKind(kind.as_str().to_string()).into())
            }
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Cardinality,
    Degree,
    Name,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort criterion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub by: SortBy,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(by: SortBy, direction: SortDirection) -> Self {
        Self { by, direction }
    }

    /// Compare two combinations under this key alone
    pub fn compare(&self, a: &Combination, b: &Combination) -> Ordering {
        let ord = match self.by {
            SortBy::Cardinality => a.cardinality().cmp(&b.cardinality()),
            SortBy::Degree => a.degree().cmp(&b.degree()),
            SortBy::Name => a.name.cmp(&b.name),
        };
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let by = match self.by {
            SortBy::Cardinality => "cardinality",
            SortBy::Degree => "degree",
            SortBy::Name => "name",
        };
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", by, direction)
    }
}

impl FromStr for SortKey {
    type Err = UpSetError;

    /// Parse `by[:asc|:desc]`; without a direction cardinality sorts descending,
    /// degree and name ascending.
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || UpSetError::from(InvalidRequest::UnknownOrder(s.to_string()));
        let (by, direction) = match s.split_once(':') {
            Some((by, direction)) => (by, Some(direction)),
            None => (s, None),
        };

        let by = match by.to_ascii_lowercase().as_str() {
            "cardinality" => SortBy::Cardinality,
            "degree" => SortBy::Degree,
            "name" => SortBy::Name,
            _ => return Err(unknown()),
        };
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => SortDirection::Ascending,
            Some("desc") => SortDirection::Descending,
            Some(_) => return Err(unknown()),
            None if by == SortBy::Cardinality => SortDirection::Descending,
            None => SortDirection::Ascending,
        };
        Ok(Self { by, direction })
    }
}

/// Compare by each key in turn; `Equal` when all keys tie
pub fn compare_by_keys(a: &Combination, b: &Combination, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

// =============================================================================
// Request
// =============================================================================

/// Options of [`generate_combinations`](crate::app::generator::generate_combinations)
#[derive(Clone, Debug)]
pub struct CombinationRequest {
    pub aggregation: Aggregation,
    pub min_degree: usize,
    /// Largest degree (None = number of sets)
    pub max_degree: Option<usize>,
    /// Keep combinations without elements
    pub include_empty: bool,
    /// Keep only the first `limit` combinations after ordering
    pub limit: Option<usize>,
    /// Sort keys, applied in order; ties keep enumeration order
    pub order: Vec<SortKey>,
    /// Refuse enumerations larger than this
    pub max_enumeration: Option<u128>,
    pub strategy: Enumeration,
}

impl Default for CombinationRequest {
    fn default() -> Self {
        Self {
            aggregation: Aggregation::Intersection,
            min_degree: 1,
            max_degree: None,
            include_empty: false,
            limit: None,
            order: vec![SortKey::new(SortBy::Cardinality, SortDirection::Descending)],
            max_enumeration: None,
            strategy: Enumeration::Auto,
        }
    }
}

impl CombinationRequest {
    pub fn new(aggregation: Aggregation) -> Self {
        Self {
            aggregation,
            ..Self::default()
        }
    }

    /// Request with built-in semantics
    ///
    /// # Errors
    ///
    /// `InvalidRequest::UnknownKind` for `Composite`, which needs a filter.
    pub fn for_kind(kind: CombinationKind) -> Result<Self> {
        Ok(Self::new(Aggregation::try_from(kind)?))
    }

    pub fn kind(&self) -> CombinationKind {
        self.aggregation.kind()
    }

    pub fn with_degree(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_degree = min;
        self.max_degree = max;
        self
    }

    pub fn with_include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Replace the sort keys by a single key
    pub fn order_by(mut self, by: SortBy, direction: SortDirection) -> Self {
        self.order = vec![SortKey::new(by, direction)];
        self
    }

    /// Append a tie-breaking sort key
    pub fn then_by(mut self, by: SortBy, direction: SortDirection) -> Self {
        self.order.push(SortKey::new(by, direction));
        self
    }

    pub fn with_order(mut self, order: Vec<SortKey>) -> Self {
        self.order = order;
        self
    }

    pub fn with_max_enumeration(mut self, ceiling: u128) -> Self {
        self.max_enumeration = Some(ceiling);
        self
    }

    pub fn with_strategy(mut self, strategy: Enumeration) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check degree bounds against the number of sets, returning `(min, max)`
    pub fn degree_bounds(&self, set_count: usize) -> Result<(usize, usize)> {
        let max = self.max_degree.unwrap_or(set_count);
        if self.min_degree > max {
            return Err(InvalidRequest::DegreeRange {
                min: self.min_degree,
                max,
            }
            .into());
        }
        if max > set_count {
            return Err(InvalidRequest::DegreeExceedsSets {
                max,
                sets: set_count,
            }
            .into());
        }
        Ok((self.min_degree, max))
    }
}

// =============================================================================
// Combination
// =============================================================================

/// A subset of sets together with the elements it aggregates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combination {
    pub name: String,
    pub kind: CombinationKind,
    /// Contributing sets in enumeration order
    pub sets: Vec<SetId>,
    pub elems: Vec<ElemId>,
}

impl Combination {
    pub fn degree(&self) -> usize {
        self.sets.len()
    }

    pub fn cardinality(&self) -> usize {
        self.elems.len()
    }

    pub fn contains_set(&self, id: SetId) -> bool {
        self.sets.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }
}

/// Join set names the way combinations are named
pub fn combination_name(sets: &SetList, ids: &[SetId], separator: &str) -> String {
    if ids.is_empty() {
        return EMPTY_COMBINATION_NAME.to_string();
    }
    ids.iter()
        .map(|&id| sets[id].name.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// Materialization
// =============================================================================

/// Precomputed membership structures for materializing many subsets of one set list
pub struct Materializer<'a> {
    sets: &'a SetList,
    bitmaps: Vec<ElemBitmap>,
    degrees: Vec<u32>,
}

impl<'a> Materializer<'a> {
    pub fn new(sets: &'a SetList) -> Self {
        let universe = sets.universe_len();
        let bitmaps = sets
            .iter()
            .map(|set| ElemBitmap::from_elems(universe, &set.elems))
            .collect();
        Self {
            sets,
            bitmaps,
            degrees: sets.membership_degrees(),
        }
    }

    /// Build the combination of the sets at positions `subset`
    pub fn materialize(&self, subset: &[usize], aggregation: &Aggregation) -> Combination {
        let ids: Vec<SetId> = subset.iter().map(|&i| SetId::new(i)).collect();
        let elems = match aggregation {
            Aggregation::Intersection => self.intersection(&ids, false),
            Aggregation::DistinctIntersection => self.intersection(&ids, true),
            Aggregation::Union => self.union(&ids),
            Aggregation::Custom { filter, .. } => self.custom(&ids, filter.as_ref()),
        };

        Combination {
            name: combination_name(self.sets, &ids, aggregation.separator()),
            kind: aggregation.kind(),
            sets: ids,
            elems,
        }
    }

    /// Scan the smallest set and test membership in the others
    fn intersection(&self, ids: &[SetId], distinct: bool) -> Vec<ElemId> {
        let degree = ids.len() as u32;
        let Some(&smallest) = ids.iter().min_by_key(|&&id| self.sets[id].cardinality()) else {
            // the empty subset: every element, or those in no set
            return (0..self.sets.universe_len())
                .map(ElemId::new)
                .filter(|e| !distinct || self.degrees[e.index()] == 0)
                .collect();
        };

        self.sets[smallest]
            .elems
            .iter()
            .copied()
            .filter(|&e| !distinct || self.degrees[e.index()] == degree)
            .filter(|&e| {
                ids.iter()
                    .all(|&id| id == smallest || self.bitmaps[id.index()].is_set(e))
            })
            .collect()
    }

    fn union(&self, ids: &[SetId]) -> Vec<ElemId> {
        let mut seen = ElemBitmap::new(self.sets.universe_len());
        let mut elems = Vec::new();
        for &id in ids {
            for &e in &self.sets[id].elems {
                if seen.insert(e) {
                    elems.push(e);
                }
            }
        }
        elems
    }

    fn custom(&self, ids: &[SetId], filter: &dyn ElementFilter) -> Vec<ElemId> {
        (0..self.sets.universe_len())
            .map(ElemId::new)
            .filter(|&elem| {
                let hits = ids
                    .iter()
                    .filter(|&&id| self.bitmaps[id.index()].is_set(elem))
                    .count();
                filter.includes(&ElementMembership {
                    elem,
                    hits,
                    degree: ids.len(),
                    memberships: self.degrees[elem.index()] as usize,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::set::elem_ids;

    /// A={0,1,2}, B={0,1}, C={0}, D={3}; element 4 in no set
    fn sample_sets() -> SetList {
        SetList::from_sets(
            5,
            [
                ("A", elem_ids(&[0, 1, 2])),
                ("B", elem_ids(&[0, 1])),
                ("C", elem_ids(&[0])),
                ("D", elem_ids(&[3])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_kind_parse_and_display() {
        for kind in [
            CombinationKind::Intersection,
            CombinationKind::Union,
            CombinationKind::DistinctIntersection,
            CombinationKind::Composite,
        ] {
            assert_eq!(kind.to_string().parse::<CombinationKind>().unwrap(), kind);
        }
        assert!(matches!(
            "overlap".parse::<CombinationKind>(),
            Err(UpSetError::InvalidRequest(InvalidRequest::UnknownKind(_)))
        ));
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(
            "cardinality".parse::<SortKey>().unwrap(),
            SortKey::new(SortBy::Cardinality, SortDirection::Descending)
        );
        assert_eq!(
            "Name:DESC".parse::<SortKey>().unwrap(),
            SortKey::new(SortBy::Name, SortDirection::Descending)
        );
        assert_eq!(
            "degree".parse::<SortKey>().unwrap().to_string(),
            "degree:asc"
        );
        assert!("size:asc".parse::<SortKey>().is_err());
        assert!("name:up".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_degree_bounds() {
        let request = CombinationRequest::default();
        assert_eq!(request.degree_bounds(3).unwrap(), (1, 3));

        let inverted = CombinationRequest::default().with_degree(3, Some(2));
        assert!(matches!(
            inverted.degree_bounds(4),
            Err(UpSetError::InvalidRequest(InvalidRequest::DegreeRange { min: 3, max: 2 }))
        ));

        let too_large = CombinationRequest::default().with_degree(1, Some(5));
        assert!(matches!(
            too_large.degree_bounds(4),
            Err(UpSetError::InvalidRequest(InvalidRequest::DegreeExceedsSets { max: 5, sets: 4 }))
        ));
    }

    #[test]
    fn test_composite_kind_needs_filter() {
        assert!(CombinationRequest::for_kind(CombinationKind::Composite).is_err());
        assert_eq!(
            CombinationRequest::for_kind(CombinationKind::Union).unwrap().kind(),
            CombinationKind::Union
        );
    }

    #[test]
    fn test_intersection_scans_smallest() {
        let sets = sample_sets();
        let m = Materializer::new(&sets);

        let ab = m.materialize(&[0, 1], &Aggregation::Intersection);
        assert_eq!(ab.name, "A∩B");
        assert_eq!(ab.elems, elem_ids(&[0, 1]));

        let ad = m.materialize(&[0, 3], &Aggregation::Intersection);
        assert!(ad.is_empty());
    }

    #[test]
    fn test_distinct_intersection_excludes_other_sets() {
        let sets = sample_sets();
        let m = Materializer::new(&sets);

        let a = m.materialize(&[0], &Aggregation::DistinctIntersection);
        assert_eq!(a.elems, elem_ids(&[2]));
        let ab = m.materialize(&[0, 1], &Aggregation::DistinctIntersection);
        assert_eq!(ab.elems, elem_ids(&[1]));
        let abc = m.materialize(&[0, 1, 2], &Aggregation::DistinctIntersection);
        assert_eq!(abc.elems, elem_ids(&[0]));
    }

    #[test]
    fn test_union_keeps_first_seen_order() {
        let sets = sample_sets();
        let m = Materializer::new(&sets);

        let du = m.materialize(&[3, 0], &Aggregation::Union);
        assert_eq!(du.name, "D∪A");
        assert_eq!(du.elems, elem_ids(&[3, 0, 1, 2]));
    }

    #[test]
    fn test_empty_subset() {
        let sets = sample_sets();
        let m = Materializer::new(&sets);

        let all = m.materialize(&[], &Aggregation::Intersection);
        assert_eq!(all.name, EMPTY_COMBINATION_NAME);
        assert_eq!(all.cardinality(), 5);
        assert_eq!(
            m.materialize(&[], &Aggregation::DistinctIntersection).elems,
            elem_ids(&[4])
        );
        assert!(m.materialize(&[], &Aggregation::Union).is_empty());
    }

    #[test]
    fn test_custom_filter() {
        let sets = sample_sets();
        let m = Materializer::new(&sets);
        // elements in exactly one of the subset's sets
        let exactly_one = Aggregation::custom("△", |m: &ElementMembership| m.hits == 1);

        let ab = m.materialize(&[0, 1], &exactly_one);
        assert_eq!(ab.kind, CombinationKind::Composite);
        assert_eq!(ab.name, "A△B");
        assert_eq!(ab.elems, elem_ids(&[2]));
    }

    #[test]
    fn test_compare_by_keys_falls_through() {
        let sets = sample_sets();
        let m = Materializer::new(&sets);
        let b = m.materialize(&[1], &Aggregation::Intersection);
        let ab = m.materialize(&[0, 1], &Aggregation::Intersection);

        let by_cardinality = [SortKey::new(SortBy::Cardinality, SortDirection::Descending)];
        assert_eq!(compare_by_keys(&b, &ab, &by_cardinality), Ordering::Equal);

        let then_degree = [
            SortKey::new(SortBy::Cardinality, SortDirection::Descending),
            SortKey::new(SortBy::Degree, SortDirection::Descending),
        ];
        assert_eq!(compare_by_keys(&b, &ab, &then_degree), Ordering::Greater);
    }
}
