//! Snapshot encoding and decoding
//!
//! A [`Snapshot`] is the sets/combinations graph plus selection and queries.
//! [`encode`] turns it into the index-based [`DumpRecord`]; [`decode`] checks
//! every index and rebuilds a value-equal snapshot.

use crate::app::generator::generate_combinations;
use crate::constants::{DUMP_FORMAT_VERSION, INTERSECTION_SEPARATOR, UNION_SEPARATOR};
use crate::domain::combination::{
    Aggregation, Combination, CombinationKind, CombinationRequest, SortKey, combination_name,
};
use crate::domain::dump_format::{
    DumpCombination, DumpCombinations, DumpElement, DumpGenerate, DumpQuery, DumpQueryTarget,
    DumpRecord, DumpRef, DumpRefKind, DumpSet, ElementRecord,
};
use crate::domain::query::{Query, QueryTarget, SetRef};
use crate::domain::set::{ElemId, SetId, SetList};
use crate::error::{InvalidRequest, MalformedInput, Result, UpSetError};

/// Everything a dump carries
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub elements: Vec<DumpElement>,
    pub sets: SetList,
    pub combinations: Vec<Combination>,
    pub selection: Option<SetRef>,
    pub queries: Vec<Query>,
}

impl Snapshot {
    pub fn new(elements: Vec<DumpElement>, sets: SetList, combinations: Vec<Combination>) -> Self {
        Self {
            elements,
            sets,
            combinations,
            selection: None,
            queries: Vec::new(),
        }
    }

    pub fn with_selection(mut self, selection: SetRef) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.queries.push(query);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    /// Write elements as `[name, attr1, …]` arrays
    pub compress: bool,
    /// Store these generator options instead of the combinations
    pub generator: Option<CombinationRequest>,
}

impl EncodeOptions {
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_generator(mut self, request: CombinationRequest) -> Self {
        self.generator = Some(request);
        self
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a snapshot
///
/// # Errors
///
/// `MalformedInput` if the snapshot references elements beyond its element
/// list, `InvalidRequest::UnknownKind` if composite combinations are to be
/// stored as generator options.
pub fn encode(snapshot: &Snapshot, options: &EncodeOptions) -> Result<DumpRecord> {
    let universe = snapshot.elements.len();
    if snapshot.sets.universe_len() != universe {
        return Err(MalformedInput::InvalidRecord {
            location: "sets".to_string(),
            reason: format!(
                "universe of {} elements, snapshot has {}",
                snapshot.sets.universe_len(),
                universe
            ),
        }
        .into());
    }

    let (attrs, elements) = if options.compress {
        let keys = attribute_keys(&snapshot.elements);
        let records = snapshot
            .elements
            .iter()
            .map(|e| e.to_record(&keys))
            .collect();
        (Some(keys), records)
    } else {
        let records = snapshot
            .elements
            .iter()
            .cloned()
            .map(ElementRecord::Full)
            .collect();
        (None, records)
    };

    let sets = snapshot
        .sets
        .iter()
        .map(|s| DumpSet {
            name: s.name.clone(),
            elem_indices: s.elems.iter().map(|e| e.index()).collect(),
        })
        .collect();

    let combinations = match &options.generator {
        Some(request) => DumpCombinations::Generate(encode_request(request)?),
        None => DumpCombinations::Stored(
            snapshot
                .combinations
                .iter()
                .map(|c| encode_combination(&snapshot.sets, c))
                .collect(),
        ),
    };

    let queries = snapshot
        .queries
        .iter()
        .map(|q| DumpQuery {
            name: q.name.clone(),
            color: q.color.clone(),
            target: match &q.target {
                QueryTarget::Ref(r) => DumpQueryTarget::Set(encode_ref(*r)),
                QueryTarget::Elems(elems) => {
                    DumpQueryTarget::Elems(elems.iter().map(|e| e.index()).collect())
                }
            },
        })
        .collect();

    Ok(DumpRecord {
        version: DUMP_FORMAT_VERSION,
        attrs,
        elements,
        sets,
        combinations,
        selection: snapshot.selection.map(encode_ref),
        queries,
    })
}

/// Attribute keys in first-seen order
fn attribute_keys(elements: &[DumpElement]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in elements.iter().flat_map(|e| e.attrs.keys()) {
        if !keys.contains(key) {
            keys.push(key.clone());
        }
    }
    keys
}

fn default_separator(kind: CombinationKind) -> Option<&'static str> {
    match kind {
        CombinationKind::Intersection | CombinationKind::DistinctIntersection => {
            Some(INTERSECTION_SEPARATOR)
        }
        CombinationKind::Union => Some(UNION_SEPARATOR),
        CombinationKind::Composite => None,
    }
}

fn encode_combination(sets: &SetList, combination: &Combination) -> DumpCombination {
    let derived = default_separator(combination.kind)
        .map(|sep| combination_name(sets, &combination.sets, sep));
    DumpCombination {
        kind: combination.kind,
        name: (derived.as_deref() != Some(combination.name.as_str()))
            .then(|| combination.name.clone()),
        set_indices: combination.sets.iter().map(|s| s.index()).collect(),
        elem_indices: combination.elems.iter().map(|e| e.index()).collect(),
    }
}

fn encode_request(request: &CombinationRequest) -> Result<DumpGenerate> {
    let kind = request.kind();
    if kind == CombinationKind::Composite {
        return Err(InvalidRequest::UnknownKind(kind.to_string()).into());
    }
    Ok(DumpGenerate {
        kind,
        min_degree: request.min_degree,
        max_degree: request.max_degree,
        include_empty: request.include_empty,
        limit: request.limit,
        order: Some(request.order.iter().map(SortKey::to_string).collect()),
    })
}

fn encode_ref(r: SetRef) -> DumpRef {
    match r {
        SetRef::Set(index) => DumpRef {
            kind: DumpRefKind::Set,
            index,
        },
        SetRef::Combination(index) => DumpRef {
            kind: DumpRefKind::Combination,
            index,
        },
    }
}

// =============================================================================
// Decoding
// =============================================================================

fn check_index(location: impl FnOnce() -> String, index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(MalformedInput::IndexOutOfRange {
            location: location(),
            index,
            len,
        }
        .into());
    }
    Ok(())
}

/// Decode a dump, regenerating combinations stored as generator options
///
/// # Errors
///
/// `MalformedInput` naming the first invalid index or record,
/// `UnsupportedVersion` for unknown format versions, and any error of
/// regeneration.
pub fn decode(record: &DumpRecord) -> Result<Snapshot> {
    if record.version != DUMP_FORMAT_VERSION {
        return Err(MalformedInput::UnsupportedVersion(record.version).into());
    }

    let keys = record.attrs.as_deref();
    let elements = record
        .elements
        .iter()
        .enumerate()
        .map(|(i, e)| e.expand(keys, &format!("elements[{}]", i)))
        .collect::<Result<Vec<_>>>()?;
    let universe = elements.len();

    let mut sets = SetList::new(universe);
    for (i, set) in record.sets.iter().enumerate() {
        for (j, &index) in set.elem_indices.iter().enumerate() {
            check_index(|| format!("sets[{}].elemIndices[{}]", i, j), index, universe)?;
        }
        let elems = set.elem_indices.iter().map(|&e| ElemId::new(e)).collect();
        sets.push(set.name.clone(), elems).map_err(|e| match e {
            UpSetError::MalformedInput(MalformedInput::DuplicateSetName(name)) => {
                MalformedInput::InvalidRecord {
                    location: format!("sets[{}].name", i),
                    reason: format!("duplicate set name '{}'", name),
                }
                .into()
            }
            e => e,
        })?;
    }

    let combinations = match &record.combinations {
        DumpCombinations::Stored(stored) => stored
            .iter()
            .enumerate()
            .map(|(i, c)| decode_combination(&sets, c, i))
            .collect::<Result<Vec<_>>>()?,
        DumpCombinations::Generate(options) => {
            generate_combinations(&sets, &decode_request(options)?)?
        }
    };

    let selection = record
        .selection
        .map(|r| {
            let r = decode_ref(r);
            r.validate(&sets, &combinations, "selection").map(|_| r)
        })
        .transpose()?;

    let mut queries = Vec::with_capacity(record.queries.len());
    for (i, q) in record.queries.iter().enumerate() {
        let target = match &q.target {
            DumpQueryTarget::Set(r) => {
                let r = decode_ref(*r);
                r.validate(&sets, &combinations, &format!("queries[{}].set", i))?;
                QueryTarget::Ref(r)
            }
            DumpQueryTarget::Elems(indices) => {
                for (j, &index) in indices.iter().enumerate() {
                    check_index(|| format!("queries[{}].elems[{}]", i, j), index, universe)?;
                }
                QueryTarget::Elems(indices.iter().map(|&e| ElemId::new(e)).collect())
            }
        };
        queries.push(Query::new(q.name.clone(), q.color.clone(), target));
    }

    Ok(Snapshot {
        elements,
        sets,
        combinations,
        selection,
        queries,
    })
}

fn decode_combination(sets: &SetList, stored: &DumpCombination, i: usize) -> Result<Combination> {
    for (j, &index) in stored.set_indices.iter().enumerate() {
        check_index(|| format!("combinations[{}].setIndices[{}]", i, j), index, sets.len())?;
    }
    for (j, &index) in stored.elem_indices.iter().enumerate() {
        check_index(
            || format!("combinations[{}].elemIndices[{}]", i, j),
            index,
            sets.universe_len(),
        )?;
    }

    let ids: Vec<SetId> = stored.set_indices.iter().map(|&s| SetId::new(s)).collect();
    let name = match (&stored.name, default_separator(stored.kind)) {
        (Some(name), _) => name.clone(),
        (None, Some(sep)) => combination_name(sets, &ids, sep),
        (None, None) => {
            return Err(MalformedInput::InvalidRecord {
                location: format!("combinations[{}]", i),
                reason: "composite combination without a name".to_string(),
            }
            .into());
        }
    };

    Ok(Combination {
        name,
        kind: stored.kind,
        sets: ids,
        elems: stored.elem_indices.iter().map(|&e| ElemId::new(e)).collect(),
    })
}

fn decode_request(options: &DumpGenerate) -> Result<CombinationRequest> {
    let mut request = CombinationRequest::new(Aggregation::try_from(options.kind)?)
        .with_degree(options.min_degree, options.max_degree)
        .with_include_empty(options.include_empty);
    if let Some(order) = &options.order {
        let order = order
            .iter()
            .map(|key| key.parse::<SortKey>())
            .collect::<Result<Vec<_>>>()?;
        request = request.with_order(order);
    }
    if let Some(limit) = options.limit {
        request = request.with_limit(limit);
    }
    Ok(request)
}

fn decode_ref(r: DumpRef) -> SetRef {
    match r.kind {
        DumpRefKind::Set => SetRef::Set(r.index),
        DumpRefKind::Combination => SetRef::Combination(r.index),
    }
}
