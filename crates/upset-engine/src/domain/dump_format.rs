//! Dump wire format
//!
//! A dump is a JSON document holding one flat element array; sets,
//! combinations, the selection and queries refer to elements and sets by
//! index. Under max compression element records `{name, attrs}` become arrays
//! `[name, attr1, …]` following the top-level `attrs` key list; an element
//! missing a key before its last present one stays a full record.
//!
//! ```json
//! {
//!   "version": 1,
//!   "elements": [{"name": "a", "attrs": {"age": 3}}],
//!   "sets": [{"name": "A", "elemIndices": [0]}],
//!   "combinations": [{"kind": "intersection", "setIndices": [0], "elemIndices": [0]}],
//!   "selection": {"kind": "set", "index": 0},
//!   "queries": [{"name": "q", "color": "red", "elems": [0]}]
//! }
//! ```

use crate::constants::DUMP_FORMAT_VERSION;
use crate::domain::combination::CombinationKind;
use crate::error::{MalformedInput, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_version() -> u32 {
    DUMP_FORMAT_VERSION
}

/// Top-level dump document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Attribute keys of compressed element records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Vec<String>>,
    pub elements: Vec<ElementRecord>,
    pub sets: Vec<DumpSet>,
    pub combinations: DumpCombinations,
    #[serde(default)]
    pub selection: Option<DumpRef>,
    #[serde(default)]
    pub queries: Vec<DumpQuery>,
}

/// An element with its display name and attributes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DumpElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl DumpElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Map::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// `[name, attr1, …]` following `keys`
    ///
    /// Trailing absent attributes are left off the array. `None` when an
    /// absent attribute is followed by a present one, since the array has
    /// no way to skip a position.
    pub fn compress(&self, keys: &[String]) -> Option<Vec<Value>> {
        let present = keys
            .iter()
            .rposition(|k| self.attrs.contains_key(k))
            .map_or(0, |i| i + 1);
        let mut values = Vec::with_capacity(present + 1);
        values.push(Value::String(self.name.clone()));
        for key in &keys[..present] {
            values.push(self.attrs.get(key)?.clone());
        }
        Some(values)
    }

    /// The compressed array if it is lossless, otherwise the full record
    pub fn to_record(&self, keys: &[String]) -> ElementRecord {
        match self.compress(keys) {
            Some(values) => ElementRecord::Compressed(values),
            None => ElementRecord::Full(self.clone()),
        }
    }
}

/// Element record, full or compressed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementRecord {
    Compressed(Vec<Value>),
    Full(DumpElement),
}

impl ElementRecord {
    /// Restore the element; `keys` is the top-level attribute key list
    ///
    /// A compressed array shorter than `keys` has no value for the trailing
    /// keys. Nulls are kept as values.
    pub fn expand(&self, keys: Option<&[String]>, location: &str) -> Result<DumpElement> {
        let values = match self {
            Self::Full(element) => return Ok(element.clone()),
            Self::Compressed(values) => values,
        };
        let invalid = |reason: &str| MalformedInput::InvalidRecord {
            location: location.to_string(),
            reason: reason.to_string(),
        };

        let keys = keys.ok_or_else(|| invalid("compressed element without an attrs key list"))?;
        let (name, attrs) = values
            .split_first()
            .ok_or_else(|| invalid("compressed element without a name"))?;
        let name = name
            .as_str()
            .ok_or_else(|| invalid("element name is not a string"))?;
        if attrs.len() > keys.len() {
            return Err(MalformedInput::IndexOutOfRange {
                location: location.to_string(),
                index: attrs.len(),
                len: keys.len() + 1,
            }
            .into());
        }

        let attrs = keys
            .iter()
            .zip(attrs)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(DumpElement {
            name: name.to_string(),
            attrs,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpSet {
    pub name: String,
    pub elem_indices: Vec<usize>,
}

/// Stored combinations, or the generator options to recompute them
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DumpCombinations {
    Stored(Vec<DumpCombination>),
    Generate(DumpGenerate),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpCombination {
    pub kind: CombinationKind,
    /// Omitted when it equals the name derived from the sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub set_indices: Vec<usize>,
    pub elem_indices: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpGenerate {
    pub kind: CombinationKind,
    pub min_degree: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_degree: Option<usize>,
    #[serde(default)]
    pub include_empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Sort keys as `by:asc|desc`; omitted means the default order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DumpRefKind {
    Set,
    Combination,
}

/// Set-or-combination reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRef {
    pub kind: DumpRefKind,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpQuery {
    pub name: String,
    pub color: String,
    #[serde(flatten)]
    pub target: DumpQueryTarget,
}

/// `"set": {kind, index}` or `"elems": [...]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DumpQueryTarget {
    Set(DumpRef),
    Elems(Vec<usize>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names() {
        let record = DumpRecord {
            version: DUMP_FORMAT_VERSION,
            attrs: None,
            elements: vec![ElementRecord::Full(DumpElement::new("a"))],
            sets: vec![DumpSet {
                name: "A".to_string(),
                elem_indices: vec![0],
            }],
            combinations: DumpCombinations::Stored(vec![DumpCombination {
                kind: CombinationKind::DistinctIntersection,
                name: None,
                set_indices: vec![0],
                elem_indices: vec![0],
            }]),
            selection: None,
            queries: vec![DumpQuery {
                name: "q".to_string(),
                color: "red".to_string(),
                target: DumpQueryTarget::Set(DumpRef {
                    kind: DumpRefKind::Combination,
                    index: 0,
                }),
            }],
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "version": 1,
                "elements": [{"name": "a"}],
                "sets": [{"name": "A", "elemIndices": [0]}],
                "combinations": [
                    {"kind": "distinctIntersection", "setIndices": [0], "elemIndices": [0]}
                ],
                "selection": null,
                "queries": [{"name": "q", "color": "red", "set": {"kind": "combination", "index": 0}}]
            })
        );
        let back: DumpRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_generate_options_parse() {
        let record: DumpRecord = serde_json::from_value(json!({
            "elements": [],
            "sets": [],
            "combinations": {"kind": "union", "minDegree": 2, "order": ["name:asc"]},
            "queries": [{"name": "q", "color": "blue", "elems": [1, 2]}]
        }))
        .unwrap();

        assert_eq!(record.version, DUMP_FORMAT_VERSION);
        assert_eq!(
            record.combinations,
            DumpCombinations::Generate(DumpGenerate {
                kind: CombinationKind::Union,
                min_degree: 2,
                max_degree: None,
                include_empty: false,
                limit: None,
                order: Some(vec!["name:asc".to_string()]),
            })
        );
        assert_eq!(record.queries[0].target, DumpQueryTarget::Elems(vec![1, 2]));
    }

    #[test]
    fn test_compress_and_expand() {
        let keys = vec!["age".to_string(), "city".to_string()];
        let element = DumpElement::new("bob").with_attr("age", json!(41));
        let compressed = element.compress(&keys).unwrap();
        assert_eq!(compressed, vec![json!("bob"), json!(41)]);

        let record = ElementRecord::Compressed(compressed);
        assert_eq!(record.expand(Some(&keys), "elements[0]").unwrap(), element);
    }

    #[test]
    fn test_null_attribute_survives_compression() {
        let keys = vec!["age".to_string()];
        let element = DumpElement::new("ann").with_attr("age", Value::Null);
        let record = element.to_record(&keys);
        assert_eq!(record, ElementRecord::Compressed(vec![json!("ann"), Value::Null]));
        assert_eq!(record.expand(Some(&keys), "elements[0]").unwrap(), element);
    }

    #[test]
    fn test_gap_falls_back_to_full_record() {
        let keys = vec!["age".to_string(), "city".to_string()];
        let element = DumpElement::new("bob").with_attr("city", json!("Linz"));
        assert_eq!(element.compress(&keys), None);
        assert_eq!(element.to_record(&keys), ElementRecord::Full(element.clone()));
    }

    #[test]
    fn test_expand_rejects_malformed() {
        let keys = vec!["age".to_string()];
        let too_long = ElementRecord::Compressed(vec![json!("a"), json!(1), json!(2)]);
        assert!(too_long.expand(Some(&keys), "elements[3]").is_err());

        let unnamed = ElementRecord::Compressed(vec![json!(5)]);
        let err = unnamed.expand(Some(&keys), "elements[1]").unwrap_err();
        assert!(err.to_string().contains("elements[1]"));

        let no_keys = ElementRecord::Compressed(vec![json!("a")]);
        assert!(no_keys.expand(None, "elements[0]").is_err());
    }
}
