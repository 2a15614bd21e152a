//! Element file loading
//!
//! Element files are JSON arrays of objects. Each object lists its sets under
//! a membership key; `name` becomes the element name and every other field an
//! attribute.
//!
//! ```json
//! [{"name": "Alien", "sets": ["Horror", "SciFi"], "year": 1979}]
//! ```

use crate::domain::dump_format::DumpElement;
use crate::domain::extract::extract_sets_from_json;
use crate::domain::set::SetList;
use crate::error::{MalformedInput, Result};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Membership key used when none is given
pub const DEFAULT_MEMBERSHIP_KEY: &str = "sets";

/// Parse element objects into elements and sets
///
/// Elements without a string `name` are named by their position.
pub fn parse_elements(values: &[Value], key: &str) -> Result<(Vec<DumpElement>, SetList)> {
    let sets = extract_sets_from_json(values, key)?;

    let elements = values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| Some((i, value.as_object()?)))
        .map(|(i, object)| {
            let name = match object.get("name") {
                Some(Value::String(name)) => name.clone(),
                _ => i.to_string(),
            };
            let attrs = object
                .iter()
                .filter(|(k, _)| k.as_str() != "name" && k.as_str() != key)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            DumpElement { name, attrs }
        })
        .collect();

    Ok((elements, sets))
}

/// Load an element file
pub fn load_elements(path: impl AsRef<Path>, key: &str) -> Result<(Vec<DumpElement>, SetList)> {
    let file = File::open(path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    let Value::Array(values) = value else {
        return Err(MalformedInput::InvalidRecord {
            location: "elements".to_string(),
            reason: "expected a JSON array of element objects".to_string(),
        }
        .into());
    };
    parse_elements(&values, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::set::elem_ids;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_elements() {
        let values = vec![
            json!({"name": "Alien", "sets": ["Horror", "SciFi"], "year": 1979}),
            json!({"sets": ["SciFi"]}),
        ];
        let (elements, sets) = parse_elements(&values, DEFAULT_MEMBERSHIP_KEY).unwrap();

        assert_eq!(
            elements,
            vec![
                DumpElement::new("Alien").with_attr("year", json!(1979)),
                DumpElement::new("1"),
            ]
        );
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.by_name("SciFi").unwrap().elems, elem_ids(&[0, 1]));
    }

    #[test]
    fn test_load_elements_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(
            &path,
            r#"[{"name": "a", "genres": ["X"]}, {"name": "b", "genres": []}]"#,
        )
        .unwrap();

        let (elements, sets) = load_elements(&path, "genres").unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(sets.universe_len(), 2);
        assert_eq!(sets.by_name("X").unwrap().cardinality(), 1);
    }

    #[test]
    fn test_load_elements_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"name": "a"}"#).unwrap();
        assert!(load_elements(&path, "sets").is_err());

        fs::write(&path, r#"[{"name": "a", "sets": "X"}]"#).unwrap();
        let err = load_elements(&path, "sets").unwrap_err();
        assert!(err.to_string().contains("element 0"), "{}", err);
    }
}
