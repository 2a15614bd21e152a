//! Set extraction
//!
//! Turns elements tagged with set names into a [`SetList`]. Sets appear in the
//! order their name is first seen; elements inside a set keep element order.

use crate::domain::set::{ElemId, SetList};
use crate::error::{MalformedInput, Result, UpSetError};
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Group `elements` by the set names returned by `membership_of`
///
/// A name listed twice for the same element counts once.
///
/// # Errors
///
/// `MalformedInput::Membership` if an element lists an empty set name.
pub fn extract_sets<'a, T, F, I, S>(elements: &'a [T], mut membership_of: F) -> Result<SetList>
where
    F: FnMut(&'a T) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut groups: Vec<(String, Vec<ElemId>)> = Vec::new();

    for (i, elem) in elements.iter().enumerate() {
        let id = ElemId::new(i);
        for name in membership_of(elem) {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(membership_error(i, "empty set name"));
            }

            let slot = match index.get(name) {
                Some(&slot) => slot,
                None => {
                    index.insert(name.to_string(), groups.len());
                    groups.push((name.to_string(), Vec::new()));
                    groups.len() - 1
                }
            };

            let elems = &mut groups[slot].1;
            if elems.last() != Some(&id) {
                elems.push(id);
            }
        }
    }

    SetList::from_sets(elements.len(), groups)
}

/// Extract sets from JSON element objects whose `key` field lists set names
///
/// # Errors
///
/// `MalformedInput::Membership` naming the element if it is not an object,
/// lacks `key`, or `key` is not an array of non-empty strings.
pub fn extract_sets_from_json(elements: &[Value], key: &str) -> Result<SetList> {
    let memberships = elements
        .iter()
        .enumerate()
        .map(|(i, elem)| json_membership(i, elem, key))
        .collect::<Result<Vec<_>>>()?;

    extract_sets(&memberships, |names| names.iter())
}

fn json_membership<'a>(i: usize, elem: &'a Value, key: &str) -> Result<Vec<&'a str>> {
    let object = elem
        .as_object()
        .ok_or_else(|| membership_error(i, "element is not an object"))?;
    let list = object
        .get(key)
        .ok_or_else(|| membership_error(i, &format!("missing '{}' field", key)))?
        .as_array()
        .ok_or_else(|| membership_error(i, &format!("'{}' is not an array", key)))?;

    list.iter()
        .enumerate()
        .map(|(j, name)| {
            name.as_str()
                .ok_or_else(|| membership_error(i, &format!("'{}'[{}] is not a string", key, j)))
        })
        .collect()
}

fn membership_error(element: usize, reason: &str) -> UpSetError {
    MalformedInput::Membership {
        element,
        reason: reason.to_string(),
    }
    .into()
}
