//! Dump file I/O operations
//!
//! This module provides functions for reading and writing dump files.

use crate::constants::DUMP_FILE_EXTENSION;
use crate::domain::dump_format::DumpRecord;
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "mmap")]
use memmap2::Mmap;

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    Ok(())
}

/// Get the file path of a dump
///
/// Format: `{dir}/{name}.upset.json`
pub fn get_dump_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.{}", name, DUMP_FILE_EXTENSION))
}

/// Save a dump as JSON
pub fn save_dump(path: impl AsRef<Path>, record: &DumpRecord) -> Result<()> {
    ensure_parent_dir(path.as_ref())?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, record)?;
    writer.flush()?;
    Ok(())
}

/// Load a dump
#[cfg(not(feature = "mmap"))]
pub fn load_dump(path: impl AsRef<Path>) -> Result<DumpRecord> {
    let file = File::open(path)?;
    let reader = std::io::BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Load a dump through a memory map
#[cfg(feature = "mmap")]
pub fn load_dump(path: impl AsRef<Path>) -> Result<DumpRecord> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        // empty files cannot be mapped on every platform
        return Ok(serde_json::from_slice(&[])?);
    }

    // SAFETY: the map is read-only and dropped before this function returns
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(serde_json::from_slice(&mmap)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::combination::CombinationKind;
    use crate::domain::dump_format::{
        DumpCombination, DumpCombinations, DumpElement, DumpSet, ElementRecord,
    };
    use crate::error::{MalformedInput, UpSetError};
    use tempfile::TempDir;

    fn record() -> DumpRecord {
        DumpRecord {
            version: 1,
            attrs: None,
            elements: vec![
                ElementRecord::Full(DumpElement::new("x")),
                ElementRecord::Full(DumpElement::new("y")),
            ],
            sets: vec![DumpSet {
                name: "A".to_string(),
                elem_indices: vec![0, 1],
            }],
            combinations: DumpCombinations::Stored(vec![DumpCombination {
                kind: CombinationKind::Intersection,
                name: None,
                set_indices: vec![0],
                elem_indices: vec![0, 1],
            }]),
            selection: None,
            queries: vec![],
        }
    }

    #[test]
    fn test_get_dump_path() {
        let path = get_dump_path("out", "movies");
        assert_eq!(path, Path::new("out").join("movies.upset.json"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = get_dump_path(dir.path().join("nested"), "dump");

        save_dump(&path, &record()).unwrap();
        assert_eq!(load_dump(&path).unwrap(), record());
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_dump(dir.path().join("missing.upset.json")),
            Err(UpSetError::Io(_))
        ));

        let empty = dir.path().join("empty.upset.json");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            load_dump(&empty),
            Err(UpSetError::MalformedInput(MalformedInput::Json(_)))
        ));

        let garbage = dir.path().join("garbage.upset.json");
        fs::write(&garbage, b"{\"elements\": 3}").unwrap();
        assert!(matches!(
            load_dump(&garbage),
            Err(UpSetError::MalformedInput(MalformedInput::Json(_)))
        ));
    }
}
