//! Memory-mapped file readers.
//!

use crate::{Error, Result};
use memmap2::Mmap;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without copying the whole file
/// into a buffer first.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns [`Error::Open`] if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self { mmap, path })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Returns the path the reader was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes the whole file as JSON.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] if the contents do not match `T`.
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(self.as_bytes()).map_err(|source| Error::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Opens and decodes a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    MappedFileReader::open(path)?.parse_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_mapped_file_reader() {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..64).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let reader = MappedFileReader::open(file.path()).unwrap();
        assert_eq!(reader.len(), 64);
        assert!(!reader.is_empty());
        assert_eq!(reader.as_bytes(), &data[..]);
        assert_eq!(reader.path(), file.path());
    }

    #[test]
    fn test_read_json_integer_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"12": [1.5, -2.0], "7": [0.0, 0.25]}}"#).unwrap();
        file.flush().unwrap();

        let map: HashMap<u32, (f64, f64)> = read_json(file.path()).unwrap();
        assert_eq!(map[&12_u32], (1.5, -2.0));
        assert_eq!(map[&7_u32], (0.0, 0.25));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        match MappedFileReader::open(&missing) {
            Err(Error::Open { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        file.flush().unwrap();

        let err = read_json::<Vec<u32>, _>(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("cannot parse"));
    }
}
