//! Native binary map format.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// File magic.
pub const MAGIC: [u8; 4] = *b"SETU";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Persistence error.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the expected magic
    #[error("Not a setu map file (bad magic {0:02x?})")]
    BadMagic([u8; 4]),

    /// Written by an incompatible version
    #[error("Unsupported format version {0} (expected {})", FORMAT_VERSION)]
    UnsupportedVersion(u32),

    /// Body encode/decode failure
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Write `value` to `path` with the native header.
pub fn write_with_header<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, value)?;
        writer.flush()?;
    }

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Read a value written by [`write_with_header`].
pub fn read_with_header<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(PersistError::BadMagic(magic));
    }

    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(version));
    }

    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("values.setu");

        write_with_header(&path, &vec![1u32, 2, 3]).unwrap();
        let values: Vec<u32> = read_with_header(&path).unwrap();

        assert_eq!(values, vec![1, 2, 3]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.setu");
        std::fs::write(&path, b"JUNKJUNKJUNK").unwrap();

        let err = read_with_header::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(err, PersistError::BadMagic(_)));
    }

    #[test]
    fn test_bad_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.setu");
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&99u32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let err = read_with_header::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedVersion(99)));
    }
}
