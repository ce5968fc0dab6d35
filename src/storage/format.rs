//! Binary model file format.
//!
//! ## Format Layout
//!
//! ```text
//! +------------------+
//! | Header (16 bytes)|
//! +------------------+
//! | Map tree         |
//! | (bincode)        |
//! +------------------+
//! ```
//!
//! ### Header (16 bytes)
//! - Magic number (4 bytes): "GHSM"
//! - Version (2 bytes)
//! - Flags (2 bytes): reserved, must be 0
//! - Depth (4 bytes): number of map levels
//! - Reserved (4 bytes)

use crate::error::{InspectError, Result};
use crate::som::{Map, Model};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for model files.
const MAGIC: &[u8; 4] = b"GHSM";

/// Current format version.
const VERSION: u16 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 16;

/// Model file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    /// Format version.
    pub version: u16,
    /// Flags.
    pub flags: u16,
    /// Number of map levels.
    pub depth: u32,
}

impl ModelHeader {
    /// Creates a header for a model of the given depth.
    pub fn new(depth: u32) -> Self {
        Self {
            version: VERSION,
            flags: 0,
            depth,
        }
    }

    /// Writes the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.depth.to_le_bytes());
        // Reserved (bytes 12-15)
        bytes
    }

    /// Reads a header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(InspectError::InvalidModelFormat("Header too short".to_string()));
        }
        if &bytes[0..4] != MAGIC {
            return Err(InspectError::InvalidModelFormat("Invalid magic number".to_string()));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version == 0 || version > VERSION {
            return Err(InspectError::InvalidModelFormat(format!(
                "Unsupported version {}",
                version
            )));
        }
        let flags = u16::from_le_bytes([bytes[6], bytes[7]]);
        if flags != 0 {
            return Err(InspectError::InvalidModelFormat(format!(
                "Unsupported flags {:#06x}",
                flags
            )));
        }
        let depth = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

        Ok(Self {
            version,
            flags,
            depth,
        })
    }
}

/// Reader and writer for model files.
pub struct ModelFile;

impl ModelFile {
    /// Writes a model to a file.
    pub fn write<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        let header = ModelHeader::new(model.depth() as u32);
        writer.write_all(&header.to_bytes())?;
        bincode::serialize_into(&mut writer, model.root())?;
        writer.flush()?;
        Ok(())
    }

    /// Reads and validates a model file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Model> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InspectError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("model file not found: {}", path.display()),
            )));
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;
        let header = ModelHeader::from_bytes(&header_bytes)?;

        let map: Map = bincode::deserialize_from(&mut reader)?;
        let model = Model::new(map)?;

        if model.depth() as u32 != header.depth {
            return Err(InspectError::InvalidModelFormat(format!(
                "header depth {} but tree depth {}",
                header.depth,
                model.depth()
            )));
        }

        info!(
            "loaded model from {} (depth {}, {}x{} top level)",
            path.display(),
            model.depth(),
            model.root().rows,
            model.root().cols
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Model {
        let grandchild = Map::from_weights(1, 2, vec![vec![0.1; 4], vec![0.2; 4]]).unwrap();
        let child = Map::from_weights(2, 1, vec![vec![1.0; 4], vec![2.0; 4]])
            .unwrap()
            .with_child(1, 0, grandchild)
            .unwrap();
        let root = Map::from_weights(2, 2, vec![vec![0.0; 4]; 4])
            .unwrap()
            .with_child(0, 0, child)
            .unwrap();
        Model::new(root).unwrap()
    }

    #[test]
    fn test_header_bytes() {
        let header = ModelHeader::new(3);
        let parsed = ModelHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = ModelHeader::new(1).to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            ModelHeader::from_bytes(&bytes),
            Err(InspectError::InvalidModelFormat(_))
        ));
    }

    #[test]
    fn test_nonzero_flags_rejected() {
        let mut header = ModelHeader::new(2);
        header.flags = 1;
        assert!(matches!(
            ModelHeader::from_bytes(&header.to_bytes()),
            Err(InspectError::InvalidModelFormat(_))
        ));
    }

    #[test]
    fn test_mismatched_child_dims_rejected_on_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.ghsom");
        let mut root = Map::from_weights(1, 1, vec![vec![0.0; 4]]).unwrap();
        root.neurons[0].child = Some(Box::new(Map::from_weights(1, 1, vec![vec![0.0; 9]]).unwrap()));

        let mut bytes = ModelHeader::new(2).to_bytes().to_vec();
        bytes.extend(bincode::serialize(&root).unwrap());
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(ModelFile::read(&path), Err(InspectError::Model(_))));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.ghsom");
        let model = sample();

        ModelFile::write(&model, &path).unwrap();
        let loaded = ModelFile::read(&path).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.depth(), 3);
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.ghsom");
        std::fs::write(&path, b"GHSM").unwrap();
        assert!(ModelFile::read(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ModelFile::read("/nonexistent/model.ghsom"),
            Err(InspectError::Io(_))
        ));
    }
}
