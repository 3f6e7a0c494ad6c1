pub mod catalog;
pub mod sectors;

use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use thiserror::Error;

use crate::data::catalog::GalaxyCatalog;

/// zstd level for catalog bundles. Bundles are built once and shipped, so
/// size wins over encode time.
const CATALOG_COMPRESSION_LEVEL: i32 = 19;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Inconsistent catalog: {0}")]
    Inconsistent(String),
}

pub fn serialize_catalog(catalog: &GalaxyCatalog) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(catalog)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, CATALOG_COMPRESSION_LEVEL).map_err(DataError::Compression)
}

pub fn deserialize_catalog(bytes: &[u8]) -> Result<GalaxyCatalog, DataError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(DataError::Compression)?;
    let mut catalog: GalaxyCatalog = bincode::deserialize(&decoded)?;
    catalog.rebuild_indices();
    Ok(catalog)
}

pub fn write_catalog_to_file<P: AsRef<Path>>(catalog: &GalaxyCatalog, path: P) -> Result<(), DataError> {
    let bytes = serialize_catalog(catalog)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Reads either a compact bundle or the plain JSON form, chosen by extension.
pub fn read_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<GalaxyCatalog, DataError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => GalaxyCatalog::from_json_slice(&bytes),
        _ => deserialize_catalog(&bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::StarSystem;
    use crate::WorldPoint;

    #[test]
    fn bundle_round_trip_restores_lookups() {
        let catalog = GalaxyCatalog::new(vec![
            StarSystem {
                id: 30000001,
                name: "A 2560".into(),
                position: WorldPoint::new(2100.0, 10.0, 6000.0),
            },
            StarSystem {
                id: 30000002,
                name: "M 974".into(),
                position: WorldPoint::new(40000.0, -20.0, 30000.0),
            },
        ]);
        let bytes = serialize_catalog(&catalog).expect("encode");
        let back = deserialize_catalog(&bytes).expect("decode");
        assert_eq!(back.len(), 2);
        assert_eq!(back.by_id(30000002).map(|s| s.name.as_str()), Some("M 974"));
        assert_eq!(back.by_name("a 2560").map(|s| s.id), Some(30000001));
    }

    #[test]
    fn garbage_bundle_is_a_compression_error() {
        let err = deserialize_catalog(b"not zstd").unwrap_err();
        assert!(matches!(err, DataError::Compression(_)));
    }

    #[test]
    fn reads_json_and_bundle_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json = dir.path().join("galaxy-systems.json");
        fs::write(
            &json,
            r#"{"count":1,"ids":[7],"positions":[1.0,2.0,3.0],"names":["Seven"]}"#,
        )
        .expect("write json");
        let catalog = read_catalog_from_file(&json).expect("json catalog");
        assert_eq!(catalog.by_id(7).map(|s| s.position), Some(WorldPoint::new(1.0, 2.0, 3.0)));

        let bundle = dir.path().join("galaxy.bin");
        write_catalog_to_file(&catalog, &bundle).expect("write bundle");
        assert_eq!(read_catalog_from_file(&bundle).expect("bundle").len(), 1);
    }
}
