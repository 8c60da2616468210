// ── Document storage ──
//
// The registry keeps every record in memory. A directory store
// additionally writes each record to `<dir>/<id>.json`, one document per
// bus, and reads them back at startup in registry order.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bustrack_api::BusRecord;
use bustrack_core::Bus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::StorageError;
use crate::seed;

const DOCUMENT_EXT: &str = "json";

/// On-disk form of a bus: the wire record plus its index in the registry.
/// Documents without a position count as position 0; ties go by file name.
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    position: usize,
    #[serde(flatten)]
    record: BusRecord,
}

/// Parsed `server.store_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// `memory://` (seeded with the demo fleet) or `memory://empty`.
    Memory { seeded: bool },
    /// `file:///abs/dir`.
    Directory(PathBuf),
}

impl FromStr for StoreUrl {
    type Err = StorageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(raw).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "memory" => match url.host_str().unwrap_or_default() {
                "" => Ok(Self::Memory { seeded: true }),
                "empty" => Ok(Self::Memory { seeded: false }),
                other => Err(StorageError::InvalidUrl(format!(
                    "unknown memory store `{other}`"
                ))),
            },
            "file" => url.to_file_path().map(Self::Directory).map_err(|()| {
                StorageError::InvalidUrl("file store needs an absolute path".into())
            }),
            other => Err(StorageError::UnsupportedScheme(other.into())),
        }
    }
}

/// Where writes go after the in-memory map is updated.
#[derive(Debug)]
pub enum Storage {
    Memory,
    Directory(DocumentDir),
}

impl Storage {
    /// Open the store and return its initial records in load order.
    pub async fn open(url: &StoreUrl) -> Result<(Self, Vec<Bus>), StorageError> {
        match url {
            StoreUrl::Memory { seeded } => {
                let buses = if *seeded { seed::demo_fleet() } else { Vec::new() };
                Ok((Self::Memory, buses))
            }
            StoreUrl::Directory(root) => {
                let dir = DocumentDir::open(root).await?;
                let mut buses = dir.load_all().await?;
                if buses.is_empty() {
                    info!(dir = %root.display(), "empty store, writing demo fleet");
                    buses = seed::demo_fleet();
                    for (position, bus) in buses.iter().enumerate() {
                        dir.write(position, bus).await?;
                    }
                }
                Ok((Self::Directory(dir), buses))
            }
        }
    }

    /// Persist the record at `position` in the registry. A no-op for the
    /// memory store.
    pub async fn write(&self, position: usize, bus: &Bus) -> Result<(), StorageError> {
        match self {
            Self::Memory => Ok(()),
            Self::Directory(dir) => dir.write(position, bus).await,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Directory(_) => "file",
        }
    }
}

/// A directory of `<id>.json` bus documents.
#[derive(Debug)]
pub struct DocumentDir {
    root: PathBuf,
}

impl DocumentDir {
    pub async fn open(root: &Path) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|source| io_error(root, source))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every document, ordered by stored position.
    pub async fn load_all(&self) -> Result<Vec<Bus>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|source| io_error(&self.root, source))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| io_error(&self.root, source))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == DOCUMENT_EXT) {
                paths.push(path);
            }
        }
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let (position, bus) = read_document(&path).await?;
            documents.push((position, path, bus));
        }
        documents.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

        let buses: Vec<Bus> = documents.into_iter().map(|(_, _, bus)| bus).collect();
        debug!(dir = %self.root.display(), count = buses.len(), "loaded bus documents");
        Ok(buses)
    }

    /// Write one document through a temp file so readers never see a
    /// partial record.
    pub async fn write(&self, position: usize, bus: &Bus) -> Result<(), StorageError> {
        let path = self.document_path(bus);
        let tmp = path.with_extension("json.tmp");
        let document = Document {
            position,
            record: BusRecord::from(bus),
        };
        let body = serde_json::to_vec_pretty(&document).map_err(|source| {
            StorageError::Json {
                path: path.clone(),
                source,
            }
        })?;

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| io_error(&path, source))?;
        debug!(path = %path.display(), "wrote bus document");
        Ok(())
    }

    fn document_path(&self, bus: &Bus) -> PathBuf {
        self.root.join(format!("{}.{DOCUMENT_EXT}", bus.id))
    }
}

async fn read_document(path: &Path) -> Result<(usize, Bus), StorageError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| io_error(path, source))?;
    let document: Document = serde_json::from_slice(&raw).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let bus = Bus::try_from(document.record).map_err(|e| StorageError::Invalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok((document.position, bus))
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bustrack_core::{BusId, Stop};

    #[test]
    fn parses_store_urls() {
        assert_eq!(
            "memory://".parse::<StoreUrl>().unwrap(),
            StoreUrl::Memory { seeded: true }
        );
        assert_eq!(
            "memory://empty".parse::<StoreUrl>().unwrap(),
            StoreUrl::Memory { seeded: false }
        );
        assert_eq!(
            "file:///var/lib/bustrack".parse::<StoreUrl>().unwrap(),
            StoreUrl::Directory(PathBuf::from("/var/lib/bustrack"))
        );
    }

    #[test]
    fn rejects_unknown_schemes() {
        let err = "mongodb+srv://user:pw@cluster/db"
            .parse::<StoreUrl>()
            .unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedScheme(s) if s == "mongodb+srv"));
        assert!("not a url".parse::<StoreUrl>().is_err());
        assert!("memory://elsewhere".parse::<StoreUrl>().is_err());
    }

    #[tokio::test]
    async fn empty_directory_is_seeded_and_written() {
        let tmp = tempfile::tempdir().unwrap();
        let url = StoreUrl::Directory(tmp.path().to_path_buf());

        let (storage, buses) = Storage::open(&url).await.unwrap();
        assert_eq!(storage.kind(), "file");
        assert_eq!(buses.len(), 6);
        assert!(tmp.path().join("1.json").exists());
        assert!(tmp.path().join("6.json").exists());
    }

    #[tokio::test]
    async fn documents_load_in_written_position_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DocumentDir::open(tmp.path()).await.unwrap();
        for (position, id) in ["b", "a"].into_iter().enumerate() {
            let bus = Bus {
                id: BusId::from(id),
                number: id.into(),
                route: "R".into(),
                stops: vec![Stop::new("S", "06:00")],
                current_location: String::new(),
                next_stop: String::new(),
                eta: String::new(),
                capacity: 10,
                occupancy: 12,
            };
            dir.write(position, &bus).await.unwrap();
        }

        let loaded = dir.load_all().await.unwrap();
        let ids: Vec<String> = loaded.iter().map(|b| b.id.to_string()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(loaded[0].occupancy, 12);
    }

    #[tokio::test]
    async fn documents_without_position_fall_back_to_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        for id in ["b", "a"] {
            let doc = format!(
                r#"{{"id":"{id}","busNumber":"{id}","route":"R","stops":["S"],"schedule":["06:00"]}}"#
            );
            std::fs::write(tmp.path().join(format!("{id}.json")), doc).unwrap();
        }

        let dir = DocumentDir::open(tmp.path()).await.unwrap();
        let ids: Vec<String> = dir
            .load_all()
            .await
            .unwrap()
            .iter()
            .map(|b| b.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn mismatched_document_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = r#"{"id":"x","busNumber":"1","route":"R","stops":["A","B"],"schedule":["06:00"]}"#;
        std::fs::write(tmp.path().join("x.json"), doc).unwrap();

        let dir = DocumentDir::open(tmp.path()).await.unwrap();
        let err = dir.load_all().await.unwrap_err();
        assert!(matches!(err, StorageError::Invalid { .. }));
    }
}
