use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

#[cfg(feature = "rocksdb")]
mod rocks;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksDbStore;

pub const PRODUCTS_KEY: &str = "products_v2";
pub const CART_KEY: &str = "cart_v1";
pub const WISHLIST_KEY: &str = "wishlist_v1";

/// Durable string key-value storage, the local-storage of the storefront.
///
/// Writes are synchronous and replace the whole value of a key.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

impl<T: LocalStore + ?Sized> LocalStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// Reads and decodes a JSON value.
///
/// A missing key, an unreadable backend and an unparseable value all come back
/// as `None`; the last two are logged.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: LocalStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("failed to read {} from local store: {:#}", key, err);
            return None;
        }
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("discarding malformed {} in local store: {}", key, err);
            None
        }
    }
}

pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: LocalStore + ?Sized,
{
    let encoded = serde_json::to_string(value).with_context(|| format!("failed to encode {key}"))?;
    store.put(key, &encoded)
}

#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))?;
        guard.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Values are written to a temporary sibling and renamed into place, so a
/// reader never observes a half-written value.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create storage directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl LocalStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, value).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to delete {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        qty: u32,
    }

    #[test]
    fn file_store_roundtrip_and_delete() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::open(dir.path().join("nested"))?;

        assert_eq!(store.get(CART_KEY)?, None);

        let sample = Sample {
            name: "Aloe Vera Skin Toner".to_owned(),
            qty: 3,
        };
        save_json(&store, CART_KEY, &sample)?;
        assert_eq!(load_json::<Sample, _>(&store, CART_KEY), Some(sample));

        store.delete(CART_KEY)?;
        store.delete(CART_KEY)?;
        assert_eq!(store.get(CART_KEY)?, None);
        Ok(())
    }

    #[test]
    fn file_store_survives_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        {
            let store = JsonFileStore::open(dir.path())?;
            store.put(WISHLIST_KEY, r#"["p1"]"#)?;
        }
        let reopened = JsonFileStore::open(dir.path())?;
        assert_eq!(reopened.get(WISHLIST_KEY)?.as_deref(), Some(r#"["p1"]"#));
        Ok(())
    }

    #[test]
    fn malformed_values_load_as_absent() -> anyhow::Result<()> {
        let store = InMemoryStore::new();
        store.put(PRODUCTS_KEY, "{not json")?;
        assert_eq!(load_json::<Vec<Sample>, _>(&store, PRODUCTS_KEY), None);
        Ok(())
    }

    #[test]
    fn keys_with_odd_characters_stay_inside_the_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::open(dir.path())?;
        store.put("../escape/attempt", "1")?;
        assert!(dir.path().join("___escape_attempt.json").exists());
        Ok(())
    }
}
