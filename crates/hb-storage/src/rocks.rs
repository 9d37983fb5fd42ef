use anyhow::Result;
use rocksdb::{DB, Options};
use std::sync::Arc;

use crate::LocalStore;

pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    pub fn open_default(path: &str) -> Result<Self> {
        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, path)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn key_for(key: &str) -> String {
        format!("storefront:{key}")
    }
}

impl LocalStore for RocksDbStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.db.get(Self::key_for(key).as_bytes())?;
        match value {
            Some(raw) => Ok(Some(String::from_utf8(raw)?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.db.put(Self::key_for(key).as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db.delete(Self::key_for(key).as_bytes())?;
        Ok(())
    }
}
