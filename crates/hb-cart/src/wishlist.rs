use hb_storage::{LocalStore, WISHLIST_KEY, load_json, save_json};
use tracing::warn;

/// Ordered set of saved product keys.
pub struct Wishlist<S> {
    store: S,
    keys: Vec<String>,
}

impl<S: LocalStore> Wishlist<S> {
    pub fn load(store: S) -> Self {
        let persisted: Vec<String> = load_json(&store, WISHLIST_KEY).unwrap_or_default();
        let mut keys: Vec<String> = Vec::with_capacity(persisted.len());
        for key in persisted {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self { store, keys }
    }

    fn persist(&self) {
        if let Err(err) = save_json(&self.store, WISHLIST_KEY, &self.keys) {
            warn!("failed to persist wishlist: {:#}", err);
        }
    }

    /// Flips membership of `key`; returns whether it is now saved.
    pub fn toggle(&mut self, key: &str) -> bool {
        let now_saved = match self.keys.iter().position(|k| k == key) {
            Some(index) => {
                self.keys.remove(index);
                false
            }
            None => {
                self.keys.push(key.to_owned());
                true
            }
        };
        self.persist();
        now_saved
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_storage::InMemoryStore;
    use std::sync::Arc;

    #[test]
    fn toggling_twice_restores_the_original_set() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let mut wishlist = Wishlist::load(store.clone());

        assert!(wishlist.toggle("p2"));
        assert!(wishlist.contains("p2"));
        assert!(!wishlist.toggle("p2"));
        assert!(!wishlist.contains("p2"));

        let persisted: Option<Vec<String>> = load_json(&store, WISHLIST_KEY);
        assert_eq!(persisted, Some(Vec::new()));
        Ok(())
    }

    #[test]
    fn reload_keeps_order_and_drops_duplicates() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::new());
        store.put(WISHLIST_KEY, r#"["p3","p1","p3"]"#)?;

        let mut wishlist = Wishlist::load(store.clone());
        assert_eq!(wishlist.keys(), ["p3".to_owned(), "p1".to_owned()]);

        wishlist.toggle("p4");
        let reloaded = Wishlist::load(store);
        assert_eq!(reloaded.keys(), wishlist.keys());
        assert_eq!(reloaded.len(), 3);
        Ok(())
    }

    #[test]
    fn clear_empties_the_store() {
        let store = Arc::new(InMemoryStore::new());
        let mut wishlist = Wishlist::load(store.clone());
        wishlist.toggle("p1");
        wishlist.clear();
        assert!(wishlist.is_empty());
        assert!(Wishlist::load(store).is_empty());
    }
}
