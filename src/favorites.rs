//! Persisted favorites set.
//!
//! Membership checks used by the table and by `toggle` match on `name`, while
//! `remove` matches on `id` and `is_favorite` requires both. The mismatch is
//! long-standing behavior that clients depend on, so it is kept as-is.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

pub const FAVORITES_KEY: &str = "nftFavs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavItem {
    pub id: String,
    pub name: String,
}

impl FavItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("favorites store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored favorites are not valid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("favorites store unavailable: {0}")]
    Store(String),
}

/// Key-value collaborator that keeps favorites durable between sessions.
pub trait FavoritesStore: Send + Sync + 'static {
    fn load(&self, key: &str) -> Result<Option<String>, FavoritesError>;
    fn save(&self, key: &str, value: &str) -> Result<(), FavoritesError>;
}

#[derive(Clone, Default)]
pub struct InMemoryFavoritesStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoritesStore for InMemoryFavoritesStore {
    fn load(&self, key: &str) -> Result<Option<String>, FavoritesError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| FavoritesError::Store("in-memory store lock poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), FavoritesError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| FavoritesError::Store("in-memory store lock poisoned".to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under `root`.
#[derive(Debug, Clone)]
pub struct FileFavoritesStore {
    root: PathBuf,
}

impl FileFavoritesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl FavoritesStore for FileFavoritesStore {
    fn load(&self, key: &str) -> Result<Option<String>, FavoritesError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FavoritesError::Io { path, source }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), FavoritesError> {
        fs::create_dir_all(&self.root).map_err(|source| io_error(&self.root, source))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| io_error(&tmp, source))?;
        fs::rename(&tmp, &path).map_err(|source| io_error(&path, source))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> FavoritesError {
    FavoritesError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub struct Favorites {
    store: Arc<dyn FavoritesStore>,
    items: Vec<FavItem>,
    changes: watch::Sender<Vec<FavItem>>,
}

impl Favorites {
    pub fn open(store: Arc<dyn FavoritesStore>) -> Result<Self, FavoritesError> {
        let items = match store.load(FAVORITES_KEY)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)?,
            _ => Vec::new(),
        };
        let (changes, _) = watch::channel(items.clone());

        Ok(Self {
            store,
            items,
            changes,
        })
    }

    pub fn items(&self) -> &[FavItem] {
        &self.items
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<FavItem>> {
        self.changes.subscribe()
    }

    pub fn is_favorite(&self, id: &str, name: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.id == id && item.name == name)
    }

    /// Name-only match, as used for the table star and by `toggle`.
    pub fn is_favorite_by_name(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    pub fn add(&mut self, item: FavItem) -> Result<(), FavoritesError> {
        let mut next = self.items.clone();
        next.push(item.clone());
        self.commit(next)?;
        info!(
            component = "favorites",
            event = "favorites.added",
            id = %item.id,
            name = %item.name
        );
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<(), FavoritesError> {
        let next: Vec<FavItem> = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        let removed = self.items.len() - next.len();
        self.commit(next)?;
        info!(
            component = "favorites",
            event = "favorites.removed",
            id,
            removed
        );
        Ok(())
    }

    /// Returns whether `item` is a favorite after the toggle.
    pub fn toggle(&mut self, item: FavItem) -> Result<bool, FavoritesError> {
        let present = self.is_favorite_by_name(&item.name);
        let next: Vec<FavItem> = if present {
            self.items
                .iter()
                .filter(|fav| fav.name != item.name)
                .cloned()
                .collect()
        } else {
            let mut next = self.items.clone();
            next.push(item.clone());
            next
        };

        self.commit(next)?;
        info!(
            component = "favorites",
            event = "favorites.toggled",
            id = %item.id,
            name = %item.name,
            favorite = !present
        );
        Ok(!present)
    }

    fn commit(&mut self, next: Vec<FavItem>) -> Result<(), FavoritesError> {
        let encoded = serde_json::to_string(&next)?;
        self.store.save(FAVORITES_KEY, &encoded)?;
        self.items = next;
        self.changes.send_replace(self.items.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_empty() -> (Favorites, InMemoryFavoritesStore) {
        let store = InMemoryFavoritesStore::new();
        let favs = Favorites::open(Arc::new(store.clone())).expect("empty store opens");
        (favs, store)
    }

    struct RejectingStore;

    impl FavoritesStore for RejectingStore {
        fn load(&self, _key: &str) -> Result<Option<String>, FavoritesError> {
            Ok(Some(r#"[{"id":"1","name":"Foo"}]"#.to_string()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), FavoritesError> {
            Err(FavoritesError::Store("disk full".to_string()))
        }
    }

    #[test]
    fn failed_save_leaves_items_and_subscribers_untouched() {
        let mut favs = Favorites::open(Arc::new(RejectingStore)).unwrap();
        let before = favs.items().to_vec();
        let rx = favs.subscribe();

        assert!(matches!(
            favs.add(FavItem::new("2", "Bar")),
            Err(FavoritesError::Store(_))
        ));
        assert!(matches!(favs.remove("1"), Err(FavoritesError::Store(_))));
        assert!(matches!(
            favs.toggle(FavItem::new("1", "Foo")),
            Err(FavoritesError::Store(_))
        ));

        assert_eq!(favs.items(), before.as_slice());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn missing_key_defaults_to_empty_list() {
        let (favs, _) = open_empty();
        assert!(favs.items().is_empty());
    }

    #[test]
    fn toggle_twice_restores_original_set() {
        let (mut favs, _) = open_empty();
        favs.add(FavItem::new("a", "Azuki")).unwrap();
        let before = favs.items().to_vec();

        let item = FavItem::new("x", "Foo");
        assert!(favs.toggle(item.clone()).unwrap());
        assert!(favs.is_favorite("x", "Foo"));
        assert!(!favs.toggle(item).unwrap());

        assert_eq!(favs.items(), before.as_slice());
    }

    #[test]
    fn toggle_matches_by_name_and_collapses_shared_names() {
        let (mut favs, _) = open_empty();
        favs.add(FavItem::new("1", "Foo")).unwrap();
        favs.add(FavItem::new("2", "Foo")).unwrap();

        // Different id, same name: treated as already present, removes both.
        let now_favorite = favs.toggle(FavItem::new("3", "Foo")).unwrap();
        assert!(!now_favorite);
        assert!(favs.items().is_empty());
    }

    #[test]
    fn remove_matches_by_id_unlike_toggle() {
        let (mut favs, _) = open_empty();
        favs.add(FavItem::new("1", "Foo")).unwrap();
        favs.add(FavItem::new("2", "Foo")).unwrap();

        favs.remove("1").unwrap();
        assert_eq!(favs.items(), &[FavItem::new("2", "Foo")]);
        assert!(favs.is_favorite_by_name("Foo"));

        favs.remove("Foo").unwrap();
        assert_eq!(favs.items().len(), 1);
    }

    #[test]
    fn is_favorite_requires_both_id_and_name() {
        let (mut favs, _) = open_empty();
        favs.add(FavItem::new("1", "Foo")).unwrap();
        assert!(favs.is_favorite("1", "Foo"));
        assert!(!favs.is_favorite("2", "Foo"));
        assert!(favs.is_favorite_by_name("Foo"));
    }

    #[test]
    fn mutations_persist_to_store_and_reopen() {
        let (mut favs, store) = open_empty();
        favs.toggle(FavItem::new("7", "Pudgy Penguins")).unwrap();

        let raw = store.load(FAVORITES_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"[{"id":"7","name":"Pudgy Penguins"}]"#);

        let reopened = Favorites::open(Arc::new(store)).unwrap();
        assert_eq!(reopened.items(), favs.items());
    }

    #[test]
    fn subscribers_observe_changes() {
        let (mut favs, _) = open_empty();
        let rx = favs.subscribe();
        favs.add(FavItem::new("1", "Foo")).unwrap();
        assert_eq!(*rx.borrow(), vec![FavItem::new("1", "Foo")]);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn corrupt_stored_value_is_reported() {
        let store = InMemoryFavoritesStore::new();
        store.save(FAVORITES_KEY, "{oops").unwrap();
        let err = Favorites::open(Arc::new(store)).err().unwrap();
        assert!(matches!(err, FavoritesError::Decode(_)));
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFavoritesStore::new(dir.path().join("favs"));
        assert_eq!(store.load(FAVORITES_KEY).unwrap(), None);

        let mut favs = Favorites::open(Arc::new(store.clone())).unwrap();
        favs.add(FavItem::new("9", "Azuki")).unwrap();

        let reopened = Favorites::open(Arc::new(store)).unwrap();
        assert_eq!(reopened.items(), &[FavItem::new("9", "Azuki")]);
        assert!(dir.path().join("favs").join("nftFavs.json").exists());
    }
}
