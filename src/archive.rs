//! Durable store for recipes the user chose to keep.
//!
//! The whole collection lives in one JSON record that is read once at
//! startup and rewritten in full on every save. Storage problems never
//! reach the pipeline: a bad read yields an empty archive and a failed
//! write is logged while the in-memory copy stays authoritative.

use crate::error::StorageError;
use crate::model::{GeneratedImage, RecipeDraft, SavedRecipe};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Backend holding the serialized archive record
pub trait RecipeStore: Send + Sync {
    /// Read the raw record; `Ok(None)` when nothing has been stored yet
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the raw record
    fn write(&self, contents: &str) -> Result<(), StorageError>;
}

impl<S: RecipeStore + ?Sized> RecipeStore for Arc<S> {
    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        (**self).write(contents)
    }
}

/// Stores the archive as a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecipeStore for FileStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write beside the target and rename, so a crash never leaves half a record
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps the record in memory; useful for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RecipeStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(contents.to_string());
        Ok(())
    }
}

/// Saved recipes, oldest first
pub struct RecipeArchive {
    store: Box<dyn RecipeStore>,
    recipes: Vec<SavedRecipe>,
}

impl RecipeArchive {
    /// Read every saved recipe from `store`. Never fails: missing, unreadable,
    /// or corrupt storage produces an empty archive.
    pub fn load(store: impl RecipeStore + 'static) -> Self {
        let mut recipes = match store.read() {
            Ok(Some(contents)) => match serde_json::from_str::<Vec<SavedRecipe>>(&contents) {
                Ok(recipes) => {
                    info!("Loaded {} saved recipes", recipes.len());
                    recipes
                }
                Err(e) => {
                    error!("Failed to load recipes from storage: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No saved recipes yet");
                Vec::new()
            }
            Err(e) => {
                error!("Failed to read recipe storage: {}", e);
                Vec::new()
            }
        };

        recipes.sort_by_key(|recipe| recipe.id);

        RecipeArchive {
            store: Box::new(store),
            recipes,
        }
    }

    /// Open the JSON archive at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::load(FileStore::new(path))
    }

    /// An archive backed only by memory
    pub fn in_memory() -> Self {
        Self::load(MemoryStore::new())
    }

    pub fn recipes(&self) -> &[SavedRecipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Append a new entry stamped with the current time and persist the
    /// whole collection. Identical drafts are stored as separate entries.
    pub fn save(&mut self, draft: RecipeDraft, image: Option<GeneratedImage>) -> SavedRecipe {
        let saved = SavedRecipe {
            id: self.next_id(),
            draft,
            image,
        };
        self.recipes.push(saved.clone());

        if let Err(e) = self.persist() {
            warn!("Saved recipe {} only in memory: {}", saved.id, e);
        }
        saved
    }

    pub fn select(&self, id: i64) -> Option<&SavedRecipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Timestamps in milliseconds, nudged forward so ids stay unique even
    /// for saves within the same millisecond
    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self.recipes.iter().map(|recipe| recipe.id).max() {
            Some(last) if last >= now => last + 1,
            _ => now,
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let contents = serde_json::to_string(&self.recipes)?;
        self.store.write(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> RecipeDraft {
        RecipeDraft {
            era: "Medieval".to_string(),
            recipe_name: name.to_string(),
            description: "Hearty".to_string(),
            fun_fact: "Eaten by monks".to_string(),
            ingredients: vec!["1 loaf bread".to_string()],
            instructions: vec!["Toast".to_string()],
        }
    }

    struct BrokenStore;

    impl RecipeStore for BrokenStore {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::new(ErrorKind::PermissionDenied, "denied").into())
        }

        fn write(&self, _contents: &str) -> Result<(), StorageError> {
            Err(std::io::Error::new(ErrorKind::PermissionDenied, "denied").into())
        }
    }

    #[test]
    fn test_empty_store_loads_empty() {
        assert!(RecipeArchive::in_memory().is_empty());
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let archive = RecipeArchive::load(MemoryStore::with_contents("{not json"));
        assert!(archive.is_empty());
    }

    #[test]
    fn test_unreadable_store_loads_empty_and_save_still_works() {
        let mut archive = RecipeArchive::load(BrokenStore);
        assert!(archive.is_empty());

        let saved = archive.save(draft("Trencher"), None);
        assert_eq!(archive.select(saved.id), Some(&saved));
    }

    #[test]
    fn test_saving_twice_creates_distinct_entries() {
        let mut archive = RecipeArchive::in_memory();
        let first = archive.save(draft("Pottage"), None);
        let second = archive.save(draft("Pottage"), None);

        assert_eq!(archive.len(), 2);
        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
        assert_eq!(first.draft, second.draft);
    }

    #[test]
    fn test_save_rewrites_shared_store() {
        let store = Arc::new(MemoryStore::new());
        let mut archive = RecipeArchive::load(Arc::clone(&store));
        let saved = archive.save(draft("Frumenty"), Some(GeneratedImage::new("image/png", "AAAA")));

        let reloaded = RecipeArchive::load(store);
        assert_eq!(reloaded.recipes(), [saved]);
    }

    #[test]
    fn test_select_unknown_id() {
        let archive = RecipeArchive::in_memory();
        assert!(archive.select(42).is_none());
    }

    #[test]
    fn test_load_orders_oldest_first() {
        let json = serde_json::to_string(&vec![
            SavedRecipe {
                id: 20,
                draft: draft("Later"),
                image: None,
            },
            SavedRecipe {
                id: 10,
                draft: draft("Earlier"),
                image: None,
            },
        ])
        .unwrap();

        let archive = RecipeArchive::load(MemoryStore::with_contents(json));
        let names: Vec<&str> = archive
            .recipes()
            .iter()
            .map(|r| r.draft.recipe_name.as_str())
            .collect();
        assert_eq!(names, ["Earlier", "Later"]);
    }
}
