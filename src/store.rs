use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// String-valued key/value persistence. Values are JSON text, so a stored
/// value can be present but unparseable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonRead<T> {
    Missing,
    Value(T),
    Corrupt(String),
}

/// Reads and parses `key`. Store failures propagate; parse failures are
/// reported as [`JsonRead::Corrupt`] so callers can clear the key.
pub fn read_json<T, S>(store: &S, key: &str) -> Result<JsonRead<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(JsonRead::Missing);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(JsonRead::Value(value)),
        Err(err) => Ok(JsonRead::Corrupt(err.to_string())),
    }
}

pub fn write_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).with_context(|| format!("serialize value for {key}"))?;
    store.set(key, json)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Whole-map store persisted as one pretty-printed JSON object. Every write
/// is flushed to disk before returning.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = load_entries(&path)?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store parent folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries).context("serialize store entries")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write store file {}", self.path.display()))
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read store file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&content)
        .with_context(|| format!("deserialize store file {}", path.display()))
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.flush()
    }
}

/// Lets separate execution contexts (overlay, settings editor) share one
/// backing store.
impl<S: KeyValueStore> KeyValueStore for Arc<Mutex<S>> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .remove(key)
    }

    fn clear(&mut self) -> Result<()> {
        self.lock().map_err(|_| anyhow!("store lock poisoned"))?.clear()
    }
}
