// Storage media holding the serialized collection

use eyre::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the memory backend keeps the collection
pub const STORAGE_KEY: &str = "patternbase:patterns";

/// Raw I/O for a single serialized blob
///
/// The backend only moves text; decoding and business rules live in `Store`.
pub trait Backend {
    /// Read the stored text. Returns Ok(None) when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored text
    fn write(&mut self, contents: &str) -> Result<()>;

    /// Remove the stored text entirely
    fn remove(&mut self) -> Result<()>;

    /// Where the blob lives, for log messages
    fn location(&self) -> String;
}

/// A single JSON file on disk
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for FileBackend {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read pattern store {}", self.path.display()))?;
        Ok(Some(text))
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create store directory")?;
        }
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write pattern store {}", self.path.display()))?;
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove pattern store {}", self.path.display())
            })?;
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process key-value area, shaped like a browser's local storage
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    key: String,
    area: HashMap<String, String>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::with_key(STORAGE_KEY)
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            area: HashMap::new(),
        }
    }

    /// Seed or overwrite a raw value, e.g. to simulate corrupt data
    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.area.insert(key.into(), value.into());
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.area.get(key).map(String::as_str)
    }
}

impl Backend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.area.get(&self.key).cloned())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.area.insert(self.key.clone(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        self.area.remove(&self.key);
        Ok(())
    }

    fn location(&self) -> String {
        format!("memory:{}", self.key)
    }
}
