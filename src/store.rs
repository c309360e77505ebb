// Pattern store over a single serialized JSON collection

use crate::backend::{Backend, FileBackend, MemoryBackend};
use crate::blob;
use crate::filter::PatternFilter;
use crate::pattern::{NewPattern, Pattern, Source, now_ms};
use crate::record::{Collection, Record};
use crate::stats::Stats;
use eyre::{Result, eyre};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts from a successful import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records merged into the store
    pub added: usize,
    /// Elements that could not be read as a pattern
    pub skipped: usize,
}

/// Import result shaped for front ends: never an `Err`, always a status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub success: bool,
    pub count: usize,
    pub skipped: usize,
    pub error: Option<String>,
}

impl From<Result<ImportSummary>> for ImportOutcome {
    fn from(result: Result<ImportSummary>) -> Self {
        match result {
            Ok(summary) => Self {
                success: true,
                count: summary.added,
                skipped: summary.skipped,
                error: None,
            },
            Err(e) => Self {
                success: false,
                count: 0,
                skipped: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Persistent pattern store
///
/// Every mutation reads the whole collection, changes it in memory and writes
/// it back. There is no locking: two writers racing on the same backend can
/// lose updates.
pub struct Store<B: Backend = FileBackend> {
    backend: B,
}

impl Store<FileBackend> {
    /// Open a store backed by the JSON file at `path`
    ///
    /// Nothing is touched on disk until the first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::with_backend(FileBackend::new(path))
    }

    pub fn path(&self) -> &Path {
        self.backend.path()
    }
}

impl Store<MemoryBackend> {
    /// Open an empty store kept entirely in memory
    pub fn in_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }
}

impl<B: Backend> Store<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All patterns in storage order
    ///
    /// Missing or unreadable storage reads as an empty collection.
    pub fn get_all(&self) -> Vec<Pattern> {
        self.load().into_records()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Pattern> {
        self.get_all().into_iter().find(|p| p.id == id)
    }

    /// Patterns matching every criterion, most recently updated first
    ///
    /// Ties keep storage order.
    pub fn filter(&self, filter: &PatternFilter) -> Vec<Pattern> {
        let mut patterns: Vec<Pattern> = self
            .get_all()
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        patterns.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        patterns
    }

    /// Distinct tags across all patterns, sorted
    pub fn get_tags(&self) -> Vec<String> {
        let tags: BTreeSet<String> = self.get_all().into_iter().flat_map(|p| p.tags).collect();
        tags.into_iter().collect()
    }

    pub fn get_stats(&self) -> Stats {
        Stats::from_patterns(&self.get_all())
    }

    /// The whole collection as pretty-printed JSON
    pub fn export(&self) -> Result<String> {
        blob::encode_collection(&self.get_all())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert or replace a pattern by id
    ///
    /// A replacement keeps its position and gets a fresh `updated_at`; a new
    /// pattern is appended as given. Returns the pattern as stored.
    pub fn save(&mut self, mut pattern: Pattern) -> Result<Pattern> {
        Self::validate_id(&pattern.id)?;
        pattern.dedup_tags();

        let mut patterns = self.load();
        if patterns.records().any(|p| p.id == pattern.id) {
            pattern.touch(now_ms());
        }
        let replaced = patterns.upsert(pattern.clone());
        self.write_all(&patterns)?;

        debug!(id = %pattern.id, replaced, "Saved pattern");
        Ok(pattern)
    }

    /// Create a pattern from a completed form: title, description and solution required
    pub fn create(&mut self, new: NewPattern) -> Result<Pattern> {
        new.validate()?;
        self.save(new.into_pattern(now_ms()))
    }

    /// Quick capture: only the title is required
    pub fn capture(&mut self, new: NewPattern) -> Result<Pattern> {
        new.validate_title()?;
        self.save(new.into_pattern(now_ms()))
    }

    /// Remove a pattern. Unknown ids are a no-op; returns whether one was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let mut patterns = self.load();
        if !patterns.remove(id) {
            debug!(id, "Delete of unknown pattern ignored");
            return Ok(false);
        }
        self.write_all(&patterns)?;
        debug!(id, "Deleted pattern");
        Ok(true)
    }

    /// Bump the reuse counter. Returns the updated pattern, or None for an unknown id.
    pub fn mark_reused(&mut self, id: &str) -> Result<Option<Pattern>> {
        let mut patterns = self.load();
        let Some(pattern) = patterns.records_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        pattern.reuse_count = pattern.reuse_count.saturating_add(1);
        pattern.touch(now_ms());
        let updated = pattern.clone();

        self.write_all(&patterns)?;
        debug!(id, reuse_count = updated.reuse_count, "Marked pattern reused");
        Ok(Some(updated))
    }

    /// Merge an exported collection into this store
    ///
    /// Patterns whose id is already present are left alone; new ones are
    /// appended and marked as team patterns. A payload that is not a JSON
    /// array fails with an `ImportError` before anything is merged.
    pub fn try_import(&mut self, json: &str) -> Result<ImportSummary> {
        let elements = blob::parse_import(json)?;

        let mut patterns = self.load();
        let mut known: HashSet<String> = patterns.ids().map(str::to_string).collect();
        let mut summary = ImportSummary::default();

        for (index, element) in elements.into_iter().enumerate() {
            let mut pattern: Pattern = match serde_json::from_value(element) {
                Ok(p) => p,
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable pattern in import");
                    summary.skipped += 1;
                    continue;
                }
            };
            if Self::validate_id(&pattern.id).is_err() {
                warn!(index, "Skipping imported pattern without an id");
                summary.skipped += 1;
                continue;
            }
            if !known.insert(pattern.id.clone()) {
                continue;
            }

            pattern.source = Source::Team;
            pattern.dedup_tags();
            pattern.updated_at = pattern.updated_at.max(pattern.created_at);
            patterns.push(pattern);
            summary.added += 1;
        }

        if summary.added > 0 {
            self.write_all(&patterns)?;
        }

        info!(added = summary.added, skipped = summary.skipped, "Imported patterns");
        Ok(summary)
    }

    /// Like `try_import`, but folds failures into the returned status
    pub fn import(&mut self, json: &str) -> ImportOutcome {
        ImportOutcome::from(self.try_import(json))
    }

    /// Remove every pattern
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove()?;
        info!(location = %self.backend.location(), "Cleared pattern store");
        Ok(())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Read the stored collection, keeping elements that don't decode
    fn load(&self) -> Collection<Pattern> {
        let location = self.backend.location();
        match self.backend.read() {
            Ok(Some(text)) => blob::decode_collection(&text, &location),
            Ok(None) => Collection::new(),
            Err(e) => {
                warn!(
                    location = %location,
                    error = %e,
                    "Failed to read pattern store, treating as empty"
                );
                Collection::new()
            }
        }
    }

    fn write_all(&mut self, patterns: &Collection<Pattern>) -> Result<()> {
        let text = blob::encode_collection(patterns.entries())?;
        self.backend.write(&text)?;
        debug!(
            location = %self.backend.location(),
            count = patterns.len(),
            unreadable = patterns.unreadable_count(),
            "Wrote pattern store"
        );
        Ok(())
    }

    fn validate_id(id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(eyre!("Pattern id cannot be empty or whitespace-only"));
        }
        Ok(())
    }
}
