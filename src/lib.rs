// patternbase - Record, search and reuse AI-assisted coding patterns

pub mod backend;
pub mod blob;
pub mod config;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod record;
pub mod stats;
pub mod store;

// Re-export main types for convenience
pub use backend::{Backend, FileBackend, MemoryBackend, STORAGE_KEY};
pub use config::Config;
pub use error::{ImportError, PatternError};
pub use filter::{Choice, PatternFilter};
pub use pattern::{NewPattern, Outcome, Pattern, Source, Tool, now_ms};
pub use record::{Collection, Entry, Record};
pub use stats::Stats;
pub use store::{ImportOutcome, ImportSummary, Store};
