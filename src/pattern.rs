// Data model for patternbase

use crate::error::PatternError;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// AI coding assistant a pattern was recorded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    ClaudeCode,
    Cursor,
    Copilot,
    Other,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::ClaudeCode, Tool::Cursor, Tool::Copilot, Tool::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::ClaudeCode => "claude-code",
            Tool::Cursor => "cursor",
            Tool::Copilot => "copilot",
            Tool::Other => "other",
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Tool::ClaudeCode => "Claude Code",
            Tool::Cursor => "Cursor",
            Tool::Copilot => "GitHub Copilot",
            Tool::Other => "Other",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| PatternError::UnknownTool(s.to_string()))
    }
}

/// How a recorded attempt concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Success,
    Partial,
    Failure,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Success, Outcome::Partial, Outcome::Failure];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Partial => "partial",
            Outcome::Failure => "failure",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Outcome::Success => "✅",
            Outcome::Partial => "⚠️",
            Outcome::Failure => "❌",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::ALL
            .into_iter()
            .find(|outcome| outcome.as_str() == s)
            .ok_or_else(|| PatternError::UnknownOutcome(s.to_string()))
    }
}

/// Provenance of a record: created here, or merged in through import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Local,
    Team,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local => f.write_str("local"),
            Source::Team => f.write_str("team"),
        }
    }
}

impl FromStr for Source {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Source::Local),
            "team" => Ok(Source::Team),
            other => Err(PatternError::UnknownSource(other.to_string())),
        }
    }
}

/// A stored pattern
///
/// Every field but `id` falls back to its default when missing from the JSON,
/// so hand-edited or older exports still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tool: Tool,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub reuse_count: u32,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub source: Source,
}

impl Pattern {
    /// Drop exact-duplicate tags, keeping the first occurrence
    pub fn dedup_tags(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.tags.retain(|tag| seen.insert(tag.clone()));
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl Record for Pattern {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self, now: i64) {
        self.updated_at = now.max(self.created_at);
    }
}

/// Fields supplied when creating a pattern; id and timestamps are minted on build
#[derive(Debug, Clone, Default)]
pub struct NewPattern {
    pub title: String,
    pub description: String,
    pub prompt: String,
    pub solution: String,
    pub tool: Tool,
    pub outcome: Outcome,
    pub failure_reason: Option<String>,
    pub tags: Vec<String>,
}

impl NewPattern {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = solution.into();
        self
    }

    pub fn tool(mut self, tool: Tool) -> Self {
        self.tool = tool;
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Quick-capture check: only the title is mandatory
    pub fn validate_title(&self) -> Result<(), PatternError> {
        if self.title.trim().is_empty() {
            return Err(PatternError::MissingField("Title"));
        }
        Ok(())
    }

    /// Full-form check: title, description and solution are mandatory
    pub fn validate(&self) -> Result<(), PatternError> {
        self.validate_title()?;
        if self.description.trim().is_empty() {
            return Err(PatternError::MissingField("Description"));
        }
        if self.solution.trim().is_empty() {
            return Err(PatternError::MissingField("Solution"));
        }
        Ok(())
    }

    /// Mint a fresh local record stamped with `now`
    pub fn into_pattern(self, now: i64) -> Pattern {
        let mut pattern = Pattern {
            id: new_id(),
            title: self.title,
            description: self.description,
            tool: self.tool,
            prompt: self.prompt,
            solution: self.solution,
            tags: self.tags,
            outcome: self.outcome,
            failure_reason: self.failure_reason.filter(|r| !r.trim().is_empty()),
            reuse_count: 0,
            created_at: now,
            updated_at: now,
            source: Source::Local,
        };
        pattern.dedup_tags();
        pattern
    }
}

/// Generate a new pattern id (UUID v7, so ids sort by creation time)
pub fn new_id() -> String {
    format!("pattern-{}", Uuid::now_v7())
}

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        assert!(ts > 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_tool_serialization() {
        assert_eq!(serde_json::to_string(&Tool::ClaudeCode).unwrap(), "\"claude-code\"");
        assert_eq!(serde_json::to_string(&Tool::Copilot).unwrap(), "\"copilot\"");

        let tool: Tool = serde_json::from_str("\"cursor\"").unwrap();
        assert_eq!(tool, Tool::Cursor);
    }

    #[test]
    fn test_tool_from_str() {
        assert_eq!("claude-code".parse::<Tool>().unwrap(), Tool::ClaudeCode);
        assert_eq!("other".parse::<Tool>().unwrap(), Tool::Other);
        assert_eq!(
            "vim".parse::<Tool>().unwrap_err(),
            PatternError::UnknownTool("vim".to_string())
        );
    }

    #[test]
    fn test_outcome_from_str_and_glyph() {
        assert_eq!("partial".parse::<Outcome>().unwrap(), Outcome::Partial);
        assert!("Success".parse::<Outcome>().is_err());
        assert_eq!(Outcome::Success.glyph(), "✅");
        assert_eq!(Outcome::Failure.glyph(), "❌");
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("team".parse::<Source>().unwrap(), Source::Team);
        assert_eq!(Source::Local.to_string(), "local");
        assert!("remote".parse::<Source>().is_err());
    }

    #[test]
    fn test_pattern_field_names() {
        let pattern = NewPattern::new("Title").failure_reason("boom").into_pattern(1000);
        let json = serde_json::to_value(&pattern).unwrap();

        assert_eq!(json["reuseCount"], 0);
        assert_eq!(json["createdAt"], 1000);
        assert_eq!(json["updatedAt"], 1000);
        assert_eq!(json["failureReason"], "boom");
        assert_eq!(json["tool"], "claude-code");
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["source"], "local");
    }

    #[test]
    fn test_pattern_omits_missing_failure_reason() {
        let pattern = NewPattern::new("Title").into_pattern(1000);
        let json = serde_json::to_string(&pattern).unwrap();
        assert!(!json.contains("failureReason"));
    }

    #[test]
    fn test_pattern_tolerates_missing_fields() {
        let json = r#"{"id":"p1","title":"Only a title","extra":true}"#;
        let pattern: Pattern = serde_json::from_str(json).unwrap();

        assert_eq!(pattern.id, "p1");
        assert_eq!(pattern.title, "Only a title");
        assert_eq!(pattern.tool, Tool::ClaudeCode);
        assert_eq!(pattern.outcome, Outcome::Success);
        assert_eq!(pattern.source, Source::Local);
        assert!(pattern.tags.is_empty());
    }

    #[test]
    fn test_new_pattern_defaults() {
        let pattern = NewPattern::new("Fix TypeScript error").into_pattern(now_ms());

        assert!(pattern.id.starts_with("pattern-"));
        assert_eq!(pattern.outcome, Outcome::Success);
        assert_eq!(pattern.tool, Tool::ClaudeCode);
        assert_eq!(pattern.reuse_count, 0);
        assert_eq!(pattern.source, Source::Local);
        assert_eq!(pattern.created_at, pattern.updated_at);
    }

    #[test]
    fn test_new_pattern_ids_are_unique() {
        let a = NewPattern::new("a").into_pattern(1);
        let b = NewPattern::new("b").into_pattern(1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_pattern_validation() {
        assert_eq!(
            NewPattern::new("  ").validate_title(),
            Err(PatternError::MissingField("Title"))
        );
        assert!(NewPattern::new("t").validate_title().is_ok());

        assert_eq!(
            NewPattern::new("t").validate(),
            Err(PatternError::MissingField("Description"))
        );
        assert_eq!(
            NewPattern::new("t").description("d").validate(),
            Err(PatternError::MissingField("Solution"))
        );
        assert!(NewPattern::new("t").description("d").solution("s").validate().is_ok());
    }

    #[test]
    fn test_dedup_tags_keeps_first_occurrence() {
        let pattern = NewPattern::new("t")
            .tag("rust")
            .tag("cli")
            .tag("rust")
            .tag("Rust")
            .into_pattern(1);

        assert_eq!(pattern.tags, vec!["rust", "cli", "Rust"]);
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let mut pattern = NewPattern::new("t").into_pattern(5000);
        pattern.touch(1000);
        assert_eq!(pattern.updated_at, 5000);
        pattern.touch(9000);
        assert_eq!(pattern.updated_at, 9000);
    }
}
