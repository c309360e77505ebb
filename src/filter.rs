// Query filtering for patterns

use crate::pattern::{Outcome, Pattern, Tool};
use std::fmt;
use std::str::FromStr;

/// A field constraint that is either the wildcard `all` or a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr> FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Choice::All)
        } else {
            s.parse().map(Choice::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("all"),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

/// Criteria for `Store::filter`; every constraint must hold
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    /// Case-insensitive substring of title, description, solution or any tag
    pub search: String,
    pub tool: Choice<Tool>,
    pub outcome: Choice<Outcome>,
    /// Record must carry at least one of these (exact match); empty means any
    pub tags: Vec<String>,
}

impl PatternFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn tool(mut self, tool: Choice<Tool>) -> Self {
        self.tool = tool;
        self
    }

    pub fn outcome(mut self, outcome: Choice<Outcome>) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn matches(&self, pattern: &Pattern) -> bool {
        self.matches_search(pattern)
            && self.tool.matches(&pattern.tool)
            && self.outcome.matches(&pattern.outcome)
            && self.matches_tags(pattern)
    }

    fn matches_search(&self, pattern: &Pattern) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        let contains = |text: &str| text.to_lowercase().contains(&needle);

        contains(pattern.title.as_str())
            || contains(pattern.description.as_str())
            || contains(pattern.solution.as_str())
            || pattern.tags.iter().any(|t| contains(t.as_str()))
    }

    fn matches_tags(&self, pattern: &Pattern) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|tag| pattern.has_tag(tag))
    }
}
