// Aggregate counts over a pattern collection

use crate::pattern::{Outcome, Pattern, Tool};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub success: usize,
    pub partial: usize,
    pub failure: usize,
    /// Only tools used by at least one pattern appear here
    pub by_tool: BTreeMap<Tool, usize>,
}

impl Stats {
    pub fn from_patterns(patterns: &[Pattern]) -> Self {
        let mut stats = Stats {
            total: patterns.len(),
            ..Stats::default()
        };

        for pattern in patterns {
            match pattern.outcome {
                Outcome::Success => stats.success += 1,
                Outcome::Partial => stats.partial += 1,
                Outcome::Failure => stats.failure += 1,
            }
            *stats.by_tool.entry(pattern.tool).or_insert(0) += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::NewPattern;

    #[test]
    fn test_empty_stats() {
        let stats = Stats::from_patterns(&[]);
        assert_eq!(stats, Stats::default());
        assert!(stats.by_tool.is_empty());
    }

    #[test]
    fn test_stats_counts() {
        let patterns = vec![
            NewPattern::new("a").into_pattern(1),
            NewPattern::new("b").tool(Tool::Cursor).into_pattern(1),
            NewPattern::new("c").outcome(Outcome::Partial).into_pattern(1),
            NewPattern::new("d").outcome(Outcome::Failure).tool(Tool::Cursor).into_pattern(1),
        ];

        let stats = Stats::from_patterns(&patterns);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.partial, 1);
        assert_eq!(stats.failure, 1);
        assert_eq!(stats.by_tool.get(&Tool::ClaudeCode), Some(&2));
        assert_eq!(stats.by_tool.get(&Tool::Cursor), Some(&2));
        assert!(!stats.by_tool.contains_key(&Tool::Copilot));
    }

    #[test]
    fn test_stats_json_shape() {
        let patterns = vec![NewPattern::new("a").tool(Tool::Copilot).into_pattern(1)];
        let json = serde_json::to_value(Stats::from_patterns(&patterns)).unwrap();

        assert_eq!(json["total"], 1);
        assert_eq!(json["byTool"]["copilot"], 1);
    }
}
