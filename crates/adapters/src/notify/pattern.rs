// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic pattern matching

/// Pattern for matching topics
/// Supports:
///   - Exact: "lock-released:orders"
///   - Single wildcard: "lock-released:*" matches one trailing segment
///   - Prefix: "lock-released:**" matches everything below it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicPattern(String);

impl TopicPattern {
    pub fn new(pattern: &str) -> Self {
        Self(pattern.to_string())
    }

    pub fn matches(&self, topic: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        if self.0 == "**" {
            return true;
        }

        let pattern: Vec<&str> = self.0.split(':').collect();
        let topic: Vec<&str> = topic.split(':').collect();
        Self::match_segments(&pattern, &topic)
    }

    fn match_segments(pattern: &[&str], topic: &[&str]) -> bool {
        match (pattern.first(), topic.first()) {
            (None, None) => true,
            (Some(&"**"), _) => true,
            (Some(&"*"), Some(_)) => Self::match_segments(&pattern[1..], &topic[1..]),
            (Some(p), Some(t)) if p == t => Self::match_segments(&pattern[1..], &topic[1..]),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
