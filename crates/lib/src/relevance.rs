//! # Relevance Heuristics
//!
//! Keyword-driven classification used by the chat relay: deciding whether a
//! message is policy-related at all, which stored files are worth including,
//! and which sections of a long document match the question. The keyword
//! tables are plain data injected through [`RelevanceConfig`] so deployments
//! can extend them without touching control flow.

use crate::constants::SECTION_FALLBACK_CHARS;
use serde::Deserialize;
use std::collections::HashMap;

/// Keyword tables driving the relevance heuristics. All fields carry
/// programmatic defaults, so an empty config section yields the stock tables.
#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceConfig {
    /// Topic name to keyword set. A topic is "active" for a query when the
    /// topic name or any of its keywords appears in the query.
    #[serde(default = "default_topics")]
    pub topics: HashMap<String, Vec<String>>,
    /// Words that mark a message as policy-related.
    #[serde(default = "default_policy_triggers")]
    pub policy_triggers: Vec<String>,
    /// Phrases that force inclusion of every stored file regardless of topic.
    #[serde(default = "default_general_phrases")]
    pub general_phrases: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            policy_triggers: default_policy_triggers(),
            general_phrases: default_general_phrases(),
        }
    }
}

fn default_topics() -> HashMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        (
            "benefits",
            &["benefit", "health", "insurance", "vacation", "pto", "medical", "dental"],
        ),
        (
            "conduct",
            &["conduct", "behavior", "ethics", "harassment", "respect", "discipline"],
        ),
        (
            "leave",
            &["leave", "vacation", "pto", "holiday", "sick", "absence", "parental"],
        ),
        (
            "safety",
            &["safety", "safe", "emergency", "hazard", "accident", "injury"],
        ),
        (
            "privacy",
            &["privacy", "data", "confidential", "personal information"],
        ),
        (
            "remote",
            &["remote", "work from home", "wfh", "telecommute", "hybrid"],
        ),
        ("dress", &["dress", "attire", "uniform", "appearance"]),
        (
            "payroll",
            &["pay", "salary", "payroll", "compensation", "bonus", "expense"],
        ),
    ];

    table
        .iter()
        .map(|(topic, keywords)| {
            (
                topic.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

fn default_policy_triggers() -> Vec<String> {
    [
        "policy",
        "benefit",
        "handbook",
        "code of conduct",
        "privacy",
        "safe",
        "manual",
        "guide",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_general_phrases() -> Vec<String> {
    [
        "tell me about",
        "what are",
        "show me",
        "policies",
        "documents",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl RelevanceConfig {
    /// Binary classifier: does this message warrant a policy-document scan?
    ///
    /// False negatives mean a policy question proceeds without grounding
    /// context; false positives only cost an unnecessary documents scan.
    pub fn is_policy_related(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.policy_triggers
            .iter()
            .any(|trigger| message.contains(trigger.as_str()))
    }

    /// Whether the message is a broad "show me everything" style query that
    /// forces inclusion of every stored file.
    pub fn is_general_query(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.general_phrases
            .iter()
            .any(|phrase| message.contains(phrase.as_str()))
    }

    /// Topic names detected in the query, by topic name or keyword match.
    pub fn topics_in_query(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        let mut topics: Vec<&str> = self
            .topics
            .iter()
            .filter(|(topic, keywords)| {
                query.contains(topic.as_str())
                    || keywords.iter().any(|k| query.contains(k.as_str()))
            })
            .map(|(topic, _)| topic.as_str())
            .collect();
        // HashMap iteration order is arbitrary; sort for deterministic output.
        topics.sort_unstable();
        topics
    }

    /// Inclusion predicate for one stored file given the inbound message.
    ///
    /// General queries and topic matches (against message or filename) are
    /// positive signals, but the default is to include anyway: the system
    /// prefers over-including context to missing a document asked about by
    /// synonym. As a result every path currently returns `true`; the topic
    /// scan stays so that tightening the policy later only means changing
    /// the final return.
    pub fn file_is_relevant(&self, message: &str, filename: &str) -> bool {
        if self.is_general_query(message) {
            return true;
        }

        let filename = filename.to_lowercase();
        for topic in self.topics_in_query(message) {
            if filename.contains(topic) {
                return true;
            }
            if let Some(keywords) = self.topics.get(topic) {
                if keywords.iter().any(|k| filename.contains(k.as_str())) {
                    return true;
                }
            }
        }

        // Deliberately permissive default.
        true
    }

    /// Filters a document down to the blocks relevant to `query`.
    ///
    /// The text is split into blocks at header-like lines. A block is
    /// relevant when its header or any of its lines contains a keyword of a
    /// topic detected in the query. When nothing matches, the first
    /// `SECTION_FALLBACK_CHARS` characters are returned instead, so a
    /// non-empty document always yields non-empty context.
    pub fn select_relevant_section(&self, full_text: &str, query: &str) -> String {
        let fallback = || full_text.chars().take(SECTION_FALLBACK_CHARS).collect();

        let active_keywords: Vec<&str> = self
            .topics_in_query(query)
            .into_iter()
            .flat_map(|topic| {
                self.topics
                    .get(topic)
                    .map(|ks| ks.iter().map(String::as_str).collect::<Vec<_>>())
                    .unwrap_or_default()
            })
            .collect();

        if active_keywords.is_empty() {
            return fallback();
        }

        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for line in full_text.lines() {
            if is_header_line(line) || blocks.is_empty() {
                blocks.push(vec![line]);
            } else if let Some(current) = blocks.last_mut() {
                current.push(line);
            }
        }

        let relevant: Vec<String> = blocks
            .iter()
            .filter(|block| {
                block.iter().any(|line| {
                    let line = line.to_lowercase();
                    active_keywords.iter().any(|k| line.contains(k))
                })
            })
            .map(|block| block.join("\n"))
            .collect();

        if relevant.is_empty() {
            fallback()
        } else {
            relevant.join("\n\n")
        }
    }
}

/// Heuristic for header-like lines: short, and either mostly uppercase,
/// ending in a colon, or numbered ("3." / "3)" style).
fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() > 60 {
        return false;
    }

    if trimmed.ends_with(':') {
        return true;
    }

    let mut chars = trimmed.chars();
    if let Some(first) = chars.next() {
        if first.is_ascii_digit() {
            if let Some(second) = chars.next() {
                if second == '.' || second == ')' || second.is_ascii_digit() {
                    return true;
                }
            }
        }
    }

    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return false;
    }
    let uppercase = letters.iter().filter(|c| c.is_uppercase()).count();
    uppercase * 10 >= letters.len() * 7
}
