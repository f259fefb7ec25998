//! Topic candidates, their canonical keys, mentions and tiers

use crate::corpus::{text, Location, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical topic key: lowercased, whitespace collapsed.
///
/// Two surface forms with the same key are the same topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicKey(String);

impl TopicKey {
    pub fn new(name: &str) -> Self {
        Self(text::normalize(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Importance tier. Ordered from least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Extra,
    Core,
    ExamCritical,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::ExamCritical => "exam_critical",
            Tier::Core => "core",
            Tier::Extra => "extra",
        }
    }

    /// Lenient parse of a tier label as written by a generative model
    /// ("exam-critical", "Exam Critical", "core", "extra", ...).
    pub fn parse(label: &str) -> Option<Self> {
        let label: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match label.as_str() {
            "exam_critical" | "critical" | "high" => Some(Tier::ExamCritical),
            "core" | "medium" => Some(Tier::Core),
            "extra" | "low" | "optional" => Some(Tier::Extra),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One TextUnit containing a topic, with the number of whole-phrase occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Index of the unit in the corpus
    pub unit: usize,
    pub location: Location,
    pub role: Role,
    pub occurrences: usize,
}

/// A scored topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCandidate {
    pub key: TopicKey,
    pub display_name: String,
    pub mentions: Vec<Mention>,
    pub score: f64,
    pub tier: Tier,
    /// Tier proposed by an external suggester, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_tier: Option<Tier>,
}

impl TopicCandidate {
    pub fn new(display_name: impl Into<String>, mentions: Vec<Mention>) -> Self {
        let display_name = display_name.into();
        Self {
            key: TopicKey::new(&display_name),
            display_name,
            mentions,
            score: 0.0,
            tier: Tier::Extra,
            suggested_tier: None,
        }
    }

    /// Total whole-phrase occurrences across all mentions
    pub fn occurrences(&self) -> usize {
        self.mentions.iter().map(|m| m.occurrences).sum()
    }

    pub fn has_objectives_mention(&self) -> bool {
        self.mentions.iter().any(|m| m.role.is_objectives())
    }

    /// Corpus index of the earliest mentioning unit
    pub fn first_mention(&self) -> Option<usize> {
        self.mentions.iter().map(|m| m.unit).min()
    }
}
