//! Topic candidates and importance scoring

mod candidate;
mod patterns;
mod scorer;
mod tiers;

pub use candidate::{Mention, Tier, TopicCandidate, TopicKey};
pub use patterns::{CandidateEntry, CandidateExtractor, CandidateSet};
pub use scorer::{locate_mentions, TopicScorer};
pub use tiers::{assign_tiers, TierThresholds};

pub(crate) use scorer::sort_ranked;

use serde::{Deserialize, Serialize};

/// Ranked, classified topics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicSet {
    /// Score descending
    pub topics: Vec<TopicCandidate>,
    /// `None` when there were no topics to classify
    pub thresholds: Option<TierThresholds>,
}

impl TopicSet {
    pub fn get(&self, key: &TopicKey) -> Option<&TopicCandidate> {
        self.topics.iter().find(|t| &t.key == key)
    }

    /// Look a topic up by any surface form.
    pub fn find(&self, name: &str) -> Option<&TopicCandidate> {
        self.get(&TopicKey::new(name))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
