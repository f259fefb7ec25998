//! Dynamic tier thresholds
//!
//! Thresholds come from the empirical score distribution of one run:
//! `exam_critical ≥ max(floor, min + fraction·(max − min))`, same shape for
//! `core`. A degenerate distribution (max = min) puts every topic in `core`
//! before overrides.

use super::candidate::{Tier, TopicCandidate};
use crate::config::TierConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds derived for one score distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub exam_critical: f64,
    pub core: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// All scores equal: thresholds are not used, every topic starts as `core`
    pub degenerate: bool,
}

impl TierThresholds {
    /// Thresholds for a set of scores. `None` when there are no scores.
    pub fn from_scores(scores: &[f64], config: &TierConfig) -> Option<Self> {
        let min = scores.iter().copied().reduce(f64::min)?;
        let max = scores.iter().copied().reduce(f64::max)?;
        let span = max - min;
        Some(Self {
            exam_critical: config
                .exam_critical_floor
                .max(min + config.exam_critical_fraction * span),
            core: config.core_floor.max(min + config.core_fraction * span),
            min_score: min,
            max_score: max,
            degenerate: span == 0.0,
        })
    }

    /// Tier from score alone, before overrides.
    pub fn tier_for(&self, score: f64) -> Tier {
        if self.degenerate {
            Tier::Core
        } else if score >= self.exam_critical {
            Tier::ExamCritical
        } else if score >= self.core {
            Tier::Core
        } else {
            Tier::Extra
        }
    }
}

/// Assign tiers to every topic and return the thresholds used.
///
/// Overrides, in order: an objectives-role mention floors the topic at
/// `core`; exactly one occurrence with a score below the single-mention
/// ceiling forces `extra`.
pub fn assign_tiers(topics: &mut [TopicCandidate], config: &TierConfig) -> Option<TierThresholds> {
    let scores: Vec<f64> = topics.iter().map(|t| t.score).collect();
    let thresholds = TierThresholds::from_scores(&scores, config)?;
    if thresholds.degenerate {
        debug!(
            score = thresholds.max_score,
            topics = topics.len(),
            "degenerate score distribution, defaulting to core"
        );
    }

    for topic in topics.iter_mut() {
        let mut tier = thresholds.tier_for(topic.score);
        if topic.has_objectives_mention() && tier < Tier::Core {
            tier = Tier::Core;
        }
        if topic.occurrences() == 1 && topic.score < config.single_mention_ceiling {
            tier = Tier::Extra;
        }
        topic.tier = tier;
    }
    Some(thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Location, Role};
    use crate::topics::Mention;

    fn topic(score: f64, mentions: &[(Role, usize)]) -> TopicCandidate {
        let mut t = TopicCandidate::new(
            "Topic",
            mentions
                .iter()
                .enumerate()
                .map(|(i, (role, occurrences))| Mention {
                    unit: i,
                    location: Location::new("d", i),
                    role: *role,
                    occurrences: *occurrences,
                })
                .collect(),
        );
        t.score = score;
        t
    }

    #[test]
    fn thresholds_follow_distribution() {
        let t = TierThresholds::from_scores(&[2.0, 40.0, 10.0], &TierConfig::default()).unwrap();
        assert!((t.exam_critical - (2.0 + 0.7 * 38.0)).abs() < 1e-9);
        assert!((t.core - (2.0 + 0.3 * 38.0)).abs() < 1e-9);
        assert!(!t.degenerate);
    }

    #[test]
    fn floors_apply_to_compressed_distributions() {
        let t = TierThresholds::from_scores(&[1.0, 3.0], &TierConfig::default()).unwrap();
        assert_eq!(t.exam_critical, 15.0);
        assert_eq!(t.core, 8.0);
        assert_eq!(t.tier_for(3.0), Tier::Extra);
    }

    #[test]
    fn empty_scores_have_no_thresholds() {
        assert!(TierThresholds::from_scores(&[], &TierConfig::default()).is_none());
    }

    #[test]
    fn degenerate_distribution_is_all_core() {
        let mut topics = vec![
            topic(9.0, &[(Role::Body, 9)]),
            topic(9.0, &[(Role::Body, 4), (Role::Body, 5)]),
        ];
        let t = assign_tiers(&mut topics, &TierConfig::default()).unwrap();
        assert!(t.degenerate);
        assert!(topics.iter().all(|t| t.tier == Tier::Core));
    }

    #[test]
    fn objectives_mention_floors_at_core() {
        let mut topics = vec![
            topic(40.0, &[(Role::Title, 4)]),
            topic(8.0, &[(Role::ObjectivesBody, 1), (Role::Body, 1)]),
            topic(0.0, &[(Role::Body, 2)]),
        ];
        assign_tiers(&mut topics, &TierConfig::default()).unwrap();
        // core threshold is 12, so 8 would be extra without the floor
        assert_eq!(topics[1].tier, Tier::Core);
        assert_eq!(topics[2].tier, Tier::Extra);
    }

    #[test]
    fn single_mention_low_score_forced_extra() {
        let mut topics = vec![
            topic(4.0, &[(Role::Body, 1)]),
            topic(4.0, &[(Role::Body, 1)]),
            topic(3.0, &[(Role::Body, 1)]),
        ];
        topics[0].score = 4.5;
        let t = assign_tiers(&mut topics, &TierConfig::default()).unwrap();
        assert!(!t.degenerate);
        assert!(topics.iter().all(|t| t.tier == Tier::Extra));

        let mut degenerate = vec![topic(1.0, &[(Role::Body, 1)]), topic(1.0, &[(Role::Body, 1)])];
        assign_tiers(&mut degenerate, &TierConfig::default()).unwrap();
        assert!(degenerate.iter().all(|t| t.tier == Tier::Extra));
    }
}
