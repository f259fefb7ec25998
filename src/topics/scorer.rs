//! Topic importance scoring
//!
//! Score is the sum of per-mention structural contributions: role weights
//! for title/objectives/summary units, one point per occurrence in plain
//! body text, a position bonus for units near either end of their document,
//! and a bonus for externally suggested candidates.

use super::candidate::{Mention, Tier, TopicCandidate, TopicKey};
use super::patterns::CandidateSet;
use super::tiers::assign_tiers;
use super::TopicSet;
use crate::config::{ConceptMapConfig, ScoringConfig, TierConfig};
use crate::corpus::{text, Corpus, Role};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info};

pub struct TopicScorer<'a> {
    scoring: &'a ScoringConfig,
    tiers: &'a TierConfig,
    min_mentions: usize,
}

impl<'a> TopicScorer<'a> {
    pub fn new(config: &'a ConceptMapConfig) -> Self {
        Self {
            scoring: &config.scoring,
            tiers: &config.tiers,
            min_mentions: config.extraction.min_mentions,
        }
    }

    /// Locate mentions for every candidate, then score and classify.
    pub fn score(&self, candidates: &CandidateSet, corpus: &Corpus) -> TopicSet {
        let topics = candidates
            .entries()
            .iter()
            .map(|entry| {
                let mut topic =
                    TopicCandidate::new(&entry.display_name, locate_mentions(&entry.key, corpus));
                topic.suggested_tier = entry.suggested;
                topic
            })
            .collect();
        self.score_topics(topics, corpus)
    }

    /// Score topics whose mentions are already known.
    ///
    /// Entries sharing a key are merged first. Scores are recomputed from
    /// the mentions, so scoring an already-scored set gives the same result.
    pub fn score_topics(&self, topics: Vec<TopicCandidate>, corpus: &Corpus) -> TopicSet {
        let mut merged = merge_by_key(topics);
        let before = merged.len();
        merged.retain(|t| t.occurrences() >= self.min_mentions);
        if merged.len() < before {
            debug!(
                dropped = before - merged.len(),
                min_mentions = self.min_mentions,
                "dropped candidates below mention floor"
            );
        }

        for topic in &mut merged {
            topic.score = self.raw_score(topic, corpus);
        }
        sort_ranked(&mut merged);

        let thresholds = assign_tiers(&mut merged, self.tiers);
        match &thresholds {
            Some(t) => info!(
                topics = merged.len(),
                exam_critical = t.exam_critical,
                core = t.core,
                degenerate = t.degenerate,
                "scored topics"
            ),
            None => info!("no topic candidates to score"),
        }

        TopicSet {
            topics: merged,
            thresholds,
        }
    }

    fn raw_score(&self, topic: &TopicCandidate, corpus: &Corpus) -> f64 {
        let s = self.scoring;
        let mut score = 0.0;
        for mention in &topic.mentions {
            score += match mention.role {
                Role::Title => s.title,
                Role::ObjectivesTitle => s.objectives_title,
                Role::SummaryTitle => s.summary_title,
                Role::ObjectivesBody => s.objectives_body,
                Role::SummaryBody => s.summary_body,
                Role::Body => s.body_occurrence * mention.occurrences as f64,
            };
            if self.in_position_window(mention, corpus) {
                score += s.position_bonus;
            }
        }
        score += match topic.suggested_tier {
            Some(Tier::ExamCritical) => s.suggested_exam_critical,
            Some(Tier::Core) => s.suggested_core,
            Some(Tier::Extra) => s.suggested_extra,
            None => 0.0,
        };
        score
    }

    /// Within the first or last `max(min_units, ceil(window · count))` positions.
    fn in_position_window(&self, mention: &Mention, corpus: &Corpus) -> bool {
        let count = corpus.position_count(&mention.location.document);
        if count == 0 {
            return false;
        }
        let window = self
            .scoring
            .position_min_units
            .max((self.scoring.position_window * count as f64).ceil() as usize);
        let position = mention.location.position;
        position < window || position + window >= count
    }
}

/// Every unit containing `key` as a whole phrase, in corpus order.
pub fn locate_mentions(key: &TopicKey, corpus: &Corpus) -> Vec<Mention> {
    (0..corpus.len())
        .filter_map(|i| {
            let occurrences = text::count_phrase(corpus.normalized_text(i), key.as_str());
            let unit = corpus.unit(i)?;
            (occurrences > 0).then(|| Mention {
                unit: i,
                location: unit.location.clone(),
                role: unit.role,
                occurrences,
            })
        })
        .collect()
}

fn merge_by_key(topics: Vec<TopicCandidate>) -> Vec<TopicCandidate> {
    let mut merged: Vec<TopicCandidate> = Vec::with_capacity(topics.len());
    let mut index: HashMap<TopicKey, usize> = HashMap::new();
    for topic in topics {
        if topic.key.is_empty() {
            continue;
        }
        match index.get(&topic.key) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.mentions.extend(topic.mentions);
                existing.suggested_tier = existing.suggested_tier.max(topic.suggested_tier);
            }
            None => {
                index.insert(topic.key.clone(), merged.len());
                merged.push(topic);
            }
        }
    }
    merged
}

/// Score descending, then earliest first mention, then key.
pub(crate) fn sort_ranked(topics: &mut [TopicCandidate]) {
    topics.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.first_mention().cmp(&b.first_mention()))
            .then_with(|| a.key.cmp(&b.key))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Location, TextUnit};

    /// Ten-slide deck with filler so that positions 3..=6 get no position bonus.
    fn deck(slides: &[(usize, Role, &str)]) -> Corpus {
        let mut units: Vec<TextUnit> = (0..10)
            .map(|p| TextUnit::new(Location::new("deck", p), Role::Body, "filler text", p as f64 / 9.0))
            .collect();
        for (pos, role, text) in slides {
            units.push(TextUnit::new(
                Location::new("deck", *pos),
                *role,
                *text,
                *pos as f64 / 9.0,
            ));
        }
        Corpus::new(units).unwrap()
    }

    fn score_one(corpus: &Corpus, name: &str) -> TopicCandidate {
        let config = ConceptMapConfig::default();
        let mut set = CandidateSet::new();
        set.add(name, None);
        TopicScorer::new(&config)
            .score(&set, corpus)
            .topics
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn role_weights_sum_per_mention() {
        let corpus = deck(&[
            (4, Role::Title, "Recursion"),
            (5, Role::ObjectivesBody, "Explain recursion"),
        ]);
        assert_eq!(score_one(&corpus, "Recursion").score, 18.0);
    }

    #[test]
    fn body_counts_every_occurrence() {
        let corpus = deck(&[(4, Role::Body, "a stack, another stack, and a third stack")]);
        assert_eq!(score_one(&corpus, "stack").score, 3.0);
    }

    #[test]
    fn position_bonus_near_either_end() {
        let corpus = deck(&[
            (0, Role::Body, "heap sort"),
            (9, Role::Body, "heap sort"),
            (5, Role::Body, "heap sort"),
        ]);
        // 3 occurrences + 2 bonuses
        assert_eq!(score_one(&corpus, "Heap Sort").score, 9.0);
    }

    /// `count`-position deck of filler with one body mention of `text` at `pos`.
    fn long_deck(count: usize, pos: usize, text: &str) -> Corpus {
        let last = (count - 1) as f64;
        let mut units: Vec<TextUnit> = (0..count)
            .map(|p| TextUnit::new(Location::new("long", p), Role::Body, "filler text", p as f64 / last))
            .collect();
        units.push(TextUnit::new(Location::new("long", pos), Role::Body, text, pos as f64 / last));
        Corpus::new(units).unwrap()
    }

    #[test]
    fn position_window_grows_with_document_length() {
        // 40 positions: ceil(0.1 * 40) = 4 beats the 3-unit minimum
        assert_eq!(score_one(&long_deck(40, 3, "tries"), "tries").score, 4.0);
        assert_eq!(score_one(&long_deck(40, 36, "tries"), "tries").score, 4.0);
        assert_eq!(score_one(&long_deck(40, 4, "tries"), "tries").score, 1.0);
        assert_eq!(score_one(&long_deck(40, 5, "tries"), "tries").score, 1.0);
        assert_eq!(score_one(&long_deck(40, 35, "tries"), "tries").score, 1.0);
    }

    #[test]
    fn suggested_tier_adds_bonus() {
        let corpus = deck(&[(4, Role::Body, "dynamic programming")]);
        let config = ConceptMapConfig::default();
        let mut set = CandidateSet::new();
        set.add("Dynamic Programming", Some(Tier::ExamCritical));
        let topics = TopicScorer::new(&config).score(&set, &corpus).topics;
        assert_eq!(topics[0].score, 5.0);
    }

    #[test]
    fn unmentioned_candidates_are_dropped() {
        let corpus = deck(&[(4, Role::Body, "queues")]);
        let config = ConceptMapConfig::default();
        let mut set = CandidateSet::new();
        set.add("Priority Queue", None);
        set.add("queues", None);
        let topics = TopicScorer::new(&config).score(&set, &corpus).topics;
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].key.as_str(), "queues");
    }

    #[test]
    fn merging_sums_contributions() {
        let corpus = deck(&[(4, Role::Body, "graphs"), (5, Role::Body, "graphs")]);
        let config = ConceptMapConfig::default();
        let a = TopicCandidate::new("Graphs", locate_mentions(&TopicKey::new("graphs"), &corpus)[..1].to_vec());
        let b = TopicCandidate::new("GRAPHS", locate_mentions(&TopicKey::new("graphs"), &corpus)[1..].to_vec());
        let set = TopicScorer::new(&config).score_topics(vec![a, b], &corpus);
        assert_eq!(set.topics.len(), 1);
        assert_eq!(set.topics[0].display_name, "Graphs");
        assert_eq!(set.topics[0].score, 2.0);
    }

    #[test]
    fn rescoring_is_idempotent() {
        let corpus = deck(&[
            (1, Role::Title, "Sorting"),
            (4, Role::Body, "sorting and searching"),
            (6, Role::SummaryBody, "searching"),
        ]);
        let config = ConceptMapConfig::default();
        let scorer = TopicScorer::new(&config);
        let mut set = CandidateSet::new();
        set.add("Sorting", None);
        set.add("Searching", None);

        let first = scorer.score(&set, &corpus);
        let second = scorer.score_topics(first.topics.clone(), &corpus);
        assert_eq!(first.topics, second.topics);
        assert_eq!(first.thresholds, second.thresholds);
    }

    #[test]
    fn ranked_by_score_then_first_mention() {
        let corpus = deck(&[(4, Role::Body, "beta alpha")]);
        let config = ConceptMapConfig::default();
        let mut set = CandidateSet::new();
        set.add("alpha", None);
        set.add("beta", None);
        let topics = TopicScorer::new(&config).score(&set, &corpus).topics;
        let keys: Vec<&str> = topics.iter().map(|t| t.key.as_str()).collect();
        // equal scores, same first unit: key order
        assert_eq!(keys, vec!["alpha", "beta"]);
    }

    #[test]
    fn empty_candidates_give_empty_set() {
        let config = ConceptMapConfig::default();
        let set = TopicScorer::new(&config).score(&CandidateSet::new(), &Corpus::default());
        assert!(set.topics.is_empty());
        assert!(set.thresholds.is_none());
    }
}
