//! Analysis configuration.
//!
//! Every point value and threshold used by the pipeline is a field here.
//! All fields carry serde defaults, so a YAML file only needs to name the
//! values it overrides.

use crate::error::{ConceptMapError, ConceptMapResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptMapConfig {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub tiers: TierConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub centrality: CentralityConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl ConceptMapConfig {
    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml_str(text: &str) -> ConceptMapResult<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConceptMapResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Load `path` if given, else the default location if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> ConceptMapResult<Self> {
        match path {
            Some(p) => Self::from_yaml_file(p),
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_yaml_file(p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reject values that would make thresholds or scores meaningless.
    pub fn validate(&self) -> ConceptMapResult<()> {
        let s = &self.scoring;
        let weights = [
            ("scoring.title", s.title),
            ("scoring.objectives_title", s.objectives_title),
            ("scoring.objectives_body", s.objectives_body),
            ("scoring.summary_title", s.summary_title),
            ("scoring.summary_body", s.summary_body),
            ("scoring.body_occurrence", s.body_occurrence),
            ("scoring.position_bonus", s.position_bonus),
            ("graph.co_occurrence", self.graph.co_occurrence),
            ("graph.containment", self.graph.containment),
            ("graph.adjacency", self.graph.adjacency),
            ("graph.external_judgment", self.graph.external_judgment),
            ("graph.min_edge_weight", self.graph.min_edge_weight),
            ("centrality.boost", self.centrality.boost),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConceptMapError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let fractions = [
            ("scoring.position_window", s.position_window),
            ("tiers.exam_critical_fraction", self.tiers.exam_critical_fraction),
            ("tiers.core_fraction", self.tiers.core_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConceptMapError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.tiers.core_fraction > self.tiers.exam_critical_fraction {
            return Err(ConceptMapError::InvalidConfig(
                "tiers.core_fraction must not exceed tiers.exam_critical_fraction".to_string(),
            ));
        }

        let g = &self.graph;
        if !(0.0..1.0).contains(&g.similarity_floor) {
            return Err(ConceptMapError::InvalidConfig(format!(
                "graph.similarity_floor must be within [0, 1), got {}",
                g.similarity_floor
            )));
        }
        if g.similarity_min_weight > g.similarity_max_weight {
            return Err(ConceptMapError::InvalidConfig(
                "graph.similarity_min_weight must not exceed graph.similarity_max_weight".to_string(),
            ));
        }

        if self.retrieval.default_k == 0 {
            return Err(ConceptMapError::InvalidConfig(
                "retrieval.default_k must be at least 1".to_string(),
            ));
        }
        if self.retrieval.chunk_chars < 20 {
            return Err(ConceptMapError::InvalidConfig(format!(
                "retrieval.chunk_chars must be at least 20, got {}",
                self.retrieval.chunk_chars
            )));
        }

        Ok(())
    }
}

/// `~/.config/conceptmap/config.yaml` (or the platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("conceptmap").join("config.yaml"))
}

/// Candidate name extraction from corpus text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_max_headings")]
    pub max_headings: usize,
    #[serde(default = "default_max_bigrams")]
    pub max_bigrams: usize,
    #[serde(default = "default_max_trigrams")]
    pub max_trigrams: usize,
    /// Minimum frequency for an n-gram to become a candidate
    #[serde(default = "default_min_ngram_frequency")]
    pub min_ngram_frequency: usize,
    #[serde(default = "default_min_name_chars")]
    pub min_name_chars: usize,
    #[serde(default = "default_max_name_chars")]
    pub max_name_chars: usize,
    /// Candidates mentioned fewer times than this are dropped before scoring
    #[serde(default = "default_min_mentions")]
    pub min_mentions: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_headings: default_max_headings(),
            max_bigrams: default_max_bigrams(),
            max_trigrams: default_max_trigrams(),
            min_ngram_frequency: default_min_ngram_frequency(),
            min_name_chars: default_min_name_chars(),
            max_name_chars: default_max_name_chars(),
            min_mentions: default_min_mentions(),
        }
    }
}

fn default_max_headings() -> usize {
    20
}
fn default_max_bigrams() -> usize {
    15
}
fn default_max_trigrams() -> usize {
    10
}
fn default_min_ngram_frequency() -> usize {
    2
}
fn default_min_name_chars() -> usize {
    5
}
fn default_max_name_chars() -> usize {
    100
}
fn default_min_mentions() -> usize {
    1
}

/// Per-mention point values for the topic scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_title")]
    pub title: f64,
    #[serde(default = "default_objectives_title")]
    pub objectives_title: f64,
    #[serde(default = "default_objectives_body")]
    pub objectives_body: f64,
    #[serde(default = "default_summary_title")]
    pub summary_title: f64,
    #[serde(default = "default_summary_body")]
    pub summary_body: f64,
    /// Points per occurrence in plain body text
    #[serde(default = "default_body_occurrence")]
    pub body_occurrence: f64,
    #[serde(default = "default_position_bonus")]
    pub position_bonus: f64,
    /// Fraction of a document counted as its opening or closing stretch
    #[serde(default = "default_position_window")]
    pub position_window: f64,
    /// The opening/closing stretch is never shorter than this many units
    #[serde(default = "default_position_min_units")]
    pub position_min_units: usize,
    #[serde(default = "default_suggested_exam_critical")]
    pub suggested_exam_critical: f64,
    #[serde(default = "default_suggested_core")]
    pub suggested_core: f64,
    #[serde(default)]
    pub suggested_extra: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            objectives_title: default_objectives_title(),
            objectives_body: default_objectives_body(),
            summary_title: default_summary_title(),
            summary_body: default_summary_body(),
            body_occurrence: default_body_occurrence(),
            position_bonus: default_position_bonus(),
            position_window: default_position_window(),
            position_min_units: default_position_min_units(),
            suggested_exam_critical: default_suggested_exam_critical(),
            suggested_core: default_suggested_core(),
            suggested_extra: 0.0,
        }
    }
}

fn default_title() -> f64 {
    10.0
}
fn default_objectives_title() -> f64 {
    15.0
}
fn default_objectives_body() -> f64 {
    8.0
}
fn default_summary_title() -> f64 {
    12.0
}
fn default_summary_body() -> f64 {
    6.0
}
fn default_body_occurrence() -> f64 {
    1.0
}
fn default_position_bonus() -> f64 {
    3.0
}
fn default_position_window() -> f64 {
    0.10
}
fn default_position_min_units() -> usize {
    3
}
fn default_suggested_exam_critical() -> f64 {
    4.0
}
fn default_suggested_core() -> f64 {
    2.0
}

/// Distribution-relative tier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Absolute floor for the exam-critical cut
    #[serde(default = "default_exam_critical_floor")]
    pub exam_critical_floor: f64,
    #[serde(default = "default_exam_critical_fraction")]
    pub exam_critical_fraction: f64,
    /// Absolute floor for the core cut
    #[serde(default = "default_core_floor")]
    pub core_floor: f64,
    #[serde(default = "default_core_fraction")]
    pub core_fraction: f64,
    /// Single-mention topics scoring below this are forced to extra
    #[serde(default = "default_single_mention_ceiling")]
    pub single_mention_ceiling: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            exam_critical_floor: default_exam_critical_floor(),
            exam_critical_fraction: default_exam_critical_fraction(),
            core_floor: default_core_floor(),
            core_fraction: default_core_fraction(),
            single_mention_ceiling: default_single_mention_ceiling(),
        }
    }
}

fn default_exam_critical_floor() -> f64 {
    15.0
}
fn default_exam_critical_fraction() -> f64 {
    0.70
}
fn default_core_floor() -> f64 {
    8.0
}
fn default_core_fraction() -> f64 {
    0.30
}
fn default_single_mention_ceiling() -> f64 {
    5.0
}

/// Edge signal weights and filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_co_occurrence")]
    pub co_occurrence: f64,
    #[serde(default = "default_containment")]
    pub containment: f64,
    #[serde(default = "default_adjacency")]
    pub adjacency: f64,
    #[serde(default = "default_external_judgment")]
    pub external_judgment: f64,
    /// Cosine similarity below this contributes nothing
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f64,
    #[serde(default = "default_similarity_min_weight")]
    pub similarity_min_weight: f64,
    #[serde(default = "default_similarity_max_weight")]
    pub similarity_max_weight: f64,
    /// Edges with a smaller total weight are dropped
    #[serde(default = "default_min_edge_weight")]
    pub min_edge_weight: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            co_occurrence: default_co_occurrence(),
            containment: default_containment(),
            adjacency: default_adjacency(),
            external_judgment: default_external_judgment(),
            similarity_floor: default_similarity_floor(),
            similarity_min_weight: default_similarity_min_weight(),
            similarity_max_weight: default_similarity_max_weight(),
            min_edge_weight: default_min_edge_weight(),
        }
    }
}

fn default_co_occurrence() -> f64 {
    3.0
}
fn default_containment() -> f64 {
    4.0
}
fn default_adjacency() -> f64 {
    0.5
}
fn default_external_judgment() -> f64 {
    10.0
}
fn default_similarity_floor() -> f64 {
    0.6
}
fn default_similarity_min_weight() -> f64 {
    0.5
}
fn default_similarity_max_weight() -> f64 {
    1.0
}
fn default_min_edge_weight() -> f64 {
    2.0
}

/// Second scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    /// Score added for a topic with the highest degree in the graph
    #[serde(default = "default_centrality_boost")]
    pub boost: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            boost: default_centrality_boost(),
        }
    }
}

fn default_centrality_boost() -> f64 {
    2.0
}

/// Evidence retrieval scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_k")]
    pub default_k: usize,
    /// Maximum characters per evidence chunk
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    #[serde(default = "default_exact_phrase")]
    pub exact_phrase: f64,
    #[serde(default = "default_word_overlap")]
    pub word_overlap: f64,
    #[serde(default = "default_synonym")]
    pub synonym: f64,
    /// Cosine similarity 1.0 maps to this many points
    #[serde(default = "default_semantic_scale")]
    pub semantic_scale: f64,
    #[serde(default = "default_title_bonus")]
    pub title_bonus: f64,
    #[serde(default = "default_objectives_bonus")]
    pub objectives_bonus: f64,
    #[serde(default = "default_summary_bonus")]
    pub summary_bonus: f64,
    #[serde(default = "default_example_bonus")]
    pub example_bonus: f64,
    /// Prefix length used to collapse near-duplicate snippets
    #[serde(default = "default_dedup_prefix_chars")]
    pub dedup_prefix_chars: usize,
    /// Extra related terms per topic phrase, merged over the built-in table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            chunk_chars: default_chunk_chars(),
            exact_phrase: default_exact_phrase(),
            word_overlap: default_word_overlap(),
            synonym: default_synonym(),
            semantic_scale: default_semantic_scale(),
            title_bonus: default_title_bonus(),
            objectives_bonus: default_objectives_bonus(),
            summary_bonus: default_summary_bonus(),
            example_bonus: default_example_bonus(),
            dedup_prefix_chars: default_dedup_prefix_chars(),
            synonyms: BTreeMap::new(),
        }
    }
}

fn default_k() -> usize {
    5
}
fn default_chunk_chars() -> usize {
    500
}
fn default_exact_phrase() -> f64 {
    15.0
}
fn default_word_overlap() -> f64 {
    2.0
}
fn default_synonym() -> f64 {
    5.0
}
fn default_semantic_scale() -> f64 {
    10.0
}
fn default_title_bonus() -> f64 {
    8.0
}
fn default_objectives_bonus() -> f64 {
    10.0
}
fn default_summary_bonus() -> f64 {
    7.0
}
fn default_example_bonus() -> f64 {
    3.0
}
fn default_dedup_prefix_chars() -> usize {
    100
}
