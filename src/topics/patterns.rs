//! Candidate extraction from corpus text
//!
//! Detects:
//! - Headings: title-unit lines, numbered/bulleted short lines,
//!   ALL CAPS lines and Title Case lines
//! - Frequent bigrams and trigrams of alphabetic words
//!
//! External suggestions are merged into the same [`CandidateSet`].

use super::candidate::{Tier, TopicKey};
use crate::config::ExtractionConfig;
use crate::corpus::{text, Corpus};
use std::collections::HashMap;
use tracing::debug;

const MAX_HEADING_LINE_CHARS: usize = 100;

/// A named candidate before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
    pub key: TopicKey,
    pub display_name: String,
    pub suggested: Option<Tier>,
}

/// Deduplicated candidate names, in order of first insertion.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: Vec<CandidateEntry>,
    index: HashMap<TopicKey, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface form. A form whose key is already present merges into
    /// the existing entry: the first display name is kept and the suggested
    /// tier is raised to the more important of the two.
    ///
    /// Returns `true` if a new entry was created.
    pub fn add(&mut self, name: &str, suggested: Option<Tier>) -> bool {
        let key = TopicKey::new(name);
        if key.is_empty() {
            return false;
        }
        if let Some(&i) = self.index.get(&key) {
            let entry = &mut self.entries[i];
            entry.suggested = entry.suggested.max(suggested);
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(CandidateEntry {
            key,
            display_name: name.split_whitespace().collect::<Vec<_>>().join(" "),
            suggested,
        });
        true
    }

    pub fn entries(&self) -> &[CandidateEntry] {
        &self.entries
    }

    pub fn get(&self, key: &TopicKey) -> Option<&CandidateEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pattern-based candidate extraction.
pub struct CandidateExtractor<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> CandidateExtractor<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    /// Headings first, then bigrams, then trigrams; names outside the
    /// configured length range are discarded.
    pub fn extract(&self, corpus: &Corpus) -> CandidateSet {
        let mut set = CandidateSet::new();

        let headings = self.headings(corpus);
        let bigrams = self.ngrams(corpus, 2, self.config.max_bigrams);
        let trigrams = self.ngrams(corpus, 3, self.config.max_trigrams);
        debug!(
            headings = headings.len(),
            bigrams = bigrams.len(),
            trigrams = trigrams.len(),
            "extracted candidate patterns"
        );

        for name in headings.into_iter().chain(bigrams).chain(trigrams) {
            let len = name.chars().count();
            if len < self.config.min_name_chars || len > self.config.max_name_chars {
                continue;
            }
            set.add(&name, None);
        }
        set
    }

    fn headings(&self, corpus: &Corpus) -> Vec<String> {
        let mut headings = Vec::new();
        for unit in corpus.units() {
            for line in unit.raw_text.lines() {
                let line = line.trim();
                if line.is_empty() || line.chars().count() > MAX_HEADING_LINE_CHARS {
                    continue;
                }
                let heading = if unit.role.is_title() {
                    Some(display_form(strip_list_marker(line).unwrap_or(line)))
                } else if let Some(rest) = strip_list_marker(line) {
                    (rest.chars().count() > 3).then(|| display_form(rest))
                } else if is_all_caps(line) {
                    Some(text::title_case(&line.to_lowercase()))
                } else if is_title_case(line) {
                    Some(line.to_string())
                } else {
                    None
                };

                if let Some(h) = heading {
                    if h.chars().count() > 5 {
                        headings.push(h);
                    }
                }
                if headings.len() >= self.config.max_headings {
                    return headings;
                }
            }
        }
        headings
    }

    /// Most frequent n-grams, ties in order of first appearance.
    fn ngrams(&self, corpus: &Corpus, n: usize, limit: usize) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for unit in corpus.units() {
            let words: Vec<String> = unit
                .raw_text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| w.len() >= 3 && w.chars().all(|c| c.is_ascii_alphabetic()))
                .map(str::to_lowercase)
                .collect();

            for window in words.windows(n) {
                if text::is_stopword(&window[0]) || text::is_stopword(&window[n - 1]) {
                    continue;
                }
                let gram = window.join(" ");
                let count = counts.entry(gram.clone()).or_insert(0);
                if *count == 0 {
                    order.push(gram);
                }
                *count += 1;
            }
        }

        let mut frequent: Vec<(String, usize)> = order
            .into_iter()
            .filter_map(|g| {
                let c = counts[&g];
                (c >= self.config.min_ngram_frequency).then_some((g, c))
            })
            .collect();
        frequent.sort_by(|a, b| b.1.cmp(&a.1));
        frequent
            .into_iter()
            .take(limit)
            .map(|(g, _)| text::title_case(&g))
            .collect()
    }
}

/// `"1. Intro"`, `"- item"`, `"• item"`, `"* item"` → the text after the marker.
fn strip_list_marker(line: &str) -> Option<&str> {
    let rest = if let Some(r) = line.strip_prefix(['•', '-', '*']) {
        r
    } else {
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        line[digits..].trim_start_matches(['.', ')'])
    };
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

fn is_all_caps(line: &str) -> bool {
    let len = line.chars().count();
    len > 5
        && len < 80
        && line.chars().any(|c| c.is_alphabetic())
        && line.chars().all(|c| !c.is_lowercase())
}

/// Words of one capital followed by lowercase letters, single-space separated.
fn is_title_case(line: &str) -> bool {
    if line.chars().count() >= 80 {
        return false;
    }
    line.split(' ').all(|word| {
        let mut chars = word.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && word.len() > 1
            && chars.all(|c| c.is_ascii_lowercase())
    })
}

fn display_form(s: &str) -> String {
    if is_all_caps(s) {
        text::title_case(&s.to_lowercase())
    } else {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
