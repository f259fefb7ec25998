//! Signal extraction: slide/page structure → TextUnits
//!
//! Pure transform, no scoring. Slides keep their title/body split and
//! their objectives/summary flags; plain page text is split into
//! paragraphs, each becoming a body unit at its own position.

use super::unit::{Location, Role, TextUnit};
use super::Corpus;
use crate::error::{ConceptMapError, ConceptMapResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

const OBJECTIVES_KEYWORDS: &[&str] = &[
    "learning objectives",
    "by the end",
    "you will",
    "objectives",
    "goals",
    "outcomes",
];

const SUMMARY_KEYWORDS: &[&str] = &[
    "key ideas",
    "summary",
    "takeaways",
    "main points",
    "important points",
    "key concepts",
    "recap",
];

/// All documents of one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSet {
    pub documents: Vec<DocumentInput>,
}

impl DocumentSet {
    pub fn new(documents: Vec<DocumentInput>) -> Self {
        Self { documents }
    }
}

/// One document as delivered by the text-extraction collaborator.
///
/// Slide decks carry `slides`; PDFs and OCR output carry plain `text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slides: Vec<SlideRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DocumentInput {
    pub fn slides(id: impl Into<String>, slides: Vec<SlideRecord>) -> Self {
        Self {
            id: id.into(),
            slides,
            text: None,
        }
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slides: Vec::new(),
            text: Some(text.into()),
        }
    }
}

/// Structural facts for one slide.
///
/// Flags left as `None` are detected from keywords in the slide text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideRecord {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_learning_objectives: Option<bool>,
    #[serde(default)]
    pub is_key_ideas: Option<bool>,
}

impl SlideRecord {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn objectives(mut self, flag: bool) -> Self {
        self.is_learning_objectives = Some(flag);
        self
    }

    pub fn key_ideas(mut self, flag: bool) -> Self {
        self.is_key_ideas = Some(flag);
        self
    }
}

/// Turns a [`DocumentSet`] into a validated [`Corpus`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, set: &DocumentSet) -> ConceptMapResult<Corpus> {
        let mut seen = HashSet::new();
        let mut units = Vec::new();

        for doc in &set.documents {
            if doc.id.trim().is_empty() {
                return Err(ConceptMapError::validation("<unknown>", 0, "document id is empty"));
            }
            if !seen.insert(doc.id.as_str()) {
                return Err(ConceptMapError::validation(&doc.id, 0, "duplicate document id"));
            }

            let before = units.len();
            if !doc.slides.is_empty() {
                extract_slides(doc, &mut units)?;
            } else if let Some(text) = &doc.text {
                extract_pages(&doc.id, text, &mut units);
            }

            if units.len() == before {
                debug!(document = %doc.id, "document produced no text units");
            }
        }

        Corpus::new(units)
    }
}

fn extract_slides(doc: &DocumentInput, units: &mut Vec<TextUnit>) -> ConceptMapResult<()> {
    let mut indexed: Vec<(usize, &SlideRecord)> = doc
        .slides
        .iter()
        .enumerate()
        .map(|(i, s)| (s.index.unwrap_or(i), s))
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    for pair in indexed.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(ConceptMapError::validation(
                &doc.id,
                pair[0].0,
                "duplicate slide index",
            ));
        }
    }

    let count = indexed.len();
    for (position, (_, slide)) in indexed.into_iter().enumerate() {
        let title = slide.title.as_deref().map(str::trim).unwrap_or("");
        let body = slide.body.as_deref().map(str::trim).unwrap_or("");
        let lowered = format!("{} {}", title, body).to_lowercase();

        let objectives = slide
            .is_learning_objectives
            .unwrap_or_else(|| has_keyword(&lowered, OBJECTIVES_KEYWORDS));
        let summary = slide
            .is_key_ideas
            .unwrap_or_else(|| has_keyword(&lowered, SUMMARY_KEYWORDS));

        let location = Location::new(&doc.id, position);
        let fraction = position_fraction(position, count);

        if !title.is_empty() {
            units.push(TextUnit::new(
                location.clone(),
                Role::for_slide(true, objectives, summary),
                title,
                fraction,
            ));
        }
        if !body.is_empty() {
            units.push(TextUnit::new(
                location,
                Role::for_slide(false, objectives, summary),
                body,
                fraction,
            ));
        }
    }
    Ok(())
}

fn extract_pages(document: &str, text: &str, units: &mut Vec<TextUnit>) {
    let paragraphs = split_paragraphs(text);
    let count = paragraphs.len();
    for (position, paragraph) in paragraphs.into_iter().enumerate() {
        units.push(TextUnit::new(
            Location::new(document, position),
            Role::Body,
            paragraph,
            position_fraction(position, count),
        ));
    }
}

/// Split on blank lines, dropping empty paragraphs.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

fn has_keyword(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowered.contains(k))
}

fn position_fraction(position: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        position as f64 / (count - 1) as f64
    }
}
