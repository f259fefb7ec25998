//! Extracted text corpus
//!
//! The corpus is the read-only input shared by every stage of one analysis
//! run: the ordered TextUnits, their normalized text, and the structural
//! segments (slides/pages) they group into.

mod chunk;
mod extract;
pub mod text;
mod unit;

pub use chunk::{EvidenceChunk, EvidenceCorpus, StructuralMarks};
pub use extract::{DocumentInput, DocumentSet, SignalExtractor, SlideRecord};
pub use unit::{Location, RawTextUnit, Role, TextUnit};

use crate::error::ConceptMapResult;
use std::collections::HashMap;

/// One structural unit (slide or page): all TextUnits sharing a location.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub location: Location,
    /// Indices into the corpus of units with a title role
    pub title_units: Vec<usize>,
    /// Indices into the corpus of units with a body role
    pub body_units: Vec<usize>,
}

impl Segment {
    fn new(location: Location) -> Self {
        Self {
            location,
            title_units: Vec::new(),
            body_units: Vec::new(),
        }
    }

    /// All unit indices, titles first
    pub fn unit_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.title_units.iter().chain(self.body_units.iter()).copied()
    }
}

/// Validated, ordered collection of TextUnits for one document set.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    units: Vec<TextUnit>,
    normalized: Vec<String>,
    segments: Vec<Segment>,
    /// Document id → number of positions (max position + 1)
    position_counts: HashMap<String, usize>,
    /// Document ids in order of first appearance
    documents: Vec<String>,
}

impl Corpus {
    /// Build a corpus from units in corpus order, validating each one.
    pub fn new(units: Vec<TextUnit>) -> ConceptMapResult<Self> {
        for unit in &units {
            unit.validate()?;
        }

        let normalized = units.iter().map(|u| text::normalize(&u.raw_text)).collect();

        let mut segments: Vec<Segment> = Vec::new();
        let mut segment_index: HashMap<Location, usize> = HashMap::new();
        let mut position_counts: HashMap<String, usize> = HashMap::new();
        let mut documents = Vec::new();

        for (i, unit) in units.iter().enumerate() {
            let seg = *segment_index
                .entry(unit.location.clone())
                .or_insert_with(|| {
                    segments.push(Segment::new(unit.location.clone()));
                    segments.len() - 1
                });
            if unit.role.is_title() {
                segments[seg].title_units.push(i);
            } else {
                segments[seg].body_units.push(i);
            }

            let count = position_counts
                .entry(unit.location.document.clone())
                .or_insert_with(|| {
                    documents.push(unit.location.document.clone());
                    0
                });
            *count = (*count).max(unit.location.position + 1);
        }

        Ok(Self {
            units,
            normalized,
            segments,
            position_counts,
            documents,
        })
    }

    /// Build a corpus from collaborator records, failing on the first malformed one.
    pub fn from_raw_units(raw: Vec<RawTextUnit>) -> ConceptMapResult<Self> {
        let units = raw
            .into_iter()
            .map(TextUnit::try_from)
            .collect::<ConceptMapResult<Vec<_>>>()?;
        Self::new(units)
    }

    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&TextUnit> {
        self.units.get(index)
    }

    /// Lowercased, whitespace-collapsed text of a unit
    pub fn normalized_text(&self, index: usize) -> &str {
        self.normalized.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Number of positions in a document (0 for an unknown document)
    pub fn position_count(&self, document: &str) -> usize {
        self.position_counts.get(document).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Pairs of segment indices that are consecutive positions of the same document.
    pub fn adjacent_segments(&self) -> Vec<(usize, usize)> {
        let mut by_location: Vec<(&Location, usize)> = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.location, i))
            .collect();
        by_location.sort();

        by_location
            .windows(2)
            .filter(|w| {
                w[0].0.document == w[1].0.document && w[0].0.position + 1 == w[1].0.position
            })
            .map(|w| (w[0].1, w[1].1))
            .collect()
    }

    /// Whole-corpus text, documents separated by blank lines.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        let mut last_doc: Option<&str> = None;
        for unit in &self.units {
            if let Some(doc) = last_doc {
                out.push_str(if doc == unit.location.document { "\n" } else { "\n\n" });
            }
            out.push_str(&unit.raw_text);
            last_doc = Some(unit.location.document.as_str());
        }
        out
    }
}
