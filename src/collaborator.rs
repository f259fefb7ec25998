//! Generative-model collaborators
//!
//! Topic suggestions and pairwise relationship judgments come from a
//! generative model outside the core. The core only sees the structured
//! results, through two async traits:
//! - `TopicSuggester`: corpus text → ranked `(name, suggested tier)` list
//! - `RelationshipJudge`: two topic names plus shared context → judgment
//!
//! `ModelTopicSuggester` / `ModelRelationshipJudge` adapt any [`TextModel`]
//! (prompt in, free-text reply out) by parsing the first JSON array in the
//! reply. `StaticSuggester` / `StaticJudge` are deterministic stand-ins.

use crate::corpus::text;
use crate::topics::Tier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Corpus text sent to a suggester is truncated to this many characters.
pub const MAX_SUGGESTER_INPUT_CHARS: usize = 8000;

/// Errors from collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("collaborator not available: {0}")]
    Unavailable(String),
    #[error("invocation failed: {0}")]
    InvocationFailed(String),
    #[error("response parse error: {0}")]
    ParseError(String),
}

/// An externally suggested topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSuggestion {
    pub name: String,
    pub tier: Tier,
}

impl TopicSuggestion {
    pub fn new(name: impl Into<String>, tier: Tier) -> Self {
        Self {
            name: name.into(),
            tier,
        }
    }
}

/// A parent→child relationship asserted by an external judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipJudgment {
    pub parent: String,
    pub child: String,
}

impl RelationshipJudgment {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

/// Verdict on an ordered pair `(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    /// `a` is the parent of `b`
    ParentChild,
    /// `b` is the parent of `a`
    ChildParent,
    Unrelated,
}

#[async_trait]
pub trait TopicSuggester: Send + Sync {
    async fn suggest(&self, corpus_text: &str) -> Result<Vec<TopicSuggestion>, CollaboratorError>;
}

#[async_trait]
pub trait RelationshipJudge: Send + Sync {
    async fn judge(&self, a: &str, b: &str, context: &str) -> Result<Judgment, CollaboratorError>;
}

/// Prompt-in, reply-out transport to a generative model.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

#[async_trait]
impl<M: TextModel + ?Sized> TextModel for Arc<M> {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError> {
        (**self).complete(prompt).await
    }
}

/// Suggester backed by a [`TextModel`].
pub struct ModelTopicSuggester<M> {
    model: M,
}

impl<M: TextModel> ModelTopicSuggester<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: TextModel> TopicSuggester for ModelTopicSuggester<M> {
    async fn suggest(&self, corpus_text: &str) -> Result<Vec<TopicSuggestion>, CollaboratorError> {
        let excerpt = truncate_chars(corpus_text, MAX_SUGGESTER_INPUT_CHARS);
        let prompt = format!(
            "List the main topics of this course material, most important first. \
             Reply with a JSON array of objects {{\"name\": string, \"importance\": \
             \"exam_critical\" | \"core\" | \"extra\"}}.\n\n{}",
            excerpt
        );
        let reply = self.model.complete(&prompt).await?;
        parse_topic_suggestions(&reply)
    }
}

/// Judge backed by a [`TextModel`].
pub struct ModelRelationshipJudge<M> {
    model: M,
}

impl<M: TextModel> ModelRelationshipJudge<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: TextModel> RelationshipJudge for ModelRelationshipJudge<M> {
    async fn judge(&self, a: &str, b: &str, context: &str) -> Result<Judgment, CollaboratorError> {
        let prompt = format!(
            "Is one of these topics a prerequisite or parent of the other?\n\
             Topic A: {}\nTopic B: {}\nContext:\n{}\n\n\
             Reply with a JSON array of {{\"parent\": string, \"child\": string}} \
             objects, or [] if they are unrelated.",
            a, b, context
        );
        let reply = self.model.complete(&prompt).await?;
        let judgments = parse_relationship_judgments(&reply, &[a, b])?;
        Ok(judgment_for(&judgments, a, b))
    }
}

/// Locate the first top-level JSON array in free text.
fn first_json_array(reply: &str) -> Option<&str> {
    let start = reply.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in reply[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_array(reply: &str) -> Result<Vec<serde_json::Value>, CollaboratorError> {
    let array = first_json_array(reply)
        .ok_or_else(|| CollaboratorError::ParseError("no JSON array in reply".to_string()))?;
    serde_json::from_str(array).map_err(|e| CollaboratorError::ParseError(e.to_string()))
}

/// Parse `[{"name": ..., "importance": ...}]` out of a model reply.
///
/// Entries without a name are skipped; a missing or unknown importance
/// label defaults to `core`.
pub fn parse_topic_suggestions(reply: &str) -> Result<Vec<TopicSuggestion>, CollaboratorError> {
    Ok(parse_array(reply)?
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            let tier = item
                .get("importance")
                .and_then(|v| v.as_str())
                .and_then(Tier::parse)
                .unwrap_or(Tier::Core);
            Some(TopicSuggestion::new(name, tier))
        })
        .collect())
}

/// Parse `[{"parent": ..., "child": ...}]` out of a model reply, dropping
/// judgments that name a topic outside `known` or relate a topic to itself.
pub fn parse_relationship_judgments(
    reply: &str,
    known: &[&str],
) -> Result<Vec<RelationshipJudgment>, CollaboratorError> {
    let known: Vec<String> = known.iter().map(|k| text::normalize(k)).collect();
    let is_known = |name: &str| known.contains(&text::normalize(name));

    Ok(parse_array(reply)?
        .iter()
        .filter_map(|item| {
            let parent = item.get("parent")?.as_str()?;
            let child = item.get("child")?.as_str()?;
            if !is_known(parent) || !is_known(child) {
                return None;
            }
            if text::normalize(parent) == text::normalize(child) {
                return None;
            }
            Some(RelationshipJudgment::new(parent, child))
        })
        .collect())
}

fn judgment_for(judgments: &[RelationshipJudgment], a: &str, b: &str) -> Judgment {
    let (a, b) = (text::normalize(a), text::normalize(b));
    for j in judgments {
        let (parent, child) = (text::normalize(&j.parent), text::normalize(&j.child));
        if parent == a && child == b {
            return Judgment::ParentChild;
        }
        if parent == b && child == a {
            return Judgment::ChildParent;
        }
    }
    Judgment::Unrelated
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Suggester that returns a fixed list, or fails when unavailable.
pub struct StaticSuggester {
    available: bool,
    suggestions: Vec<TopicSuggestion>,
}

impl StaticSuggester {
    pub fn available(suggestions: Vec<TopicSuggestion>) -> Self {
        Self {
            available: true,
            suggestions,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            suggestions: Vec::new(),
        }
    }
}

#[async_trait]
impl TopicSuggester for StaticSuggester {
    async fn suggest(&self, _corpus_text: &str) -> Result<Vec<TopicSuggestion>, CollaboratorError> {
        if !self.available {
            return Err(CollaboratorError::Unavailable(
                "static suggester configured as unavailable".to_string(),
            ));
        }
        Ok(self.suggestions.clone())
    }
}

/// Judge answering from a fixed parent→child table; any other pair is unrelated.
pub struct StaticJudge {
    available: bool,
    parents: HashSet<(String, String)>,
}

impl StaticJudge {
    pub fn available() -> Self {
        Self {
            available: true,
            parents: HashSet::new(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            parents: HashSet::new(),
        }
    }

    pub fn with_parent(mut self, parent: &str, child: &str) -> Self {
        self.parents
            .insert((text::normalize(parent), text::normalize(child)));
        self
    }
}

#[async_trait]
impl RelationshipJudge for StaticJudge {
    async fn judge(&self, a: &str, b: &str, _context: &str) -> Result<Judgment, CollaboratorError> {
        if !self.available {
            return Err(CollaboratorError::Unavailable(
                "static judge configured as unavailable".to_string(),
            ));
        }
        let (a, b) = (text::normalize(a), text::normalize(b));
        if self.parents.contains(&(a.clone(), b.clone())) {
            Ok(Judgment::ParentChild)
        } else if self.parents.contains(&(b, a)) {
            Ok(Judgment::ChildParent)
        } else {
            Ok(Judgment::Unrelated)
        }
    }
}

/// Model returning one canned reply for every prompt.
pub struct CannedModel {
    reply: Result<String, String>,
}

impl CannedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
        }
    }
}

#[async_trait]
impl TextModel for CannedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, CollaboratorError> {
        self.reply
            .clone()
            .map_err(CollaboratorError::InvocationFailed)
    }
}
