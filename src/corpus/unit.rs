//! TextUnit: one structural fact extracted from a document

use crate::error::{ConceptMapError, ConceptMapResult};
use serde::{Deserialize, Serialize};

/// Where a unit sits: document id plus position index (slide/page/paragraph).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub document: String,
    pub position: usize,
}

impl Location {
    pub fn new(document: impl Into<String>, position: usize) -> Self {
        Self {
            document: document.into(),
            position,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.document, self.position)
    }
}

/// Structural role of a unit within its slide or page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Title,
    Body,
    ObjectivesTitle,
    ObjectivesBody,
    SummaryTitle,
    SummaryBody,
}

impl Role {
    /// Any of the title roles
    pub fn is_title(self) -> bool {
        matches!(self, Role::Title | Role::ObjectivesTitle | Role::SummaryTitle)
    }

    pub fn is_objectives(self) -> bool {
        matches!(self, Role::ObjectivesTitle | Role::ObjectivesBody)
    }

    pub fn is_summary(self) -> bool {
        matches!(self, Role::SummaryTitle | Role::SummaryBody)
    }

    /// Role for a title or body line on a slide carrying the given flags.
    /// Objectives wins when a slide is flagged as both.
    pub fn for_slide(is_title: bool, objectives: bool, summary: bool) -> Self {
        match (is_title, objectives, summary) {
            (true, true, _) => Role::ObjectivesTitle,
            (true, false, true) => Role::SummaryTitle,
            (true, false, false) => Role::Title,
            (false, true, _) => Role::ObjectivesBody,
            (false, false, true) => Role::SummaryBody,
            (false, false, false) => Role::Body,
        }
    }
}

/// A single extracted fact. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    pub location: Location,
    pub role: Role,
    pub raw_text: String,
    /// Relative position of the unit's slide/page within its document, in `[0, 1]`
    pub position_fraction: f64,
}

/// TextUnit-shaped record as delivered by an extraction collaborator.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error naming the field, rather than silently
/// defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTextUnit {
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub position: Option<usize>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub position_fraction: Option<f64>,
}

impl TryFrom<RawTextUnit> for TextUnit {
    type Error = ConceptMapError;

    fn try_from(raw: RawTextUnit) -> ConceptMapResult<Self> {
        let position = raw.position.unwrap_or(0);
        let document = match raw.document {
            Some(d) if !d.trim().is_empty() => d,
            _ => {
                return Err(ConceptMapError::validation(
                    "<unknown>",
                    position,
                    "missing required field 'document'",
                ))
            }
        };
        let position = raw.position.ok_or_else(|| {
            ConceptMapError::validation(&document, 0, "missing required field 'position'")
        })?;
        let role = raw.role.ok_or_else(|| {
            ConceptMapError::validation(&document, position, "missing required field 'role'")
        })?;
        let raw_text = raw.text.ok_or_else(|| {
            ConceptMapError::validation(&document, position, "missing required field 'text'")
        })?;
        let position_fraction = raw.position_fraction.ok_or_else(|| {
            ConceptMapError::validation(
                &document,
                position,
                "missing required field 'position_fraction'",
            )
        })?;

        let unit = TextUnit {
            location: Location::new(document, position),
            role,
            raw_text,
            position_fraction,
        };
        unit.validate()?;
        Ok(unit)
    }
}

impl TextUnit {
    pub fn new(
        location: Location,
        role: Role,
        raw_text: impl Into<String>,
        position_fraction: f64,
    ) -> Self {
        Self {
            location,
            role,
            raw_text: raw_text.into(),
            position_fraction,
        }
    }

    /// Fail fast on values that would corrupt downstream scoring.
    pub fn validate(&self) -> ConceptMapResult<()> {
        if self.location.document.trim().is_empty() {
            return Err(ConceptMapError::validation(
                "<unknown>",
                self.location.position,
                "document id is empty",
            ));
        }
        if !(0.0..=1.0).contains(&self.position_fraction) {
            return Err(ConceptMapError::validation(
                &self.location.document,
                self.location.position,
                format!(
                    "position_fraction must be within [0, 1], got {}",
                    self.position_fraction
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_raw() -> RawTextUnit {
        RawTextUnit {
            document: Some("lecture-1".to_string()),
            position: Some(2),
            role: Some(Role::Title),
            text: Some("Recursion".to_string()),
            position_fraction: Some(0.5),
        }
    }

    #[test]
    fn complete_record_converts() {
        let unit = TextUnit::try_from(complete_raw()).unwrap();
        assert_eq!(unit.location, Location::new("lecture-1", 2));
        assert_eq!(unit.role, Role::Title);
    }

    #[test]
    fn missing_role_fails_fast() {
        let raw = RawTextUnit {
            role: None,
            ..complete_raw()
        };
        let err = TextUnit::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("'role'"));
        assert!(err.to_string().contains("lecture-1"));
    }

    #[test]
    fn missing_document_fails_fast() {
        let raw = RawTextUnit {
            document: None,
            ..complete_raw()
        };
        assert!(TextUnit::try_from(raw).unwrap_err().to_string().contains("'document'"));
    }

    #[test]
    fn fraction_out_of_range_rejected() {
        let raw = RawTextUnit {
            position_fraction: Some(1.5),
            ..complete_raw()
        };
        assert!(matches!(
            TextUnit::try_from(raw),
            Err(ConceptMapError::Validation { .. })
        ));

        let raw = RawTextUnit {
            position_fraction: Some(f64::NAN),
            ..complete_raw()
        };
        assert!(TextUnit::try_from(raw).is_err());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::ObjectivesBody).unwrap();
        assert_eq!(json, "\"objectives_body\"");
        let role: Role = serde_json::from_str("\"summary_title\"").unwrap();
        assert_eq!(role, Role::SummaryTitle);
    }

    #[test]
    fn raw_record_deserializes_with_missing_fields() {
        let raw: RawTextUnit =
            serde_json::from_str(r#"{"document": "d", "position": 0, "text": "x"}"#).unwrap();
        assert!(raw.role.is_none());
        assert!(TextUnit::try_from(raw).is_err());
    }

    #[test]
    fn slide_roles_prefer_objectives() {
        assert_eq!(Role::for_slide(true, true, true), Role::ObjectivesTitle);
        assert_eq!(Role::for_slide(false, false, true), Role::SummaryBody);
        assert_eq!(Role::for_slide(false, false, false), Role::Body);
        assert!(Role::ObjectivesTitle.is_title());
        assert!(Role::ObjectivesTitle.is_objectives());
        assert!(!Role::SummaryBody.is_title());
    }
}
