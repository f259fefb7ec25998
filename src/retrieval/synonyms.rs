//! Related-term table for direct-mention scoring

use crate::corpus::text;
use std::collections::BTreeMap;

/// Built-in related terms for common machine-learning topics.
const BUILTIN: &[(&str, &[&str])] = &[
    (
        "backpropagation",
        &["gradient descent", "loss derivative", "chain rule", "neural network training"],
    ),
    (
        "gradient descent",
        &["backpropagation", "optimization", "learning rate", "loss function"],
    ),
    ("activation function", &["sigmoid", "relu", "tanh", "neural activation"]),
    ("neural network", &["deep learning", "artificial neural network", "ann", "mlp"]),
    ("overfitting", &["regularization", "generalization", "bias variance"]),
    ("regularization", &["overfitting", "dropout", "weight decay", "l2"]),
];

/// Topic phrase → related terms. The first entry whose phrase occurs in a
/// topic name supplies that topic's synonyms.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (phrase, terms) in BUILTIN {
            table.insert(phrase, terms.iter().copied());
        }
        table
    }
}

impl SynonymTable {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Built-in table extended with configured entries.
    pub fn with_extra(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let mut table = Self::default();
        for (phrase, terms) in extra {
            table.insert(phrase, terms.iter().map(String::as_str));
        }
        table
    }

    /// Add terms for a phrase; terms for an existing phrase are appended.
    pub fn insert<'t>(&mut self, phrase: &str, terms: impl IntoIterator<Item = &'t str>) {
        let phrase = text::normalize(phrase);
        if phrase.is_empty() {
            return;
        }
        let terms = terms.into_iter().map(text::normalize).filter(|t| !t.is_empty());
        match self.entries.iter_mut().find(|(p, _)| *p == phrase) {
            Some((_, existing)) => {
                for term in terms {
                    if !existing.contains(&term) {
                        existing.push(term);
                    }
                }
            }
            None => self.entries.push((phrase, terms.collect())),
        }
    }

    /// Related terms for a topic name, excluding the name itself.
    pub fn synonyms_for(&self, topic: &str) -> Vec<&str> {
        let topic = text::normalize(topic);
        self.entries
            .iter()
            .find(|(phrase, _)| text::contains_phrase(&topic, phrase))
            .map(|(_, terms)| {
                terms
                    .iter()
                    .map(String::as_str)
                    .filter(|t| *t != topic)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_entries_match_by_phrase() {
        let table = SynonymTable::default();
        let syns = table.synonyms_for("Stochastic Gradient Descent");
        assert!(syns.contains(&"learning rate"));
        assert!(syns.contains(&"backpropagation"));
        assert!(table.synonyms_for("Heap Sort").is_empty());
    }

    #[test]
    fn first_matching_entry_wins() {
        let table = SynonymTable::default();
        // "backpropagation" is listed before "neural network"
        let syns = table.synonyms_for("Backpropagation in a Neural Network");
        assert!(syns.contains(&"chain rule"));
        assert!(!syns.contains(&"mlp"));
    }

    #[test]
    fn configured_entries_extend_table() {
        let mut extra = BTreeMap::new();
        extra.insert("Recursion".to_string(), vec!["Base Case".to_string()]);
        extra.insert("overfitting".to_string(), vec!["early stopping".to_string()]);
        let table = SynonymTable::with_extra(&extra);

        assert_eq!(table.synonyms_for("recursion"), vec!["base case"]);
        assert!(table.synonyms_for("overfitting").contains(&"early stopping"));
        assert!(table.synonyms_for("overfitting").contains(&"regularization"));
    }

    #[test]
    fn empty_table_has_no_synonyms() {
        assert!(SynonymTable::empty().synonyms_for("gradient descent").is_empty());
    }
}
