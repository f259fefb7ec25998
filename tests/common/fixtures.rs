//! Fixture documents
//!
//! Small lecture decks with known structure: which topics sit in titles,
//! objectives and summaries, and which share slides.

use conceptmap::corpus::{Location, Role, TextUnit};
use conceptmap::{AnalysisPipeline, Corpus, DocumentInput, DocumentSet, SlideRecord};

/// Pipeline with default configuration and the hashing embedder.
pub fn pipeline() -> AnalysisPipeline {
    AnalysisPipeline::with_defaults()
}

/// Machine-learning lecture: objectives, four content slides, summary.
pub fn ml_lecture() -> DocumentInput {
    DocumentInput::slides(
        "ml-lecture",
        vec![
            SlideRecord::new(
                "Learning Objectives",
                "Explain gradient descent. Describe how backpropagation computes gradients.",
            ),
            SlideRecord::new(
                "Neural Network",
                "A neural network stacks layers of units. Each layer applies an activation function.",
            ),
            SlideRecord::new(
                "Gradient Descent",
                "Gradient descent updates weights against the gradient. The learning rate sets the step size.",
            ),
            SlideRecord::new(
                "Backpropagation",
                "Backpropagation applies the chain rule through the neural network to compute gradients for gradient descent.",
            ),
            SlideRecord::new(
                "Overfitting",
                "For example, a large neural network can memorize noise. Regularization such as dropout reduces overfitting.",
            ),
            SlideRecord::new(
                "Summary",
                "Gradient descent and backpropagation train the neural network.",
            ),
        ],
    )
}

/// Algorithms deck used where two documents are needed.
pub fn algorithms_deck() -> DocumentInput {
    DocumentInput::slides(
        "algorithms",
        vec![
            SlideRecord::new("Learning Objectives", "Understand recursion and merge sort."),
            SlideRecord::new(
                "Recursion",
                "A recursive function calls itself. Recursion needs a base case.",
            ),
            SlideRecord::new("Base Case", "The base case stops recursion."),
            SlideRecord::new("Merge Sort", "Merge sort uses recursion to sort both halves."),
            SlideRecord::new("Key Ideas", "Recursion and merge sort."),
        ],
    )
}

/// Plain page text split into paragraphs.
pub fn notes_document() -> DocumentInput {
    DocumentInput::text(
        "notes",
        "Hash tables map keys to buckets.\n\n\
         Collisions happen when two keys share a bucket.\n\n\
         Open addressing and chaining resolve collisions in hash tables.",
    )
}

/// Ten-slide deck of filler with `slides` placed on top, so that
/// positions 3..=6 sit outside the position-bonus window.
pub fn scored_deck(slides: &[(usize, Role, &str)]) -> Corpus {
    let mut units: Vec<TextUnit> = (0..10)
        .map(|p| {
            TextUnit::new(Location::new("deck", p), Role::Body, "filler text", p as f64 / 9.0)
        })
        .collect();
    for (pos, role, text) in slides {
        units.push(TextUnit::new(
            Location::new("deck", *pos),
            *role,
            *text,
            *pos as f64 / 9.0,
        ));
    }
    Corpus::new(units).expect("fixture corpus is valid")
}

pub fn document_set(documents: Vec<DocumentInput>) -> DocumentSet {
    DocumentSet::new(documents)
}
