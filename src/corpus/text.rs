//! Text normalization and phrase matching shared by scoring, graph building
//! and retrieval.

use std::collections::BTreeSet;

/// Words never counted as significant for overlap scoring.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "that", "this", "these", "those", "are",
    "was", "were", "been", "being", "has", "have", "had", "not", "but", "its", "their",
    "our", "your", "you", "can", "will", "how", "why", "what", "when", "where", "which",
    "who", "all", "any", "each", "more", "most", "other", "some", "such", "than", "then",
    "there", "use", "using", "used", "via", "per", "also", "only", "over", "under",
];

/// Lowercase and collapse every whitespace run to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count whole-phrase occurrences of `needle` in `haystack`.
///
/// Both sides must already be normalized. A match must start and end on a
/// word boundary, so "art" does not match inside "start".
pub fn count_phrase(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() || needle.len() > haystack.len() {
        return 0;
    }
    let mut count = 0;
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();
        if is_boundary(haystack, start, end) {
            count += 1;
            from = end;
        } else {
            from = start + first_char_len(&haystack[start..]);
        }
        if from >= haystack.len() {
            break;
        }
    }
    count
}

/// Whole-phrase containment; see [`count_phrase`].
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    count_phrase(haystack, needle) > 0
}

fn is_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
}

fn first_char_len(s: &str) -> usize {
    s.chars().next().map_or(1, char::len_utf8)
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Alphanumeric words of at least three characters that are not stopwords.
pub fn significant_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !is_stopword(w))
        .collect()
}

/// Capitalize the first letter of each word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
