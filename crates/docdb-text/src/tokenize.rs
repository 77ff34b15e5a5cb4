use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Runs of Han ideographs or ASCII letters. Digits and punctuation separate terms.
static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\p{Han}a-zA-Z]+").ok());

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上", "也", "很", "到", "说",
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "as", "is", "are",
        "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will", "would", "could",
        "should", "may", "might", "can", "this", "that", "these", "those", "i", "you", "he", "she", "it", "we",
        "they", "what", "which", "who", "when", "where", "why", "how", "all", "each", "every", "both", "few", "more",
        "most", "other", "some", "such", "only", "own", "same", "so", "than", "too", "very", "just", "now",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Lower-cased terms of `text` in order of appearance, duplicates kept.
///
/// Length is measured in bytes, so a single ASCII letter is dropped while a
/// single ideograph (three bytes in UTF-8) survives.
pub fn tokenize(text: &str) -> Vec<String> {
    let Some(re) = WORD.as_ref() else { return Vec::new() };
    re.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() > 1 && !is_stop_word(w))
        .collect()
}
