//! Word frequency over post and comment text.
//!
//! Text is normalized (curly quotes to straight, Unicode lowercase) and split into word
//! tokens: runs of letters, marks and digits, with apostrophes allowed between them
//! (`don't` is one token). Punctuation never forms a token.

use crate::archive::ArchiveStore;
use crate::date::Window;
use ahash::AHashSet;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const TOKEN_PATTERN: &str = r"[\p{L}\p{M}\p{N}]+(?:'[\p{L}\p{M}\p{N}]+)*";

/// English stop words (the NLTK list).
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "couldn", "couldn't", "d", "did", "didn", "didn't",
    "do", "does", "doesn", "doesn't", "doing", "don", "don't", "down", "during", "each", "few",
    "for", "from", "further", "had", "hadn", "hadn't", "has", "hasn", "hasn't", "have", "haven",
    "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "i", "if", "in", "into", "is", "isn", "isn't", "it", "it's", "its", "itself", "just", "ll",
    "m", "ma", "me", "mightn", "mightn't", "more", "most", "mustn", "mustn't", "my", "myself",
    "needn", "needn't", "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan",
    "shan't", "she", "she's", "should", "should've", "shouldn", "shouldn't", "so", "some",
    "such", "t", "than", "that", "that'll", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "ve", "very", "was", "wasn", "wasn't", "we", "were", "weren", "weren't", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "won", "won't", "wouldn",
    "wouldn't", "y", "you", "you'd", "you'll", "you're", "you've", "your", "yours", "yourself",
    "yourselves",
];

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("static token pattern"))
}

fn stop_words() -> &'static AHashSet<&'static str> {
    static SET: OnceLock<AHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(token: &str) -> bool {
    stop_words().contains(token)
}

/// Straighten curly quotes and lowercase.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Normalized word tokens of `text`, stop words included.
pub fn tokenize(text: &str) -> Vec<String> {
    let norm = normalize_text(text);
    token_re().find_iter(&norm).map(|m| m.as_str().to_string()).collect()
}

fn count_into(freq: &mut BTreeMap<String, u64>, text: &str) {
    for tok in tokenize(text) {
        if tok.is_empty() || is_stop_word(&tok) { continue; }
        *freq.entry(tok).or_insert(0) += 1;
    }
}

/// Token -> occurrences across posts and comments in the window, optionally restricted
/// to one author. Stop words are excluded.
pub fn word_frequency(store: &ArchiveStore, author: Option<&str>, window: &Window) -> BTreeMap<String, u64> {
    let mut freq = BTreeMap::new();
    let wanted = |a: &Option<String>| author.map_or(true, |u| a.as_deref() == Some(u));

    for (post, thread) in store.all() {
        if wanted(&post.author_id) && window.contains(post.created_at) {
            count_into(&mut freq, &post.text);
        }
        for c in thread {
            if wanted(&c.author_id) && window.contains(c.created_at) {
                count_into(&mut freq, &c.text);
            }
        }
    }
    freq
}

/// The `n` most frequent tokens, most frequent first (ties alphabetical).
pub fn top_words(freq: &BTreeMap<String, u64>, n: usize) -> Vec<(&str, u64)> {
    let mut v: Vec<(&str, u64)> = freq.iter().map(|(k, c)| (k.as_str(), *c)).collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    v.truncate(n);
    v
}
