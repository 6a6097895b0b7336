//! English language helpers for term generation and noise filtering.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_BREAKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Words ignored when deciding whether a response was fully understood.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
        "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
        "these", "they", "this", "to", "was", "will", "with",
    ]
    .into_iter()
    .collect()
});

pub static ARTICLES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["a", "an", "the"].into_iter().collect());

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// True if `word` is entirely punctuation, whitespace or control characters.
pub fn non_word(word: &str) -> bool {
    !word.chars().any(is_word_char)
}

/// True if `word` is a number, a non-word or a stop word.
pub fn noise_word(word: &str) -> bool {
    word.trim().parse::<f64>().is_ok() || noise_response(word)
}

/// True if `word` can be ignored in a response.
pub fn noise_response(word: &str) -> bool {
    non_word(word) || STOP_WORDS.contains(word.to_lowercase().as_str())
}

pub fn article_or_none(word: &str) -> bool {
    non_word(word) || ARTICLES.contains(word)
}

pub fn non_noise_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    words.into_iter().filter(|word| !noise_response(word)).collect()
}

/// Breaks input into runs of word characters.
pub fn word_break(input: &str) -> Vec<&str> {
    WORD_BREAKER.find_iter(input).map(|m| m.as_str()).collect()
}

pub fn number_of_words(input: &str) -> usize {
    WORD_BREAKER.find_iter(input).count()
}

/// Splits an identifier into words on `_`, case changes and letter/digit boundaries.
///
/// `PizzaSize` becomes `Pizza Size`, `delivery_address` becomes `delivery address`.
pub fn camel_case(original: &str) -> String {
    let name: Vec<char> = original.trim().chars().collect();
    let Some(&head) = name.first() else {
        return String::new();
    };
    let mut builder = String::with_capacity(name.len() + 4);
    let mut previous_upper = head.is_uppercase();
    let mut previous_letter = head.is_alphabetic();
    let mut first = true;
    for (i, &ch) in name.iter().enumerate() {
        if !first && (ch == '_' || ch == ' ') {
            builder.push(' ');
            continue;
        }
        let is_upper = ch.is_uppercase();
        let is_letter = ch.is_alphabetic();
        let upper_before_lower =
            !first && is_upper && name.get(i + 1).map_or(false, |next| next.is_lowercase());
        if !first
            && !builder.ends_with(' ')
            && ((!previous_upper && is_upper) || is_letter != previous_letter || upper_before_lower)
        {
            builder.push(' ');
        }
        previous_upper = is_upper;
        previous_letter = is_letter;
        builder.push(ch);
        first = false;
    }
    builder
}

/// Lowercases words and lets each non-noise word take an optional plural `s`.
pub fn optional_plurals<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    words
        .into_iter()
        .map(|original| {
            let word = regex::escape(&original.to_lowercase());
            if !noise_word(original) && original.chars().count() > 1 {
                if word.ends_with('s') {
                    format!("{}?", word)
                } else {
                    format!("{}s?", word)
                }
            } else {
                word
            }
        })
        .collect()
}

/// Generates regex fragments matching word subsequences of `phrase`.
///
/// All n-grams up to `max_length` words are produced, skipping those that
/// start or end with an article. When the phrase is longer than
/// `max_length` the whole phrase is added as well.
pub fn generate_terms(phrase: &str, max_length: usize) -> Vec<String> {
    let words: Vec<String> = phrase
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();
    let mut terms = Vec::new();
    for length in 1..=words.len().min(max_length) {
        for start in 0..=(words.len() - length) {
            let ngram = &words[start..start + length];
            if !article_or_none(&ngram[0]) && !article_or_none(&ngram[length - 1]) {
                terms.push(optional_plurals(ngram.iter().map(String::as_str)).join(" "));
            }
        }
    }
    if words.len() > max_length {
        let escaped: Vec<String> = words.iter().map(|word| regex::escape(word)).collect();
        terms.push(escaped.join(" "));
    }
    terms
}

/// Joins values into an English list: `a, b or c`.
pub fn build_list<S: AsRef<str>>(values: &[S], separator: &str, last_separator: &str) -> String {
    let mut builder = String::new();
    let end = values.len().saturating_sub(1);
    for (pos, value) in values.iter().enumerate() {
        if pos > 0 {
            builder.push_str(if pos == end { last_separator } else { separator });
        }
        builder.push_str(value.as_ref());
    }
    builder
}
