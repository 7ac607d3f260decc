//! Tokenization and per-word frequency measures.

use std::collections::HashMap;

/// Scale used for frequency-per-million-words.
pub const PER_MILLION: f64 = 1_000_000.0;

///Strips non-alphabetic characters from both ends of a whitespace-delimited chunk.
///Characters inside the word are left alone, so `"3rd,"` becomes `"rd"` and `"don't"` stays intact.
///Returns `None` when nothing alphabetic remains.
/// # Example
/// ```
/// use srt_freqs::trim_edges;
/// assert_eq!(trim_edges("--hello!!"), Some("hello"));
/// assert_eq!(trim_edges("3rd,"), Some("rd"));
/// assert_eq!(trim_edges("123"), None);
/// ```
pub fn trim_edges(chunk: &str) -> Option<&str> {
    let trimmed = chunk.trim_matches(|c: char| !c.is_alphabetic());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

///Splits text at whitespace, trims each chunk with [`trim_edges`] and lower-cases what survives.
/// # Example
/// ```
/// use srt_freqs::tokenize;
/// let tokens = tokenize("\"Hello,\" she said -- 42 times.");
/// assert_eq!(tokens, vec!["hello", "she", "said", "times"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    tokenize_into(text, &mut tokens);
    tokens
}

/// Same as [`tokenize`], appending to an existing token list.
pub fn tokenize_into(text: &str, tokens: &mut Vec<String>) {
    tokens.extend(
        text.split_whitespace()
            .filter_map(trim_edges)
            .map(str::to_lowercase),
    );
}

///Takes a token list and counts the quantity of each token.
/// # Example
/// ```
/// use srt_freqs::count_words;
/// let words = vec!["cat".to_string(), "dog".to_string(), "cat".to_string()];
/// let counted = count_words(&words);
/// assert_eq!(counted["cat"], 2);
/// assert_eq!(counted["dog"], 1);
/// ```
pub fn count_words(words: &[String]) -> HashMap<String, u64> {
    count_words_with(words, |_| {})
}

/// [`count_words`], calling `tick` with the index of every token counted.
pub fn count_words_with(words: &[String], mut tick: impl FnMut(usize)) -> HashMap<String, u64> {
    let mut frequency: HashMap<String, u64> = HashMap::new();
    for (i, word) in words.iter().enumerate() {
        *frequency.entry(word.to_owned()).or_insert(0) += 1;
        tick(i);
    }
    frequency
}

/// Occurrences per million tokens.
pub fn fpmw(count: u64, total: u64) -> f64 {
    count as f64 / total as f64 * PER_MILLION
}

/// Zipf-scale value: `log10(fpmw) + 3`.
pub fn zipf(fpmw: f64) -> f64 {
    fpmw.log10() + 3.0
}

/// Inverse of [`zipf`].
pub fn fpmw_from_zipf(zipf: f64) -> f64 {
    10f64.powf(zipf - 3.0)
}

///Sort words in a frequency map into a Vec, most frequent first.
///Ties are broken by the word itself, ascending, so the order is deterministic.
pub fn rank_words(frequency: &HashMap<String, u64>) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = frequency
        .iter()
        .map(|(word, count)| (word.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_edges() {
        assert_eq!(trim_edges("3rd,"), Some("rd"));
        assert_eq!(trim_edges("--hello!!"), Some("hello"));
        assert_eq!(trim_edges("123"), None);
        assert_eq!(trim_edges("..."), None);
        assert_eq!(trim_edges("(don't)"), Some("don't"));
        assert_eq!(trim_edges("¿qué?"), Some("qué"));
        assert_eq!(trim_edges("a"), Some("a"));
    }

    #[test]
    fn test_tokenize_lowercases_and_discards() {
        let tokens = tokenize("<- Well, WELL... 1999 -- well?\nMr. Smith's 3rd");
        assert_eq!(
            tokens,
            vec!["well", "well", "well", "mr", "smith's", "rd"]
        );
    }

    #[test]
    fn test_tokenize_is_idempotent_on_clean_input() {
        let first = tokenize("It's the END, of the world! 2012 as we know it.");
        let second = tokenize(&first.join(" "));
        assert_eq!(first, second);
    }

    #[test]
    fn test_count() {
        let words = vec!["cat".to_string(), "dog".to_string(), "cat".to_string()];
        let counted = count_words(&words);
        let mut words_map = HashMap::new();
        words_map.insert("cat".to_string(), 2_u64);
        words_map.insert("dog".to_string(), 1_u64);
        assert_eq!(counted, words_map);
    }

    #[test]
    fn test_fpmw_and_zipf() {
        let f = fpmw(2, 3);
        assert!((f - 666_666.666_666_7).abs() < 1e-3);
        assert!((zipf(f) - 8.823_908_740_944_32).abs() < 1e-9);
        assert!((fpmw_from_zipf(zipf(f)) - f).abs() < 1e-6);
        assert!((fpmw_from_zipf(3.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_words_ties_by_word() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), 2_u64);
        map.insert("a".to_string(), 2_u64);
        map.insert("z".to_string(), 5_u64);
        map.insert("c".to_string(), 1_u64);
        let ranked = rank_words(&map);
        assert_eq!(ranked, vec![("z", 5), ("a", 2), ("b", 2), ("c", 1)]);
    }
}
