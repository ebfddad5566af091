//! Copy-text signals. These are computed from the provided copy string and
//! do not depend on OCR availability.

pub fn copy_length(text: &str) -> u32 {
    text.chars().count() as u32
}

/// Crude readability proxy in [0, 1]; 1.0 is easiest. Based on mean word
/// length and mean sentence length, which is enough to separate terse ad
/// copy from dense legalese without a syllable dictionary.
pub fn readability(text: &str) -> Option<f64> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let word_count = words.len() as f64;
    let mean_word_len =
        words.iter().map(|w| w.chars().count() as f64).sum::<f64>() / word_count;
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1) as f64;
    let words_per_sentence = word_count / sentences;

    // Sigmoid-free linear penalty: 4-char words in 8-word sentences score ~1.
    let word_penalty = ((mean_word_len - 4.0) / 8.0).clamp(0.0, 1.0);
    let sentence_penalty = ((words_per_sentence - 8.0) / 24.0).clamp(0.0, 1.0);
    Some((1.0 - 0.5 * word_penalty - 0.5 * sentence_penalty).clamp(0.0, 1.0))
}

/// Similarity of candidate copy to a previously used copy, in [0, 1].
pub fn copy_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Highest similarity of `text` against recently used copies. None when the
/// recent set is empty.
pub fn max_copy_similarity(text: &str, recent: &[String]) -> Option<f64> {
    recent
        .iter()
        .map(|r| copy_similarity(text, r))
        .max_by(|x, y| x.total_cmp(y))
}
