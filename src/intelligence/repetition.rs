use std::collections::BTreeSet;

/// Minimum content-token Jaccard similarity for two queries to count as the
/// same request.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

const STOPWORDS: &[&str] = &[
    "a", "am", "an", "and", "are", "be", "can", "could", "do", "for", "get", "have", "i", "im",
    "in", "is", "it", "me", "my", "of", "on", "please", "some", "that", "the", "this", "to",
    "would", "you",
];

fn content_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Whether two queries ask for the same thing.
pub fn is_similar(a: &str, b: &str) -> bool {
    let a_tokens = content_tokens(a);
    let b_tokens = content_tokens(b);
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return false;
    }

    let a_norm = a_tokens.join(" ");
    let b_norm = b_tokens.join(" ");
    if a_norm.contains(&b_norm) || b_norm.contains(&a_norm) {
        return true;
    }

    let a_set: BTreeSet<&str> = a_tokens.iter().map(String::as_str).collect();
    let b_set: BTreeSet<&str> = b_tokens.iter().map(String::as_str).collect();
    let intersection = a_set.intersection(&b_set).count();
    let union = a_set.union(&b_set).count();
    union > 0 && intersection as f64 / union as f64 >= SIMILARITY_THRESHOLD
}

/// Count prior queries similar to `query`, looking at most `window` entries
/// back. `recent` is newest first.
pub fn count_similar<S: AsRef<str>>(query: &str, recent: &[S], window: usize) -> u32 {
    recent
        .iter()
        .take(window)
        .filter(|prior| is_similar(query, prior.as_ref()))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rephrased_request_is_similar() {
        assert!(is_similar("Can I get some water?", "could I have water please"));
    }

    #[test]
    fn containment_counts_as_similar() {
        assert!(is_similar("water", "cold water with ice"));
    }

    #[test]
    fn different_requests_are_not_similar() {
        assert!(!is_similar("turn on the tv", "open the window curtain"));
    }

    #[test]
    fn stopword_only_text_is_never_similar() {
        assert!(!is_similar("can you", "can you"));
    }

    #[test]
    fn jaccard_threshold() {
        // {extra, blanket} vs {blanket, pillow, towel}: 1/4
        assert!(!is_similar("extra blanket", "blanket pillow towel"));
        // {warm, blanket} vs {warm, blanket, now}: 2/3
        assert!(is_similar("warm blanket", "blanket warm now"));
    }

    #[test]
    fn counting_honors_the_window() {
        let history = vec!["water please"; 5];
        assert_eq!(count_similar("can I get water", &history, 10), 5);
        assert_eq!(count_similar("can I get water", &history, 3), 3);
        assert_eq!(count_similar("can I get water", &history, 0), 0);
    }

    #[test]
    fn counting_skips_unrelated_history() {
        let history = vec![
            "turn on the tv".to_string(),
            "water please".to_string(),
            "what time is it".to_string(),
        ];
        assert_eq!(count_similar("I need water", &history, 10), 1);
    }
}
