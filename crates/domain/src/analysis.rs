//! Lightweight keyword and topic analysis of note content
//!
//! Used by the offline provider and the `analyze` command; it does not call
//! any backend.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("Valid regex"));
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("Valid regex"));
static TOPIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:about|regarding|concerning)\s+([a-z][a-z ]{2,19})",
        r"(?i)(?:study|research|analysis)\s+(?:of|on)\s+([a-z][a-z ]{2,19})",
        r"(?i)([a-z][a-z ]{3,20})\s+(?:theory|concept|principle)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Valid regex"))
    .collect()
});

const MAX_KEYWORDS: usize = 10;
const MAX_TOPICS: usize = 5;

/// Summary statistics of a piece of content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentAnalysis {
    /// Most frequent words longer than three characters
    pub keywords: Vec<String>,
    /// Short phrases introduced by topic markers ("about ...", "study of ...")
    pub topics: Vec<String>,
    /// Number of words longer than two characters
    pub word_count: usize,
    /// Readability score in [0, 1]
    pub complexity: f64,
}

/// Analyze cleaned note content
pub fn analyze(content: &str) -> ContentAnalysis {
    let words: Vec<String> = content
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect();

    let cleaned = words
        .iter()
        .map(|word| NON_WORD.replace_all(word, "").into_owned())
        .filter(|word| word.chars().count() > 3);

    ContentAnalysis {
        keywords: top_by_frequency(cleaned, MAX_KEYWORDS),
        topics: extract_topics(content),
        word_count: words.len(),
        complexity: complexity(content),
    }
}

/// Most frequent words longer than three characters, punctuation ignored
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let spaced = NON_WORD.replace_all(&lowered, " ");
    let words = spaced
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(str::to_string);

    top_by_frequency(words, max_keywords)
}

/// Rank words by count; ties keep first-seen order
fn top_by_frequency(words: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for word in words {
        match index.get(&word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word.clone(), counts.len());
                counts.push((word, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(word, _)| word).collect()
}

fn extract_topics(content: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();

    for pattern in TOPIC_PATTERNS.iter() {
        for caps in pattern.captures_iter(content) {
            let Some(m) = caps.get(1) else { continue };
            let topic = m.as_str().trim().to_lowercase();
            let len = topic.chars().count();
            if len > 3 && len < 30 && !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }

    topics.truncate(MAX_TOPICS);
    topics
}

fn complexity(content: &str) -> f64 {
    let sentences = SENTENCE_END
        .split(content)
        .filter(|s| !s.trim().is_empty())
        .count();
    if sentences == 0 {
        return 0.0;
    }

    let words: Vec<&str> = content.split_whitespace().collect();
    let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();

    let avg_words_per_sentence = words.len() as f64 / sentences as f64;
    let avg_chars_per_word = total_chars as f64 / words.len() as f64;

    (avg_words_per_sentence * avg_chars_per_word / 100.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_ranked_by_frequency() {
        let text = "Rust makes async programming pleasant. Async Rust uses tokio. \
                    Tokio schedules async tasks.";
        let analysis = analyze(text);
        assert_eq!(analysis.keywords[0], "async");
        assert!(analysis.keywords.contains(&"rust".to_string()));
        assert!(analysis.keywords.contains(&"tokio".to_string()));
        assert!(analysis.keywords.len() <= MAX_KEYWORDS);
    }

    #[test]
    fn test_topics_from_markers() {
        let text = "This note is about distributed systems. A study of consensus protocols.";
        let analysis = analyze(text);
        assert!(analysis.topics.iter().any(|t| t.starts_with("distributed systems")));
        assert!(analysis.topics.iter().any(|t| t.starts_with("consensus")));
    }

    #[test]
    fn test_empty_content() {
        let analysis = analyze("");
        assert!(analysis.keywords.is_empty());
        assert!(analysis.topics.is_empty());
        assert_eq!(analysis.word_count, 0);
        assert_eq!(analysis.complexity, 0.0);
    }

    #[test]
    fn test_complexity_is_bounded() {
        let long_sentence = "extraordinarily ".repeat(200);
        assert_eq!(analyze(&long_sentence).complexity, 1.0);

        let simple = "I am. We go. It is.";
        let score = analyze(simple).complexity;
        assert!(score > 0.0 && score < 0.1);
    }

    #[test]
    fn test_extract_keywords_ignores_punctuation() {
        let keywords = extract_keywords("Graph, graph; GRAPH! nodes and edges.", 3);
        assert_eq!(keywords, vec!["graph", "nodes", "edges"]);
    }
}
