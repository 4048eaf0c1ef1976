//! Entity-match relevance scoring and result ordering.

use crate::domain::Note;
use serde::Serialize;
use std::cmp::Ordering;

/// Score increments for entity matches.
///
/// Scores start at `base`, grow by `title_boost` for each query term found
/// in the title and by `tag_boost` for each tag containing a term, and never
/// exceed `cap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostPolicy {
    pub base: f64,
    pub title_boost: f64,
    pub tag_boost: f64,
    pub cap: f64,
}

impl Default for BoostPolicy {
    fn default() -> Self {
        Self {
            base: 0.0,
            title_boost: 0.1,
            tag_boost: 0.05,
            cap: 1.0,
        }
    }
}

impl BoostPolicy {
    /// Scores `note` against lowercased query terms.
    pub fn score(&self, note: &Note, terms: &[String]) -> f64 {
        let title = note.title().to_lowercase();
        let tags: Vec<String> = note.tags().iter().map(|t| t.to_lowercase()).collect();

        let mut boost = 0.0;
        for term in terms {
            if title.contains(term.as_str()) {
                boost += self.title_boost;
            }
            boost += self.tag_boost * tags.iter().filter(|t| t.contains(term.as_str())).count() as f64;
        }
        (self.base + boost).min(self.cap)
    }
}

/// Splits a free-text query into lowercased terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// A note path with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored {
    pub path: String,
    pub title: String,
    pub score: f64,
}

/// Scores every note against `query`.
pub fn rank<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
    query: &str,
    policy: &BoostPolicy,
) -> Vec<Scored> {
    let terms = query_terms(query);
    notes
        .into_iter()
        .map(|note| Scored {
            path: note.path().to_string(),
            title: note.title().to_string(),
            score: policy.score(note, &terms),
        })
        .collect()
}

/// Orders results by score (highest first), then path, keeping at most
/// `limit` of them.
pub fn prioritize(mut results: Vec<Scored>, limit: Option<usize>) -> Vec<Scored> {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    if let Some(limit) = limit {
        results.truncate(limit);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metadata;
    use pretty_assertions::assert_eq;

    fn note(path: &str, title: &str, tags: &[&str]) -> Note {
        let mut metadata: Metadata = [("title", title)].into_iter().collect();
        metadata.set_tags(tags.iter().map(|t| t.to_string()));
        Note::new(path, "", Some(metadata))
    }

    fn scored(path: &str, score: f64) -> Scored {
        Scored {
            path: path.into(),
            title: String::new(),
            score,
        }
    }

    #[test]
    fn score_is_monotonic_in_matches() {
        let policy = BoostPolicy::default();
        let terms = query_terms("budget review");
        let none = policy.score(&note("a.md", "Misc", &[]), &terms);
        let title = policy.score(&note("a.md", "Budget", &[]), &terms);
        let both = policy.score(&note("a.md", "Budget", &["review"]), &terms);
        assert!(none < title);
        assert!(title < both);
    }

    #[test]
    fn score_never_exceeds_cap() {
        let policy = BoostPolicy {
            base: 0.9,
            ..BoostPolicy::default()
        };
        let terms = query_terms("a b c d");
        let score = policy.score(&note("x.md", "a b c d", &["a", "b", "c", "d"]), &terms);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let policy = BoostPolicy::default();
        let score = policy.score(&note("a.md", "ROADMAP", &[]), &query_terms("roadmap"));
        assert!(score > 0.0);
    }

    #[test]
    fn prioritize_sorts_by_score_then_path() {
        let results = vec![scored("b.md", 0.5), scored("a.md", 0.5), scored("c.md", 0.9)];
        let ordered: Vec<String> = prioritize(results, None)
            .into_iter()
            .map(|s| s.path)
            .collect();
        assert_eq!(ordered, vec!["c.md", "a.md", "b.md"]);
    }

    #[test]
    fn prioritize_applies_limit() {
        let results = vec![scored("a.md", 0.1), scored("b.md", 0.2)];
        let top = prioritize(results, Some(1));
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].path, "b.md");
    }

    #[test]
    fn rank_scores_each_note() {
        let notes = vec![note("a.md", "Roadmap", &[]), note("b.md", "Misc", &[])];
        let ranked = rank(&notes, "roadmap", &BoostPolicy::default());
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].score > ranked[1].score);
    }
}
