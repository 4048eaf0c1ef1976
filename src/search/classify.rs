//! Keyword classification of notes.

use crate::domain::Note;
use serde::Serialize;

/// Lowercased fields a rule looks at.
pub struct Subject {
    title: String,
    tags: Vec<String>,
    summary: String,
    path: String,
}

/// Characters of body text considered by summary rules.
const SUMMARY_CHARS: usize = 200;

impl Subject {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title().to_lowercase(),
            tags: note.tags().iter().map(|t| t.to_lowercase()).collect(),
            summary: note.excerpt(SUMMARY_CHARS).to_lowercase(),
            path: note.path().to_lowercase(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True if the title contains any of `words`.
    pub fn title_has(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.title.contains(w))
    }

    /// True if any tag equals one of `words`.
    pub fn tagged(&self, words: &[&str]) -> bool {
        self.tags.iter().any(|t| words.contains(&t.as_str()))
    }
}

/// One row of the classification table.
pub struct Rule {
    pub label: &'static str,
    pub confidence: f64,
    pub reason: &'static str,
    pub actions: &'static [&'static str],
    pub test: fn(&Subject) -> bool,
}

/// Ordered rule table. The first matching rule wins.
pub static RULES: &[Rule] = &[
    Rule {
        label: "archive",
        confidence: 0.95,
        reason: "Located in archive folder",
        actions: &["Keep archived", "Consider deletion if very old"],
        test: |s| s.path().contains("archive"),
    },
    Rule {
        label: "project",
        confidence: 0.85,
        reason: "Title contains project-related keywords",
        actions: &["Add to Projects folder", "Add project tag", "Link to project timeline"],
        test: |s| s.title_has(&["project", "initiative", "plan", "roadmap"]),
    },
    Rule {
        label: "meeting",
        confidence: 0.80,
        reason: "Title indicates meeting content",
        actions: &["Add date tag", "Move to Meetings folder", "Link to calendar"],
        test: |s| s.title_has(&["meeting", "discussion", "call", "sync"]),
    },
    Rule {
        label: "task",
        confidence: 0.75,
        reason: "Title indicates task or action item",
        actions: &["Add to todo system", "Set priority tag", "Assign owner"],
        test: |s| s.title_has(&["todo", "task", "action", "item"]),
    },
    Rule {
        label: "urgent",
        confidence: 0.90,
        reason: "Marked urgent in tags or content",
        actions: &["Prioritize review", "Add high priority tag", "Schedule immediate follow-up"],
        test: |s| {
            s.tagged(&["urgent"])
                || ["urgent", "asap", "critical", "priority"]
                    .iter()
                    .any(|w| s.summary.contains(w))
        },
    },
    Rule {
        label: "research",
        confidence: 0.70,
        reason: "Title indicates research content",
        actions: &["Add research tag", "Link to bibliography", "Share with team"],
        test: |s| s.title_has(&["research", "study", "analysis", "investigation"]),
    },
    Rule {
        label: "idea",
        confidence: 0.65,
        reason: "Title suggests creative content",
        actions: &["Add ideas tag", "Review for development", "Share with stakeholders"],
        test: |s| s.title_has(&["idea", "thought", "insight", "concept"]),
    },
    Rule {
        label: "personal",
        confidence: 0.60,
        reason: "Title indicates personal note",
        actions: &["Move to personal folder", "Add date tag"],
        test: |s| s.title_has(&["note", "journal", "log", "diary"]),
    },
    Rule {
        label: "review",
        confidence: 0.75,
        reason: "Tagged for review or feedback",
        actions: &["Schedule review", "Add review checklist", "Track revisions"],
        test: |s| s.tagged(&["review", "feedback", "iteration"]),
    },
];

/// Label assigned to one note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub path: String,
    pub label: &'static str,
    pub confidence: f64,
    pub reason: &'static str,
    pub suggested_actions: &'static [&'static str],
}

/// Classifies a note with the default rule table.
pub fn classify(note: &Note) -> Classification {
    classify_with(RULES, note)
}

/// Classifies a note against `rules`; unmatched notes are `unclassified`.
pub fn classify_with(rules: &[Rule], note: &Note) -> Classification {
    let subject = Subject::from_note(note);
    match rules.iter().find(|rule| (rule.test)(&subject)) {
        Some(rule) => Classification {
            path: note.path().to_string(),
            label: rule.label,
            confidence: rule.confidence,
            reason: rule.reason,
            suggested_actions: rule.actions,
        },
        None => Classification {
            path: note.path().to_string(),
            label: "unclassified",
            confidence: 0.0,
            reason: "",
            suggested_actions: &[],
        },
    }
}
