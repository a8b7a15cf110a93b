//! Stance classification for agent responses
//!
//! Every response is classified as either an agreement or a disagreement.
//! The default [`MarkerClassifier`] is a lexical heuristic: a response that
//! contains any of a fixed list of marker phrases (case-insensitive substring
//! match) is an agreement, everything else is a disagreement. There is no
//! negation handling, so "I agree" inside "I don't fully agree, I agree only
//! partly" still counts as agreement.

use serde::{Deserialize, Serialize};

/// Classified stance of a single response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Agreement,
    Disagreement,
}

impl Stance {
    pub fn is_agreement(&self) -> bool {
        matches!(self, Stance::Agreement)
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stance::Agreement => write!(f, "agreement"),
            Stance::Disagreement => write!(f, "disagreement"),
        }
    }
}

/// Strategy that maps response text to a [`Stance`]
///
/// Implementations must be total: ambiguity is not an error, every input
/// gets a definite stance.
pub trait StanceClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Stance;
}

/// Marker phrases that signal agreement
pub const AGREEMENT_MARKERS: &[&str] = &[
    "I agree",
    "I propose",
    "I suggest",
    "I consider",
    "I observe",
    "Indeed",
    "Exactly",
    "True",
];

/// Case-insensitive marker-phrase classifier
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    markers: Vec<String>,
}

impl MarkerClassifier {
    /// Classifier over the standard [`AGREEMENT_MARKERS`]
    pub fn new() -> Self {
        Self::with_markers(AGREEMENT_MARKERS.iter().copied())
    }

    /// Classifier over a custom marker list
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StanceClassifier for MarkerClassifier {
    fn classify(&self, text: &str) -> Stance {
        let lowered = text.to_lowercase();
        if self.markers.iter().any(|m| lowered.contains(m.as_str())) {
            Stance::Agreement
        } else {
            Stance::Disagreement
        }
    }
}

/// Classifier that always returns the same stance
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier(pub Stance);

impl StanceClassifier for FixedClassifier {
    fn classify(&self, _text: &str) -> Stance {
        self.0
    }
}
