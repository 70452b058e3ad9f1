//! Dataset schema and categorical vocabularies.
//!
//! The original survey analysis hard-coded its category mappings as
//! string→int literals scattered through the pipeline. Here they live in
//! one explicit, versioned [`EncodingConfig`] that is passed into the
//! encoder, so tests can substitute alternate vocabularies.

use serde::{Deserialize, Serialize};

/// Demographic column names.
pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const EDUCATION: &str = "Education_Level";
pub const EMPLOYMENT: &str = "Employment_Status";

/// Sentinel education value whose rows are removed during cleaning.
pub const EDUCATION_UNKNOWN: &str = "unknown";

/// The three skill domains measured pre- and post-training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    BasicComputerKnowledge,
    InternetUsage,
    MobileLiteracy,
}

impl Domain {
    /// All domains in reporting order.
    pub const ALL: [Domain; 3] = [
        Domain::BasicComputerKnowledge,
        Domain::InternetUsage,
        Domain::MobileLiteracy,
    ];

    /// Column-name stem shared by the score, post-score, and gain columns.
    #[must_use]
    pub fn stem(&self) -> &'static str {
        match self {
            Domain::BasicComputerKnowledge => "Basic_Computer_Knowledge",
            Domain::InternetUsage => "Internet_Usage",
            Domain::MobileLiteracy => "Mobile_Literacy",
        }
    }

    /// Pre-training score column name.
    #[must_use]
    pub fn score_column(&self) -> String {
        format!("{}_Score", self.stem())
    }

    /// Post-training score column name.
    #[must_use]
    pub fn post_score_column(&self) -> String {
        format!("Post_{}_Score", self.stem())
    }

    /// Derived gain column name (post minus pre).
    #[must_use]
    pub fn gain_column(&self) -> String {
        format!("{}_Gain", self.stem())
    }

    /// Binary access label column name (from the pre-training score).
    #[must_use]
    pub fn access_label(&self) -> String {
        format!("Access_{}", self.stem())
    }

    /// Binary gain label column name (from the gain column).
    #[must_use]
    pub fn gain_label(&self) -> String {
        format!("Gain_{}", self.stem())
    }
}

/// All columns the input file must provide.
#[must_use]
pub fn required_columns() -> Vec<String> {
    let mut cols = vec![
        GENDER.to_string(),
        AGE.to_string(),
        EDUCATION.to_string(),
        EMPLOYMENT.to_string(),
    ];
    for domain in Domain::ALL {
        cols.push(domain.score_column());
        cols.push(domain.post_score_column());
    }
    cols
}

/// Versioned category→code vocabularies for the categorical columns.
///
/// Codes are non-negative and dense from zero; the education and
/// employment vocabularies are ordered, so the code doubles as the rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Vocabulary version, bumped whenever a mapping changes.
    pub version: u32,
    /// Gender vocabulary: two symbols after cleaning.
    pub gender: Vec<String>,
    /// Education vocabulary, ordered lowest to highest attainment.
    pub education: Vec<String>,
    /// Employment vocabulary, ordered by attachment to the labor force.
    pub employment: Vec<String>,
}

impl EncodingConfig {
    /// Code for a gender value, if it is in the vocabulary.
    #[must_use]
    pub fn gender_code(&self, value: &str) -> Option<u32> {
        code_of(&self.gender, value)
    }

    /// Code for an education value, if it is in the vocabulary.
    #[must_use]
    pub fn education_code(&self, value: &str) -> Option<u32> {
        code_of(&self.education, value)
    }

    /// Code for an employment value, if it is in the vocabulary.
    #[must_use]
    pub fn employment_code(&self, value: &str) -> Option<u32> {
        code_of(&self.employment, value)
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gender: vec!["male".into(), "female".into()],
            education: vec![
                "none".into(),
                "high school".into(),
                "some college".into(),
                "associate".into(),
                "bachelor".into(),
                "master".into(),
            ],
            employment: vec![
                "unemployed".into(),
                "part-time".into(),
                "full-time".into(),
            ],
        }
    }
}

fn code_of(vocabulary: &[String], value: &str) -> Option<u32> {
    vocabulary
        .iter()
        .position(|v| v == value)
        .map(|idx| idx as u32)
}
