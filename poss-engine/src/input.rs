//! Assessment input (one per scoring run)

use poss_common::demographics::{AgeGroup, Sex, SEX_UNDISCLOSED};
use crate::scoring::eq_ignore_case;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInput {
    /// Declared sex label, unset or "Não informar" when not disclosed
    pub sex: Option<String>,
    /// Declared age group label
    pub age_group: String,
    /// Answers keyed by trait tag; unanswered traits are absent
    #[serde(default)]
    pub answers: HashMap<String, bool>,
    /// Captured photo, if any
    pub photo: Option<PathBuf>,
}

impl AssessmentInput {
    pub fn new(sex: Option<Sex>, age_group: AgeGroup) -> Self {
        Self {
            sex: sex.map(|s| s.as_str().to_string()),
            age_group: age_group.as_str().to_string(),
            answers: HashMap::new(),
            photo: None,
        }
    }

    pub fn with_answer(mut self, trait_tag: &str, value: bool) -> Self {
        self.answers.insert(trait_tag.to_string(), value);
        self
    }

    pub fn answered_yes(&self, trait_tag: &str) -> bool {
        self.answers.get(trait_tag).copied().unwrap_or(false)
    }

    /// Sex label usable for gating, `None` when unset, blank or undisclosed
    pub fn disclosed_sex(&self) -> Option<&str> {
        self.sex
            .as_deref()
            .filter(|s| !s.trim().is_empty() && !eq_ignore_case(s, SEX_UNDISCLOSED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disclosed_sex() {
        let mut input = AssessmentInput::new(Some(Sex::Female), AgeGroup::Adult);
        assert_eq!(input.disclosed_sex(), Some("Feminino"));

        input.sex = Some("NÃO INFORMAR".to_string());
        assert_eq!(input.disclosed_sex(), None);

        input.sex = Some("  ".to_string());
        assert_eq!(input.disclosed_sex(), None);

        input.sex = None;
        assert_eq!(input.disclosed_sex(), None);
    }

    #[test]
    fn test_unanswered_is_no() {
        let input = AssessmentInput::default()
            .with_answer("mood_swings", true)
            .with_answer("xenoglossia", false);
        assert!(input.answered_yes("mood_swings"));
        assert!(!input.answered_yes("xenoglossia"));
        assert!(!input.answered_yes("voice_shift"));
    }
}
