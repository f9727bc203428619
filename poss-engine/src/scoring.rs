//! Entity scoring and selection
//!
//! Each entity is scored from four factors:
//! - how much of its trait list was answered "yes" (ratio and absolute count)
//! - a rarity bonus, so traits shared by few entities weigh more
//! - gender gating (bonus on match, penalty on mismatch, neutral if unknown)
//! - age-group gating (same shape, smaller penalty)
//!
//! The raw score is only used for ranking. The user-facing confidence is a
//! bounded transform of the match ratio and count.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use poss_common::catalog::{EntityCatalog, EntityDefinition};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::input::AssessmentInput;

/// Confidence reported for a candidate with no matched trait
pub const NO_EVIDENCE_CONFIDENCE: f64 = 0.18;
pub const MIN_MATCHED_CONFIDENCE: f64 = 0.35;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Candidates considered by `choose`
pub const CHOICE_POOL_SIZE: usize = 3;

/// Trait tag of a retired youth-targeting feature. No shipped entity
/// declares it; entities that do still get `legacy_youth_bonus` for children.
pub const LEGACY_YOUTH_TRAIT: &str = "affects_youth";
const CHILD_AGE_GROUP: &str = "Criança";

/// Unicode-aware case-insensitive equality
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Weights of the scoring function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub match_ratio: f64,
    pub match_count: f64,
    pub rarity: f64,
    pub gender_match: f64,
    pub gender_mismatch: f64,
    pub age_match: f64,
    pub age_mismatch: f64,
    pub legacy_youth_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            match_ratio: 100.0,
            match_count: 6.0,
            rarity: 12.0,
            gender_match: 10.0,
            gender_mismatch: -8.0,
            age_match: 10.0,
            age_mismatch: -6.0,
            legacy_youth_bonus: 4.0,
        }
    }
}

/// One ranked entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub entity_id: String,
    /// Unbounded ranking score, never shown to the user
    pub score: f64,
    pub match_count: usize,
    /// In [0, 1]
    pub match_ratio: f64,
    /// Matched tags, in the entity's trait order
    pub matched_traits: Vec<String>,
    /// In [0.18, 0.95]
    pub confidence: f64,
    #[serde(skip)]
    pub rarity_bonus: f64,
    #[serde(skip)]
    pub gender_factor: f64,
    #[serde(skip)]
    pub age_factor: f64,
}

impl ScoredCandidate {
    /// Sentinel returned when there is nothing to choose from
    pub fn none() -> Self {
        Self {
            entity_id: String::new(),
            score: 0.0,
            match_count: 0,
            match_ratio: 0.0,
            matched_traits: Vec::new(),
            confidence: 0.0,
            rarity_bonus: 0.0,
            gender_factor: 0.0,
            age_factor: 0.0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.entity_id.is_empty()
    }
}

/// User-facing confidence for a match ratio / count pair
pub fn confidence_for(match_count: usize, match_ratio: f64) -> f64 {
    if match_count == 0 {
        return NO_EVIDENCE_CONFIDENCE;
    }
    let raw = MIN_MATCHED_CONFIDENCE + match_ratio * 0.55 + match_count as f64 * 0.03;
    raw.clamp(MIN_MATCHED_CONFIDENCE, MAX_CONFIDENCE)
}

/// Scores a fixed catalog against assessment inputs
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: EntityCatalog,
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(catalog: EntityCatalog) -> Self {
        Self::with_weights(catalog, ScoringWeights::default())
    }

    pub fn with_weights(catalog: EntityCatalog, weights: ScoringWeights) -> Self {
        Self { catalog, weights }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Rank the catalog, returning at most `top_n` candidates.
    ///
    /// Candidates with at least one matched trait are preferred; when none
    /// exists the full ranking is used so the caller still gets candidates.
    pub fn rank(&self, input: &AssessmentInput, top_n: usize) -> Vec<ScoredCandidate> {
        let entities = self.catalog.all();
        if entities.is_empty() {
            return Vec::new();
        }

        let frequency = trait_frequency(entities);

        let mut ranked: Vec<ScoredCandidate> = entities
            .iter()
            .map(|e| self.score_entity(e, input, &frequency))
            .collect();

        // Stable: full ties keep catalog order
        ranked.sort_by(compare_candidates);

        let any_positive = ranked.iter().any(|c| c.match_count > 0);
        let selected: Vec<ScoredCandidate> = ranked
            .into_iter()
            .filter(|c| !any_positive || c.match_count > 0)
            .take(top_n)
            .map(|mut c| {
                c.confidence = confidence_for(c.match_count, c.match_ratio);
                c
            })
            .collect();

        if !selected.is_empty() {
            let summary = selected
                .iter()
                .map(|c| {
                    format!(
                        "{}:score={:.2} matches={} gf={:.2} af={:.2}",
                        c.entity_id, c.score, c.match_count, c.gender_factor, c.age_factor
                    )
                })
                .collect::<Vec<_>>()
                .join(" | ");
            debug!("Ranking (selected list): {}", summary);
        }

        selected
    }

    /// Pick one entity using the thread-local random source
    pub fn choose(&self, input: &AssessmentInput) -> ScoredCandidate {
        self.choose_with(input, &mut rand::thread_rng())
    }

    /// Pick one entity among the top candidates.
    ///
    /// Candidates tied exactly on the highest score are drawn uniformly with
    /// a single call on `rng`. Returns `ScoredCandidate::none()` for an empty
    /// catalog.
    pub fn choose_with<R: Rng + ?Sized>(&self, input: &AssessmentInput, rng: &mut R) -> ScoredCandidate {
        let top = self.rank(input, CHOICE_POOL_SIZE);
        if top.is_empty() {
            return ScoredCandidate::none();
        }

        let max_score = top
            .iter()
            .map(|c| c.score)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut tied: Vec<ScoredCandidate> = top.into_iter().filter(|c| c.score == max_score).collect();
        let ties = tied.len();
        let pick = if ties == 1 { 0 } else { rng.gen_range(0..ties) };
        let chosen = tied.swap_remove(pick);

        info!(
            entity_id = %chosen.entity_id,
            confidence = chosen.confidence,
            ties,
            "Chosen entity"
        );

        chosen
    }

    fn score_entity(
        &self,
        entity: &EntityDefinition,
        input: &AssessmentInput,
        frequency: &HashMap<&str, usize>,
    ) -> ScoredCandidate {
        let w = &self.weights;

        let trait_count = entity.traits.len().max(1);
        let matched: Vec<String> = entity
            .traits
            .iter()
            .filter(|t| input.answered_yes(t))
            .cloned()
            .collect();
        let match_count = matched.len();
        let match_ratio = match_count as f64 / trait_count as f64;

        let rarity_bonus: f64 = matched
            .iter()
            .map(|t| 1.0 / frequency.get(t.as_str()).copied().unwrap_or(1) as f64)
            .sum();

        let legacy_bonus = if input.age_group == CHILD_AGE_GROUP && entity.has_trait(LEGACY_YOUTH_TRAIT) {
            w.legacy_youth_bonus
        } else {
            0.0
        };

        let gender_factor = if entity.affected_genders.is_empty() {
            0.0
        } else {
            match input.disclosed_sex() {
                None => 0.0,
                Some(sex) if entity.affected_genders.iter().any(|g| eq_ignore_case(g, sex)) => w.gender_match,
                Some(_) => w.gender_mismatch,
            }
        };

        let age = input.age_group.as_str();
        let age_factor = if entity.affected_age_groups.is_empty() || age.trim().is_empty() {
            0.0
        } else if entity.affected_age_groups.iter().any(|g| eq_ignore_case(g, age)) {
            w.age_match
        } else {
            w.age_mismatch
        };

        let score = match_ratio * w.match_ratio
            + match_count as f64 * w.match_count
            + rarity_bonus * w.rarity
            + legacy_bonus
            + gender_factor
            + age_factor;

        debug!(
            entity_id = %entity.id,
            matched = match_count,
            matched_traits = ?matched,
            match_ratio = format_args!("{:.2}", match_ratio),
            rarity_bonus = format_args!("{:.2}", rarity_bonus),
            gender_factor = format_args!("{:.2}", gender_factor),
            age_factor = format_args!("{:.2}", age_factor),
            score = format_args!("{:.2}", score),
            "Scored entity"
        );

        ScoredCandidate {
            entity_id: entity.id.clone(),
            score,
            match_count,
            match_ratio,
            matched_traits: matched,
            confidence: 0.0,
            rarity_bonus,
            gender_factor,
            age_factor,
        }
    }
}

/// Number of entities declaring each trait
fn trait_frequency(entities: &[EntityDefinition]) -> HashMap<&str, usize> {
    let mut frequency = HashMap::new();
    for entity in entities {
        let distinct: HashSet<&str> = entity.traits.iter().map(String::as_str).collect();
        for t in distinct {
            *frequency.entry(t).or_insert(0) += 1;
        }
    }
    frequency
}

/// Descending by score, then match count, then match ratio
fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.match_count.cmp(&a.match_count))
        .then_with(|| b.match_ratio.total_cmp(&a.match_ratio))
}
