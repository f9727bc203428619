//! Ranking and selection properties over the shipped catalog and small
//! hand-built catalogs

use poss_common::catalog::{EntityCatalog, EntityDefinition};
use poss_common::demographics::{AgeGroup, Sex};
use poss_engine::{AssessmentInput, ScoringEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn entity(id: &str, traits: &[&str]) -> EntityDefinition {
    EntityDefinition {
        id: id.to_string(),
        name: id.to_uppercase(),
        culture: "Teste".to_string(),
        traits: traits.iter().map(|s| s.to_string()).collect(),
        description: String::new(),
        traditions: Vec::new(),
        references: Vec::new(),
        affected_genders: Vec::new(),
        affected_age_groups: Vec::new(),
    }
}

fn adult(sex: Option<Sex>) -> AssessmentInput {
    AssessmentInput::new(sex, AgeGroup::Adult)
}

fn score_of(engine: &ScoringEngine, input: &AssessmentInput, id: &str) -> f64 {
    engine
        .rank(input, engine.catalog().len())
        .into_iter()
        .find(|c| c.entity_id == id)
        .map(|c| c.score)
        .unwrap_or_else(|| panic!("{} missing from ranking", id))
}

// ============================================================================
// rank
// ============================================================================

#[test]
fn test_rank_respects_top_n_without_duplicates() {
    let engine = ScoringEngine::new(EntityCatalog::from_seed());
    let input = adult(Some(Sex::Female))
        .with_answer("mood_swings", true)
        .with_answer("voice_shift", true)
        .with_answer("somnambulism", false);

    for n in 0..=15 {
        let ranked = engine.rank(&input, n);
        assert!(ranked.len() <= n);

        let ids: HashSet<_> = ranked.iter().map(|c| c.entity_id.as_str()).collect();
        assert_eq!(ids.len(), ranked.len(), "duplicate ids for n={}", n);
        for id in ids {
            assert!(engine.catalog().get(id).is_some());
        }
    }
}

#[test]
fn test_rank_prefers_entities_with_matches() {
    let engine = ScoringEngine::new(EntityCatalog::from_seed());
    let input = adult(None).with_answer("xenoglossia", true);

    let ranked = engine.rank(&input, 11);
    let ids: Vec<_> = ranked.iter().map(|c| c.entity_id.as_str()).collect();

    // Only ifrit and silat declare xenoglossia
    assert_eq!(ranked.len(), 2);
    assert!(ids.contains(&"ifrit"));
    assert!(ids.contains(&"silat"));
    assert!(ranked.iter().all(|c| c.matched_traits == vec!["xenoglossia".to_string()]));
}

#[test]
fn test_full_ties_keep_catalog_order() {
    let catalog = EntityCatalog::new(vec![
        entity("c", &["x"]),
        entity("a", &["x"]),
        entity("b", &["x"]),
    ]);
    let engine = ScoringEngine::new(catalog);
    let input = adult(None).with_answer("x", true);

    let ids: Vec<_> = engine
        .rank(&input, 3)
        .into_iter()
        .map(|c| c.entity_id)
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn test_more_matched_traits_ranks_first() {
    let catalog = EntityCatalog::new(vec![entity("b", &["x"]), entity("a", &["x", "y"])]);
    let engine = ScoringEngine::new(catalog);
    let input = adult(None).with_answer("x", true).with_answer("y", true);

    let ranked = engine.rank(&input, 2);
    assert_eq!(ranked[0].entity_id, "a");
    assert_eq!(ranked[0].match_count, 2);
    assert_eq!(ranked[0].match_ratio, 1.0);
    assert_eq!(ranked[1].entity_id, "b");
    assert_eq!(ranked[1].match_ratio, 1.0);
    assert!(ranked[0].score > ranked[1].score);
}

#[test]
fn test_confidence_bounds_and_floor() {
    let engine = ScoringEngine::new(EntityCatalog::from_seed());
    let inputs = [
        adult(None),
        adult(Some(Sex::Male)).with_answer("mood_swings", true),
        adult(Some(Sex::Undisclosed))
            .with_answer("mood_swings", true)
            .with_answer("aversion_symbols", true)
            .with_answer("temperature_shift", true)
            .with_answer("unusual_strength", true),
    ];

    for input in &inputs {
        for c in engine.rank(input, 11) {
            assert!(c.confidence >= 0.18 && c.confidence <= 0.95, "{:?}", c);
            assert_eq!(c.confidence == 0.18, c.match_count == 0, "{:?}", c);
            assert_ne!(c.confidence, c.score);
        }
    }
}

#[test]
fn test_additional_match_never_decreases_score() {
    let catalog = EntityCatalog::from_seed();
    let engine = ScoringEngine::new(catalog.clone());

    for e in catalog.all() {
        let mut input = adult(Some(Sex::Male)).with_answer(&e.traits[0], true);
        let mut previous = score_of(&engine, &input, &e.id);

        for t in &e.traits[1..] {
            input = input.with_answer(t, true);
            let current = score_of(&engine, &input, &e.id);
            assert!(current >= previous, "{}: {} < {}", e.id, current, previous);
            previous = current;
        }
    }
}

#[test]
fn test_gender_mismatch_costs_eighteen_points() {
    let mut gated = entity("gated", &["x", "y"]);
    gated.affected_genders = vec!["Feminino".to_string()];
    let engine = ScoringEngine::new(EntityCatalog::new(vec![gated]));

    let female = adult(Some(Sex::Female)).with_answer("x", true);
    let male = adult(Some(Sex::Male)).with_answer("x", true);
    let undisclosed = adult(Some(Sex::Undisclosed)).with_answer("x", true);

    let f = score_of(&engine, &female, "gated");
    let m = score_of(&engine, &male, "gated");
    let u = score_of(&engine, &undisclosed, "gated");

    assert!((f - m - 18.0).abs() < 1e-9);
    assert!((f - u - 10.0).abs() < 1e-9);
}

#[test]
fn test_age_gating_is_case_insensitive() {
    let mut gated = entity("gated", &["x"]);
    gated.affected_age_groups = vec!["adulto".to_string()];
    let engine = ScoringEngine::new(EntityCatalog::new(vec![gated]));

    let matching = adult(None).with_answer("x", true);
    let mut elder = matching.clone();
    elder.age_group = AgeGroup::Elder.as_str().to_string();
    let mut blank = matching.clone();
    blank.age_group = String::new();

    let base = score_of(&engine, &blank, "gated");
    assert!((score_of(&engine, &matching, "gated") - base - 10.0).abs() < 1e-9);
    assert!((base - score_of(&engine, &elder, "gated") - 6.0).abs() < 1e-9);
}

// ============================================================================
// choose
// ============================================================================

#[test]
fn test_choose_breaks_ties_uniformly() {
    let catalog = EntityCatalog::new(vec![entity("a", &["x"]), entity("b", &["x"])]);
    let engine = ScoringEngine::new(catalog);
    let input = adult(None).with_answer("x", true);
    let mut rng = StdRng::seed_from_u64(42);

    let trials = 2000;
    let mut a = 0;
    for _ in 0..trials {
        match engine.choose_with(&input, &mut rng).entity_id.as_str() {
            "a" => a += 1,
            "b" => {}
            other => panic!("unexpected pick {}", other),
        }
    }

    assert!(a > 850 && a < 1150, "a picked {} of {}", a, trials);
}

#[test]
fn test_choose_is_reproducible_with_seeded_rng() {
    let catalog = EntityCatalog::new(vec![
        entity("a", &["x"]),
        entity("b", &["x"]),
        entity("c", &["x"]),
    ]);
    let engine = ScoringEngine::new(catalog);
    let input = adult(None).with_answer("x", true);

    let picks = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..20)
            .map(|_| engine.choose_with(&input, &mut rng).entity_id)
            .collect::<Vec<_>>()
    };
    assert_eq!(picks(7), picks(7));
}

#[test]
fn test_choose_returns_top_candidate_without_ties() {
    let engine = ScoringEngine::new(EntityCatalog::from_seed());
    let input = adult(None)
        .with_answer("xenoglossia", true)
        .with_answer("symbolic_drawings", true)
        .with_answer("mirror_discomfort", true);

    let top = engine.rank(&input, 3);
    let chosen = engine.choose(&input);
    assert_eq!(chosen.entity_id, "silat");
    assert_eq!(chosen, top[0]);
}

#[test]
fn test_empty_answers_still_choose_an_entity() {
    let engine = ScoringEngine::new(EntityCatalog::from_seed());
    let input = adult(None);

    let chosen = engine.choose_with(&input, &mut StdRng::seed_from_u64(1));
    assert!(!chosen.is_none());
    assert_eq!(chosen.confidence, 0.18);
    assert_eq!(chosen.match_count, 0);
    assert!(engine.catalog().get(&chosen.entity_id).is_some());
}

#[test]
fn test_empty_catalog_yields_sentinel() {
    let engine = ScoringEngine::new(EntityCatalog::new(Vec::new()));
    let input = adult(None).with_answer("mood_swings", true);

    assert!(engine.rank(&input, 3).is_empty());
    let chosen = engine.choose(&input);
    assert!(chosen.is_none());
    assert_eq!(chosen.entity_id, "");
    assert_eq!(chosen.confidence, 0.0);
    assert!(chosen.matched_traits.is_empty());
}
