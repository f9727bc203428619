//! Yes/no question vocabulary
//!
//! Every trait tag an entity can declare has one question, phrased either for
//! the user answering about themself or about someone else.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Questions asked per session unless the caller asks for another amount
pub const DEFAULT_QUESTION_COUNT: usize = 7;

/// Who the answers describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    /// Answering about oneself
    #[default]
    #[serde(alias = "self")]
    First,
    /// Answering about another person
    #[serde(alias = "other")]
    Third,
}

/// One entry of the vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitQuestion {
    pub trait_tag: &'static str,
    pub first_person: &'static str,
    pub third_person: &'static str,
}

impl TraitQuestion {
    pub fn prompt(&self, perspective: Perspective) -> &'static str {
        match perspective {
            Perspective::First => self.first_person,
            Perspective::Third => self.third_person,
        }
    }
}

/// A question as presented to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub trait_tag: String,
    pub prompt: String,
}

const fn q(
    trait_tag: &'static str,
    first_person: &'static str,
    third_person: &'static str,
) -> TraitQuestion {
    TraitQuestion {
        trait_tag,
        first_person,
        third_person,
    }
}

/// Closed vocabulary, in canonical order
pub const TRAIT_QUESTIONS: [TraitQuestion; 16] = [
    q("xenoglossia",
      "Começa a falar línguas que nunca aprendeu",
      "A pessoa começa a falar línguas que nunca aprendeu?"),
    q("aversion_symbols",
      "Sente algum desconforto perto de símbolos religiosos",
      "A pessoa sente algum desconforto perto de símbolos religiosos?"),
    q("voice_shift",
      "A voz muda de um jeito estranho, sem explicação",
      "A voz da pessoa muda de um jeito estranho, sem explicação?"),
    q("somnambulism",
      "Anda dormindo com frequência e conta coisas esquisitas depois",
      "A pessoa anda dormindo com frequência e conta coisas esquisitas depois?"),
    q("mood_swings",
      "Muda de humor do nada, sem motivo claro",
      "A pessoa muda de humor do nada, sem motivo claro?"),
    q("temperature_shift",
      "A temperatura do corpo altera sem explicação",
      "A temperatura do corpo da pessoa altera sem explicação?"),
    q("object_movement",
      "Objetos próximos se mexem sozinhos, ou há lapsos de raiva com arremesso de materiais",
      "Os objetos perto da pessoa se mexem sozinhos, ou ela tem lapsos de raiva arremessando materiais?"),
    q("memory_gaps",
      "Tem apagões ou esquece o que fez durante comportamentos estranhos",
      "A pessoa tem apagões ou esquece o que fez durante comportamentos estranhos?"),
    q("shadow_presence",
      "Alguém já comentou ter visto sombras ou vultos por perto",
      "Alguém já disse que viu sombras ou vultos perto da pessoa?"),
    q("mirror_discomfort",
      "Evita se olhar no espelho ou sente incômodo com o próprio reflexo",
      "A pessoa evita se olhar no espelho ou parece incomodada com o próprio reflexo?"),
    q("unusual_strength",
      "Já demonstrou força fora do comum em alguns momentos",
      "A pessoa já mostrou uma força fora do comum em alguns momentos?"),
    q("animal_reaction",
      "Animais ficam agitados, agressivos ou desconfortáveis quando estão por perto",
      "Animais ficam agitados, agressivos ou desconfortáveis quando estão perto da pessoa?"),
    q("time_distortion",
      "A percepção do tempo muda durante certos episódios",
      "A pessoa sente que o tempo passa diferente durante certos episódios?"),
    q("persistent_whispers",
      "Ouve sussurros ou vozes mesmo quando não há ninguém por perto",
      "A pessoa ouve sussurros ou vozes mesmo quando não tem ninguém por perto?"),
    q("symbolic_drawings",
      "Faz desenhos ou símbolos repetidos sem saber o motivo",
      "A pessoa faz desenhos ou símbolos repetidos sem saber o porquê?"),
    q("unexplained_fatigue",
      "Sente cansaço além do normal",
      "A pessoa sente cansaço além do normal?"),
];

pub fn is_known_trait(tag: &str) -> bool {
    TRAIT_QUESTIONS.iter().any(|q| q.trait_tag == tag)
}

/// Draw `quantity` distinct questions uniformly at random.
///
/// `quantity` is capped at the vocabulary size.
pub fn random_questions<R: Rng + ?Sized>(
    perspective: Perspective,
    quantity: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut pool: Vec<&TraitQuestion> = TRAIT_QUESTIONS.iter().collect();
    pool.shuffle(rng);
    pool.into_iter()
        .take(quantity.min(TRAIT_QUESTIONS.len()))
        .map(|q| Question {
            trait_tag: q.trait_tag.to_string(),
            prompt: q.prompt(perspective).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_vocabulary_tags_are_unique() {
        let tags: HashSet<_> = TRAIT_QUESTIONS.iter().map(|q| q.trait_tag).collect();
        assert_eq!(tags.len(), TRAIT_QUESTIONS.len());
    }

    #[test]
    fn test_random_questions_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let questions = random_questions(Perspective::First, DEFAULT_QUESTION_COUNT, &mut rng);
        assert_eq!(questions.len(), 7);

        let tags: HashSet<_> = questions.iter().map(|q| q.trait_tag.as_str()).collect();
        assert_eq!(tags.len(), 7);
        assert!(tags.iter().all(|t| is_known_trait(t)));
    }

    #[test]
    fn test_quantity_is_capped() {
        let mut rng = StdRng::seed_from_u64(1);
        let questions = random_questions(Perspective::Third, 100, &mut rng);
        assert_eq!(questions.len(), TRAIT_QUESTIONS.len());
    }

    #[test]
    fn test_third_person_prompts() {
        let mut rng = StdRng::seed_from_u64(3);
        let questions = random_questions(Perspective::Third, 16, &mut rng);
        assert!(questions.iter().all(|q| q.prompt.ends_with('?')));
    }

    #[test]
    fn test_perspective_aliases() {
        let p: Perspective = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(p, Perspective::Third);
        let p: Perspective = serde_json::from_str("\"first\"").unwrap();
        assert_eq!(p, Perspective::First);
    }
}
