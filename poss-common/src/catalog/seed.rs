//! Static seed list of entity definitions

use super::EntityDefinition;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct Seed<'a> {
    id: &'a str,
    name: &'a str,
    culture: &'a str,
    traits: &'a [&'a str],
    description: &'a str,
    traditions: [&'a str; 3],
    references: &'a [&'a str],
    genders: &'a [&'a str],
    ages: &'a [&'a str],
}

impl Seed<'_> {
    fn build(&self) -> EntityDefinition {
        EntityDefinition {
            id: self.id.to_string(),
            name: self.name.to_string(),
            culture: self.culture.to_string(),
            traits: strings(self.traits),
            description: self.description.to_string(),
            traditions: strings(&self.traditions),
            references: strings(self.references),
            affected_genders: strings(self.genders),
            affected_age_groups: strings(self.ages),
        }
    }
}

const SEEDS: &[Seed<'static>] = &[
    Seed {
        id: "pazuzu",
        name: "Pazuzu",
        culture: "Mesopotâmica",
        traits: &["somnambulism", "mood_swings", "temperature_shift"],
        description: "Espírito dos ventos do sudoeste, híbrido e protetor contra forças malignas como Lamashtu, porém de humor instável e presença noturna.",
        traditions: [
            "Etapa I: Abrir janelas ou portas por alguns minutos, permitindo que o ar circule livremente.",
            "Etapa II: Caminhar ao ar livre e respirar fundo, simbolizando a libertação dos ventos.",
            "Etapa III: Deixar uma pequena oferenda simbólica ao vento, como uma flor ou folha seca.",
        ],
        references: &["Britannica – Pazuzu", "Dictionnaire Infernal (Collin de Plancy, 1818)"],
        genders: &[],
        ages: &[],
    },
    Seed {
        id: "lamashtu",
        name: "Lamashtu",
        culture: "Mesopotâmica",
        traits: &["mood_swings", "aversion_symbols", "unexplained_fatigue"],
        description: "Figura feminina monstruosa, metade leoa e metade humana, associada ao medo e às mudanças emocionais das noites antigas.",
        traditions: [
            "Etapa I: Acender uma vela e mentalizar proteção e equilíbrio.",
            "Etapa II: Colocar um copo d’água ao lado da cama antes de dormir.",
            "Etapa III: Descartar essa água pela manhã, simbolizando o fim da influência de Lamashtu.",
        ],
        references: &["Met Museum – Amuletos de Lamashtu", "Harvard Library Bulletin – Demonologia Mesopotâmica"],
        genders: &["Feminino"],
        ages: &["Adulto", "Idoso"],
    },
    Seed {
        id: "legiao",
        name: "Legião",
        culture: "Cristã",
        traits: &["voice_shift", "aversion_symbols", "mood_swings", "persistent_whispers"],
        description: "Entidade coletiva mencionada no Novo Testamento, 'somos muitos', símbolo de vozes internas conflitantes e desordem emocional.",
        traditions: [
            "Etapa I: Fazer silêncio por alguns minutos e respirar profundamente.",
            "Etapa II: Falar em voz alta uma frase afirmativa: 'Eu sou um só, em equilíbrio'.",
            "Etapa III: Lavar as mãos e rosto, simbolizando purificação e retorno à unidade.",
        ],
        references: &["Evangelho de Marcos 5:1–20", "Comentário Bíblico NCEC – Legião e simbolismo coletivo"],
        genders: &["Masculino"],
        ages: &[],
    },
    Seed {
        id: "beelzebub",
        name: "Beelzebub",
        culture: "Cristã Ocidental",
        traits: &["aversion_symbols", "mood_swings", "object_movement", "unusual_strength"],
        description: "Figura demoníaca clássica, associada à decadência e à gula, representando a corrupção e o orgulho humanos.",
        traditions: [
            "Etapa I: Deixar entrar a luz solar por alguns minutos.",
            "Etapa II: Fazer uma limpeza rápida no ambiente.",
            "Etapa III: Acender um incenso ou vela, agradecendo pela harmonia restabelecida.",
        ],
        references: &["Dictionnaire Infernal (1818)", "Wikipedia – Beelzebub"],
        genders: &[],
        ages: &[],
    },
    Seed {
        id: "aka_oni",
        name: "Aka Oni",
        culture: "Japonesa",
        traits: &["mood_swings", "aversion_symbols", "temperature_shift", "unusual_strength"],
        description: "Oni vermelho do folclore japonês, símbolo da raiva e da impulsividade. Representa emoções que explodem como fogo.",
        traditions: [
            "Etapa I: Gritar em um local aberto, liberando simbolicamente a raiva.",
            "Etapa II: Fazer três respirações lentas, visualizando o calor se dissipando.",
            "Etapa III: Beber um copo de água fria para restaurar a calma.",
        ],
        references: &["Reider, Noriko T. – Japanese Demon Lore", "Kojiki – Mitos do Japão Antigo"],
        genders: &["Masculino"],
        ages: &[],
    },
    Seed {
        id: "ao_oni",
        name: "Ao Oni",
        culture: "Japonesa",
        traits: &["somnambulism", "mood_swings", "shadow_presence", "time_distortion"],
        description: "Oni azul, associado à tristeza e ao arrependimento. Move-se silenciosamente durante a noite, confundindo os sonhadores.",
        traditions: [
            "Etapa I: Acender uma luz suave e escrever algo positivo no papel.",
            "Etapa II: Ler em voz alta uma lembrança boa do passado.",
            "Etapa III: Guardar o papel em local tranquilo, simbolizando o descanso do espírito.",
        ],
        references: &["Yōkai Daizukai – Mizuki Shigeru", "Festival Setsubun – registros culturais"],
        genders: &[],
        ages: &["Adolescente"],
    },
    Seed {
        id: "namahage",
        name: "Namahage",
        culture: "Japonesa (Akita)",
        traits: &["voice_shift", "aversion_symbols", "animal_reaction"],
        description: "Espírito mascarado que visita casas durante o inverno para assustar crianças preguiçosas. Na verdade, é um protetor ritualístico.",
        traditions: [
            "Etapa I: Tocar um sino ou fazer barulho, como nas festas de inverno.",
            "Etapa II: Limpar a entrada da casa, simbolizando boas-vindas.",
            "Etapa III: Agradecer em voz alta pelo ano que passou.",
        ],
        references: &["Museu Folclórico de Akita", "Festival Namahage Sedo Matsuri"],
        genders: &[],
        ages: &["Criança"],
    },
    Seed {
        id: "ifrit",
        name: "Ifrit",
        culture: "Islâmica",
        traits: &["xenoglossia", "mood_swings", "temperature_shift", "unusual_strength"],
        description: "Jinn de fogo puro, descrito como poderoso e orgulhoso. Simboliza o controle das paixões e do orgulho humano.",
        traditions: [
            "Etapa I: Ficar em silêncio por um minuto observando uma chama.",
            "Etapa II: Respirar lentamente até sentir calma interior.",
            "Etapa III: Soprar a chama com respeito, representando o domínio sobre o fogo.",
        ],
        references: &["Al-Jahiz – Kitab al-Hayawan", "Oxford Islamic Studies – Ifrit"],
        genders: &[],
        ages: &["Adulto"],
    },
    Seed {
        id: "marid",
        name: "Marid",
        culture: "Islâmica",
        traits: &["voice_shift", "mood_swings", "memory_gaps", "time_distortion"],
        description: "Jinn das águas profundas e das tempestades. Representa emoções presas e desejos não expressos.",
        traditions: [
            "Etapa I: Lavar as mãos e o rosto com água fria, em silêncio.",
            "Etapa II: Ficar próximo a uma fonte ou rio por alguns minutos.",
            "Etapa III: Mentalizar o som da água levando embora preocupações.",
        ],
        references: &["Kitab al-Bulhan (séc. XIV)", "Qur'an Surata 55 – Ar-Rahman"],
        genders: &[],
        ages: &["Adulto"],
    },
    Seed {
        id: "ghul",
        name: "Ghul",
        culture: "Islâmica",
        traits: &["somnambulism", "aversion_symbols", "shadow_presence", "object_movement"],
        description: "Jinn associado a desertos e cemitérios. Gosta de se disfarçar e confundir viajantes. Símbolo do medo do desconhecido.",
        traditions: [
            "Etapa I: Caminhar alguns passos em linha reta, observando atentamente o caminho.",
            "Etapa II: Falar uma frase de coragem em voz alta.",
            "Etapa III: Acender uma lanterna para simbolizar o retorno à clareza.",
        ],
        references: &["Al-Qazwini – Aja'ib al-Makhluqat", "Encyclopaedia of Islam – Ghul"],
        genders: &[],
        ages: &["Adulto"],
    },
    Seed {
        id: "silat",
        name: "Si’lat",
        culture: "Islâmica",
        traits: &["xenoglossia", "mood_swings", "mirror_discomfort", "symbolic_drawings"],
        description: "Jinn sedutor e mutável, famoso por enganar viajantes com aparências belas. Representa a ilusão e o autoengano.",
        traditions: [
            "Etapa I: Olhar-se no espelho e dizer o próprio nome três vezes.",
            "Etapa II: Respirar fundo e sorrir, reconhecendo quem se é de verdade.",
            "Etapa III: Agradecer em voz alta pela autenticidade recuperada.",
        ],
        references: &["Al-Jahiz – Kitab al-Hayawan", "Oxford Dictionary of Islam – Si’lat"],
        genders: &["Feminino"],
        ages: &["Adulto"],
    },
];

/// The shipped entity catalog, in display order
pub fn sample_entities() -> Vec<EntityDefinition> {
    SEEDS.iter().map(Seed::build).collect()
}
