// Phase content: dialogue scripts, quizzes, puzzles and colours.
use bevy::prelude::*;
use strum::{AsRefStr, EnumIter};

pub const PHASE_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Speaker {
    Aria,
    Kaoru,
}

impl Speaker {
    pub fn display_name(self) -> &'static str {
        match self {
            Speaker::Aria => "Aria",
            Speaker::Kaoru => "Kaoru",
        }
    }

    pub fn avatar_path(self) -> String {
        format!("avatars/{}.png", self.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub answer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSpec {
    pub targets: Vec<u32>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub title: String,
    pub dialogue: Vec<DialogueLine>,
    pub quiz: Vec<QuizQuestion>,
    pub puzzle: Option<PuzzleSpec>,
    /// 0xRRGGBB floor colour.
    pub ambient: u32,
}

impl Phase {
    pub fn ambient_color(&self) -> Color {
        let [_, r, g, b] = self.ambient.to_be_bytes();
        Color::srgb_u8(r, g, b)
    }
}

/// Read-only table of phases, indexed by phase number.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable(Vec<Phase>);

impl PhaseTable {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self(phases)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.0.iter()
    }

    pub fn builtin() -> Self {
        use Speaker::{Aria, Kaoru};

        let phases = vec![
            phase(
                "Prologue",
                0x88c0d0,
                &[
                    (Aria, "Welcome, researcher! I am Aria, your virtual assistant. Let's explore the world of innate immunity."),
                    (Kaoru, "I'm Kaoru, an immunologist in training. They say innate immunity is just a quick barrier... is it?"),
                    (Aria, "It is much more than that: dynamic, plastic and even capable of memory! Our mission is to find out why the pattern recognition receptors are in disarray."),
                ],
                vec![question(
                    "What is the main difference between innate and adaptive immunity?",
                    &[
                        "Innate immunity has memory and specificity while adaptive is fast and stereotyped",
                        "Adaptive immunity has memory and specificity while innate is fast and memoryless",
                        "Innate immunity is mediated by T and B lymphocytes",
                        "Adaptive immunity does not interact with innate immunity",
                    ],
                    1,
                )],
                None,
            ),
            phase(
                "Epithelium",
                0xa3be8c,
                &[
                    (Aria, "This is the epithelial surface, a living mosaic of cells. Here we look for the lost PRRs: TLRs, NLRs, RLRs, cGAS-STING and the newly described cGLRs."),
                    (Kaoru, "Each one recognises different patterns: PAMPs from microbes or DAMPs from tissue damage. Let's collect them to restore surveillance!"),
                ],
                vec![
                    question(
                        "Which of these PRR families is found on the plasma membrane and in endosomes?",
                        &["NLRs", "TLRs", "RLRs", "CLRs"],
                        1,
                    ),
                    question(
                        "PAMPs are:",
                        &[
                            "Pathogen-associated molecular patterns",
                            "Endogenous molecules released by damaged cells",
                            "Antibodies produced by B lymphocytes",
                            "MHC sequences",
                        ],
                        0,
                    ),
                ],
                None,
            ),
            phase(
                "Bloodstream",
                0xbf616a,
                &[
                    (Aria, "Now we dive into the bloodstream. Circulating neutrophils build extracellular traps: the NETs."),
                    (Kaoru, "We need to tune calcium and NADPH oxidase to release NETs at the right moment and avoid thrombosis."),
                ],
                vec![question(
                    "NETosis in neutrophils involves:",
                    &[
                        "Ejecting DNA and proteins to trap pathogens",
                        "Programmed apoptosis through caspases 8/9",
                        "Secretion of IgG antibodies",
                        "Activation of T lymphocytes",
                    ],
                    0,
                )],
                Some(puzzle(&[(50, "Ca2+"), (50, "NADPH oxidase")])),
            ),
            phase(
                "Inflammasome",
                0xb48ead,
                &[
                    (Aria, "We are inside the cell. Time to assemble inflammasomes, platforms that activate caspase-1 and release IL-1β."),
                    (Kaoru, "There are canonical inflammasomes such as NLRP3 and AIM2, and non-canonical pathways driven by caspases 4/5/11."),
                ],
                vec![question(
                    "Non-canonical inflammasomes depend mainly on which caspases?",
                    &["Caspases 1/3", "Caspases 8/9", "Caspases 4/5/11", "Caspases 2/6"],
                    2,
                )],
                None,
            ),
            phase(
                "Complosome",
                0xebb55a,
                &[
                    (Aria, "We have reached the complosome, an intracellular version of the complement system tied to metabolism."),
                    (Kaoru, "We must balance ATP, reactive oxygen species and the C3a/C5a fragments for a proper response."),
                ],
                vec![question(
                    "The intracellular complosome is associated with:",
                    &[
                        "Integrating complement signals with cell metabolism (ATP, ROS)",
                        "Producing immunoglobulins",
                        "Transcribing TCR genes",
                        "Inhibiting NK cells",
                    ],
                    0,
                )],
                Some(puzzle(&[(40, "ATP"), (60, "ROS"), (50, "C3a/C5a")])),
            ),
            phase(
                "Bone marrow",
                0xd08770,
                &[
                    (Aria, "We are in the bone marrow. Let's train immunity with mRNA vaccines, BCG or β-glucan."),
                    (Kaoru, "Innate memory comes from epigenetic changes (H3K4me3, H3K27ac) and metabolic shifts such as increased glycolysis."),
                ],
                vec![question(
                    "Trained immunity involves epigenetic reprogramming (such as H3K4me3) and is associated with:",
                    &[
                        "Increased glycolysis and IL-6/TNF-α production",
                        "Reduced metabolism and tolerance",
                        "Antibody cloning",
                        "Spontaneous apoptosis",
                    ],
                    0,
                )],
                Some(puzzle(&[(70, "H3K4me3"), (30, "H3K27ac")])),
            ),
            phase(
                "Tumours",
                0x5e81ac,
                &[
                    (Aria, "We are entering the tumours. We will use CAR-NK cells and CAR-macrophages to attack the tumour microenvironment."),
                    (Kaoru, "We will also look at memory ILC3s and sentinel fibroblasts, allies in the immunotherapy of the future."),
                ],
                vec![question(
                    "CAR-NK and CAR-macrophage therapies aim to:",
                    &[
                        "Reprogram innate cells to recognise and attack tumours",
                        "Replace B cells in antibody production",
                        "Neutralise complement C5",
                        "Induce NETosis in neutrophils",
                    ],
                    0,
                )],
                None,
            ),
            phase(
                "Integration",
                0x8fa1b3,
                &[
                    (Aria, "Congratulations! You restored the balance of innate immunity and integrated it with the adaptive response."),
                    (Kaoru, "This knowledge paves the way for new therapies and vaccines. Keep exploring and learning!"),
                ],
                vec![question(
                    "Why is the integration between innate and adaptive immunity essential?",
                    &[
                        "Because both exchange signals and modulate each other, allowing flexible responses",
                        "Because innate immunity always suppresses adaptive immunity",
                        "Because adaptive immunity does not depend on innate immunity",
                        "Because the two systems act in isolation",
                    ],
                    0,
                )],
                None,
            ),
        ];
        debug_assert_eq!(phases.len(), PHASE_COUNT);
        Self(phases)
    }
}

fn phase(
    title: &str,
    ambient: u32,
    lines: &[(Speaker, &str)],
    quiz: Vec<QuizQuestion>,
    puzzle: Option<PuzzleSpec>,
) -> Phase {
    Phase {
        title: title.to_string(),
        dialogue: lines
            .iter()
            .map(|(speaker, text)| DialogueLine {
                speaker: *speaker,
                text: text.to_string(),
            })
            .collect(),
        quiz,
        puzzle,
        ambient,
    }
}

fn question(prompt: &str, options: &[&str], answer: usize) -> QuizQuestion {
    QuizQuestion {
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        answer,
    }
}

fn puzzle(controls: &[(u32, &str)]) -> PuzzleSpec {
    PuzzleSpec {
        targets: controls.iter().map(|(target, _)| *target).collect(),
        labels: controls.iter().map(|(_, label)| label.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn builtin_table_is_well_formed() {
        let table = PhaseTable::builtin();
        assert_eq!(table.len(), PHASE_COUNT);
        assert!(!table.is_empty());
        for phase in table.iter() {
            assert!(!phase.dialogue.is_empty(), "{} has no dialogue", phase.title);
            assert!(!phase.quiz.is_empty(), "{} has no quiz", phase.title);
            for q in &phase.quiz {
                assert!(q.answer < q.options.len(), "bad answer in {}", q.prompt);
            }
            if let Some(puzzle) = &phase.puzzle {
                assert_eq!(puzzle.targets.len(), puzzle.labels.len());
                assert!(puzzle.targets.iter().all(|t| *t <= 100));
            }
        }
    }

    #[test]
    fn puzzles_only_in_bloodstream_complosome_and_marrow() {
        let table = PhaseTable::builtin();
        let with_puzzle: Vec<usize> = table
            .iter()
            .enumerate()
            .filter(|(_, phase)| phase.puzzle.is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(with_puzzle, vec![2, 4, 5]);
    }

    #[test]
    fn every_speaker_has_an_avatar() {
        for speaker in Speaker::iter() {
            assert!(speaker.avatar_path().starts_with("avatars/"));
            assert!(speaker.avatar_path().ends_with(".png"));
        }
        assert_eq!(Speaker::Kaoru.avatar_path(), "avatars/kaoru.png");
    }

    #[test]
    fn avatar_images_ship_with_the_game() {
        let assets = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        for speaker in Speaker::iter() {
            let path = assets.join(speaker.avatar_path());
            assert!(path.is_file(), "missing {}", path.display());
        }
    }
}
