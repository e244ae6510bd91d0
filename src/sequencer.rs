// Phase sequencer: dialogue, then quiz, then the optional puzzle, for every
// phase in order, then the end of the game.
use bevy::prelude::*;

use crate::config::GameConfig;
use crate::content::{Phase, PhaseTable};
use crate::dialogue::{DialoguePresenter, DialogueProgress};
use crate::hud::ShowPrompt;
use crate::ledger::{Ledger, Ranking, ScoreEntry};
use crate::puzzle::PuzzleRunner;
use crate::quiz::{QuizProgress, QuizRunner};
use crate::sections::{Rejected, Sections, Session};

pub struct SequencerPlugin;

impl Plugin for SequencerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Sequencer::new(PhaseTable::builtin()))
            .init_resource::<Session>()
            .add_message::<PanelInput>()
            .add_message::<PhaseStarted>()
            .add_systems(OnEnter(Sections::Playing), begin_run)
            .add_systems(
                Update,
                (drive_sequencer, dispatch_sequencer_events)
                    .chain()
                    .run_if(in_state(Sections::Playing)),
            );
    }
}

/// Player actions on the phase panels.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelInput {
    Advance,
    Select(usize),
    Submit,
    Slide { control: usize, value: u32 },
    Confirm,
}

/// The kind of input the current step is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Advance,
    Answer,
    Tune,
    Nothing,
}

impl PanelInput {
    pub fn kind(self) -> InputKind {
        match self {
            PanelInput::Advance => InputKind::Advance,
            PanelInput::Select(_) | PanelInput::Submit => InputKind::Answer,
            PanelInput::Slide { .. } | PanelInput::Confirm => InputKind::Tune,
        }
    }
}

/// Sent when a phase is loaded so the arena, HUD and title card can react.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStarted {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    PhaseLoaded(usize),
    GameEnded,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Idle,
    Dialogue(DialoguePresenter),
    Quiz(QuizRunner),
    Puzzle(PuzzleRunner),
    Advancing,
    Ended,
}

impl Step {
    pub fn awaiting(&self) -> InputKind {
        match self {
            Step::Dialogue(_) => InputKind::Advance,
            Step::Quiz(_) => InputKind::Answer,
            Step::Puzzle(_) => InputKind::Tune,
            Step::Idle | Step::Advancing | Step::Ended => InputKind::Nothing,
        }
    }
}

#[derive(Resource, Debug)]
pub struct Sequencer {
    table: PhaseTable,
    step: Step,
    events: Vec<SequencerEvent>,
}

impl Sequencer {
    pub fn new(table: PhaseTable) -> Self {
        Self {
            table,
            step: Step::Idle,
            events: Vec::new(),
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.table.get(index)
    }

    pub fn phase_count(&self) -> usize {
        self.table.len()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Starts a run from phase 0 with a cleared score.
    pub fn start(&mut self, session: &mut Session) {
        session.restart();
        self.events.clear();
        if self.table.is_empty() {
            warn!("no phases to play");
        }
        self.load_phase(0, session);
    }

    pub fn load_phase(&mut self, index: usize, session: &mut Session) {
        let Some(phase) = self.table.get(index) else {
            self.finish(index, session);
            return;
        };
        info!("loading phase {index}: {}", phase.title);
        session.phase_index = index;
        self.step = Step::Dialogue(DialoguePresenter::new(phase.dialogue.clone()));
        self.events.push(SequencerEvent::PhaseLoaded(index));
    }

    /// Feeds one input to the current step. Inputs of a kind the step is not
    /// waiting for are ignored.
    pub fn handle(
        &mut self,
        input: PanelInput,
        session: &mut Session,
        config: &GameConfig,
    ) -> Result<(), Rejected> {
        if input.kind() != self.step.awaiting() {
            debug!("ignoring {input:?}, waiting for {:?}", self.step.awaiting());
            return Ok(());
        }

        let step_done = match (&mut self.step, input) {
            (Step::Dialogue(presenter), PanelInput::Advance) => {
                presenter.advance() == DialogueProgress::Finished
            }
            (Step::Quiz(runner), PanelInput::Select(option)) => {
                runner.select(option);
                false
            }
            (Step::Quiz(runner), PanelInput::Submit) => matches!(
                runner.submit(session, config.quiz_bonus)?,
                QuizProgress::Finished { .. }
            ),
            (Step::Puzzle(runner), PanelInput::Slide { control, value }) => {
                runner.set(control, value);
                false
            }
            (Step::Puzzle(runner), PanelInput::Confirm) => {
                runner.confirm(session, config.puzzle_tolerance, config.puzzle_bonus)?
            }
            _ => false,
        };

        if step_done {
            self.complete_step(session, config);
        }
        Ok(())
    }

    fn complete_step(&mut self, session: &mut Session, config: &GameConfig) {
        let Some(phase) = self.table.get(session.phase_index) else {
            return;
        };

        let puzzle_or_advance = || match &phase.puzzle {
            Some(spec) => Step::Puzzle(PuzzleRunner::new(
                spec.clone(),
                config.slider_start,
                config.slider_max,
            )),
            None => Step::Advancing,
        };

        self.step = match &self.step {
            Step::Dialogue(_) if !phase.quiz.is_empty() => {
                Step::Quiz(QuizRunner::new(phase.quiz.clone()))
            }
            Step::Dialogue(_) | Step::Quiz(_) => puzzle_or_advance(),
            _ => Step::Advancing,
        };

        if self.step == Step::Advancing {
            self.load_phase(session.phase_index + 1, session);
        }
    }

    fn finish(&mut self, index: usize, session: &mut Session) {
        session.phase_index = index;
        self.step = Step::Ended;
        self.events.push(SequencerEvent::GameEnded);
        info!(
            "game over: {} scored {} points",
            session.player_name, session.score
        );
    }
}

fn begin_run(mut sequencer: ResMut<Sequencer>, mut session: ResMut<Session>) {
    sequencer.start(&mut session);
}

pub fn drive_sequencer(
    mut inputs: MessageReader<PanelInput>,
    mut sequencer: ResMut<Sequencer>,
    mut session: ResMut<Session>,
    config: Res<GameConfig>,
    mut prompts: MessageWriter<ShowPrompt>,
) {
    for input in inputs.read() {
        if let Err(rejected) = sequencer.handle(*input, &mut session, &config) {
            debug!("rejected {input:?}: {rejected}");
            prompts.write(ShowPrompt(rejected.to_string()));
        }
    }
}

fn dispatch_sequencer_events(
    mut commands: Commands,
    mut sequencer: ResMut<Sequencer>,
    session: Res<Session>,
    mut ledger: ResMut<Ledger>,
    mut started: MessageWriter<PhaseStarted>,
    mut next_state: ResMut<NextState<Sections>>,
) {
    if !sequencer.has_events() {
        return;
    }
    for event in sequencer.bypass_change_detection().take_events() {
        match event {
            SequencerEvent::PhaseLoaded(index) => {
                started.write(PhaseStarted { index });
            }
            SequencerEvent::GameEnded => {
                let entry = ScoreEntry::new(session.player_name.clone(), session.score);
                commands.insert_resource(Ranking(ledger.finalize(entry)));
                next_state.set(Sections::Scores);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{DialogueLine, PuzzleSpec, QuizQuestion, Speaker};
    use crate::ledger::MemoryStore;

    fn line(text: &str) -> DialogueLine {
        DialogueLine {
            speaker: Speaker::Kaoru,
            text: text.to_string(),
        }
    }

    fn question(answer: usize) -> QuizQuestion {
        QuizQuestion {
            prompt: "?".to_string(),
            options: vec!["a".into(), "b".into()],
            answer,
        }
    }

    fn phase(lines: usize, questions: usize, puzzle: Option<&[u32]>) -> Phase {
        Phase {
            title: "test".to_string(),
            dialogue: (0..lines).map(|i| line(&i.to_string())).collect(),
            quiz: (0..questions).map(|_| question(0)).collect(),
            puzzle: puzzle.map(|targets| PuzzleSpec {
                targets: targets.to_vec(),
                labels: targets.iter().map(|t| t.to_string()).collect(),
            }),
            ambient: 0xffffff,
        }
    }

    /// Inputs that clear a phase with every answer correct.
    fn clear_phase_script(phase: &Phase) -> Vec<PanelInput> {
        let mut script = vec![PanelInput::Advance; phase.dialogue.len().max(1)];
        for question in &phase.quiz {
            script.push(PanelInput::Select(question.answer));
            script.push(PanelInput::Submit);
        }
        if let Some(spec) = &phase.puzzle {
            for (control, target) in spec.targets.iter().enumerate() {
                script.push(PanelInput::Slide {
                    control,
                    value: *target,
                });
            }
            script.push(PanelInput::Confirm);
        }
        script
    }

    fn play(
        sequencer: &mut Sequencer,
        session: &mut Session,
        script: &[PanelInput],
    ) -> Vec<Result<(), Rejected>> {
        let config = GameConfig::default();
        script
            .iter()
            .map(|input| sequencer.handle(*input, session, &config))
            .collect()
    }

    #[test]
    fn every_phase_advances_the_index_by_one() {
        let table = PhaseTable::builtin();
        for index in 0..table.len() {
            let mut sequencer = Sequencer::new(table.clone());
            let mut session = Session::new("Ana");
            sequencer.load_phase(index, &mut session);
            let script = clear_phase_script(table.get(index).unwrap());
            play(&mut sequencer, &mut session, &script);
            assert_eq!(session.phase_index, index + 1, "phase {index}");
        }
    }

    #[test]
    fn steps_run_dialogue_then_quiz_then_puzzle() {
        let mut sequencer = Sequencer::new(PhaseTable::new(vec![phase(2, 1, Some(&[50]))]));
        let mut session = Session::default();
        sequencer.start(&mut session);
        assert_eq!(sequencer.step().awaiting(), InputKind::Advance);

        play(&mut sequencer, &mut session, &[PanelInput::Advance]);
        assert_eq!(sequencer.step().awaiting(), InputKind::Advance);
        play(&mut sequencer, &mut session, &[PanelInput::Advance]);
        assert_eq!(sequencer.step().awaiting(), InputKind::Answer);

        play(
            &mut sequencer,
            &mut session,
            &[PanelInput::Select(0), PanelInput::Submit],
        );
        assert_eq!(sequencer.step().awaiting(), InputKind::Tune);
        // Quiz points land before the puzzle starts.
        assert_eq!(session.score, 20);

        play(&mut sequencer, &mut session, &[PanelInput::Confirm]);
        assert_eq!(*sequencer.step(), Step::Ended);
        assert_eq!(session.score, 50);
    }

    #[test]
    fn phase_without_puzzle_skips_straight_to_next_phase() {
        let mut sequencer =
            Sequencer::new(PhaseTable::new(vec![phase(1, 1, None), phase(1, 1, None)]));
        let mut session = Session::default();
        sequencer.start(&mut session);
        play(
            &mut sequencer,
            &mut session,
            &[PanelInput::Advance, PanelInput::Select(1), PanelInput::Submit],
        );
        assert_eq!(session.phase_index, 1);
        assert_eq!(session.score, 0);
        assert!(matches!(sequencer.step(), Step::Dialogue(_)));
        assert_eq!(
            sequencer.take_events(),
            vec![SequencerEvent::PhaseLoaded(0), SequencerEvent::PhaseLoaded(1)]
        );
    }

    #[test]
    fn empty_dialogue_needs_one_advance() {
        let mut sequencer = Sequencer::new(PhaseTable::new(vec![phase(0, 1, None)]));
        let mut session = Session::default();
        sequencer.start(&mut session);
        assert_eq!(sequencer.step().awaiting(), InputKind::Advance);
        play(&mut sequencer, &mut session, &[PanelInput::Advance]);
        assert_eq!(sequencer.step().awaiting(), InputKind::Answer);
    }

    #[test]
    fn empty_quiz_is_skipped() {
        let mut sequencer = Sequencer::new(PhaseTable::new(vec![phase(1, 0, Some(&[10]))]));
        let mut session = Session::default();
        sequencer.start(&mut session);
        play(&mut sequencer, &mut session, &[PanelInput::Advance]);
        assert_eq!(sequencer.step().awaiting(), InputKind::Tune);
    }

    #[test]
    fn inputs_for_other_steps_are_ignored() {
        let mut sequencer = Sequencer::new(PhaseTable::new(vec![phase(1, 1, None)]));
        let mut session = Session::default();
        sequencer.start(&mut session);
        let results = play(
            &mut sequencer,
            &mut session,
            &[PanelInput::Submit, PanelInput::Confirm, PanelInput::Select(0)],
        );
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(sequencer.step().awaiting(), InputKind::Advance);
    }

    #[test]
    fn rejections_leave_the_step_unchanged() {
        let mut sequencer = Sequencer::new(PhaseTable::new(vec![phase(1, 1, Some(&[90]))]));
        let mut session = Session::default();
        sequencer.start(&mut session);
        play(&mut sequencer, &mut session, &[PanelInput::Advance]);

        let results = play(&mut sequencer, &mut session, &[PanelInput::Submit]);
        assert_eq!(results, vec![Err(Rejected::NoOptionSelected)]);
        assert_eq!(sequencer.step().awaiting(), InputKind::Answer);

        play(
            &mut sequencer,
            &mut session,
            &[PanelInput::Select(0), PanelInput::Submit],
        );
        let results = play(&mut sequencer, &mut session, &[PanelInput::Confirm]);
        assert_eq!(results, vec![Err(Rejected::OutOfTolerance)]);
        assert_eq!(sequencer.step().awaiting(), InputKind::Tune);
        assert_eq!(session.score, 20);
    }

    #[test]
    fn full_run_ends_the_game_once() {
        let table = PhaseTable::builtin();
        let mut sequencer = Sequencer::new(table.clone());
        let mut session = Session::new("Ana");
        sequencer.start(&mut session);

        let script: Vec<PanelInput> = table.iter().flat_map(clear_phase_script).collect();
        let results = play(&mut sequencer, &mut session, &script);
        assert!(results.iter().all(Result::is_ok));

        let questions: u32 = table.iter().map(|p| p.quiz.len() as u32).sum();
        let puzzles = table.iter().filter(|p| p.puzzle.is_some()).count() as u32;
        assert_eq!(session.score, questions * 20 + puzzles * 30);
        assert_eq!(session.phase_index, table.len());
        assert_eq!(*sequencer.step(), Step::Ended);

        let events = sequencer.take_events();
        assert_eq!(events.len(), table.len() + 1);
        assert_eq!(events.last(), Some(&SequencerEvent::GameEnded));

        play(&mut sequencer, &mut session, &[PanelInput::Advance]);
        assert!(!sequencer.has_events());
    }

    #[test]
    fn start_again_resets_progress() {
        let mut sequencer = Sequencer::new(PhaseTable::new(vec![phase(1, 1, None)]));
        let mut session = Session::new("Ana");
        sequencer.start(&mut session);
        play(
            &mut sequencer,
            &mut session,
            &[PanelInput::Advance, PanelInput::Select(0), PanelInput::Submit],
        );
        assert_eq!(*sequencer.step(), Step::Ended);

        sequencer.start(&mut session);
        assert_eq!(session.phase_index, 0);
        assert_eq!(session.score, 0);
        assert_eq!(session.player_name, "Ana");
        assert_eq!(sequencer.take_events(), vec![SequencerEvent::PhaseLoaded(0)]);
    }

    #[test]
    fn play_again_keeps_the_saved_ranking() {
        let mut ledger = Ledger::new(MemoryStore::default(), 10);
        let mut sequencer = Sequencer::new(PhaseTable::new(vec![phase(1, 1, None)]));
        let mut session = Session::new("Ana");
        sequencer.start(&mut session);
        play(
            &mut sequencer,
            &mut session,
            &[PanelInput::Advance, PanelInput::Select(0), PanelInput::Submit],
        );
        assert_eq!(*sequencer.step(), Step::Ended);

        let entry = ScoreEntry::new(session.player_name.clone(), session.score);
        let ranking = ledger.finalize(entry);
        assert_eq!(ranking, vec![ScoreEntry::new("Ana", 20)]);

        sequencer.start(&mut session);
        assert_eq!(session.phase_index, 0);
        assert_eq!(session.score, 0);
        assert_eq!(ledger.load(), ranking);
    }

    #[test]
    fn empty_table_ends_at_once() {
        let mut sequencer = Sequencer::new(PhaseTable::new(Vec::new()));
        let mut session = Session::new("Ana");
        sequencer.start(&mut session);
        assert_eq!(*sequencer.step(), Step::Ended);
        assert_eq!(sequencer.take_events(), vec![SequencerEvent::GameEnded]);
    }
}
