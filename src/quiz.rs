// Quiz panel: multiple-choice questions, scored as they are answered.
use bevy::prelude::*;

use crate::content::QuizQuestion;
use crate::panels::{PanelButton, Selected, panel_root, spawn_button};
use crate::sections::{Rejected, Sections, Session};
use crate::sequencer::{PanelInput, Sequencer, Step};

pub struct QuizPlugin;

impl Plugin for QuizPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            refresh_quiz_panel
                .run_if(in_state(Sections::Playing).and(resource_changed::<Sequencer>)),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizProgress {
    /// Answer recorded, another question follows.
    Next { correct: bool },
    /// The last question was answered. Reported exactly once.
    Finished { correct: bool },
    AlreadyFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRunner {
    questions: Vec<QuizQuestion>,
    index: usize,
    selected: Option<usize>,
}

impl QuizRunner {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            index: 0,
            selected: None,
        }
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Position of the current question, 1-based, and the total.
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.questions.len())
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// Picks an option for the current question. Out-of-range picks are ignored.
    pub fn select(&mut self, option: usize) {
        let Some(question) = self.current() else {
            return;
        };
        if option < question.options.len() {
            self.selected = Some(option);
        }
    }

    /// Grades the current selection and awards `bonus` on a correct answer.
    pub fn submit(&mut self, session: &mut Session, bonus: u32) -> Result<QuizProgress, Rejected> {
        let Some(question) = self.current() else {
            return Ok(QuizProgress::AlreadyFinished);
        };
        let chosen = self.selected.ok_or(Rejected::NoOptionSelected)?;

        let correct = chosen == question.answer;
        if correct {
            session.award(bonus);
        }

        self.index += 1;
        self.selected = None;
        if self.is_finished() {
            Ok(QuizProgress::Finished { correct })
        } else {
            Ok(QuizProgress::Next { correct })
        }
    }
}

#[derive(Component)]
struct QuizPanel;

fn refresh_quiz_panel(
    mut commands: Commands,
    panels: Query<Entity, With<QuizPanel>>,
    sequencer: Res<Sequencer>,
) {
    for entity in &panels {
        commands.entity(entity).despawn();
    }

    let Step::Quiz(runner) = sequencer.step() else {
        return;
    };
    let Some(question) = runner.current() else {
        return;
    };
    let (number, total) = runner.position();

    commands.spawn((QuizPanel, panel_root())).with_children(|panel| {
        panel.spawn((
            Text::new(format!("Question {number}/{total}")),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            TextColor(Color::srgba(0.8, 0.8, 0.8, 1.0)),
        ));
        panel.spawn((
            Text::new(question.prompt.clone()),
            TextFont {
                font_size: 22.0,
                ..default()
            },
            TextColor(Color::WHITE),
            Node {
                max_width: Val::Px(640.0),
                ..default()
            },
        ));

        for (i, option) in question.options.iter().enumerate() {
            let label = format!("{}. {option}", i + 1);
            let button = PanelButton(PanelInput::Select(i));
            if runner.selected() == Some(i) {
                spawn_button(panel, &label, (button, Selected));
            } else {
                spawn_button(panel, &label, button);
            }
        }

        spawn_button(panel, "Answer", PanelButton(PanelInput::Submit));
    });
}
