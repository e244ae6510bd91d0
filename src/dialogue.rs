// Dialogue panel: one narrative line at a time.
use bevy::prelude::*;

use crate::content::DialogueLine;
use crate::panels::{PanelButton, panel_root, spawn_button};
use crate::sections::Sections;
use crate::sequencer::{PanelInput, Sequencer, Step};

pub struct DialoguePlugin;

impl Plugin for DialoguePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            refresh_dialogue_panel
                .run_if(in_state(Sections::Playing).and(resource_changed::<Sequencer>)),
        );
    }
}

/// Result of one advance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueProgress {
    /// A new line is now showing.
    Shown,
    /// The script ran out on this advance. Reported exactly once.
    Finished,
    AlreadyFinished,
}

/// Walks a dialogue script. The first line is visible as soon as the presenter
/// is created, so a script of `n` lines takes `n` advances, and an empty
/// script takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialoguePresenter {
    lines: Vec<DialogueLine>,
    cursor: usize,
    finished: bool,
}

impl DialoguePresenter {
    pub fn new(lines: Vec<DialogueLine>) -> Self {
        Self {
            lines,
            cursor: 0,
            finished: false,
        }
    }

    pub fn current(&self) -> Option<&DialogueLine> {
        if self.is_finished() {
            return None;
        }
        self.lines.get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn advance(&mut self) -> DialogueProgress {
        if self.finished {
            return DialogueProgress::AlreadyFinished;
        }
        if self.cursor + 1 < self.lines.len() {
            self.cursor += 1;
            DialogueProgress::Shown
        } else {
            self.finished = true;
            DialogueProgress::Finished
        }
    }
}

#[derive(Component)]
struct DialoguePanel;

fn refresh_dialogue_panel(
    mut commands: Commands,
    panels: Query<Entity, With<DialoguePanel>>,
    sequencer: Res<Sequencer>,
    asset_server: Res<AssetServer>,
) {
    for entity in &panels {
        commands.entity(entity).despawn();
    }

    let Step::Dialogue(presenter) = sequencer.step() else {
        return;
    };

    commands
        .spawn((DialoguePanel, panel_root()))
        .with_children(|panel| {
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    align_items: AlignItems::Center,
                    column_gap: Val::Px(16.0),
                    ..default()
                })
                .with_children(|row| match presenter.current() {
                    Some(line) => {
                        row.spawn((
                            ImageNode::new(asset_server.load(line.speaker.avatar_path())),
                            Node {
                                width: Val::Px(96.0),
                                height: Val::Px(96.0),
                                ..default()
                            },
                        ));
                        row.spawn(Node {
                            flex_direction: FlexDirection::Column,
                            row_gap: Val::Px(6.0),
                            max_width: Val::Px(560.0),
                            ..default()
                        })
                        .with_children(|column| {
                            column.spawn((
                                Text::new(line.speaker.display_name()),
                                TextFont {
                                    font_size: 22.0,
                                    ..default()
                                },
                                TextColor(Color::srgb(1.0, 0.85, 0.5)),
                            ));
                            column.spawn((
                                Text::new(line.text.clone()),
                                TextFont {
                                    font_size: 18.0,
                                    ..default()
                                },
                                TextColor(Color::WHITE),
                            ));
                        });
                    }
                    None => {
                        row.spawn((
                            Text::new("..."),
                            TextFont {
                                font_size: 18.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                    }
                });

            spawn_button(panel, "Next", PanelButton(PanelInput::Advance));
        });
}
