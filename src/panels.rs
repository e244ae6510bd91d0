// Shared widgets for the phase panels, and the inputs they produce.
use bevy::prelude::*;

use crate::sections::Sections;
use crate::sequencer::{InputKind, PanelInput, Sequencer, drive_sequencer};

pub struct PanelsPlugin;

impl Plugin for PanelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, button_visuals).add_systems(
            Update,
            (panel_buttons, panel_shortcuts)
                .before(drive_sequencer)
                .run_if(in_state(Sections::Playing)),
        );
    }
}

pub const NORMAL_BUTTON: Color = Color::srgb(0.15, 0.15, 0.15);
const HOVERED_BUTTON: Color = Color::srgb(0.25, 0.25, 0.25);
const PRESSED_BUTTON: Color = Color::srgb(0.35, 0.35, 0.35);
const SELECTED_BUTTON: Color = Color::srgb(0.15, 0.35, 0.55);

/// A button that feeds its input to the sequencer when pressed.
#[derive(Component, Clone, Copy)]
pub struct PanelButton(pub PanelInput);

/// Marks the chosen quiz option.
#[derive(Component)]
pub struct Selected;

/// Bottom-centre box that holds the active panel.
pub fn panel_root() -> impl Bundle {
    (
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            left: Val::Percent(10.0),
            right: Val::Percent(10.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            row_gap: Val::Px(10.0),
            padding: UiRect::all(Val::Px(16.0)),
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.3)),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
        DespawnOnExit(Sections::Playing),
    )
}

pub fn spawn_button(parent: &mut ChildSpawnerCommands, label: &str, marker: impl Bundle) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                min_width: Val::Px(64.0),
                min_height: Val::Px(36.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.3)),
            BackgroundColor(NORMAL_BUTTON),
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn button_visuals(
    mut query: Query<
        (
            &Interaction,
            &mut BackgroundColor,
            &mut BorderColor,
            Has<Selected>,
        ),
        (Changed<Interaction>, With<Button>),
    >,
) {
    for (interaction, mut bg, mut border, selected) in &mut query {
        match *interaction {
            Interaction::Pressed => {
                *bg = PRESSED_BUTTON.into();
                *border = BorderColor::all(Color::WHITE);
            }
            Interaction::Hovered => {
                *bg = HOVERED_BUTTON.into();
                *border = BorderColor::all(Color::WHITE);
            }
            Interaction::None => {
                *bg = if selected {
                    SELECTED_BUTTON.into()
                } else {
                    NORMAL_BUTTON.into()
                };
                *border = BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.3));
            }
        }
    }
}

fn panel_buttons(
    query: Query<(&Interaction, &PanelButton), Changed<Interaction>>,
    mut inputs: MessageWriter<PanelInput>,
) {
    for (interaction, button) in &query {
        if *interaction == Interaction::Pressed {
            inputs.write(button.0);
        }
    }
}

const OPTION_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Keyboard equivalents, so panels can be used while the pointer is locked.
fn panel_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    sequencer: Res<Sequencer>,
    mut inputs: MessageWriter<PanelInput>,
) {
    let awaiting = sequencer.step().awaiting();

    if awaiting == InputKind::Answer {
        for (option, key) in OPTION_KEYS.iter().enumerate() {
            if keyboard.just_pressed(*key) {
                inputs.write(PanelInput::Select(option));
            }
        }
    }

    if keyboard.any_just_pressed([KeyCode::Enter, KeyCode::Space]) {
        match awaiting {
            InputKind::Advance => {
                inputs.write(PanelInput::Advance);
            }
            InputKind::Answer => {
                inputs.write(PanelInput::Submit);
            }
            InputKind::Tune => {
                inputs.write(PanelInput::Confirm);
            }
            InputKind::Nothing => {}
        }
    }
}
