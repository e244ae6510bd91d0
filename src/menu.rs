// Login screen: name entry and start.

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;

use crate::panels::{NORMAL_BUTTON, spawn_button};
use crate::sections::{Rejected, Sections, Session};

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NameField>()
            .add_systems(OnEnter(Sections::Login), setup_menu)
            .add_systems(
                Update,
                (type_name, button_actions, credits_back, update_name_text)
                    .chain()
                    .run_if(in_state(Sections::Login)),
            );
    }
}

const MAX_NAME_LEN: usize = 24;

#[derive(Component)]
enum MenuButton {
    Start,
    Credits,
    #[cfg(not(target_arch = "wasm32"))]
    Exit,
}

#[derive(Component)]
struct CreditsOverlay;

#[derive(Component)]
struct CreditsBack;

#[derive(Component)]
struct NameText;

#[derive(Component)]
struct LoginPrompt;

/// Text typed into the name box.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct NameField(String);

impl NameField {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends typed text, skipping control characters and stopping at the
    /// length limit.
    pub fn push_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            if self.0.chars().count() >= MAX_NAME_LEN {
                break;
            }
            self.0.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.0.pop();
    }

    /// The trimmed name, or a rejection if nothing but whitespace was typed.
    pub fn submit(&self) -> Result<String, Rejected> {
        let name = self.0.trim();
        if name.is_empty() {
            return Err(Rejected::EmptyName);
        }
        Ok(name.to_string())
    }
}

fn setup_menu(mut commands: Commands, field: Res<NameField>) {
    // Root container.
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.05, 0.07, 0.12)),
            DespawnOnExit(Sections::Login),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Innate"),
                TextFont {
                    font_size: 64.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                Text::new("Type your name"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgba(0.8, 0.8, 0.8, 1.0)),
            ));

            // Name box.
            parent
                .spawn((
                    Node {
                        width: Val::Px(320.0),
                        height: Val::Px(44.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BorderColor::all(Color::WHITE),
                    BackgroundColor(NORMAL_BUTTON),
                ))
                .with_children(|field_box| {
                    field_box.spawn((
                        NameText,
                        Text::new(format!("{}_", field.as_str())),
                        TextFont {
                            font_size: 24.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });

            parent.spawn((
                LoginPrompt,
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.8, 0.3)),
            ));

            spawn_button(parent, "Start", MenuButton::Start);
            spawn_button(parent, "Credits", MenuButton::Credits);

            // Exit button (native only).
            #[cfg(not(target_arch = "wasm32"))]
            spawn_button(parent, "Exit", MenuButton::Exit);
        });
}

fn type_name(
    mut keys: MessageReader<KeyboardInput>,
    mut field: ResMut<NameField>,
    mut session: ResMut<Session>,
    mut next_state: ResMut<NextState<Sections>>,
    mut prompt: Query<&mut Text, With<LoginPrompt>>,
) {
    for key in keys.read() {
        if !key.state.is_pressed() {
            continue;
        }
        match &key.logical_key {
            Key::Enter => submit_name(&field, &mut session, &mut next_state, &mut prompt),
            Key::Backspace => field.backspace(),
            _ => {
                if let Some(text) = &key.text {
                    field.push_str(text);
                }
            }
        }
    }
}

fn submit_name(
    field: &NameField,
    session: &mut Session,
    next_state: &mut NextState<Sections>,
    prompt: &mut Query<&mut Text, With<LoginPrompt>>,
) {
    match field.submit() {
        Ok(name) => {
            info!("starting a game for {name}");
            *session = Session::new(name);
            next_state.set(Sections::Playing);
        }
        Err(rejected) => {
            if let Ok(mut text) = prompt.single_mut() {
                **text = rejected.to_string();
            }
        }
    }
}

fn update_name_text(field: Res<NameField>, mut text: Query<&mut Text, With<NameText>>) {
    if !field.is_changed() {
        return;
    }
    if let Ok(mut text) = text.single_mut() {
        **text = format!("{}_", field.as_str());
    }
}

fn button_actions(
    query: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    field: Res<NameField>,
    mut session: ResMut<Session>,
    mut next_state: ResMut<NextState<Sections>>,
    mut prompt: Query<&mut Text, With<LoginPrompt>>,
    mut commands: Commands,
    #[cfg(not(target_arch = "wasm32"))] mut exit: MessageWriter<AppExit>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            MenuButton::Start => {
                submit_name(&field, &mut session, &mut next_state, &mut prompt);
            }
            MenuButton::Credits => {
                spawn_credits_overlay(&mut commands);
            }
            #[cfg(not(target_arch = "wasm32"))]
            MenuButton::Exit => {
                exit.write(AppExit::Success);
            }
        }
    }
}

fn spawn_credits_overlay(commands: &mut Commands) {
    commands
        .spawn((
            CreditsOverlay,
            DespawnOnExit(Sections::Login),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.95)),
            GlobalZIndex(200),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("How to play"),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            let lines = [
                "Click the world to look around, Escape to free the mouse",
                "WASD or arrow keys to move, click to shoot viruses",
                "Enter or Space to continue, 1-9 to pick an answer",
                "",
                "Quiz answer: 20 pts   Puzzle: 30 pts   Virus: 10 pts",
                "",
                "Made with Bevy",
            ];
            for line in lines {
                parent.spawn((
                    Text::new(line),
                    TextFont {
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(Color::srgba(0.8, 0.8, 0.8, 1.0)),
                ));
            }

            spawn_button(parent, "Back", CreditsBack);
        });
}

fn credits_back(
    mut commands: Commands,
    overlay: Query<Entity, With<CreditsOverlay>>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<CreditsBack>)>,
) {
    for interaction in &buttons {
        if *interaction == Interaction::Pressed {
            for entity in &overlay {
                commands.entity(entity).despawn();
            }
        }
    }
}
