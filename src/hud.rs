// Heads-up display: score, phase, crosshair and short-lived prompts.
use bevy::prelude::*;

use crate::sections::{Sections, Session};
use crate::sequencer::{PhaseStarted, Sequencer};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ShowPrompt>()
            .add_systems(OnEnter(Sections::Playing), spawn_hud)
            .add_systems(
                Update,
                (update_score, update_phase, show_prompt, fade_prompt)
                    .run_if(in_state(Sections::Playing)),
            );
    }
}

/// A player-facing message, such as a rejected answer.
#[derive(Message, Debug, Clone)]
pub struct ShowPrompt(pub String);

const PROMPT_SECONDS: f32 = 3.0;

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct PhaseText;

#[derive(Component)]
struct PromptText {
    remaining: f32,
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
            DespawnOnExit(Sections::Playing),
        ))
        .with_children(|parent| {
            parent.spawn((
                ScoreText,
                Text::new("Score: 0"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                PhaseText,
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgba(0.8, 0.8, 0.8, 1.0)),
            ));
        });

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            DespawnOnExit(Sections::Playing),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("+"),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.8)),
            ));
        });

    commands.spawn((
        PromptText { remaining: 0.0 },
        Text::new(""),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.8, 0.3)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(10.0),
            ..default()
        },
        DespawnOnExit(Sections::Playing),
    ));
}

fn update_score(session: Res<Session>, mut text: Query<&mut Text, With<ScoreText>>) {
    if !session.is_changed() {
        return;
    }
    if let Ok(mut text) = text.single_mut() {
        **text = format!("Score: {}", session.score);
    }
}

fn update_phase(
    mut started: MessageReader<PhaseStarted>,
    sequencer: Res<Sequencer>,
    mut text: Query<&mut Text, With<PhaseText>>,
) {
    let Some(event) = started.read().last() else {
        return;
    };
    let Some(phase) = sequencer.phase(event.index) else {
        return;
    };
    if let Ok(mut text) = text.single_mut() {
        **text = format!(
            "Phase {}/{}: {}",
            event.index + 1,
            sequencer.phase_count(),
            phase.title
        );
    }
}

fn show_prompt(
    mut prompts: MessageReader<ShowPrompt>,
    mut text: Query<(&mut Text, &mut PromptText)>,
) {
    let Some(prompt) = prompts.read().last() else {
        return;
    };
    if let Ok((mut text, mut state)) = text.single_mut() {
        **text = prompt.0.clone();
        state.remaining = PROMPT_SECONDS;
    }
}

fn fade_prompt(time: Res<Time>, mut text: Query<(&mut Text, &mut PromptText)>) {
    let Ok((mut text, mut state)) = text.single_mut() else {
        return;
    };
    if state.remaining <= 0.0 {
        return;
    }
    state.remaining -= time.delta_secs();
    if state.remaining <= 0.0 {
        **text = String::new();
    }
}
