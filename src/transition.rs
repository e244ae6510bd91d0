// Full-screen title cards that fade in and out when a phase begins.

use bevy::prelude::*;

use crate::sections::Sections;
use crate::sequencer::{PhaseStarted, Sequencer};

pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (announce_phase, fade_card)
                .chain()
                .run_if(in_state(Sections::Playing)),
        )
        .add_systems(OnExit(Sections::Playing), clear_card);
    }
}

const FADE_IN: f32 = 0.1;
const HOLD: f32 = 1.5;
const FADE_OUT: f32 = 1.0;
const TOTAL: f32 = FADE_IN + HOLD + FADE_OUT;

#[derive(Resource)]
struct CardTimer(f32);

#[derive(Component)]
struct CardRoot;

#[derive(Component)]
struct CardText;

/// Text and background alpha `t` seconds into a card, or `None` once it is
/// over.
pub fn card_alpha(t: f32) -> Option<(f32, f32)> {
    if t >= TOTAL {
        None
    } else if t < FADE_IN {
        Some((t / FADE_IN, 1.0))
    } else if t < FADE_IN + HOLD {
        Some((1.0, 1.0))
    } else {
        let faded = 1.0 - (t - FADE_IN - HOLD) / FADE_OUT;
        Some((faded, faded))
    }
}

pub fn card_title(index: usize, title: &str) -> String {
    format!("Phase {}: {title}", index + 1)
}

fn announce_phase(
    mut commands: Commands,
    mut started: MessageReader<PhaseStarted>,
    sequencer: Res<Sequencer>,
    roots: Query<Entity, With<CardRoot>>,
) {
    let Some(event) = started.read().last() else {
        return;
    };
    let Some(phase) = sequencer.phase(event.index) else {
        return;
    };

    // A new phase replaces any card still on screen.
    for entity in &roots {
        commands.entity(entity).despawn();
    }
    commands.insert_resource(CardTimer(0.0));

    commands
        .spawn((
            CardRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::BLACK),
            GlobalZIndex(100),
            DespawnOnExit(Sections::Playing),
        ))
        .with_children(|parent| {
            parent.spawn((
                CardText,
                Text::new(card_title(event.index, &phase.title)),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.0)),
            ));
        });
}

fn fade_card(
    mut commands: Commands,
    time: Res<Time>,
    mut timer: Option<ResMut<CardTimer>>,
    roots: Query<Entity, With<CardRoot>>,
    mut texts: Query<&mut TextColor, With<CardText>>,
    mut backgrounds: Query<&mut BackgroundColor, With<CardRoot>>,
) {
    let Some(timer) = timer.as_mut() else {
        return;
    };
    timer.0 += time.delta_secs();

    let Some((text_alpha, bg_alpha)) = card_alpha(timer.0) else {
        for entity in &roots {
            commands.entity(entity).despawn();
        }
        commands.remove_resource::<CardTimer>();
        return;
    };

    for mut color in &mut texts {
        color.0 = Color::srgba(1.0, 1.0, 1.0, text_alpha);
    }
    for mut bg in &mut backgrounds {
        bg.0 = Color::srgba(0.0, 0.0, 0.0, bg_alpha);
    }
}

fn clear_card(mut commands: Commands) {
    commands.remove_resource::<CardTimer>();
}
