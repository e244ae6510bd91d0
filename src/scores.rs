// End-of-game screen with the top-score list.
use bevy::prelude::*;

use crate::ledger::{Ranking, ranked_lines};
use crate::panels::spawn_button;
use crate::sections::{Sections, Session};

pub struct ScoresPlugin;

impl Plugin for ScoresPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Sections::Scores), show_scores)
            .add_systems(
                Update,
                (play_again_button, play_again_key).run_if(in_state(Sections::Scores)),
            );
    }
}

#[derive(Component)]
struct PlayAgain;

fn show_scores(mut commands: Commands, ranking: Res<Ranking>, session: Res<Session>) {
    let lines = ranked_lines(&ranking.0);

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(10.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.9)),
            DespawnOnExit(Sections::Scores),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Top scores"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                Text::new(format!("{}: {} pts", session.player_name, session.score)),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.8, 0.3)),
            ));

            if lines.is_empty() {
                parent.spawn((
                    Text::new("No scores yet"),
                    TextFont {
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(Color::srgba(0.8, 0.8, 0.8, 1.0)),
                ));
            }
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

            spawn_button(parent, "Play again", PlayAgain);
        });
}

fn play_again_button(
    query: Query<&Interaction, (Changed<Interaction>, With<PlayAgain>)>,
    mut next_state: ResMut<NextState<Sections>>,
) {
    if query.iter().any(|i| *i == Interaction::Pressed) {
        next_state.set(Sections::Playing);
    }
}

fn play_again_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<Sections>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        next_state.set(Sections::Playing);
    }
}
