// Main
mod arena;
mod config;
mod content;
mod dialogue;
mod hud;
mod ledger;
mod menu;
mod panels;
mod player;
mod pursuit;
mod puzzle;
mod quiz;
mod scores;
mod sections;
mod sequencer;
mod transition;

use arena::ArenaPlugin;
use bevy::prelude::*;
use config::ConfigPlugin;
use dialogue::DialoguePlugin;
use hud::HudPlugin;
use ledger::LedgerPlugin;
use menu::MenuPlugin;
use panels::PanelsPlugin;
use player::PlayerPlugin;
use pursuit::PursuitPlugin;
use puzzle::PuzzlePlugin;
use quiz::QuizPlugin;
use scores::ScoresPlugin;
use sections::Sections;
use sequencer::SequencerPlugin;
use transition::TransitionPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Innate".to_string(),
                ..default()
            }),
            ..default()
        }))
        .init_state::<Sections>()
        .add_plugins((ConfigPlugin, LedgerPlugin, SequencerPlugin, PanelsPlugin, HudPlugin))
        .add_plugins((
            MenuPlugin,
            PlayerPlugin,
            ArenaPlugin,
            PursuitPlugin,
            DialoguePlugin,
            QuizPlugin,
            PuzzlePlugin,
            TransitionPlugin,
            ScoresPlugin,
        ))
        .run();
}
