// Slider puzzle: match every control to its target within a tolerance.
use bevy::prelude::*;

use crate::content::PuzzleSpec;
use crate::panels::{PanelButton, panel_root, spawn_button};
use crate::sections::{Rejected, Sections, Session};
use crate::sequencer::{PanelInput, Sequencer, Step};

pub struct PuzzlePlugin;

impl Plugin for PuzzlePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            refresh_puzzle_panel
                .run_if(in_state(Sections::Playing).and(resource_changed::<Sequencer>)),
        );
    }
}

/// Step sizes offered next to each control.
const STEPS: [i64; 4] = [-10, -1, 1, 10];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleRunner {
    spec: PuzzleSpec,
    values: Vec<u32>,
    max: u32,
    solved: bool,
}

impl PuzzleRunner {
    pub fn new(spec: PuzzleSpec, start: u32, max: u32) -> Self {
        let values = vec![start.min(max); spec.targets.len()];
        Self {
            spec,
            values,
            max,
            solved: false,
        }
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn labels(&self) -> &[String] {
        &self.spec.labels
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Moves one control, clamped to `0..=max`. Unknown controls are ignored.
    pub fn set(&mut self, control: usize, value: u32) {
        if let Some(slot) = self.values.get_mut(control) {
            *slot = value.min(self.max);
        }
    }

    /// True when every control is within `tolerance` of its target.
    pub fn within_tolerance(&self, tolerance: u32) -> bool {
        self.values
            .iter()
            .zip(&self.spec.targets)
            .all(|(value, target)| value.abs_diff(*target) <= tolerance)
    }

    /// Checks the current values. On success awards `bonus`; a solved puzzle
    /// stays solved and awards nothing further. A failed check leaves every
    /// value as it was.
    pub fn confirm(
        &mut self,
        session: &mut Session,
        tolerance: u32,
        bonus: u32,
    ) -> Result<bool, Rejected> {
        if self.is_solved() {
            return Ok(false);
        }
        if !self.within_tolerance(tolerance) {
            return Err(Rejected::OutOfTolerance);
        }
        self.solved = true;
        session.award(bonus);
        Ok(true)
    }
}

#[derive(Component)]
struct PuzzlePanel;

fn refresh_puzzle_panel(
    mut commands: Commands,
    panels: Query<Entity, With<PuzzlePanel>>,
    sequencer: Res<Sequencer>,
) {
    for entity in &panels {
        commands.entity(entity).despawn();
    }

    let Step::Puzzle(runner) = sequencer.step() else {
        return;
    };

    commands.spawn((PuzzlePanel, panel_root())).with_children(|panel| {
        panel.spawn((
            Text::new("Tune the parameters"),
            TextFont {
                font_size: 22.0,
                ..default()
            },
            TextColor(Color::WHITE),
        ));

        for (control, (label, value)) in runner.labels().iter().zip(runner.values()).enumerate() {
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    align_items: AlignItems::Center,
                    column_gap: Val::Px(8.0),
                    ..default()
                })
                .with_children(|row| {
                    row.spawn((
                        Text::new(format!("{label}: {value}")),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        Node {
                            width: Val::Px(220.0),
                            ..default()
                        },
                    ));
                    for step in STEPS {
                        let target = (i64::from(*value) + step).clamp(0, i64::from(runner.max()));
                        let label = if step > 0 {
                            format!("+{step}")
                        } else {
                            step.to_string()
                        };
                        spawn_button(
                            row,
                            &label,
                            PanelButton(PanelInput::Slide {
                                control,
                                value: target as u32,
                            }),
                        );
                    }
                });
        }

        spawn_button(panel, "Confirm", PanelButton(PanelInput::Confirm));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: u32 = 10;
    const BONUS: u32 = 30;

    fn spec(targets: &[u32]) -> PuzzleSpec {
        PuzzleSpec {
            targets: targets.to_vec(),
            labels: targets.iter().map(|t| format!("t{t}")).collect(),
        }
    }

    #[test]
    fn controls_start_at_midpoint() {
        let runner = PuzzleRunner::new(spec(&[40, 60, 50]), 50, 100);
        assert_eq!(runner.values(), &[50, 50, 50]);
    }

    #[test]
    fn all_controls_within_tolerance_is_accepted() {
        let mut session = Session::default();
        let mut runner = PuzzleRunner::new(spec(&[50, 50]), 50, 100);
        runner.set(0, 55);
        runner.set(1, 58);
        assert_eq!(runner.confirm(&mut session, TOLERANCE, BONUS), Ok(true));
        assert_eq!(session.score, 30);
        assert!(runner.is_solved());
    }

    #[test]
    fn one_control_out_of_tolerance_rejects_everything() {
        let mut session = Session::default();
        let mut runner = PuzzleRunner::new(spec(&[50, 50]), 50, 100);
        runner.set(0, 55);
        runner.set(1, 62);
        let before = runner.clone();
        assert_eq!(
            runner.confirm(&mut session, TOLERANCE, BONUS),
            Err(Rejected::OutOfTolerance)
        );
        assert_eq!(runner, before);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let mut runner = PuzzleRunner::new(spec(&[70, 30]), 50, 100);
        runner.set(0, 60);
        runner.set(1, 40);
        assert!(runner.within_tolerance(TOLERANCE));
        runner.set(1, 41);
        assert!(!runner.within_tolerance(TOLERANCE));
    }

    #[test]
    fn retries_are_unlimited_and_free() {
        let mut session = Session::default();
        let mut runner = PuzzleRunner::new(spec(&[70, 30]), 50, 100);
        for _ in 0..5 {
            assert!(runner.confirm(&mut session, TOLERANCE, BONUS).is_err());
        }
        runner.set(0, 70);
        runner.set(1, 30);
        assert_eq!(runner.confirm(&mut session, TOLERANCE, BONUS), Ok(true));
        assert_eq!(runner.confirm(&mut session, TOLERANCE, BONUS), Ok(false));
        assert_eq!(session.score, 30);
    }

    #[test]
    fn values_are_clamped_to_max() {
        let mut runner = PuzzleRunner::new(spec(&[90]), 50, 100);
        runner.set(0, 250);
        assert_eq!(runner.values(), &[100]);
        runner.set(3, 10);
        assert_eq!(runner.values(), &[100]);
    }
}
