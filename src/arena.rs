// Phase scenery: the coloured floor, lighting and the viruses.
use bevy::prelude::*;
use rand::Rng;

use crate::config::GameConfig;
use crate::player::SKY_BLUE;
use crate::sections::Sections;
use crate::sequencer::{PhaseStarted, Sequencer};

pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_arena_assets)
            .add_systems(OnEnter(Sections::Playing), (spawn_lights, set_sky_background))
            .add_systems(
                Update,
                setup_phase.run_if(in_state(Sections::Playing)),
            );
    }
}

const FLOOR_SIZE: f32 = 200.0;
const ENEMY_HEIGHT: f32 = 1.0;
const VIRUS_COLOR: Color = Color::srgb(1.0, 0.33, 0.33);

/// Anything that belongs to the current phase only.
#[derive(Component)]
pub struct PhaseScenery;

#[derive(Component)]
pub struct Enemy;

#[derive(Resource)]
struct ArenaAssets {
    floor: Handle<Mesh>,
    virus: Handle<Mesh>,
    virus_material: Handle<StandardMaterial>,
}

fn load_arena_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<GameConfig>,
) {
    commands.insert_resource(ArenaAssets {
        floor: meshes.add(Plane3d::default().mesh().size(FLOOR_SIZE, FLOOR_SIZE)),
        virus: meshes.add(Sphere::new(config.enemy_radius)),
        virus_material: materials.add(StandardMaterial {
            base_color: VIRUS_COLOR,
            ..default()
        }),
    });
}

fn spawn_lights(mut commands: Commands) {
    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 200.0,
        affects_lightmapped_meshes: false,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
        DespawnOnExit(Sections::Playing),
    ));
}

fn set_sky_background(mut clear_color: ResMut<ClearColor>) {
    clear_color.0 = SKY_BLUE;
}

/// Random point on a ring around the origin, at enemy height.
pub fn spawn_position(rng: &mut impl Rng, radius_min: f32, radius_max: f32) -> Vec3 {
    let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    let radius: f32 = if radius_max > radius_min {
        rng.random_range(radius_min..radius_max)
    } else {
        radius_min
    };
    Vec3::new(angle.cos() * radius, ENEMY_HEIGHT, angle.sin() * radius)
}

fn setup_phase(
    mut commands: Commands,
    mut started: MessageReader<PhaseStarted>,
    scenery: Query<Entity, With<PhaseScenery>>,
    sequencer: Res<Sequencer>,
    config: Res<GameConfig>,
    assets: Res<ArenaAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(event) = started.read().last() else {
        return;
    };
    let Some(phase) = sequencer.phase(event.index) else {
        return;
    };

    for entity in &scenery {
        commands.entity(entity).despawn();
    }

    let color = phase.ambient_color();
    commands.spawn((
        PhaseScenery,
        Mesh3d(assets.floor.clone()),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        DespawnOnExit(Sections::Playing),
    ));
    commands.insert_resource(GlobalAmbientLight {
        color,
        brightness: 200.0,
        affects_lightmapped_meshes: false,
    });

    let count = config.enemy_count(event.index);
    let mut rng = rand::rng();
    for _ in 0..count {
        commands.spawn((
            Enemy,
            PhaseScenery,
            Mesh3d(assets.virus.clone()),
            MeshMaterial3d(assets.virus_material.clone()),
            Transform::from_translation(spawn_position(
                &mut rng,
                config.spawn_radius_min,
                config.spawn_radius_max,
            )),
            DespawnOnExit(Sections::Playing),
        ));
    }
    debug!("phase {} arena ready with {count} viruses", event.index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn spawn_positions_stay_on_the_ring() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let pos = spawn_position(&mut rng, 50.0, 100.0);
            let radius = Vec2::new(pos.x, pos.z).length();
            assert!((49.99..100.01).contains(&radius), "radius {radius}");
            assert_eq!(pos.y, ENEMY_HEIGHT);
        }
    }

    #[test]
    fn fixed_radius_when_range_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let pos = spawn_position(&mut rng, 30.0, 30.0);
        assert!((Vec2::new(pos.x, pos.z).length() - 30.0).abs() < 1e-3);
    }
}
