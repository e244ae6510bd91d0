// Viruses chase the player; the player shoots them down.
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};

use crate::arena::Enemy;
use crate::config::GameConfig;
use crate::player::{Player, toggle_cursor_grab};
use crate::sections::{Sections, Session};

pub struct PursuitPlugin;

impl Plugin for PursuitPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<FireAction>().add_systems(
            Update,
            (
                pursue_player,
                fire_on_click.before(toggle_cursor_grab),
                resolve_fire,
            )
                .chain()
                .run_if(in_state(Sections::Playing)),
        );
    }
}

/// A shot along the camera's forward direction.
#[derive(Message, Debug, Clone, Copy)]
pub struct FireAction;

/// Moves `position` toward `target` by `speed * dt`. Returns the new position
/// and whether it ended up closer than `contact` to the target.
pub fn pursue(position: Vec3, target: Vec3, speed: f32, dt: f32, contact: f32) -> (Vec3, bool) {
    let dir = (target - position).normalize_or_zero();
    let moved = position + dir * speed * dt;
    (moved, moved.distance(target) < contact)
}

/// Distance along `ray` to the first point of the sphere, if it is hit.
pub fn ray_sphere(ray: Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray.origin;
    let along = to_center.dot(*ray.direction);
    let miss_sq = to_center.length_squared() - along * along;
    let radius_sq = radius * radius;
    if miss_sq > radius_sq {
        return None;
    }
    let half_chord = (radius_sq - miss_sq).sqrt();
    let far = along + half_chord;
    if far < 0.0 {
        return None;
    }
    Some((along - half_chord).max(0.0))
}

/// The closest target hit by `ray`.
pub fn nearest_hit<T: Copy>(
    ray: Ray3d,
    radius: f32,
    targets: impl IntoIterator<Item = (T, Vec3)>,
) -> Option<T> {
    targets
        .into_iter()
        .filter_map(|(id, center)| ray_sphere(ray, center, radius).map(|dist| (id, dist)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Fires `ray` at `targets`. At most one target is hit; a hit awards the
/// kill bonus.
pub fn shoot<T: Copy>(
    session: &mut Session,
    config: &GameConfig,
    ray: Ray3d,
    targets: impl IntoIterator<Item = (T, Vec3)>,
) -> Option<T> {
    let hit = nearest_hit(ray, config.enemy_radius, targets)?;
    session.award(config.kill_bonus);
    Some(hit)
}

fn pursue_player(
    mut commands: Commands,
    mut enemies: Query<(Entity, &mut Transform), (With<Enemy>, Without<Player>)>,
    player: Query<&Transform, With<Player>>,
    config: Res<GameConfig>,
    time: Res<Time>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    let dt = time.delta_secs();

    for (entity, mut transform) in &mut enemies {
        let (moved, caught) = pursue(
            transform.translation,
            player.translation,
            config.enemy_speed,
            dt,
            config.despawn_distance,
        );
        transform.translation = moved;
        if caught {
            commands.entity(entity).despawn();
        }
    }
}

fn fire_on_click(
    mouse: Res<ButtonInput<MouseButton>>,
    cursor: Query<&CursorOptions>,
    mut fire: MessageWriter<FireAction>,
) {
    let Ok(cursor) = cursor.single() else {
        return;
    };
    if cursor.grab_mode == CursorGrabMode::Locked && mouse.just_pressed(MouseButton::Left) {
        fire.write(FireAction);
    }
}

fn resolve_fire(
    mut commands: Commands,
    mut fire: MessageReader<FireAction>,
    camera: Query<&Transform, (With<Player>, Without<Enemy>)>,
    enemies: Query<(Entity, &Transform), With<Enemy>>,
    mut session: ResMut<Session>,
    config: Res<GameConfig>,
) {
    let shots = fire.read().count();
    if shots == 0 {
        return;
    }
    let Ok(camera) = camera.single() else {
        return;
    };
    // Same-frame transforms on both sides: enemies moved earlier in this chain.
    let ray = Ray3d {
        origin: camera.translation,
        direction: camera.forward(),
    };

    let mut remaining: Vec<(Entity, Vec3)> = enemies
        .iter()
        .map(|(entity, transform)| (entity, transform.translation))
        .collect();
    for _ in 0..shots {
        let Some(hit) = shoot(&mut session, &config, ray, remaining.iter().copied()) else {
            break;
        };
        remaining.retain(|(entity, _)| *entity != hit);
        commands.entity(hit).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    fn forward_ray() -> Ray3d {
        Ray3d {
            origin: Vec3::ZERO,
            direction: Dir3::NEG_Z,
        }
    }

    #[test]
    fn enemy_moves_toward_player_at_fixed_speed() {
        let (moved, caught) = pursue(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 5.0, 0.5, 2.0);
        assert!((moved - Vec3::new(7.5, 0.0, 0.0)).length() < 1e-5);
        assert!(!caught);
    }

    #[test]
    fn direction_follows_the_player_each_frame() {
        let (first, _) = pursue(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 5.0, 0.1, 2.0);
        let (second, _) = pursue(first, Vec3::new(first.x, 0.0, 20.0), 5.0, 0.1, 2.0);
        assert!((second.x - first.x).abs() < 1e-5);
        assert!(second.z > first.z);
    }

    #[test]
    fn contact_inside_threshold_is_caught() {
        let (_, caught) = pursue(Vec3::new(2.2, 0.0, 0.0), Vec3::ZERO, 5.0, 0.1, 2.0);
        assert!(caught);
        let (_, caught) = pursue(Vec3::new(2.6, 0.0, 0.0), Vec3::ZERO, 5.0, 0.1, 2.0);
        assert!(!caught);
    }

    #[test]
    fn enemy_at_player_position_stays_put() {
        let (moved, caught) = pursue(Vec3::ONE, Vec3::ONE, 5.0, 1.0, 2.0);
        assert_eq!(moved, Vec3::ONE);
        assert!(caught);
    }

    #[test]
    fn ray_hits_sphere_in_front_only() {
        let ray = forward_ray();
        let hit = ray_sphere(ray, Vec3::new(0.0, 0.0, -10.0), 0.8).unwrap();
        assert!((hit - 9.2).abs() < 1e-5);
        assert!(ray_sphere(ray, Vec3::new(0.0, 0.0, 10.0), 0.8).is_none());
        assert!(ray_sphere(ray, Vec3::new(1.0, 0.0, -10.0), 0.8).is_none());
    }

    #[test]
    fn shot_removes_only_the_nearest_enemy() {
        let mut session = Session::default();
        let config = GameConfig::default();
        let targets = [
            (1, Vec3::new(0.0, 0.0, -30.0)),
            (2, Vec3::new(0.3, 0.0, -12.0)),
            (3, Vec3::new(0.0, 0.0, -20.0)),
        ];
        assert_eq!(shoot(&mut session, &config, forward_ray(), targets), Some(2));
        assert_eq!(session.score, 10);
    }

    #[test]
    fn miss_changes_nothing() {
        let mut session = Session::default();
        let config = GameConfig::default();
        let targets = [(1, Vec3::new(5.0, 0.0, -10.0)), (2, Vec3::new(0.0, 0.0, 4.0))];
        assert_eq!(shoot(&mut session, &config, forward_ray(), targets), None);
        assert_eq!(session.score, 0);
    }

    fn world_with_player(player: Transform) -> World {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.insert_resource(Session::default());
        world.init_resource::<Messages<FireAction>>();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_millis(100));
        world.insert_resource(time);
        world.spawn((Player, player));
        world
    }

    #[test]
    fn pursuit_system_despawns_on_contact_without_scoring() {
        let mut world = world_with_player(Transform::default());
        let near = world.spawn((Enemy, Transform::from_xyz(2.1, 0.0, 0.0))).id();
        let far = world.spawn((Enemy, Transform::from_xyz(40.0, 0.0, 0.0))).id();

        world.run_system_once(pursue_player).unwrap();

        assert!(world.get_entity(near).is_err());
        let far_x = world.get::<Transform>(far).unwrap().translation.x;
        assert!((far_x - 39.5).abs() < 1e-4);
        assert_eq!(world.resource::<Session>().score, 0);
    }

    #[test]
    fn fire_system_kills_one_enemy_per_shot() {
        let mut world = world_with_player(Transform::default());
        let front = world.spawn((Enemy, Transform::from_xyz(0.0, 0.0, -10.0))).id();
        let behind = world.spawn((Enemy, Transform::from_xyz(0.0, 0.0, -15.0))).id();

        world.write_message(FireAction);
        world.run_system_once(resolve_fire).unwrap();

        assert!(world.get_entity(front).is_err());
        assert!(world.get_entity(behind).is_ok());
        assert_eq!(world.resource::<Session>().score, 10);
    }

    #[test]
    fn fire_system_aims_with_the_current_camera_pose() {
        // Looking along +X this frame; the stale default pose would face -Z.
        let camera = Transform::default().looking_to(Vec3::X, Vec3::Y);
        let mut world = world_with_player(camera);
        let player = world
            .query_filtered::<Entity, With<Player>>()
            .single(&world)
            .unwrap();
        world.entity_mut(player).insert(GlobalTransform::default());
        let ahead = world.spawn((Enemy, Transform::from_xyz(10.0, 0.0, 0.0))).id();
        let stale = world.spawn((Enemy, Transform::from_xyz(0.0, 0.0, -10.0))).id();

        world.write_message(FireAction);
        world.run_system_once(resolve_fire).unwrap();

        assert!(world.get_entity(ahead).is_err());
        assert!(world.get_entity(stale).is_ok());
    }

    #[test]
    fn fire_system_miss_leaves_everything() {
        let mut world = world_with_player(Transform::default());
        let aside = world.spawn((Enemy, Transform::from_xyz(6.0, 0.0, -10.0))).id();

        world.write_message(FireAction);
        world.run_system_once(resolve_fire).unwrap();

        assert!(world.get_entity(aside).is_ok());
        assert_eq!(world.resource::<Session>().score, 0);
    }

    #[test]
    fn ray_starting_inside_sphere_hits_at_zero() {
        assert_eq!(
            ray_sphere(forward_ray(), Vec3::new(0.0, 0.0, -0.2), 0.8),
            Some(0.0)
        );
    }
}
