// First-person camera controller with mouse look and keyboard movement.
use crate::sections::Sections;
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player)
            .insert_resource(ClearColor(Color::BLACK))
            .insert_resource(GlobalAmbientLight::NONE)
            .add_systems(
                Update,
                (toggle_cursor_grab, mouse_look, player_movement)
                    .chain()
                    .run_if(in_state(Sections::Playing)),
            )
            .add_systems(OnEnter(Sections::Playing), reset_player)
            .add_systems(OnExit(Sections::Playing), release_cursor);
    }
}

#[derive(Component)]
pub struct Player;

/// Tracks the player's yaw and pitch for composed camera rotation.
#[derive(Component)]
pub struct PlayerLook {
    pub yaw: f32,
    pub pitch: f32,
}

const EYE_HEIGHT: f32 = 1.6;
const START_Z: f32 = 5.0;
const MOUSE_SENSITIVITY: f32 = 0.002;
const MOVE_SPEED: f32 = 10.0;
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

pub const SKY_BLUE: Color = Color::linear_rgb(0.53, 0.81, 0.92);

fn spawn_player(mut commands: Commands) {
    commands.spawn((
        Player,
        PlayerLook {
            yaw: 0.0,
            pitch: 0.0,
        },
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            ..default()
        }),
        Transform::from_xyz(0.0, EYE_HEIGHT, START_Z),
    ));
}

/// Locks the pointer on a click into the world and frees it on Escape.
/// Clicks on panel buttons never lock it.
pub fn toggle_cursor_grab(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    buttons: Query<&Interaction, With<Button>>,
    mut cursor: Query<&mut CursorOptions>,
) {
    let Ok(mut cursor) = cursor.single_mut() else {
        return;
    };

    let over_button = buttons.iter().any(|i| *i != Interaction::None);
    if mouse.just_pressed(MouseButton::Left)
        && !over_button
        && cursor.grab_mode != CursorGrabMode::Locked
    {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
        info!("pointer lock requested");
    }
    if keyboard.just_pressed(KeyCode::Escape) && cursor.grab_mode != CursorGrabMode::None {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
        info!("pointer released");
    }
}

fn mouse_look(
    mut motion: MessageReader<MouseMotion>,
    mut query: Query<(&mut Transform, &mut PlayerLook), With<Player>>,
    cursor: Query<&CursorOptions>,
) {
    let Ok(cursor) = cursor.single() else {
        return;
    };
    if cursor.grab_mode != CursorGrabMode::Locked {
        motion.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for ev in motion.read() {
        delta += ev.delta;
    }
    if delta == Vec2::ZERO {
        return;
    }

    let Ok((mut transform, mut look)) = query.single_mut() else {
        return;
    };
    look.yaw -= delta.x * MOUSE_SENSITIVITY;
    look.pitch = (look.pitch - delta.y * MOUSE_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    transform.rotation = Quat::from_rotation_y(look.yaw) * Quat::from_rotation_x(look.pitch);
}

/// Direction on the ground plane for the held movement keys.
pub fn movement_direction(forward: Vec3, keys: [bool; 4]) -> Vec3 {
    let [ahead, back, left, right] = keys;
    let forward_xz = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right_xz = Vec3::new(-forward_xz.z, 0.0, forward_xz.x);

    let mut movement = Vec3::ZERO;
    if ahead {
        movement += forward_xz;
    }
    if back {
        movement -= forward_xz;
    }
    if right {
        movement += right_xz;
    }
    if left {
        movement -= right_xz;
    }
    movement.normalize_or_zero()
}

fn player_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut Transform, With<Player>>,
    cursor: Query<&CursorOptions>,
    time: Res<Time>,
) {
    let Ok(cursor) = cursor.single() else {
        return;
    };
    if cursor.grab_mode != CursorGrabMode::Locked {
        return;
    }
    let Ok(mut transform) = query.single_mut() else {
        return;
    };

    let keys = [
        keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
        keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]),
        keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]),
        keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]),
    ];
    let movement = movement_direction(*transform.forward(), keys);
    transform.translation += movement * MOVE_SPEED * time.delta_secs();
}

fn reset_player(mut query: Query<(&mut Transform, &mut PlayerLook), With<Player>>) {
    let Ok((mut transform, mut look)) = query.single_mut() else {
        return;
    };
    transform.translation = Vec3::new(0.0, EYE_HEIGHT, START_Z);
    look.yaw = 0.0;
    look.pitch = 0.0;
    transform.rotation = Quat::IDENTITY;
}

fn release_cursor(mut cursor: Query<&mut CursorOptions>) {
    let Ok(mut cursor) = cursor.single_mut() else {
        return;
    };
    cursor.grab_mode = CursorGrabMode::None;
    cursor.visible = true;
}
