use glam::{Mat4, Vec2, Vec3};

use crate::input::{InputState, KeyCode, NamedKey};

/// Degrees of pitch/yaw added per pixel of cursor travel.
const MOUSE_SENSITIVITY: f32 = 0.1;
/// Movement speed in world units per second.
const BASE_SPEED: f32 = 2.5;
/// Pitch is clamped short of the poles to avoid gimbal flip.
const PITCH_LIMIT_DEG: f32 = 89.0;
const FOV_MIN_DEG: f32 = 1.0;
const FOV_MAX_DEG: f32 = 100.0;

/// Free-flying camera driven by cursor deltas, scroll zoom, and polled keys.
///
/// Yaw and pitch are the source of truth for orientation; the forward vector
/// is recomputed from them on every change rather than integrated, so it can
/// never drift away from unit length.
#[derive(Debug)]
pub struct CameraController {
    position: Vec3,
    forward: Vec3,
    up: Vec3,
    yaw_deg: f32,
    pitch_deg: f32,
    fov_deg: f32,
    last_cursor: Option<Vec2>,
}

impl CameraController {
    pub fn new() -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            forward: Vec3::X,
            up: Vec3::Y,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            fov_deg: 75.0,
            last_cursor: None,
        };
        camera.refresh_forward();
        camera
    }

    /// Feeds an absolute cursor position in window coordinates.
    ///
    /// The first sample only establishes the reference point and produces
    /// no rotation.
    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        let Some(last) = self.last_cursor.replace(Vec2::new(x, y)) else {
            return;
        };
        let dx = (x - last.x) * MOUSE_SENSITIVITY;
        // Screen y grows downward, pitch grows upward.
        let dy = (last.y - y) * MOUSE_SENSITIVITY;
        self.yaw_deg += dx;
        self.pitch_deg = (self.pitch_deg + dy).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.refresh_forward();
    }

    /// Scroll wheel zoom: positive deltas narrow the field of view.
    pub fn scroll(&mut self, dy: f32) {
        self.fov_deg = (self.fov_deg - dy).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
    }

    /// Advances the camera position for one frame from the polled key state.
    ///
    /// Each axis is applied independently: diagonal movement is faster than
    /// single-axis movement, and stays that way (pinned by tests).
    pub fn tick(&mut self, input: &InputState, delta_seconds: f32) {
        let speed = BASE_SPEED * delta_seconds;
        let right = self.forward.cross(self.up).normalize();
        if input.is_key_down(KeyCode::Character('W')) {
            self.position += self.forward * speed;
        }
        if input.is_key_down(KeyCode::Character('S')) {
            self.position -= self.forward * speed;
        }
        if input.is_key_down(KeyCode::Character('A')) {
            self.position -= right * speed;
        }
        if input.is_key_down(KeyCode::Character('D')) {
            self.position += right * speed;
        }
        if input.is_key_down(KeyCode::Named(NamedKey::Space)) {
            self.position += self.up * speed;
        }
        if input.is_key_down(KeyCode::Named(NamedKey::LeftShift))
            || input.is_key_down(KeyCode::Named(NamedKey::RightShift))
        {
            self.position -= self.up * speed;
        }
    }

    /// Read-only view of the pose, sufficient to build view and projection
    /// matrices without reaching into controller internals.
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            position: self.position,
            forward: self.forward,
            up: self.up,
            fov_deg: self.fov_deg,
        }
    }

    fn refresh_forward(&mut self) {
        let yaw = self.yaw_deg.to_radians();
        let pitch = self.pitch_deg.to_radians();
        self.forward = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable per-frame camera state handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov_deg: f32,
}

impl CameraSnapshot {
    /// Look-at view matrix toward `position + forward`.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_pose_looks_along_positive_x() {
        let camera = CameraController::new();
        let snapshot = camera.snapshot();
        assert_close(snapshot.position, Vec3::new(0.0, 0.0, 3.0));
        assert_close(snapshot.forward, Vec3::X);
        assert_close(snapshot.up, Vec3::Y);
        assert!((snapshot.fov_deg - 75.0).abs() < EPS);
    }

    #[test]
    fn first_cursor_sample_causes_no_rotation() {
        let mut camera = CameraController::new();
        let before = camera.snapshot().forward;
        camera.cursor_moved(912.0, -443.5);
        assert_close(camera.snapshot().forward, before);
    }

    #[test]
    fn second_cursor_sample_rotates() {
        let mut camera = CameraController::new();
        camera.cursor_moved(0.0, 0.0);
        camera.cursor_moved(100.0, 0.0);
        // 100 px * 0.1 deg/px = 10 degrees of yaw.
        let expected = Vec3::new(
            10f32.to_radians().cos(),
            0.0,
            10f32.to_radians().sin(),
        );
        assert_close(camera.snapshot().forward, expected);
    }

    #[test]
    fn forward_stays_unit_length_across_angle_sweep() {
        for dx in (-7000..7000).step_by(370) {
            for dy in (-2000..2000).step_by(230) {
                let mut camera = CameraController::new();
                camera.cursor_moved(0.0, 0.0);
                camera.cursor_moved(dx as f32, dy as f32);
                let forward = camera.snapshot().forward;
                assert!(
                    (forward.length() - 1.0).abs() < EPS,
                    "forward {forward} not unit for deltas ({dx}, {dy})"
                );
            }
        }
    }

    #[test]
    fn pitch_is_clamped_at_the_poles() {
        let mut camera = CameraController::new();
        camera.cursor_moved(0.0, 0.0);
        // A huge upward swipe; pitch must stop at 89 degrees.
        camera.cursor_moved(0.0, -100_000.0);
        let forward = camera.snapshot().forward;
        assert!((forward.y - 89f32.to_radians().sin()).abs() < EPS);
        // Further swipes keep it pinned rather than wrapping.
        camera.cursor_moved(0.0, -200_000.0);
        assert!((camera.snapshot().forward.y - forward.y).abs() < EPS);
    }

    #[test]
    fn scroll_never_drives_fov_out_of_range() {
        let mut camera = CameraController::new();
        camera.scroll(1.0e6);
        assert!((camera.snapshot().fov_deg - 1.0).abs() < EPS);
        camera.scroll(-1.0e6);
        assert!((camera.snapshot().fov_deg - 100.0).abs() < EPS);
        for dy in [-3.0, 250.0, -0.25, 97.5, -1000.0, 4.0] {
            camera.scroll(dy);
            let fov = camera.snapshot().fov_deg;
            assert!((1.0..=100.0).contains(&fov), "fov {fov} escaped range");
        }
    }

    #[test]
    fn forward_key_moves_exactly_base_speed_times_forward() {
        let mut camera = CameraController::new();
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        camera.tick(&input, 1.0);
        assert_close(camera.snapshot().position, Vec3::new(2.5, 0.0, 3.0));
    }

    #[test]
    fn movement_scales_linearly_with_delta_time() {
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));

        let mut half = CameraController::new();
        half.tick(&input, 0.5);
        let mut full = CameraController::new();
        full.tick(&input, 1.0);

        let origin = Vec3::new(0.0, 0.0, 3.0);
        let half_step = half.snapshot().position - origin;
        let full_step = full.snapshot().position - origin;
        assert_close(full_step, half_step * 2.0);
    }

    #[test]
    fn diagonal_movement_is_not_normalized() {
        let mut camera = CameraController::new();
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        input.set_key_down(KeyCode::Character('D'));
        camera.tick(&input, 1.0);
        let travelled = (camera.snapshot().position - Vec3::new(0.0, 0.0, 3.0)).length();
        assert!((travelled - 2.5 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn vertical_keys_move_along_up_axis() {
        let mut camera = CameraController::new();
        let input = InputState::new();
        input.set_key_down(KeyCode::Named(NamedKey::Space));
        camera.tick(&input, 1.0);
        assert_close(camera.snapshot().position, Vec3::new(0.0, 2.5, 3.0));

        input.set_key_up(KeyCode::Named(NamedKey::Space));
        input.set_key_down(KeyCode::Named(NamedKey::LeftShift));
        camera.tick(&input, 1.0);
        assert_close(camera.snapshot().position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn view_matrix_matches_look_at_of_snapshot() {
        let camera = CameraController::new();
        let snapshot = camera.snapshot();
        let expected = Mat4::look_at_rh(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(1.0, 0.0, 3.0),
            Vec3::Y,
        );
        assert!(snapshot.view().abs_diff_eq(expected, EPS));
    }
}
