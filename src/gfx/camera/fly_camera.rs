use cgmath::*;

use super::camera_utils::OPENGL_TO_WGPU_MATRIX;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

const PITCH_LIMIT: f32 = 89.0;
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;

/// Direction of a single keyboard movement command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person fly camera driven by Euler angles (degrees)
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub world_up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vector3::zero())
    }
}

impl FlyCamera {
    pub fn new(position: Vector3<f32>) -> Self {
        let mut camera = Self {
            position,
            front: -Vector3::unit_z(),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: Vector3::unit_y(),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Applies a look delta in cursor units; positive `y_offset` looks up
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Restores a persisted front vector as-is.
    ///
    /// Yaw and pitch are derived from it so the next look delta continues from
    /// the restored orientation instead of snapping back to the defaults. A
    /// degenerate vector is stored but leaves the angles and basis untouched.
    pub fn set_front(&mut self, front: Vector3<f32>) {
        self.front = front;
        let length2 = front.magnitude2();
        if length2 <= f32::EPSILON || !length2.is_finite() {
            return;
        }
        let dir = front.normalize();
        let right = dir.cross(self.world_up);
        if right.magnitude2() <= f32::EPSILON {
            return;
        }
        self.pitch = Deg::from(Rad(dir.y.clamp(-1.0, 1.0).asin())).0;
        self.yaw = Deg::from(Rad(dir.z.atan2(dir.x))).0;
        self.right = right.normalize();
        self.up = self.right.cross(dir).normalize();
    }

    /// Vertical field of view in degrees
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        Matrix4::look_at_rh(eye, eye + self.front, self.up)
    }

    /// Perspective projection in wgpu clip space
    pub fn projection_matrix(&self, aspect: f32, z_near: f32, z_far: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.zoom), aspect, z_near, z_far)
    }

    fn update_camera_vectors(&mut self) {
        let (yaw, pitch) = (Deg(self.yaw), Deg(self.pitch));
        self.front = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_vec_eq(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < EPS, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = FlyCamera::new(Vector3::new(0.0, 0.0, 3.0));
        assert_vec_eq(camera.front, Vector3::new(0.0, 0.0, -1.0));
        assert_vec_eq(camera.right, Vector3::new(1.0, 0.0, 0.0));
        assert_vec_eq(camera.up, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn test_keyboard_moves_along_basis() {
        let mut camera = FlyCamera::new(Vector3::zero());
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert_vec_eq(camera.position, Vector3::new(0.0, 0.0, -2.5));
        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert_vec_eq(camera.position, Vector3::new(5.0, 0.0, -2.5));
        camera.process_keyboard(CameraMovement::Backward, 1.0);
        camera.process_keyboard(CameraMovement::Left, 2.0);
        assert_vec_eq(camera.position, Vector3::zero());
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_movement(0.0, 10_000.0);
        assert_eq!(camera.pitch, 89.0);
        camera.process_mouse_movement(0.0, -20_000.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn test_mouse_sensitivity_scales_yaw() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_movement(100.0, 0.0);
        assert!((camera.yaw - (-80.0)).abs() < EPS);
    }

    #[test]
    fn test_scroll_clamps_zoom() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom, 35.0);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom, 1.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn test_set_front_keeps_vector_and_derives_angles() {
        let mut camera = FlyCamera::default();
        let front = Vector3::new(1.0, 0.0, 0.0);
        camera.set_front(front);
        assert_eq!(camera.front, front);
        assert!(camera.yaw.abs() < EPS);
        assert!(camera.pitch.abs() < EPS);

        // A zero-length look delta recomputes the same direction
        camera.process_mouse_movement(0.0, 0.0);
        assert_vec_eq(camera.front, front);
    }

    #[test]
    fn test_set_front_degenerate_vector_keeps_angles() {
        let mut camera = FlyCamera::default();
        camera.set_front(Vector3::zero());
        assert_eq!(camera.front, Vector3::zero());
        assert_eq!(camera.yaw, DEFAULT_YAW);
        assert_eq!(camera.pitch, DEFAULT_PITCH);
        assert_vec_eq(camera.right, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let camera = FlyCamera::new(Vector3::new(1.0, 2.0, 3.0));
        let eye = camera.view_matrix() * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert!(eye.truncate().magnitude() < EPS);
    }
}
