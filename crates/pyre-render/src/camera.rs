//! Fixed-distance turntable camera driven by pitch/yaw angles

use pyre_core::{mat4_mul, CameraAngles, Vec3};

/// Camera that translates the scene back/down, then rotates it by pitch (X)
/// and yaw (Y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub angles: CameraAngles,
    /// Translation applied before rotation (scene moves, not the eye)
    pub offset: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            angles: CameraAngles::default(),
            offset: Vec3::new(0.0, -0.2, -5.0),
            fov: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_angles(mut self, angles: CameraAngles) -> Self {
        self.angles = angles;
        self
    }

    /// Aspect ratio from a viewport size; zero height is treated as 1
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        self
    }

    /// View matrix: translate(offset) * rotate_x(pitch) * rotate_y(yaw)
    pub fn view_matrix(&self) -> [[f32; 4]; 4] {
        let rotation = mat4_mul(
            &rotation_x(self.angles.pitch),
            &rotation_y(self.angles.yaw),
        );
        mat4_mul(&translation(self.offset), &rotation)
    }

    /// Perspective projection mapping view depth to [0, 1] (wgpu convention)
    pub fn projection_matrix(&self) -> [[f32; 4]; 4] {
        let f = 1.0 / (self.fov.to_radians() / 2.0).tan();
        let range = self.near - self.far;

        // Column-major: m[col][row]
        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, self.far / range, -1.0],
            [0.0, 0.0, self.near * self.far / range, 0.0],
        ]
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> [[f32; 4]; 4] {
        mat4_mul(&self.projection_matrix(), &self.view_matrix())
    }

    /// Eye position in world space
    pub fn eye_position(&self) -> Vec3 {
        self.to_world(-self.offset)
    }

    /// Viewing direction in world space (unit length)
    pub fn forward_vector(&self) -> Vec3 {
        self.to_world(Vec3::FORWARD).normalized()
    }

    /// Undo the camera rotation for a view-space vector
    fn to_world(&self, v: Vec3) -> Vec3 {
        rotate_y(rotate_x(v, -self.angles.pitch), -self.angles.yaw)
    }
}

fn translation(t: Vec3) -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [t.x, t.y, t.z, 1.0],
    ]
}

fn rotation_x(degrees: f32) -> [[f32; 4]; 4] {
    let (s, c) = degrees.to_radians().sin_cos();
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

fn rotation_y(degrees: f32) -> [[f32; 4]; 4] {
    let (s, c) = degrees.to_radians().sin_cos();
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

fn rotate_x(v: Vec3, degrees: f32) -> Vec3 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec3::new(v.x, c * v.y - s * v.z, s * v.y + c * v.z)
}

fn rotate_y(v: Vec3, degrees: f32) -> Vec3 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z)
}

/// Transform a point by a column-major matrix (with perspective divide)
pub fn transform_point(m: &[[f32; 4]; 4], p: Vec3) -> Vec3 {
    let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
    let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
    let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
    let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
    if w.abs() > 1e-8 {
        Vec3::new(x / w, y / w, z / w)
    } else {
        Vec3::new(x, y, z)
    }
}
