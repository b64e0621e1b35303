use glam::{Mat4, Vec3};

/// Fixed perspective camera. Right-handed system; looks from `eye` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO, Vec3::Y)
    }
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.eye
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Perspective projection with wgpu's 0..1 depth range.
    #[inline]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-6), self.near, self.far)
    }

    /// Aspect ratio for a framebuffer, with a zero height clamped to one pixel.
    #[inline]
    pub fn aspect_for(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4Swizzles;

    #[test]
    fn test_view_moves_target_onto_negative_z() {
        let cam = Camera::default();
        let t = cam.view_matrix().transform_point3(cam.target);
        assert!(t.x.abs() < 1e-5 && t.y.abs() < 1e-5);
        assert!((t.z + 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_depth_range() {
        let cam = Camera::default();
        let p = cam.projection_matrix(800.0 / 600.0);
        let near = p * Vec3::new(0.0, 0.0, -cam.near).extend(1.0);
        let far = p * Vec3::new(0.0, 0.0, -cam.far).extend(1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_aspect_follows_framebuffer() {
        let cam = Camera::default();
        let wide = cam.projection_matrix(Camera::aspect_for(1600, 600));
        let narrow = cam.projection_matrix(Camera::aspect_for(800, 600));
        // x scale shrinks as the aspect grows
        assert!(wide.x_axis.x < narrow.x_axis.x);
        assert_eq!(wide.y_axis.xyz(), narrow.y_axis.xyz());
        assert_eq!(Camera::aspect_for(640, 0), 640.0);
    }
}
