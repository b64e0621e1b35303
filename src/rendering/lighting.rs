//! Point light and the Phong model evaluated by the fragment stage.
//!
//! [`PhongModel::shade`] is a CPU mirror of `fs_main` in
//! `assets/shaders/phong.wgsl`; keep the two in sync.

use glam::{Mat3, Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 5.0, 5.0),
            color: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongModel {
    pub ambient_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
}

impl Default for PhongModel {
    fn default() -> Self {
        Self {
            ambient_strength: 0.1,
            specular_strength: 0.5,
            shininess: 32.0,
        }
    }
}

impl PhongModel {
    /// `(ambient + diffuse + specular) * object_color` for one fragment.
    pub fn shade(
        &self,
        frag_pos: Vec3,
        normal: Vec3,
        view_pos: Vec3,
        light: &PointLight,
        object_color: Vec3,
    ) -> Vec3 {
        let ambient = self.ambient_strength * light.color;

        let norm = normal.normalize_or_zero();
        let light_dir = (light.position - frag_pos).normalize_or_zero();
        let diff = norm.dot(light_dir).max(0.0);
        let diffuse = diff * light.color;

        let view_dir = (view_pos - frag_pos).normalize_or_zero();
        let reflect_dir = reflect(-light_dir, norm);
        let spec = view_dir.dot(reflect_dir).max(0.0).powf(self.shininess);
        let specular = self.specular_strength * spec * light.color;

        (ambient + diffuse + specular) * object_color
    }
}

/// GLSL/WGSL `reflect`: `i - 2 * dot(n, i) * n`
#[inline]
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * n.dot(i) * n
}

/// Inverse-transpose of the model's upper 3x3, so normals stay perpendicular
/// to surfaces under non-uniform scale.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    Mat3::from_mat4(model).inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::shaders::PHONG_WGSL;

    #[test]
    fn test_facing_light_and_viewer() {
        let model = PhongModel::default();
        let light = PointLight {
            position: Vec3::new(0.0, 0.0, 10.0),
            color: Vec3::ONE,
        };
        let c = model.shade(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 20.0), &light, Vec3::X);
        // ambient 0.1 + diffuse 1.0 + specular 0.5, red channel only
        assert!((c.x - 1.6).abs() < 1e-5, "{c:?}");
        assert_eq!(c.y, 0.0);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_back_face_gets_ambient_only() {
        let model = PhongModel::default();
        let light = PointLight::default();
        let c = model.shade(Vec3::ZERO, Vec3::NEG_ONE, Vec3::new(0.0, 0.0, 30.0), &light, Vec3::ONE);
        assert!((c - Vec3::splat(0.1)).length() < 1e-6, "{c:?}");
    }

    #[test]
    fn test_reflect_mirrors_about_normal() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_normal_matrix_rigid_and_scaled() {
        let rigid = Mat4::from_translation(Vec3::new(4.0, -2.0, 1.0))
            * Mat4::from_axis_angle(Vec3::new(0.5, 1.0, 0.0).normalize(), 1.3);
        let n = normal_matrix(rigid);
        let r = Mat3::from_mat4(rigid);
        assert!(n.abs_diff_eq(r, 1e-5));

        // Non-uniform scale: the transformed normal stays perpendicular to a
        // transformed tangent.
        let scaled = Mat4::from_scale(Vec3::new(2.0, 0.5, 1.0));
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let tangent = Vec3::new(1.0, -1.0, 0.0);
        let n2 = normal_matrix(scaled) * normal;
        let t2 = Mat3::from_mat4(scaled) * tangent;
        assert!(n2.dot(t2).abs() < 1e-5);
    }

    #[test]
    fn test_shader_constants_match() {
        let m = PhongModel::default();
        assert!(PHONG_WGSL.contains(&format!("AMBIENT_STRENGTH: f32 = {:?};", m.ambient_strength)));
        assert!(PHONG_WGSL.contains(&format!("SPECULAR_STRENGTH: f32 = {:?};", m.specular_strength)));
        assert!(PHONG_WGSL.contains(&format!("SHININESS: f32 = {:?};", m.shininess)));
    }
}
