use std::fmt::Write as _;

use glam::{Mat4, Vec3};

use crate::lighting::LightRig;

/// The single selectable object the viewer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub color: Vec3,
    pub shininess: f32,
    pub placement: Mat4,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 0.5, 0.31),
            shininess: 32.0,
            placement: Mat4::IDENTITY,
        }
    }
}

/// Appearance of the selection highlight drawn around the object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineStyle {
    /// Model-space enlargement factor for the second draw of the mesh.
    pub thickness: f32,
    pub color: Vec3,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            thickness: 0.1,
            color: Vec3::new(0.04, 0.28, 0.26),
        }
    }
}

/// Everything the renderer needs to draw a frame, camera excepted.
/// Fixed after construction apart from CLI overrides applied at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub object: SceneObject,
    pub lights: LightRig,
    pub outline: OutlineStyle,
    pub clear_color: Vec3,
}

impl Scene {
    /// The built-in demo arrangement: one cube, two point lights, a
    /// camera-mounted spotlight.
    pub fn demo() -> Self {
        Self {
            object: SceneObject::default(),
            lights: LightRig::demo(),
            outline: OutlineStyle::default(),
            clear_color: Vec3::ZERO,
        }
    }

    /// Plain-text description printed at startup and by `--summary-only`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Scene: 1 object (shininess {:.0}), outline thickness {:.2}",
            self.object.shininess, self.outline.thickness
        );
        for (index, light) in self.lights.points.iter().enumerate() {
            let _ = writeln!(
                out,
                " - point light {index} at ({:.2}, {:.2}, {:.2})",
                light.position.x, light.position.y, light.position.z
            );
        }
        let _ = write!(
            out,
            " - spotlight follows the camera (cone {:.1} to {:.1} deg)",
            self.lights.spot.cutoff_deg, self.lights.spot.outer_cutoff_deg
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_defaults() {
        let scene = Scene::demo();
        assert_eq!(scene.object.color, Vec3::new(1.0, 0.5, 0.31));
        assert_eq!(scene.object.shininess, 32.0);
        assert_eq!(scene.object.placement, Mat4::IDENTITY);
        assert_eq!(scene.outline.thickness, 0.1);
        assert_eq!(scene.clear_color, Vec3::ZERO);
        assert_eq!(scene.lights.points.len(), 2);
    }

    #[test]
    fn summary_lists_each_point_light() {
        let summary = Scene::demo().summary();
        assert!(summary.contains("point light 0 at (0.70, 0.20, 2.00)"));
        assert!(summary.contains("point light 1 at (-0.70, -0.20, -2.00)"));
        assert!(summary.contains("spotlight follows the camera"));
    }
}
