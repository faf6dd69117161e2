use glam::Vec3;

use crate::camera::CameraSnapshot;
use crate::program::{UniformLayoutBuilder, UniformSink};

/// Number of point lights the shading program is compiled for.
pub const MAX_POINT_LIGHTS: usize = 2;

/// Inverse-distance falloff coefficients: `1 / (c + l·d + q·d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// A fixed light in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
        }
    }
}

/// A flashlight cone attached to the camera. Position and direction are not
/// stored; they are read from the live camera snapshot at upload time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
    /// Full-intensity half angle of the cone, degrees.
    pub cutoff_deg: f32,
    /// Zero-intensity half angle; the band between the two is the soft edge.
    pub outer_cutoff_deg: f32,
}

impl Default for Spotlight {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
            cutoff_deg: 12.5,
            outer_cutoff_deg: 15.0,
        }
    }
}

/// The scene's lights, uploaded each frame under stable indexed names.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub points: Vec<PointLight>,
    pub spot: Spotlight,
}

impl LightRig {
    /// The default two-light arrangement.
    pub fn demo() -> Self {
        Self {
            points: vec![
                PointLight::at(Vec3::new(0.7, 0.2, 2.0)),
                PointLight::at(Vec3::new(-0.7, -0.2, -2.0)),
            ],
            spot: Spotlight::default(),
        }
    }

    /// Registers every uniform slot this rig uploads, in upload order.
    pub fn register(&self, builder: &mut UniformLayoutBuilder) {
        for index in 0..self.points.len() {
            builder
                .vec3(format!("pointLights[{index}].position"))
                .vec3(format!("pointLights[{index}].ambient"))
                .vec3(format!("pointLights[{index}].diffuse"))
                .vec3(format!("pointLights[{index}].specular"))
                .float(format!("pointLights[{index}].constant"))
                .float(format!("pointLights[{index}].linear"))
                .float(format!("pointLights[{index}].quadratic"));
        }
        builder
            .vec3("spotLight.position")
            .vec3("spotLight.direction")
            .vec3("spotLight.ambient")
            .vec3("spotLight.diffuse")
            .vec3("spotLight.specular")
            .float("spotLight.constant")
            .float("spotLight.linear")
            .float("spotLight.quadratic")
            .float("spotLight.cutOff")
            .float("spotLight.outerCutOff");
    }

    /// Uploads the full parameter set. Point lights go out in index order;
    /// the spotlight takes its pose from the camera.
    pub fn upload(&self, sink: &mut dyn UniformSink, camera: &CameraSnapshot) {
        for (index, light) in self.points.iter().enumerate() {
            sink.set_vec3(&format!("pointLights[{index}].position"), light.position);
            sink.set_vec3(&format!("pointLights[{index}].ambient"), light.ambient);
            sink.set_vec3(&format!("pointLights[{index}].diffuse"), light.diffuse);
            sink.set_vec3(&format!("pointLights[{index}].specular"), light.specular);
            sink.set_float(
                &format!("pointLights[{index}].constant"),
                light.attenuation.constant,
            );
            sink.set_float(
                &format!("pointLights[{index}].linear"),
                light.attenuation.linear,
            );
            sink.set_float(
                &format!("pointLights[{index}].quadratic"),
                light.attenuation.quadratic,
            );
        }

        let spot = &self.spot;
        sink.set_vec3("spotLight.position", camera.position);
        sink.set_vec3("spotLight.direction", camera.forward);
        sink.set_vec3("spotLight.ambient", spot.ambient);
        sink.set_vec3("spotLight.diffuse", spot.diffuse);
        sink.set_vec3("spotLight.specular", spot.specular);
        sink.set_float("spotLight.constant", spot.attenuation.constant);
        sink.set_float("spotLight.linear", spot.attenuation.linear);
        sink.set_float("spotLight.quadratic", spot.attenuation.quadratic);
        sink.set_float("spotLight.cutOff", spot.cutoff_deg.to_radians().cos());
        sink.set_float(
            "spotLight.outerCutOff",
            spot.outer_cutoff_deg.to_radians().cos(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{UniformLayout, UniformStore};

    fn store_for(rig: &LightRig) -> UniformStore {
        let mut builder = UniformLayout::builder();
        rig.register(&mut builder);
        UniformStore::new(builder.build())
    }

    fn camera() -> CameraSnapshot {
        CameraSnapshot {
            position: Vec3::new(0.0, 0.0, 3.0),
            forward: Vec3::X,
            up: Vec3::Y,
            fov_deg: 75.0,
        }
    }

    #[test]
    fn default_attenuation_matches_documented_coefficients() {
        let attenuation = Attenuation::default();
        assert_eq!(attenuation.constant, 1.0);
        assert_eq!(attenuation.linear, 0.09);
        assert_eq!(attenuation.quadratic, 0.032);
    }

    #[test]
    fn demo_rig_uploads_exactly_two_indexed_point_lights() {
        let rig = LightRig::demo();
        let mut store = store_for(&rig);
        rig.upload(&mut store, &camera());

        assert_eq!(
            store.vec3("pointLights[0].position"),
            Some(Vec3::new(0.7, 0.2, 2.0))
        );
        assert_eq!(
            store.vec3("pointLights[1].position"),
            Some(Vec3::new(-0.7, -0.2, -2.0))
        );
        assert!(!store.layout().contains("pointLights[2].position"));

        for index in 0..2 {
            assert_eq!(store.float(&format!("pointLights[{index}].constant")), Some(1.0));
            assert_eq!(store.float(&format!("pointLights[{index}].linear")), Some(0.09));
            assert_eq!(
                store.float(&format!("pointLights[{index}].quadratic")),
                Some(0.032)
            );
        }
    }

    #[test]
    fn spotlight_tracks_the_camera_pose() {
        let rig = LightRig::demo();
        let mut store = store_for(&rig);
        let snapshot = camera();
        rig.upload(&mut store, &snapshot);

        assert_eq!(store.vec3("spotLight.position"), Some(snapshot.position));
        assert_eq!(store.vec3("spotLight.direction"), Some(snapshot.forward));
    }

    #[test]
    fn spotlight_cutoffs_are_uploaded_as_cosines() {
        let rig = LightRig::demo();
        let mut store = store_for(&rig);
        rig.upload(&mut store, &camera());

        let inner = store.float("spotLight.cutOff").unwrap();
        let outer = store.float("spotLight.outerCutOff").unwrap();
        assert!((inner - 12.5f32.to_radians().cos()).abs() < 1e-6);
        assert!((outer - 15.0f32.to_radians().cos()).abs() < 1e-6);
        // The soft edge needs a wider outer cone, i.e. a smaller cosine.
        assert!(outer < inner);
    }

    #[test]
    fn demo_light_colors_follow_the_defaults() {
        let light = PointLight::at(Vec3::ZERO);
        assert_eq!(light.ambient, Vec3::splat(0.05));
        assert_eq!(light.diffuse, Vec3::splat(0.8));
        assert_eq!(light.specular, Vec3::ONE);
    }
}
