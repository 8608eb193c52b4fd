//! Two-pass frame: shadow map from the light, then the shaded color image.
//!
//! Both passes draw the same uploaded model through the same
//! [`Rasterizer`]; only the shaders and targets differ.
//!
//! * **Shadow pass**: the model is projected orthographically from the light
//!   and each fragment writes its NDC depth. The depth buffer of this pass is
//!   the shadow map.
//! * **Color pass**: the camera's perspective view. The vertex shader also
//!   emits the vertex position in light clip space, which the fragment shader
//!   projects into the shadow map to decide whether it is lit.

use std::path::Path;

use log::{debug, info};

use crate::bitmap;
use crate::colors;
use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::light::DirectionalLight;
use crate::math::{Mat4, Vec3, Vec4};
use crate::model::Model;
use crate::projection::Perspective;
use crate::render::{
    Depth, DrawConfig, FrameBuffer, ModelHandle, Rasterizer, SamplerMode, VertexOutput,
};
use crate::texture::Texture;
use crate::transform::Transform;
use crate::triangle::{Attributes, BarycentricCoordinates, Vertex};

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 10_000.0;
/// Color multiplier for fragments the light cannot see.
pub const SHADOW_ATTENUATION: f32 = 0.5;
/// Clear value of every depth-like target.
pub const FAR_DEPTH: f32 = f32::MAX;

pub const SHADOW_MAP_FILE: &str = "shadowmap.bmp";
pub const COLOR_FILE: &str = "color.bmp";
pub const DEPTH_FILE: &str = "depth.bmp";

/// The shadow pass carries nothing besides the vertex itself.
pub type ShadowPassAttributes = ();

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorPassAttributes {
    /// Light clip-space position, before the perspective divide.
    pub light_space_position: Vec4,
}

impl Attributes for ColorPassAttributes {
    fn interpolate(coords: &BarycentricCoordinates, a: &Self, b: &Self, c: &Self) -> Self {
        Self {
            light_space_position: coords.weigh(
                a.light_space_position,
                b.light_space_position,
                c.light_space_position,
            ),
        }
    }
}

/// Owns the scene and every render target of the demo.
pub struct Pipeline {
    rasterizer: Rasterizer,
    model: ModelHandle,
    texture: Texture,
    light: DirectionalLight,
    projection: Perspective,
    camera: Transform,
    shadow_bias: f32,
    color: FrameBuffer<Vec4>,
    depth: FrameBuffer<f32>,
    /// Color target of the shadow pass; holds the same depths as `shadow_map`.
    light_depth: FrameBuffer<f32>,
    shadow_map: FrameBuffer<f32>,
}

impl Pipeline {
    pub fn new(config: &Config, model: Model, texture: Texture) -> Self {
        let mut rasterizer = Rasterizer::new();
        let model = rasterizer.upload_model(model);

        let mut light = DirectionalLight::new(config.light_direction());
        light.ambient_intensity = config.ambient;

        let mut camera = Transform::new();
        camera.set_position_xyz(0.0, 0.0, -config.camera_distance);

        let shadow_size = config.shadow_map_size;
        Self {
            rasterizer,
            model,
            texture,
            light,
            projection: Perspective::from_degrees(
                config.fov_degrees,
                config.aspect_ratio(),
                Z_NEAR,
                Z_FAR,
            ),
            camera,
            shadow_bias: config.shadow_bias,
            color: FrameBuffer::new(config.width, config.height, Vec4::new(0.0, 0.0, 0.0, 1.0)),
            depth: FrameBuffer::new(config.width, config.height, FAR_DEPTH),
            light_depth: FrameBuffer::new(shadow_size, shadow_size, FAR_DEPTH),
            shadow_map: FrameBuffer::new(shadow_size, shadow_size, FAR_DEPTH),
        }
    }

    /// Builds the pipeline with the configured assets, or the built-in scene
    /// and a white texture when none are configured.
    pub fn from_config(config: &Config) -> std::result::Result<Self, LoadError> {
        let model = match &config.model {
            Some(path) => Model::from_obj(path)?,
            None => {
                info!("No model configured, using the built-in scene");
                Model::demo_scene()
            }
        };
        let texture = match &config.texture {
            Some(path) => Texture::from_file(path)?,
            None => Texture::white(),
        };
        Ok(Self::new(config, model, texture))
    }

    /// Renders both passes with the model rotated by `seconds` radians about Y.
    pub fn render_frame(&mut self, seconds: f32) {
        let mut transform = Transform::new();
        transform.rotate_y(seconds);

        self.shadow_pass(&transform);
        self.color_pass(&transform);
    }

    fn shadow_pass(&mut self, transform: &Transform) {
        self.light_depth.clear();
        self.shadow_map.clear();

        let mvp = self.light.view_projection() * transform.to_matrix();
        let vertex_shader = move |mut vertex: Vertex| -> VertexOutput<ShadowPassAttributes> {
            vertex.position = mvp * vertex.position;
            vertex.into()
        };

        let mut draw = DrawConfig::new(&mut self.light_depth, vertex_shader, Depth)
            .with_depth_buffer(&mut self.shadow_map);
        self.rasterizer.draw_triangles(self.model, &mut draw);
    }

    fn color_pass(&mut self, transform: &Transform) {
        self.color.clear();
        self.depth.clear();

        let model = transform.to_matrix();
        let normal_matrix = transform.normal_matrix();
        let mvp = self.projection.matrix() * self.camera.to_matrix() * model;
        let light_mvp = self.light.view_projection() * model;
        let bias = self.shadow_bias;

        let vertex_shader = move |mut vertex: Vertex| {
            let normal = normal_matrix * Vec4::from_vec3(vertex.normal, 0.0);
            vertex.normal = normal.to_vec3();
            let light_space_position = light_mvp * vertex.position + normal * bias;
            vertex.position = mvp * vertex.position;
            VertexOutput::new(vertex, ColorPassAttributes { light_space_position })
        };

        let texture = &self.texture;
        let shadow_map = &self.shadow_map;
        let light = &self.light;
        let fragment_shader = |vertex: &Vertex, attributes: &ColorPassAttributes| {
            shade(vertex, attributes, texture, shadow_map, light)
        };

        let mut draw = DrawConfig::new(&mut self.color, vertex_shader, fragment_shader)
            .with_depth_buffer(&mut self.depth);
        self.rasterizer.draw_triangles(self.model, &mut draw);
    }

    /// Writes the shadow map, color image and depth image as BMPs into `dir`.
    pub fn screenshot<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        debug!("Writing screenshot into {}", dir.display());
        bitmap::write_gray(&self.shadow_map, dir.join(SHADOW_MAP_FILE))?;
        bitmap::write_color(&self.color, dir.join(COLOR_FILE))?;
        bitmap::write_gray(&self.depth, dir.join(DEPTH_FILE))?;
        Ok(())
    }

    pub fn color(&self) -> &FrameBuffer<Vec4> {
        &self.color
    }

    pub fn depth(&self) -> &FrameBuffer<f32> {
        &self.depth
    }

    pub fn shadow_map(&self) -> &FrameBuffer<f32> {
        &self.shadow_map
    }

    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    pub fn model_handle(&self) -> ModelHandle {
        self.model
    }
}

/// Color-pass fragment: texture × vertex color × (ambient + Lambert), then
/// attenuated when the shadow map holds something nearer to the light.
fn shade(
    vertex: &Vertex,
    attributes: &ColorPassAttributes,
    texture: &Texture,
    shadow_map: &FrameBuffer<f32>,
    light: &DirectionalLight,
) -> Vec4 {
    let albedo = texture.at_uv(vertex.uv.x, vertex.uv.y, SamplerMode::Nearest);
    let color: Vec3 = (albedo * vertex.color * light.illumination(vertex.normal)).saturate();
    let shadow = shadow_factor(shadow_map, attributes.light_space_position);
    colors::opaque(color * shadow)
}

/// `1.0` when the light-space position is at least as near to the light as the
/// shadow map's depth at its projected location, [`SHADOW_ATTENUATION`]
/// otherwise. The lookup wraps like any other UV sample.
pub fn shadow_factor(shadow_map: &FrameBuffer<f32>, light_space_position: Vec4) -> f32 {
    let projected = light_space_position.to_vec3_perspective();
    let closest = shadow_map.at_uv(
        projected.x * 0.5 + 0.5,
        projected.y * 0.5 + 0.5,
        SamplerMode::Bilinear,
    );
    if projected.z <= closest {
        1.0
    } else {
        SHADOW_ATTENUATION
    }
}

/// Light clip-space position of a model-space point, for tests and tools.
pub fn light_space(light: &DirectionalLight, model: &Mat4, point: Vec3) -> Vec4 {
    light.view_projection() * *model * Vec4::from_vec3(point, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_config() -> Config {
        Config {
            width: 64,
            height: 64,
            shadow_map_size: 64,
            ..Config::default()
        }
    }

    #[test]
    fn color_attributes_interpolate_light_space_position() {
        let a = ColorPassAttributes {
            light_space_position: Vec4::new(1.0, 0.0, 0.0, 1.0),
        };
        let b = ColorPassAttributes {
            light_space_position: Vec4::new(0.0, 1.0, 0.0, 1.0),
        };
        let c = ColorPassAttributes::default();
        let mixed = ColorPassAttributes::interpolate(&BarycentricCoordinates::new(0.5, 0.5, 0.0), &a, &b, &c);
        assert_eq!(mixed.light_space_position, Vec4::new(0.5, 0.5, 0.0, 1.0));
    }

    #[test]
    fn occluded_fragments_are_attenuated() {
        let shadow_map = FrameBuffer::new(4, 4, 0.0f32);
        assert_eq!(shadow_factor(&shadow_map, Vec4::new(0.1, 0.1, 0.5, 1.0)), SHADOW_ATTENUATION);
        assert_eq!(shadow_factor(&shadow_map, Vec4::new(0.1, 0.1, -0.5, 1.0)), 1.0);
        assert_eq!(shadow_factor(&shadow_map, Vec4::new(0.1, 0.1, 0.0, 1.0)), 1.0);
    }

    #[test]
    fn zero_sized_shadow_map_renders_unshadowed() {
        let config = Config {
            shadow_map_size: 0,
            ..small_config()
        };
        let mut pipeline = Pipeline::new(&config, Model::demo_scene(), Texture::white());
        pipeline.render_frame(0.0);
        assert!(pipeline.color().as_slice().iter().any(|&c| c != Vec4::new(0.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn empty_shadow_map_lights_everything() {
        let shadow_map = FrameBuffer::new(4, 4, FAR_DEPTH);
        assert_eq!(shadow_factor(&shadow_map, Vec4::new(0.3, -0.2, 0.9, 1.0)), 1.0);
    }

    #[test]
    fn fragment_color_is_saturated_and_opaque() {
        let mut light = DirectionalLight::new(Vec3::new(0.0, -1.0, 0.0));
        light.ambient_intensity = 0.5;
        let vertex = Vertex {
            normal: Vec3::UP,
            color: Vec3::new(1.0, 0.5, 0.0),
            ..Vertex::default()
        };
        let color = shade(
            &vertex,
            &ColorPassAttributes::default(),
            &Texture::white(),
            &FrameBuffer::new(1, 1, FAR_DEPTH),
            &light,
        );
        assert_eq!(color.w, 1.0);
        assert_relative_eq!(color.x, 1.0);
        assert_relative_eq!(color.y, 0.75);
        assert_relative_eq!(color.z, 0.0);
    }

    #[test]
    fn frame_renders_scene_into_every_target() {
        let mut pipeline = Pipeline::new(&small_config(), Model::demo_scene(), Texture::white());
        pipeline.render_frame(0.0);

        // The cube covers the middle of the image and of the light's view.
        let clear = Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_ne!(pipeline.color().at_texel(32, 32), clear);
        assert!(pipeline.depth().at_texel(32, 32) < 1.0);
        assert!(pipeline.shadow_map().at_texel(32, 32) < 1.0);

        // Corners see only background.
        assert_eq!(pipeline.depth().at_texel(0, 63), FAR_DEPTH);
    }

    #[test]
    fn rendering_twice_is_stable() {
        let mut pipeline = Pipeline::new(&small_config(), Model::demo_scene(), Texture::white());
        pipeline.render_frame(0.3);
        let first = pipeline.color().clone();
        pipeline.render_frame(0.3);
        assert_eq!(pipeline.color().as_slice(), first.as_slice());
    }

    #[test]
    fn cube_shadows_the_floor_behind_it() {
        let mut pipeline = Pipeline::new(&small_config(), Model::demo_scene(), Texture::white());
        pipeline.render_frame(0.0);

        let model = Mat4::identity();
        // Follow a light ray through the cube's interior down to the floor.
        let direction = pipeline.light().direction;
        let inside = Vec3::new(0.0, 0.2, 0.0);
        let hidden = inside + direction * ((-0.35 - inside.y) / direction.y);
        // Open air on the light's side of the cube.
        let exposed = Vec3::new(0.6, 0.3, 0.6);

        let shadow_map = pipeline.shadow_map();
        let light = pipeline.light();
        let hidden_factor = shadow_factor(shadow_map, light_space(light, &model, hidden));
        let exposed_factor = shadow_factor(shadow_map, light_space(light, &model, exposed));
        assert_eq!(hidden_factor, SHADOW_ATTENUATION);
        assert_eq!(exposed_factor, 1.0);
    }

    #[test]
    fn screenshot_writes_three_bitmaps() {
        let mut pipeline = Pipeline::new(&small_config(), Model::demo_scene(), Texture::white());
        pipeline.render_frame(0.0);

        let dir = tempfile::tempdir().unwrap();
        pipeline.screenshot(dir.path()).unwrap();
        for name in [SHADOW_MAP_FILE, COLOR_FILE, DEPTH_FILE] {
            let img = image::open(dir.path().join(name)).unwrap();
            assert_eq!((img.width(), img.height()), (64, 64));
        }
    }

    #[test]
    fn missing_assets_fail_to_load() {
        let config = Config {
            model: Some("does/not/exist.obj".into()),
            ..small_config()
        };
        assert!(matches!(Pipeline::from_config(&config), Err(LoadError::Obj(_))));
    }
}
