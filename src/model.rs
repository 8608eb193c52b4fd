//! Triangle meshes uploaded to the rasterizer.
//!
//! A [`Model`] is an ordered list of [`Triangle`]s in model space. It is
//! loaded from an OBJ file or built from the stock geometry below
//! ([`Model::cube`], [`Model::floor`], [`Model::demo_scene`]).

use std::path::Path;

use log::info;

use crate::error::LoadError;
use crate::math::{Vec2, Vec3};
use crate::triangle::{Triangle, Vertex};

/// Color given to every loaded vertex; texture and lighting tint it later.
const VERTEX_COLOR: Vec3 = Vec3::ONE;

/// An ordered triangle list. Triangles are drawn in this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    triangles: Vec<Triangle>,
}

impl Model {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Load every object in an OBJ file into one model.
    ///
    /// Faces are triangulated and positions, normals and texture coordinates
    /// are re-indexed to a single index buffer. All three attributes are
    /// required.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )?;

        let mut triangles = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            if mesh.positions.is_empty() {
                return Err(LoadError::NoVertices);
            }
            if mesh.normals.is_empty() {
                return Err(LoadError::NoNormals);
            }
            if mesh.texcoords.is_empty() {
                return Err(LoadError::NoUvs);
            }

            let vertex = |index: u32| {
                let i = index as usize;
                Vertex::new(
                    Vec3::new(
                        mesh.positions[3 * i],
                        mesh.positions[3 * i + 1],
                        mesh.positions[3 * i + 2],
                    ),
                    VERTEX_COLOR,
                    Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]),
                    Vec3::new(
                        mesh.normals[3 * i],
                        mesh.normals[3 * i + 1],
                        mesh.normals[3 * i + 2],
                    ),
                )
            };

            triangles.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|face| Triangle::new([vertex(face[0]), vertex(face[1]), vertex(face[2])])),
            );
        }

        if triangles.is_empty() {
            return Err(LoadError::NoVertices);
        }

        info!(
            "Loaded {} triangles from {} object(s) in {}",
            triangles.len(),
            models.len(),
            path.display()
        );
        Ok(Self { triangles })
    }

    /// Axis-aligned cube centered on the origin, faces wound counter-clockwise
    /// when seen from outside.
    pub fn cube(half_size: f32) -> Self {
        // (normal, tangent u, tangent v) per face; u × v = normal.
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
            (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        ];

        let triangles = FACES
            .iter()
            .flat_map(|&(normal, u, v)| {
                quad(normal * half_size, u * half_size, v * half_size, normal)
            })
            .collect();
        Self { triangles }
    }

    /// Upward-facing square in the plane `y = height`.
    pub fn floor(half_size: f32, height: f32) -> Self {
        let triangles = quad(
            Vec3::new(0.0, height, 0.0),
            Vec3::new(half_size, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -half_size),
            Vec3::UP,
        );
        Self {
            triangles: triangles.to_vec(),
        }
    }

    /// The scene shown when no model file is configured: a cube resting on a
    /// floor, sized to fit the shadow pass's light volume.
    pub fn demo_scene() -> Self {
        let mut scene = Self::cube(0.35);
        scene.extend(Self::floor(0.9, -0.35));
        scene
    }

    /// Appends another model's triangles after this one's.
    pub fn extend(&mut self, other: Model) {
        self.triangles.extend(other.triangles);
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl FromIterator<Triangle> for Model {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Two counter-clockwise triangles spanning `center ± u ± v`.
fn quad(center: Vec3, u: Vec3, v: Vec3, normal: Vec3) -> [Triangle; 2] {
    let corner = |su: f32, sv: f32| {
        Vertex::new(
            center + u * su + v * sv,
            VERTEX_COLOR,
            Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5),
            normal,
        )
    };
    let (bl, br, tr, tl) = (
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, 1.0),
    );
    [Triangle::new([bl, br, tr]), Triangle::new([bl, tr, tl])]
}
