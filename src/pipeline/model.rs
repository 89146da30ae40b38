//! Model data
//!
//! A `Model` is the immutable mesh shared by every object that uses the
//! asset. It is validated once when built so the per-frame stages can index
//! vertices without bounds checks failing.
//!
//! Model files are RON, either plain text or brotli-compressed (detected
//! automatically on load).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constants::{MAX_COORD, MAX_POLYGON_COUNT, MAX_VERTEX_COUNT};
use super::error::ModelError;
use super::math::{Vec2, Vec3};

/// Opaque material / texture handle, resolved by the texture system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// How the rasterizer fills a polygon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonShading {
    #[default]
    Flat,
    Gouraud,
    Texture,
    GouraudTexture,
    /// Textured by floor/ceiling projection instead of per-vertex UVs
    Plane,
}

/// One face of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Indices into the parent model's vertices
    pub indices: Vec<u32>,
    /// Face normal in model space
    pub normal: Vec3,
    #[serde(default)]
    pub material: Option<MaterialId>,
    #[serde(default)]
    pub shading: PolygonShading,
    /// Per-vertex texture coordinates; empty or one per index
    #[serde(default)]
    pub uvs: Vec<Vec2>,
}

impl Polygon {
    pub fn new(indices: Vec<u32>, normal: Vec3) -> Self {
        Self {
            indices,
            normal,
            material: None,
            shading: PolygonShading::Flat,
            uvs: Vec::new(),
        }
    }

    pub fn with_material(mut self, material: MaterialId, shading: PolygonShading) -> Self {
        self.material = Some(material);
        self.shading = shading;
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    /// Fewer than three vertices, or two consecutive vertices sharing an index
    /// (a zero-length edge). Such polygons load fine but never draw.
    pub fn is_degenerate(&self) -> bool {
        let n = self.indices.len();
        if n < 3 {
            return true;
        }
        (0..n).any(|i| self.indices[i] == self.indices[(i + 1) % n])
    }
}

/// Unvalidated model as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelData {
    #[serde(default)]
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<Polygon>,
}

/// Validated, immutable mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    vertices: Vec<Vec3>,
    polygons: Vec<Polygon>,
}

fn is_valid_coord(f: f32) -> bool {
    f.is_finite() && f.abs() <= MAX_COORD
}

fn validate_point(v: Vec3, context: impl FnOnce() -> String) -> Result<(), ModelError> {
    for value in [v.x, v.y, v.z] {
        if !is_valid_coord(value) {
            return Err(ModelError::InvalidCoordinate { context: context(), value });
        }
    }
    Ok(())
}

impl Model {
    /// Build a model, validating every index and coordinate
    pub fn new(vertices: Vec<Vec3>, polygons: Vec<Polygon>) -> Result<Self, ModelError> {
        Self::from_data(ModelData {
            name: String::new(),
            vertices,
            polygons,
        })
    }

    pub fn from_data(data: ModelData) -> Result<Self, ModelError> {
        let ModelData { name, vertices, polygons } = data;

        if vertices.len() > MAX_VERTEX_COUNT {
            return Err(ModelError::TooManyVertices { count: vertices.len(), max: MAX_VERTEX_COUNT });
        }
        if polygons.len() > MAX_POLYGON_COUNT {
            return Err(ModelError::TooManyPolygons { count: polygons.len(), max: MAX_POLYGON_COUNT });
        }

        for (i, v) in vertices.iter().enumerate() {
            validate_point(*v, || format!("vertex {}", i))?;
        }

        for (p, polygon) in polygons.iter().enumerate() {
            if let Some(&index) = polygon.indices.iter().find(|&&idx| idx as usize >= vertices.len()) {
                return Err(ModelError::IndexOutOfRange {
                    polygon: p,
                    index,
                    vertex_count: vertices.len(),
                });
            }
            if !polygon.uvs.is_empty() && polygon.uvs.len() != polygon.indices.len() {
                return Err(ModelError::UvCountMismatch {
                    polygon: p,
                    uvs: polygon.uvs.len(),
                    indices: polygon.indices.len(),
                });
            }
            // Normals are directions; only finiteness matters
            if !polygon.normal.is_finite() || polygon.normal.max_abs() > MAX_COORD {
                return Err(ModelError::InvalidCoordinate {
                    context: format!("polygon {} normal", p),
                    value: polygon.normal.max_abs(),
                });
            }
            for uv in &polygon.uvs {
                if !is_valid_coord(uv.x) || !is_valid_coord(uv.y) {
                    return Err(ModelError::InvalidCoordinate {
                        context: format!("polygon {} uv", p),
                        value: if is_valid_coord(uv.x) { uv.y } else { uv.x },
                    });
                }
            }
        }

        Ok(Self { name, vertices, polygons })
    }

    /// An empty model draws nothing
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            vertices: Vec::new(),
            polygons: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.polygons.is_empty()
    }

    /// Distance from the model origin to its farthest vertex
    pub fn radius(&self) -> f32 {
        self.vertices.iter().map(|v| v.len()).fold(0.0, f32::max)
    }

    /// Face normal from the polygon's winding (Newell's method).
    /// Counter-clockwise when viewed from the front, in a right-handed frame.
    pub fn compute_face_normal(&self, polygon: &Polygon) -> Vec3 {
        let n = polygon.indices.len();
        let mut normal = Vec3::ZERO;
        for i in 0..n {
            let a = self.vertices[polygon.indices[i] as usize];
            let b = self.vertices[polygon.indices[(i + 1) % n] as usize];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal.normalize()
    }

    /// Replace every polygon normal with the one implied by its winding
    pub fn with_computed_normals(mut self) -> Self {
        let normals: Vec<Vec3> = self.polygons.iter().map(|p| self.compute_face_normal(p)).collect();
        for (polygon, normal) in self.polygons.iter_mut().zip(normals) {
            polygon.normal = normal;
        }
        self
    }

    /// Parse and validate a model from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ModelError> {
        let data: ModelData = ron::from_str(text)?;
        Self::from_data(data)
    }

    /// Load from bytes (supports both compressed and uncompressed RON)
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, ModelError> {
        // RON files start with '(' or whitespace before '('
        let is_ron = data
            .first()
            .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t')
            .unwrap_or(false);

        let text = if is_ron {
            String::from_utf8_lossy(data).to_string()
        } else {
            let mut decompressed = Vec::new();
            brotli::BrotliDecompress(&mut std::io::Cursor::new(data), &mut decompressed)
                .map_err(|e| ModelError::Decompress(e.to_string()))?;
            String::from_utf8_lossy(&decompressed).to_string()
        };

        Self::from_ron_str(&text)
    }

    /// Load a model file from disk
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let data = std::fs::read(path)?;
        let model = Self::load_from_bytes(&data)?;
        if model.name.is_empty() {
            let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            return Ok(model.with_name(stem));
        }
        Ok(model)
    }

    /// Unvalidated copy of the model's data, for saving
    pub fn to_data(&self) -> ModelData {
        ModelData {
            name: self.name.clone(),
            vertices: self.vertices.clone(),
            polygons: self.polygons.clone(),
        }
    }

    /// Serialize to compressed RON
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .indentor("  ".to_string());
        let text = ron::ser::to_string_pretty(&self.to_data(), config)
            .map_err(|e| ModelError::Serialize(e.to_string()))?;

        let mut compressed = Vec::new();
        brotli::BrotliCompress(
            &mut std::io::Cursor::new(text.as_bytes()),
            &mut compressed,
            &brotli::enc::BrotliEncoderParams {
                quality: 6,
                lgwin: 22,
                ..Default::default()
            },
        )?;
        Ok(compressed)
    }
}

/// Axis-aligned quad in the plane `z`, wound to face `-Z` (toward a camera
/// at the origin looking down +Z). Handy for tests and demo scenes.
pub fn quad_facing_camera(half_size: f32, z: f32) -> Model {
    let s = half_size;
    let vertices = vec![
        Vec3::new(-s, -s, z),
        Vec3::new(-s, s, z),
        Vec3::new(s, s, z),
        Vec3::new(s, -s, z),
    ];
    let polygon = Polygon::new(vec![0, 1, 2, 3], Vec3::new(0.0, 0.0, -1.0)).with_uvs(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
    ]);
    Model {
        name: "quad".to_string(),
        vertices,
        polygons: vec![polygon],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn triangle() -> (Vec<Vec3>, Polygon) {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        (vertices, Polygon::new(vec![0, 1, 2], Vec3::new(0.0, 0.0, 1.0)))
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let (vertices, _) = triangle();
        let bad = Polygon::new(vec![0, 1, 3], Vec3::new(0.0, 0.0, 1.0));
        match Model::new(vertices, vec![bad]) {
            Err(ModelError::IndexOutOfRange { polygon, index, vertex_count }) => {
                assert_eq!((polygon, index, vertex_count), (0, 3, 3));
            }
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_uv_mismatch_rejected() {
        let (vertices, polygon) = triangle();
        let polygon = polygon.with_uvs(vec![Vec2::ZERO]);
        assert!(matches!(
            Model::new(vertices, vec![polygon]),
            Err(ModelError::UvCountMismatch { uvs: 1, indices: 3, .. })
        ));
    }

    #[test]
    fn test_nan_vertex_rejected() {
        let (mut vertices, polygon) = triangle();
        vertices[1].y = f32::NAN;
        assert!(matches!(
            Model::new(vertices, vec![polygon]),
            Err(ModelError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_degenerate_polygons_load() {
        let (vertices, _) = triangle();
        let line = Polygon::new(vec![0, 1], Vec3::UP);
        let repeated = Polygon::new(vec![0, 0, 1], Vec3::UP);
        let model = Model::new(vertices, vec![line.clone(), repeated.clone()]).unwrap();
        assert_eq!(model.polygon_count(), 2);
        assert!(line.is_degenerate());
        assert!(repeated.is_degenerate());
        // Wrap-around edge counts too
        assert!(Polygon::new(vec![1, 2, 1], Vec3::UP).is_degenerate());
        assert!(!Polygon::new(vec![0, 1, 2], Vec3::UP).is_degenerate());
    }

    #[test]
    fn test_empty_model_is_legal() {
        let model = Model::new(Vec::new(), Vec::new()).unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_newell_normal() {
        let (vertices, polygon) = triangle();
        let model = Model::new(vertices, vec![polygon]).unwrap();
        let n = model.compute_face_normal(&model.polygons()[0]);
        assert_abs_diff_eq!(n.z, 1.0, epsilon = 1e-6);

        // The demo quad is wound so its computed normal agrees with the stored one
        let quad = quad_facing_camera(1.0, 5.0);
        let computed = quad.compute_face_normal(&quad.polygons()[0]);
        assert_abs_diff_eq!(computed.z, quad.polygons()[0].normal.z, epsilon = 1e-6);
    }

    #[test]
    fn test_computed_normals_replace_stored() {
        let (vertices, _) = triangle();
        // Stored normal is wrong on purpose; the winding says +Z
        let polygon = Polygon::new(vec![0, 1, 2], Vec3::new(0.0, 0.0, -1.0));
        let model = Model::new(vertices, vec![polygon]).unwrap().with_computed_normals();
        assert_abs_diff_eq!(model.polygons()[0].normal.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_radius() {
        let quad = quad_facing_camera(3.0, 4.0);
        assert_abs_diff_eq!(quad.radius(), (9.0f32 + 9.0 + 16.0).sqrt(), epsilon = 1e-5);
        assert_eq!(Model::empty().radius(), 0.0);
    }

    #[test]
    fn test_serialize_error_message() {
        let err = ModelError::Serialize("depth limit".to_string());
        assert_eq!(err.to_string(), "serialization failed: depth limit");
    }

    #[test]
    fn test_ron_round_trip_through_bytes() {
        let text = r#"(
            name: "tri",
            vertices: [(x: 0.0, y: 0.0, z: 0.0), (x: 1.0, y: 0.0, z: 0.0), (x: 0.0, y: 1.0, z: 0.0)],
            polygons: [(indices: [0, 1, 2], normal: (x: 0.0, y: 0.0, z: 1.0), material: Some(MaterialId(7)), shading: Texture)],
        )"#;
        let model = Model::load_from_bytes(text.as_bytes()).unwrap();
        assert_eq!(model.name(), "tri");
        assert_eq!(model.polygons()[0].material, Some(MaterialId(7)));

        let packed = model.to_bytes().unwrap();
        let unpacked = Model::load_from_bytes(&packed).unwrap();
        assert_eq!(unpacked, model);
    }

    #[test]
    fn test_load_from_file_names_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crate_box.ron");
        let quad = quad_facing_camera(2.0, 0.0);
        std::fs::write(&path, quad.to_bytes().unwrap()).unwrap();
        let loaded = Model::load(&path).unwrap();
        // Name stored in the file wins over the file stem
        assert_eq!(loaded.name(), "quad");
        assert_eq!(loaded.vertex_count(), 4);
    }
}
