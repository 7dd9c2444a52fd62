//! OBJ mesh loader.
//!
//! Reads an `.obj` file and its `.mtl` material library into CPU meshes.
//! Each material carries its diffuse / specular colours and an optional
//! diffuse texture (`map_Kd`), resolved relative to the OBJ file.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::AssetError;
use crate::utils::{Mesh, Vertex};

/// Material description taken from the MTL file
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub diffuse_texture: Option<PathBuf>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            diffuse: [1.0, 1.0, 1.0],
            specular: [0.0, 0.0, 0.0],
            diffuse_texture: None,
        }
    }
}

/// One drawable piece of a model and the material it uses
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub name: String,
    pub mesh: Mesh,
    /// Index into `ModelData::materials`
    pub material: usize,
}

/// A loaded model. `materials` is never empty: parts without a material
/// point at a trailing default entry.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub path: PathBuf,
    pub parts: Vec<MeshPart>,
    pub materials: Vec<MaterialData>,
}

pub fn load_obj(path: &Path) -> Result<ModelData, AssetError> {
    let (models, materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .map_err(|source| AssetError::Obj { path: path.to_path_buf(), source })?;
    let materials = materials
        .map_err(|source| AssetError::Material { path: path.to_path_buf(), source })?;

    let base_dir = path.parent().unwrap_or(Path::new("."));
    let mut materials: Vec<MaterialData> = materials
        .into_iter()
        .map(|m| MaterialData {
            diffuse: m.diffuse.unwrap_or([1.0, 1.0, 1.0]),
            specular: m.specular.unwrap_or([0.0, 0.0, 0.0]),
            diffuse_texture: m.diffuse_texture.map(|tex| base_dir.join(tex)),
            name: m.name,
        })
        .collect();
    let default_material = materials.len();
    materials.push(MaterialData::default());

    let mut parts = Vec::with_capacity(models.len());
    for model in models {
        let mut mesh = convert_mesh(&model.mesh);
        if mesh.is_empty() {
            warn!(path = %path.display(), part = %model.name, "skipping empty mesh part");
            continue;
        }
        if model.mesh.normals.is_empty() {
            mesh.compute_normals();
        }
        let material = model
            .mesh
            .material_id
            .filter(|&id| id < default_material)
            .unwrap_or(default_material);
        debug!(
            part = %model.name,
            vertices = mesh.vertices.len(),
            triangles = mesh.indices.len() / 3,
            "loaded mesh part"
        );
        parts.push(MeshPart { name: model.name, mesh, material });
    }

    if parts.is_empty() {
        return Err(AssetError::EmptyModel { path: path.to_path_buf() });
    }

    Ok(ModelData { path: path.to_path_buf(), parts, materials })
}

fn convert_mesh(mesh: &tobj::Mesh) -> Mesh {
    let count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == count * 3;
    let has_uvs = mesh.texcoords.len() == count * 2;

    let vertices = (0..count)
        .map(|i| Vertex {
            pos: [mesh.positions[3 * i], mesh.positions[3 * i + 1], mesh.positions[3 * i + 2]],
            normal: if has_normals {
                [mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]]
            } else {
                [0.0; 3]
            },
            // OBJ puts v=0 at the bottom of the image, wgpu at the top
            uv: if has_uvs {
                [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
            } else {
                [0.0; 2]
            },
        })
        .collect();

    Mesh { vertices, indices: mesh.indices.clone() }
}

/// Decode an image file into RGBA8
pub fn load_texture(path: &Path) -> Result<image::RgbaImage, AssetError> {
    let image = image::open(path)
        .map_err(|source| AssetError::Texture { path: path.to_path_buf(), source })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mini-solar-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl rock
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl rock
Kd 0.5 0.25 0.125
Ks 0.1 0.1 0.1
map_Kd rock.png
";

    #[test]
    fn test_load_obj_with_material() {
        let dir = fixture_dir("quad");
        fs::write(dir.join("quad.obj"), QUAD_OBJ).unwrap();
        fs::write(dir.join("quad.mtl"), QUAD_MTL).unwrap();

        let model = load_obj(&dir.join("quad.obj")).unwrap();
        assert_eq!(model.parts.len(), 1);

        let part = &model.parts[0];
        // Quad triangulated into two triangles
        assert_eq!(part.mesh.indices.len(), 6);
        assert_eq!(part.mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        // v flipped
        assert_eq!(part.mesh.vertices[0].uv, [0.0, 1.0]);

        let material = &model.materials[part.material];
        assert_eq!(material.name, "rock");
        assert_eq!(material.diffuse, [0.5, 0.25, 0.125]);
        assert_eq!(material.diffuse_texture.as_deref(), Some(dir.join("rock.png").as_path()));
        assert_eq!(model.materials.last(), Some(&MaterialData::default()));
    }

    #[test]
    fn test_missing_normals_are_generated() {
        let dir = fixture_dir("tri");
        fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let model = load_obj(&dir.join("tri.obj")).unwrap();
        let part = &model.parts[0];
        assert_eq!(part.material, model.materials.len() - 1);
        for v in &part.mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_obj(Path::new("does/not/exist/planet.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }));
    }

    #[test]
    fn test_geometry_free_file_is_empty_model() {
        let dir = fixture_dir("empty");
        fs::write(dir.join("empty.obj"), "# nothing here\n").unwrap();
        let err = load_obj(&dir.join("empty.obj")).unwrap_err();
        assert!(matches!(err, AssetError::EmptyModel { .. }));
    }

    #[test]
    fn test_bundled_planets_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources");
        for body in crate::model::solar_system() {
            let model = load_obj(&body.mesh_path(&root)).unwrap();
            let part = &model.parts[0];
            assert_eq!(model.materials[part.material].name, body.name);
            assert_eq!(part.mesh.indices.len() % 3, 0);
        }
    }

    #[test]
    fn test_missing_texture_is_an_error() {
        let err = load_texture(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, AssetError::Texture { .. }));
    }
}
