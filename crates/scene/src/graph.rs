use crate::light::DirectionalLight;
use crate::mesh::Mesh;
use cubescene_common::Color;

/// Handle to a light added to a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(usize);

/// Handle to a mesh added to a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(usize);

/// Objects composed for a single render pass.
///
/// Lights and meshes hang directly off the scene root. There is no removal,
/// so a handle returned by `add_*` stays valid for the life of the scene it
/// came from.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    lights: Vec<DirectionalLight>,
    meshes: Vec<Mesh>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with a black background.
    pub fn new() -> Self {
        Self {
            background: Color::BLACK,
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }

    pub fn add_light(&mut self, light: DirectionalLight) -> LightId {
        let id = LightId(self.lights.len());
        self.lights.push(light);
        tracing::trace!(index = id.0, "light added");
        id
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len());
        self.meshes.push(mesh);
        tracing::trace!(index = id.0, "mesh added");
        id
    }

    pub fn light(&self, id: LightId) -> Option<&DirectionalLight> {
        self.lights.get(id.0)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    /// Lights in insertion order.
    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    /// Meshes in insertion order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty() && self.meshes.is_empty()
    }
}
