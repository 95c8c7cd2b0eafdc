//! Minimal retained asset graph the core writes transforms into.
//!
//! The real renderer owns meshes and GPU state; this graph carries exactly
//! what the transform core needs to observe and control: a root TRS with a
//! recomputable matrix, per-node visibility, and disposable geometry/material
//! handles for teardown.

use serde::{Deserialize, Serialize};

/// Procedural box description (width/height/depth in local model units).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// 0xRRGGBB.
    pub color: u32,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            depth: 100.0,
            color: 0x0000ff,
        }
    }
}

/// GPU-side vertex data handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    vertex_count: usize,
    /// Axis-aligned bounds of the vertex data in local units.
    extents: [f64; 3],
    disposed: bool,
}

impl Geometry {
    pub fn new(vertex_count: usize, extents: [f64; 3]) -> Self {
        Self {
            vertex_count,
            extents,
            disposed: false,
        }
    }

    /// Box vertex data: 6 faces, 4 vertices each.
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Self {
        Self::new(24, [width, height, depth])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn extents(&self) -> [f64; 3] {
        self.extents
    }

    /// Release the GPU-side buffer. Idempotent.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Shading handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    color: u32,
    disposed: bool,
}

impl Material {
    pub fn new(color: u32) -> Self {
        Self {
            color,
            disposed: false,
        }
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh { geometry: Geometry, material: Material },
}

/// Optional render tuning forwarded from manager configuration onto a
/// presented asset (screen-space error, memory budget, culling, debug
/// visualization). Unset fields leave the renderer's defaults alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugOverrides {
    pub maximum_screen_space_error: Option<f64>,
    pub maximum_memory_usage: Option<u64>,
    pub cull_requests_while_moving_multiplier: Option<f64>,
    pub show_bounding_volume: Option<bool>,
    pub colorize_tiles: Option<bool>,
}

impl DebugOverrides {
    /// Copy the set fields over `target`, leaving its other fields intact.
    pub fn merge_into(&self, target: &mut DebugOverrides) {
        if self.maximum_screen_space_error.is_some() {
            target.maximum_screen_space_error = self.maximum_screen_space_error;
        }
        if self.maximum_memory_usage.is_some() {
            target.maximum_memory_usage = self.maximum_memory_usage;
        }
        if self.cull_requests_while_moving_multiplier.is_some() {
            target.cull_requests_while_moving_multiplier =
                self.cull_requests_while_moving_multiplier;
        }
        if self.show_bounding_volume.is_some() {
            target.show_bounding_volume = self.show_bounding_volume;
        }
        if self.colorize_tiles.is_some() {
            target.colorize_tiles = self.colorize_tiles;
        }
    }
}

/// One node of a loaded asset. The root's TRS is what the model writes; the
/// children matter only for traversal (visibility, disposal).
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    kind: NodeKind,
    children: Vec<SceneObject>,
    /// Local translation.
    pub position: [f64; 3],
    /// Euler radians, XYZ order.
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    pub visible: bool,
    matrix: [[f64; 4]; 4],
    matrix_dirty: bool,
    overrides: DebugOverrides,
}

const IDENTITY: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

impl SceneObject {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            visible: true,
            matrix: IDENTITY,
            matrix_dirty: false,
            overrides: DebugOverrides::default(),
        }
    }

    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group)
    }

    pub fn mesh(geometry: Geometry, material: Material) -> Self {
        Self::with_kind(NodeKind::Mesh { geometry, material })
    }

    /// Procedural box mesh.
    pub fn box_mesh(spec: &BoxSpec) -> Self {
        Self::mesh(
            Geometry::cuboid(spec.width, spec.height, spec.depth),
            Material::new(spec.color),
        )
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn add_child(&mut self, child: SceneObject) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[SceneObject] {
        &self.children
    }

    pub fn set_position(&mut self, position: [f64; 3]) {
        self.position = position;
        self.matrix_dirty = true;
    }

    /// Euler radians, XYZ order.
    pub fn set_rotation(&mut self, rotation: [f64; 3]) {
        self.rotation = rotation;
        self.matrix_dirty = true;
    }

    pub fn set_scale(&mut self, scale: [f64; 3]) {
        self.scale = scale;
        self.matrix_dirty = true;
    }

    pub fn is_matrix_dirty(&self) -> bool {
        self.matrix_dirty
    }

    /// Recompute the local matrix from TRS if any component changed since the
    /// last recomputation.
    pub fn update_matrix(&mut self) -> &[[f64; 4]; 4] {
        if self.matrix_dirty {
            self.matrix = compose_trs(self.position, self.rotation, self.scale);
            self.matrix_dirty = false;
        }
        &self.matrix
    }

    pub fn matrix(&self) -> &[[f64; 4]; 4] {
        &self.matrix
    }

    pub fn apply_overrides(&mut self, overrides: &DebugOverrides) {
        overrides.merge_into(&mut self.overrides);
    }

    pub fn overrides(&self) -> &DebugOverrides {
        &self.overrides
    }

    /// Depth-first visit of this node and all descendants.
    pub fn traverse_mut(&mut self, f: &mut impl FnMut(&mut SceneObject)) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Release mesh resources on this node (groups are untouched).
    pub fn dispose_mesh(&mut self) {
        if let NodeKind::Mesh { geometry, material } = &mut self.kind {
            geometry.dispose();
            material.dispose();
        }
    }
}

/// Row-major TRS composition with Euler XYZ rotation order (translation in
/// the last column).
fn compose_trs(position: [f64; 3], rotation: [f64; 3], scale: [f64; 3]) -> [[f64; 4]; 4] {
    let (a, b) = (rotation[0].cos(), rotation[0].sin());
    let (c, d) = (rotation[1].cos(), rotation[1].sin());
    let (e, f) = (rotation[2].cos(), rotation[2].sin());
    let (ae, af, be, bf) = (a * e, a * f, b * e, b * f);

    let r = [
        [c * e, -c * f, d],
        [af + be * d, ae - bf * d, -b * c],
        [bf - ae * d, be + af * d, a * c],
    ];

    let mut m = IDENTITY;
    for (i, row) in r.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            m[i][j] = v * scale[j];
        }
        m[i][3] = position[i];
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn identity_until_mutated() {
        let mut node = SceneObject::group();
        assert!(!node.is_matrix_dirty());
        node.set_scale([2.0; 3]);
        assert!(node.is_matrix_dirty());
        let m = *node.update_matrix();
        assert!(!node.is_matrix_dirty());
        approx(m[0][0], 2.0, 0.0);
        approx(m[1][1], 2.0, 0.0);
        approx(m[2][2], 2.0, 0.0);
    }

    #[test]
    fn translation_lands_in_last_column() {
        let mut node = SceneObject::group();
        node.set_position([7.0, -3.0, 1.5]);
        let m = *node.update_matrix();
        approx(m[0][3], 7.0, 0.0);
        approx(m[1][3], -3.0, 0.0);
        approx(m[2][3], 1.5, 0.0);
    }

    #[test]
    fn quarter_turn_about_x_swaps_y_and_z() {
        let mut node = SceneObject::group();
        node.set_rotation([FRAC_PI_2, 0.0, 0.0]);
        let m = *node.update_matrix();
        // Unit Y maps to unit Z.
        approx(m[1][1], 0.0, 1e-12);
        approx(m[2][1], 1.0, 1e-12);
    }

    #[test]
    fn traverse_disposes_descendant_meshes() {
        let mut root = SceneObject::group();
        let mut limb = SceneObject::group();
        limb.add_child(SceneObject::box_mesh(&BoxSpec::default()));
        root.add_child(limb);
        root.add_child(SceneObject::box_mesh(&BoxSpec::default()));

        root.traverse_mut(&mut |node| node.dispose_mesh());

        let mut meshes = 0;
        root.traverse_mut(&mut |node| {
            if let NodeKind::Mesh { geometry, material } = node.kind() {
                meshes += 1;
                assert!(geometry.is_disposed());
                assert!(material.is_disposed());
            }
        });
        assert_eq!(meshes, 2);
    }

    #[test]
    fn overrides_merge_only_set_fields() {
        let mut node = SceneObject::group();
        node.apply_overrides(&DebugOverrides {
            maximum_screen_space_error: Some(8.0),
            ..Default::default()
        });
        node.apply_overrides(&DebugOverrides {
            colorize_tiles: Some(true),
            ..Default::default()
        });
        assert_eq!(node.overrides().maximum_screen_space_error, Some(8.0));
        assert_eq!(node.overrides().colorize_tiles, Some(true));
    }
}
