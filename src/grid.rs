//! Floor grid drawn beneath the attractor.
//!
//! A square of evenly spaced lines in the XZ plane, built once per session
//! as a line list. The two centre lines use a brighter colour than the rest.

use bytemuck::{Pod, Zeroable};

/// Edge length of the grid square.
pub const GRID_SIZE: f32 = 25.0;
/// Number of cells along each edge.
pub const GRID_DIVISIONS: u32 = 50;
/// Height of the grid plane.
pub const GRID_HEIGHT: f32 = -15.0;
/// Opacity of every grid line.
pub const GRID_OPACITY: f32 = 0.08;

/// 0x0066cc
const CENTER_COLOR: [f32; 3] = [0.0, 0.4, 0.8];
/// 0x003366
const LINE_COLOR: [f32; 3] = [0.0, 0.2, 0.4];

/// One end of a grid line. Colour is sRGB with straight alpha.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Line-list geometry of the floor grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    vertices: Vec<LineVertex>,
}

impl GridLines {
    /// `divisions + 1` lines along each axis, spanning `size` and centred on
    /// the Y axis at height `y`.
    pub fn new(size: f32, divisions: u32, y: f32) -> Self {
        let divisions = divisions.max(1);
        let half = size / 2.0;
        let step = size / divisions as f32;
        let center = divisions / 2;

        let mut vertices = Vec::with_capacity(4 * (divisions as usize + 1));
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let [r, g, b] = if i == center { CENTER_COLOR } else { LINE_COLOR };
            let color = [r, g, b, GRID_OPACITY];

            // Line parallel to Z, then line parallel to X.
            vertices.push(LineVertex { position: [k, y, -half], color });
            vertices.push(LineVertex { position: [k, y, half], color });
            vertices.push(LineVertex { position: [-half, y, k], color });
            vertices.push(LineVertex { position: [half, y, k], color });
        }

        Self { vertices }
    }

    /// The scene's grid: 25 units wide, 50 cells, 15 units below the origin.
    pub fn floor() -> Self {
        Self::new(GRID_SIZE, GRID_DIVISIONS, GRID_HEIGHT)
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}
