use bytemuck::{Pod, Zeroable};

pub const POINTS_SOURCE: &str = include_str!("points.wgsl");
pub const FRACTAL_SOURCE: &str = include_str!("fractal.wgsl");
pub const GRID_SOURCE: &str = include_str!("grid.wgsl");

/// Per-frame values shared by every point draw. Matches `Globals` in `points.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub time: f32,
    pub _padding: f32,
}

/// Per-cloud values. Matches `Style` in `points.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct StyleUniforms {
    pub model: [[f32; 4]; 4],
    pub time: f32,
    pub pulse_amount: f32,
    pub pulse_rate: f32,
    pub pulse_spread: f32,
    pub size_scale: f32,
    pub alpha_scale: f32,
    pub _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(module)
    }

    fn entry_points(module: &naga::Module) -> Vec<&str> {
        module.entry_points.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_points_shader_is_valid() {
        let module = validate_wgsl(POINTS_SOURCE).unwrap();
        let entries = entry_points(&module);
        assert!(entries.contains(&"vs_main"));
        assert!(entries.contains(&"fs_glow"));
        assert!(entries.contains(&"fs_disc"));
    }

    #[test]
    fn test_fractal_shader_is_valid() {
        let module = validate_wgsl(FRACTAL_SOURCE).unwrap();
        let entries = entry_points(&module);
        assert!(entries.contains(&"vs_fullscreen"));
        assert!(entries.contains(&"fs_mandelbrot"));
    }

    #[test]
    fn test_grid_shader_is_valid() {
        let module = validate_wgsl(GRID_SOURCE).unwrap();
        let entries = entry_points(&module);
        assert!(entries.contains(&"vs_line"));
        assert!(entries.contains(&"fs_line"));
    }

    #[test]
    fn test_grid_vertex_matches_attributes() {
        // vec3 position + vec4 colour
        assert_eq!(std::mem::size_of::<crate::grid::LineVertex>(), 28);
    }

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        // mat4x4 (64) + vec2 (8) + f32 + f32
        assert_eq!(std::mem::size_of::<Globals>(), 80);
        // mat4x4 (64) + 8 scalars
        assert_eq!(std::mem::size_of::<StyleUniforms>(), 96);
    }
}
