//! Shaders that draw one texture over the whole current viewport.
//!
//! The vertex shader emits a single oversized triangle from `gl_VertexID`
//! with no vertex buffer; it only needs an empty VAO bound. Since each
//! texture is drawn into its own viewport, "fullscreen" here means "the
//! viewport": the texture lands one texel per pixel when the viewport has
//! the texture's size.

/// GLSL 3.30 core vertex shader for a fullscreen triangle.
///
/// Draw with `gl.draw_arrays(TRIANGLES, 0, 3)`. `v_uv` spans [0, 1] over
/// the visible part of the triangle, with v = 0 at the bottom edge.
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 330 core
out vec2 v_uv;
void main() {
    v_uv = vec2((gl_VertexID << 1) & 2, gl_VertexID & 2);
    gl_Position = vec4(v_uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// Samples `u_texture` at `v_uv` with no further processing, so what
/// reaches the screen is exactly what the driver stored.
pub const TEXTURE_FRAGMENT_SHADER: &str = r#"#version 330 core
uniform sampler2D u_texture;
in vec2 v_uv;
out vec4 o_color;
void main() {
    o_color = texture(u_texture, v_uv);
}
"#;

/// Name of the sampler uniform in [`TEXTURE_FRAGMENT_SHADER`].
pub const TEXTURE_UNIFORM: &str = "u_texture";

/// Vertex count for the fullscreen triangle.
pub const FULLSCREEN_VERTEX_COUNT: i32 = 3;
