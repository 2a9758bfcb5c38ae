/// WebGL2 drawing surface: one vertex array per piece, colours baked in
use js_sys::Float32Array;
use nalgebra::Matrix4;
use rubix_core::render::{
    piece_instances, PieceInstance, RenderSurface, StickerSet, INNER_RGB, PIECE_COUNT,
};
use rubix_core::{CubeState, Mesh};
use wasm_bindgen::JsValue;
use web_sys::{
    WebGl2RenderingContext as Gl, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

const VERTEX_SHADER: &str = r#"#version 300 es
in vec3 a_position;
in vec3 a_normal;
in vec3 a_color;

uniform mat4 u_view_projection;
uniform mat4 u_model;

out vec3 v_color;

void main() {
    vec3 normal = normalize(mat3(u_model) * a_normal);
    float light = 0.55 + 0.45 * max(normal.z, 0.0);
    v_color = a_color * light;
    gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in vec3 v_color;
out vec4 out_color;

void main() {
    out_color = vec4(v_color, 1.0);
}
"#;

/// position, normal, colour
const FLOATS_PER_VERTEX: i32 = 9;

const BACKGROUND: [f32; 4] = [0.12, 0.12, 0.14, 1.0];

struct PieceBuffers {
    vao: WebGlVertexArrayObject,
    vertex_count: i32,
}

pub struct WebGlSurface {
    gl: Gl,
    program: WebGlProgram,
    u_view_projection: WebGlUniformLocation,
    u_model: WebGlUniformLocation,
    pieces: Vec<PieceBuffers>,
    width: i32,
    height: i32,
}

impl WebGlSurface {
    pub fn new(gl: Gl, width: u32, height: u32) -> Result<Self, JsValue> {
        let program = link_program(&gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        let u_view_projection = uniform(&gl, &program, "u_view_projection")?;
        let u_model = uniform(&gl, &program, "u_model")?;

        // Stickers never move relative to their piece, so colours are fixed per slot
        let mesh = Mesh::cube(1.0);
        let pieces = piece_instances(&CubeState::solved(), None)
            .iter()
            .map(|piece| upload_piece(&gl, &program, &mesh, &piece.stickers))
            .collect::<Result<Vec<_>, JsValue>>()?;
        debug_assert_eq!(pieces.len(), PIECE_COUNT);

        gl.enable(Gl::DEPTH_TEST);
        gl.enable(Gl::CULL_FACE);
        gl.cull_face(Gl::BACK);

        Ok(Self {
            gl,
            program,
            u_view_projection,
            u_model,
            pieces,
            width: width as i32,
            height: height as i32,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as i32;
        self.height = height as i32;
    }
}

impl RenderSurface for WebGlSurface {
    type Error = JsValue;

    fn begin_frame(&mut self, view_projection: &Matrix4<f32>) -> Result<(), JsValue> {
        let [r, g, b, a] = BACKGROUND;
        self.gl.viewport(0, 0, self.width, self.height);
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        self.gl.use_program(Some(&self.program));
        self.gl.uniform_matrix4fv_with_f32_array(
            Some(&self.u_view_projection),
            false,
            view_projection.as_slice(),
        );
        Ok(())
    }

    fn draw_piece(&mut self, piece: &PieceInstance, model: &Matrix4<f32>) -> Result<(), JsValue> {
        let buffers = self
            .pieces
            .get(piece.slot)
            .ok_or_else(|| JsValue::from_str(&format!("no buffers for piece {}", piece.slot)))?;
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(&self.u_model), false, model.as_slice());
        self.gl.bind_vertex_array(Some(&buffers.vao));
        self.gl.draw_arrays(Gl::TRIANGLES, 0, buffers.vertex_count);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), JsValue> {
        self.gl.bind_vertex_array(None);
        Ok(())
    }
}

/// Interleaved vertex data for one piece
pub fn piece_vertices(mesh: &Mesh, stickers: &StickerSet) -> Vec<f32> {
    let mut data = Vec::with_capacity(mesh.triangles.len() * 3 * FLOATS_PER_VERTEX as usize);
    for triangle in &mesh.triangles {
        let color = stickers[triangle.face.index()]
            .map(|sticker| sticker.rgb())
            .unwrap_or(INNER_RGB);
        for vertex in &triangle.vertices {
            data.extend_from_slice(vertex.position.coords.as_slice());
            data.extend_from_slice(vertex.normal.as_slice());
            data.extend_from_slice(&color);
        }
    }
    data
}

fn upload_piece(
    gl: &Gl,
    program: &WebGlProgram,
    mesh: &Mesh,
    stickers: &StickerSet,
) -> Result<PieceBuffers, JsValue> {
    let data = piece_vertices(mesh, stickers);

    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| JsValue::from_str("Unable to create vertex array"))?;
    gl.bind_vertex_array(Some(&vao));

    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("Unable to create buffer"))?;
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
    let array = Float32Array::from(data.as_slice());
    gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);

    let stride = FLOATS_PER_VERTEX * 4;
    for (name, offset) in [("a_position", 0), ("a_normal", 3), ("a_color", 6)] {
        let location = gl.get_attrib_location(program, name);
        if location < 0 {
            return Err(JsValue::from_str(&format!("Missing attribute {name}")));
        }
        let location = location as u32;
        gl.enable_vertex_attrib_array(location);
        gl.vertex_attrib_pointer_with_i32(location, 3, Gl::FLOAT, false, stride, offset * 4);
    }
    gl.bind_vertex_array(None);

    Ok(PieceBuffers {
        vao,
        vertex_count: (data.len() / FLOATS_PER_VERTEX as usize) as i32,
    })
}

fn uniform(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<WebGlUniformLocation, JsValue> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| JsValue::from_str(&format!("Missing uniform {name}")))
}

fn compile_shader(gl: &Gl, shader_type: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| JsValue::from_str("Unable to create shader object"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(JsValue::from_str(
            &gl.get_shader_info_log(&shader)
                .unwrap_or_else(|| "Unknown error creating shader".into()),
        ))
    }
}

fn link_program(
    gl: &Gl,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<WebGlProgram, JsValue> {
    let vertex_shader = compile_shader(gl, Gl::VERTEX_SHADER, vertex_source)?;
    let fragment_shader = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment_source)?;

    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("Unable to create shader program"))?;
    gl.attach_shader(&program, &vertex_shader);
    gl.attach_shader(&program, &fragment_shader);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(JsValue::from_str(
            &gl.get_program_info_log(&program)
                .unwrap_or_else(|| "Unknown error linking program".into()),
        ))
    }
}
