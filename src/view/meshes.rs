use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::config::HallConfig;
use crate::model::{Exhibit, ParticleField};

/// Height of the walls and ceiling.
pub const WALL_HEIGHT: f32 = 12.0;
/// Plinths, benches and desks are drawn this tall.
const PLINTH_HEIGHT: f32 = 1.0;
/// Square footprints up to this size are pillars and reach the ceiling.
const PILLAR_MAX_SIDE: f32 = 1.5;

const FLOOR_COLOR: [f32; 4] = [0.03, 0.03, 0.035, 1.0];
const WALL_COLOR: [f32; 4] = [0.09, 0.09, 0.11, 1.0];
const CEILING_COLOR: [f32; 4] = [0.02, 0.02, 0.03, 1.0];
const FURNITURE_COLOR: [f32; 4] = [0.16, 0.16, 0.18, 1.0];
const PILLAR_COLOR: [f32; 4] = [0.22, 0.22, 0.25, 1.0];
const BANNER_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const SCREEN_PAUSED: [f32; 4] = [0.05, 0.08, 0.1, 1.0];
const SCREEN_PLAYING: [f32; 4] = [0.3, 0.95, 1.0, 1.0];
const PARTICLE_COLOR: [f32; 4] = [0.7, 1.0, 1.0, 0.8];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Quad spanning `center ± u ± v`; its front (CCW) side faces `u × v`.
    pub fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, color: [f32; 4]) {
        let normal = u.cross(v).normalize_or_zero().to_array();
        let base = self.vertices.len() as u32;
        for corner in [center - u - v, center + u - v, center + u + v, center - u + v] {
            self.vertices.push(Vertex { pos: corner.to_array(), normal, color });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Axis-aligned box seen from outside.
    pub fn push_box(&mut self, center: Vec3, half: Vec3, color: [f32; 4]) {
        let (x, y, z) = (Vec3::X * half.x, Vec3::Y * half.y, Vec3::Z * half.z);
        self.push_quad(center + x, -z, y, color);
        self.push_quad(center - x, z, y, color);
        self.push_quad(center + z, x, y, color);
        self.push_quad(center - z, -x, y, color);
        self.push_quad(center + y, x, -z, color);
        self.push_quad(center - y, x, z, color);
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer { vertex_buffer, index_buffer, index_count: self.indices.len() as u32 }
    }

    /// Like `upload`, but the vertex buffer can be rewritten every frame with
    /// a mesh of the same topology.
    pub fn upload_dynamic(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dynamic Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dynamic Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer { vertex_buffer, index_buffer, index_count: self.indices.len() as u32 }
    }
}

/// Right-hand vector of a wall-mounted item whose front faces `facing` (yaw).
fn facing_axes(facing: f32) -> (Vec3, Vec3) {
    let (s, c) = facing.sin_cos();
    let right = Vec3::new(c, 0.0, -s);
    let front = Vec3::new(s, 0.0, c);
    (right, front)
}

fn push_portrait(mesh: &mut Mesh, exhibit: &Exhibit) {
    let (right, front) = facing_axes(exhibit.facing);
    let center = exhibit.position();
    let neon = exhibit.neon_rgba();
    let canvas = [neon[0] * 0.25 + 0.1, neon[1] * 0.25 + 0.1, neon[2] * 0.25 + 0.1, 1.0];

    // neon frame, canvas on top of it, name plate below
    mesh.push_quad(center + front * 0.02, right * 1.7, Vec3::Y * 2.2, neon);
    mesh.push_quad(center + front * 0.04, right * 1.5, Vec3::Y * 2.0, canvas);
    let plate = center - Vec3::Y * 2.65 + front * 0.04;
    mesh.push_quad(plate, right * 1.5, Vec3::Y * 0.3, [0.05, 0.05, 0.05, 1.0]);
    mesh.push_quad(plate + front * 0.01 - Vec3::Y * 0.28, right * 1.5, Vec3::Y * 0.02, neon);
}

/// Static geometry: room shell, obstacles, portraits and the banner.
pub fn build_hall_mesh(config: &HallConfig) -> Mesh {
    let mut mesh = Mesh::empty();
    let b = &config.bounds;
    let r = config.player.radius;
    let (min_x, max_x, min_z, max_z) = (b.min_x - r, b.max_x + r, b.min_z - r, b.max_z + r);
    let cx = (min_x + max_x) / 2.0;
    let cz = (min_z + max_z) / 2.0;
    let hx = (max_x - min_x) / 2.0;
    let hz = (max_z - min_z) / 2.0;
    let hy = WALL_HEIGHT / 2.0;

    // shell, faces pointing inward
    mesh.push_quad(Vec3::new(cx, 0.0, cz), Vec3::X * hx, Vec3::NEG_Z * hz, FLOOR_COLOR);
    mesh.push_quad(Vec3::new(cx, WALL_HEIGHT, cz), Vec3::X * hx, Vec3::Z * hz, CEILING_COLOR);
    mesh.push_quad(Vec3::new(min_x, hy, cz), Vec3::NEG_Z * hz, Vec3::Y * hy, WALL_COLOR);
    mesh.push_quad(Vec3::new(max_x, hy, cz), Vec3::Z * hz, Vec3::Y * hy, WALL_COLOR);
    mesh.push_quad(Vec3::new(cx, hy, min_z), Vec3::X * hx, Vec3::Y * hy, WALL_COLOR);
    mesh.push_quad(Vec3::new(cx, hy, max_z), Vec3::NEG_X * hx, Vec3::Y * hy, WALL_COLOR);

    for o in &config.obstacles {
        let pillar = o.w <= PILLAR_MAX_SIDE && o.d <= PILLAR_MAX_SIDE;
        let (height, color) = if pillar { (WALL_HEIGHT, PILLAR_COLOR) } else { (PLINTH_HEIGHT, FURNITURE_COLOR) };
        mesh.push_box(
            Vec3::new(o.x, height / 2.0, o.z),
            Vec3::new(o.w / 2.0, height / 2.0, o.d / 2.0),
            color,
        );
    }

    for exhibit in &config.exhibits {
        push_portrait(&mut mesh, exhibit);
    }

    // anniversary banner high on the back wall
    mesh.push_quad(Vec3::new(cx, WALL_HEIGHT - 1.5, min_z + 0.05), Vec3::X * 6.0, Vec3::Y * 0.6, BANNER_COLOR);

    mesh
}

/// The kiosk's screen, lit while playing.
pub fn build_screen_mesh(config: &HallConfig, playing: bool) -> Mesh {
    let k = &config.kiosk;
    let mut mesh = Mesh::empty();
    let center = Vec3::new(k.x, PLINTH_HEIGHT + 0.5 + k.screen_height / 2.0, k.z - 1.0);
    let half_w = k.screen_width / 2.0;
    let half_h = k.screen_height / 2.0;
    mesh.push_box(center - Vec3::Z * 0.1, Vec3::new(half_w + 0.15, half_h + 0.15, 0.05), FURNITURE_COLOR);
    let color = if playing { SCREEN_PLAYING } else { SCREEN_PAUSED };
    mesh.push_quad(center - Vec3::Z * 0.04, Vec3::X * half_w, Vec3::Y * half_h, color);
    mesh
}

/// One tiny cube per particle; topology depends only on the particle count.
pub fn build_particle_mesh(field: &ParticleField) -> Mesh {
    let mut mesh = Mesh::empty();
    let half = Vec3::splat(field.size());
    for p in field.particles() {
        mesh.push_box(p.position, half, PARTICLE_COLOR);
    }
    mesh
}
