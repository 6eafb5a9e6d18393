//! Uploading batch meshes to wgpu buffers.
//!
//! The crate owns no pipeline. A renderer creates one [`GpuBatch`] per effect,
//! uses [`Vertex::layout`] in its own pipeline, then every frame calls
//! [`GpuBatch::upload`] followed by [`GpuBatch::draw`] inside its render pass.
//!
//! Buffers only grow, to the next power of two of the requested size, so a
//! steady effect stops reallocating after a few frames.

use log::debug;

use crate::mesh::{BatchMesh, Vertex};

/// Quads the buffers can hold before the first grow.
const INITIAL_QUADS: usize = 64;

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    /// Vertex buffer layout: position at location 0, colour at location 1.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// GPU-side vertex and index buffers of one effect.
pub struct GpuBatch {
    label: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    /// Capacity in vertices.
    vertex_capacity: usize,
    /// Capacity in indices.
    index_capacity: usize,
    index_count: u32,
}

impl GpuBatch {
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let vertex_capacity = INITIAL_QUADS * 4;
        let index_capacity = INITIAL_QUADS * 6;
        Self {
            label: label.to_string(),
            vertex_buffer: create_vertex_buffer(device, label, vertex_capacity),
            index_buffer: create_index_buffer(device, label, index_capacity),
            vertex_capacity,
            index_capacity,
            index_count: 0,
        }
    }

    /// Copy a mesh into the buffers, growing them if needed.
    ///
    /// `None` clears the batch; the next [`draw`](Self::draw) does nothing.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, mesh: Option<&BatchMesh>) {
        let Some(mesh) = mesh.filter(|m| !m.is_empty()) else {
            self.index_count = 0;
            return;
        };

        if mesh.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = grown_capacity(self.vertex_capacity, mesh.vertices.len());
            self.vertex_buffer = create_vertex_buffer(device, &self.label, self.vertex_capacity);
            debug!("{}: vertex buffer grown to {} vertices", self.label, self.vertex_capacity);
        }
        if mesh.indices.len() > self.index_capacity {
            self.index_capacity = grown_capacity(self.index_capacity, mesh.indices.len());
            self.index_buffer = create_index_buffer(device, &self.label, self.index_capacity);
            debug!("{}: index buffer grown to {} indices", self.label, self.index_capacity);
        }

        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&mesh.vertices));
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        self.index_count = mesh.index_count();
    }

    /// Record one indexed draw. Returns `false` when there is nothing to draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) -> bool {
        if self.index_count == 0 {
            return false;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
        true
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Next power of two that holds `needed`, never below `current`.
fn grown_capacity(current: usize, needed: usize) -> usize {
    needed.next_power_of_two().max(current)
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{label} Vertex Buffer")),
        size: (vertices * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, label: &str, indices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{label} Index Buffer")),
        size: (indices * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_vertex() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }

    #[test]
    fn test_grown_capacity() {
        assert_eq!(grown_capacity(256, 257), 512);
        assert_eq!(grown_capacity(256, 1000), 1024);
        assert_eq!(grown_capacity(1024, 1024), 1024);
        assert_eq!(grown_capacity(512, 3), 512);
    }
}
