//! Device abstraction the batcher uploads into.
//!
//! The batcher talks to a [`RenderDevice`] so the whole pipeline runs
//! headless in tests. [`WgpuDevice`] is the real implementation: one
//! vertex/index buffer pair per submesh slot, grown geometrically and
//! refilled in place with `queue.write_buffer` each frame.

use log::{debug, trace};

use super::commands::{MaterialKey, Vertex, VertexFormat};

/// Sink for the per-frame submeshes the batcher produces.
pub trait RenderDevice {
    /// Start a new frame; previously pushed submeshes are discarded.
    fn begin_frame(&mut self);

    /// Upload one submesh worth of geometry.
    fn push_submesh(&mut self, vertices: &[Vertex], indices: &[u16], material: MaterialKey);

    /// Frame complete; everything pushed since `begin_frame` is the
    /// full draw list.
    fn end_frame(&mut self);
}

/// Discards geometry. Default device for documents without a GPU.
#[derive(Default)]
pub struct NoopDevice {
    submeshes: usize,
    vertices: usize,
}

impl NoopDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submeshes pushed in the last frame.
    pub fn submesh_count(&self) -> usize {
        self.submeshes
    }

    /// Vertices pushed in the last frame.
    pub fn vertex_count(&self) -> usize {
        self.vertices
    }
}

impl RenderDevice for NoopDevice {
    fn begin_frame(&mut self) {
        self.submeshes = 0;
        self.vertices = 0;
    }

    fn push_submesh(&mut self, vertices: &[Vertex], _indices: &[u16], _material: MaterialKey) {
        self.submeshes += 1;
        self.vertices += vertices.len();
    }

    fn end_frame(&mut self) {
        trace!(
            "frame complete: {} submeshes, {} vertices",
            self.submeshes,
            self.vertices
        );
    }
}

/// One reusable vertex/index buffer pair.
struct BufferPool {
    vertex: wgpu::Buffer,
    vertex_capacity: u64,
    index: wgpu::Buffer,
    index_capacity: u64,
}

/// A submesh recorded for the current frame, ready to draw.
pub struct GpuSubmesh {
    /// Which buffer pool holds the geometry.
    pub pool: usize,
    pub vertex_count: u32,
    pub index_count: u32,
    pub material: MaterialKey,
}

/// Uploads submeshes into wgpu buffers, one pool per submesh slot.
/// Pools persist across frames and grow geometrically, so a stable
/// scene reuses its buffers without reallocating.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pools: Vec<BufferPool>,
    cursor: usize,
    submeshes: Vec<GpuSubmesh>,
}

// Initial capacities fit one quad.
const INITIAL_VERTEX_BYTES: u64 = (4 * VertexFormat::PosColor.stride()) as u64;
const INITIAL_INDEX_BYTES: u64 = 6 * std::mem::size_of::<u16>() as u64;

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            pools: Vec::new(),
            cursor: 0,
            submeshes: Vec::new(),
        }
    }

    /// Bring up a headless device on the default adapter.
    pub fn headless() -> Result<Self, Box<dyn std::error::Error>> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))?;
        Ok(Self::new(device, queue))
    }

    /// Submeshes recorded for the last frame, in draw order.
    pub fn submeshes(&self) -> &[GpuSubmesh] {
        &self.submeshes
    }

    /// Vertex/index buffers backing a recorded submesh.
    pub fn buffers(&self, pool: usize) -> (&wgpu::Buffer, &wgpu::Buffer) {
        let pool = &self.pools[pool];
        (&pool.vertex, &pool.index)
    }

    fn create_buffer(&self, size: u64, usage: wgpu::BufferUsages, label: &str) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn ensure_pool(&mut self, index: usize, vertex_bytes: u64, index_bytes: u64) {
        if index >= self.pools.len() {
            let vertex_capacity = vertex_bytes.max(INITIAL_VERTEX_BYTES);
            let index_capacity = index_bytes.max(INITIAL_INDEX_BYTES);
            let vertex =
                self.create_buffer(vertex_capacity, wgpu::BufferUsages::VERTEX, "batch vertices");
            let index =
                self.create_buffer(index_capacity, wgpu::BufferUsages::INDEX, "batch indices");
            self.pools.push(BufferPool {
                vertex,
                vertex_capacity,
                index,
                index_capacity,
            });
            return;
        }
        let pool = &self.pools[index];
        let vertex_capacity = pool.vertex_capacity;
        let index_capacity = pool.index_capacity;
        if vertex_bytes > vertex_capacity {
            let new_capacity = (vertex_capacity * 2).max(vertex_bytes);
            debug!("growing vertex buffer {index}: {vertex_capacity} -> {new_capacity} bytes");
            self.pools[index].vertex =
                self.create_buffer(new_capacity, wgpu::BufferUsages::VERTEX, "batch vertices");
            self.pools[index].vertex_capacity = new_capacity;
        }
        if index_bytes > index_capacity {
            let new_capacity = (index_capacity * 2).max(index_bytes);
            debug!("growing index buffer {index}: {index_capacity} -> {new_capacity} bytes");
            self.pools[index].index =
                self.create_buffer(new_capacity, wgpu::BufferUsages::INDEX, "batch indices");
            self.pools[index].index_capacity = new_capacity;
        }
    }
}

impl RenderDevice for WgpuDevice {
    fn begin_frame(&mut self) {
        self.cursor = 0;
        self.submeshes.clear();
    }

    fn push_submesh(&mut self, vertices: &[Vertex], indices: &[u16], material: MaterialKey) {
        let vertex_bytes = std::mem::size_of_val(vertices) as u64;
        let index_bytes = std::mem::size_of_val(indices) as u64;
        self.ensure_pool(self.cursor, vertex_bytes, index_bytes);

        let pool = &self.pools[self.cursor];
        self.queue
            .write_buffer(&pool.vertex, 0, bytemuck::cast_slice(vertices));
        self.queue
            .write_buffer(&pool.index, 0, bytemuck::cast_slice(indices));

        self.submeshes.push(GpuSubmesh {
            pool: self.cursor,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
            material,
        });
        self.cursor += 1;
    }

    fn end_frame(&mut self) {
        trace!("uploaded {} submeshes", self.submeshes.len());
    }
}
