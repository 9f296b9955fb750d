//! Per-object uniforms batched into one buffer and selected with dynamic offsets.

use crate::context::Context;
use bytemuck::Pod;
use std::marker::PhantomData;
use std::mem;

/// Size of one `T` entry once padded to `alignment` bytes.
pub fn aligned_size<T>(alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    (mem::size_of::<T>() as u64).div_ceil(alignment) * alignment
}

/// A uniform buffer holding one aligned `T` per drawn object.
///
/// Entries are accumulated on the CPU during a frame, then written with a single
/// `write_buffer` call before the render pass starts.
pub struct DynamicUniformBuffer<T: Pod> {
    data: Vec<u8>,
    buffer: wgpu::Buffer,
    capacity: u64,
    aligned_size: u64,
    count: usize,
    label: &'static str,
    _marker: PhantomData<T>,
}

impl<T: Pod> DynamicUniformBuffer<T> {
    /// Creates a buffer with room for `initial_capacity` entries.
    pub fn with_capacity(ctxt: &Context, label: &'static str, initial_capacity: usize) -> Self {
        let aligned_size = aligned_size::<T>(ctxt.uniform_alignment());
        let capacity = aligned_size * initial_capacity.max(1) as u64;

        Self {
            data: Vec::with_capacity(capacity as usize),
            buffer: Self::create(ctxt, label, capacity),
            capacity,
            aligned_size,
            count: 0,
            label,
            _marker: PhantomData,
        }
    }

    fn create(ctxt: &Context, label: &'static str, size: u64) -> wgpu::Buffer {
        ctxt.create_buffer_simple(
            Some(label),
            size,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )
    }

    /// Forgets the entries of the previous frame.
    pub fn clear(&mut self) {
        self.data.clear();
        self.count = 0;
    }

    /// Appends an entry and returns its dynamic offset.
    pub fn push(&mut self, value: &T) -> u32 {
        let offset = (self.count as u64 * self.aligned_size) as u32;

        let bytes = bytemuck::bytes_of(value);
        self.data.extend_from_slice(bytes);
        self.data
            .extend(std::iter::repeat_n(0u8, self.aligned_size as usize - bytes.len()));

        self.count += 1;
        offset
    }

    /// Uploads the entries, growing the GPU buffer first if needed.
    ///
    /// Returns `true` if the buffer was reallocated, in which case bind groups referencing
    /// it must be recreated.
    pub fn flush(&mut self, ctxt: &Context) -> bool {
        if self.data.is_empty() {
            return false;
        }

        let required = self.data.len() as u64;
        let reallocated = required > self.capacity;
        if reallocated {
            let mut capacity = self.capacity;
            while capacity < required {
                capacity *= 2;
            }
            self.buffer = Self::create(ctxt, self.label, capacity);
            self.capacity = capacity;
        }

        ctxt.write_buffer(&self.buffer, 0, &self.data);
        reallocated
    }

    /// The GPU buffer.
    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_padded_to_the_alignment() {
        assert_eq!(aligned_size::<[f32; 4]>(256), 256);
        assert_eq!(aligned_size::<[f32; 80]>(256), 512);
        assert_eq!(aligned_size::<[f32; 64]>(256), 256);
        assert_eq!(aligned_size::<[f32; 3]>(0), 12);
    }
}
