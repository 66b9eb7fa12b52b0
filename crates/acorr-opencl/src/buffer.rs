//! Typed device buffers.

use std::ptr;

use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::memory::{Buffer, ClMem};
use opencl3::types::{CL_BLOCKING, cl_mem, cl_mem_flags};
use tracing::debug;

use crate::error::{OpenClError, Result};

/// A device buffer of `len` elements of `T`.
pub(crate) struct DeviceBuffer<T> {
    inner: Buffer<T>,
    len: usize,
}

impl<T> std::fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("len", &self.len)
            .field("elem_size", &std::mem::size_of::<T>())
            .finish()
    }
}

impl<T: Copy + Default> DeviceBuffer<T> {
    /// Allocate an uninitialized buffer.
    pub(crate) fn new(context: &Context, flags: cl_mem_flags, len: usize) -> Result<Self> {
        let bytes = len * std::mem::size_of::<T>();
        let inner = unsafe {
            Buffer::<T>::create(context, flags, len, ptr::null_mut())
                .map_err(|e| OpenClError::cl(e.0, format!("allocate {bytes} byte buffer")))?
        };
        debug!(len, bytes, "device buffer allocated");
        Ok(Self { inner, len })
    }

    /// Upload `data` (blocking).
    pub(crate) fn write(&mut self, queue: &CommandQueue, data: &[T]) -> Result<()> {
        if data.len() > self.len {
            return Err(OpenClError::TransferTooLarge { len: data.len(), capacity: self.len });
        }
        unsafe {
            queue
                .enqueue_write_buffer(&mut self.inner, CL_BLOCKING, 0, data, &[])
                .map_err(|e| OpenClError::cl(e.0, "write buffer"))?;
        }
        Ok(())
    }

    /// Fill every element with `value` and wait for the fill to finish.
    pub(crate) fn fill(&mut self, queue: &CommandQueue, value: T) -> Result<()> {
        let bytes = self.len * std::mem::size_of::<T>();
        unsafe {
            queue
                .enqueue_fill_buffer(&mut self.inner, &[value], 0, bytes, &[])
                .map_err(|e| OpenClError::cl(e.0, "fill buffer"))?;
        }
        queue.finish().map_err(|e| OpenClError::cl(e.0, "finish fill"))
    }

    /// Download the whole buffer (blocking).
    pub(crate) fn read_to_vec(&self, queue: &CommandQueue) -> Result<Vec<T>> {
        let mut host = vec![T::default(); self.len];
        unsafe {
            queue
                .enqueue_read_buffer(&self.inner, CL_BLOCKING, 0, &mut host, &[])
                .map_err(|e| OpenClError::cl(e.0, "read buffer"))?;
        }
        Ok(host)
    }

    /// Raw handle for kernel arguments.
    pub(crate) fn mem(&self) -> cl_mem {
        self.inner.get()
    }
}
