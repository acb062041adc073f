//! In-memory address space for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// Sparse byte map; any unmapped byte makes a read short.
#[derive(Debug, Default)]
pub struct MockMemoryReader {
    bytes: HashMap<u64, u8>,
    reads: AtomicUsize,
}

impl MockMemoryReader {
    /// Number of `read_bytes` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut out = Vec::with_capacity(size);
        for i in 0..size as u64 {
            match self.bytes.get(&address.wrapping_add(i)) {
                Some(b) => out.push(*b),
                None => return Err(Error::short_read(address, size, out.len())),
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Default)]
pub struct MockMemoryBuilder {
    bytes: HashMap<u64, u8>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(mut self, address: u64, data: &[u8]) -> Self {
        for (i, b) in data.iter().enumerate() {
            self.bytes.insert(address.wrapping_add(i as u64), *b);
        }
        self
    }

    pub fn i32(self, address: u64, value: i32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u32(self, address: u64, value: u32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u64(self, address: u64, value: u64) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn f32(self, address: u64, value: f32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            bytes: self.bytes,
            reads: AtomicUsize::new(0),
        }
    }
}
