//! Raw reads from a foreign address space.

use std::sync::Arc;

use crate::error::{Error, Result};

/// A readable address space (a live process, or a mock in tests).
///
/// Implementors only provide [`read_bytes`](ReadMemory::read_bytes). A read
/// that returns fewer bytes than requested must be reported as an error.
pub trait ReadMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    fn read_i32(&self, address: u64) -> Result<i32> {
        self.read_scalar(address)
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        self.read_scalar(address)
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        self.read_scalar(address)
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        self.read_scalar(address)
    }

    /// Read one little-endian scalar of `T::SIZE` bytes
    fn read_scalar<T: Scalar>(&self, address: u64) -> Result<T> {
        let bytes = self.read_bytes(address, T::SIZE)?;
        if bytes.len() != T::SIZE {
            return Err(Error::short_read(address, T::SIZE, bytes.len()));
        }
        Ok(T::from_le_slice(&bytes))
    }
}

impl<R: ReadMemory + ?Sized> ReadMemory for &R {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }
}

impl<R: ReadMemory + ?Sized> ReadMemory for Arc<R> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }
}

/// Plain values that can be decoded from process memory.
pub trait Scalar: Copy + Default + std::fmt::Debug {
    const SIZE: usize;

    /// Decode from exactly `SIZE` little-endian bytes
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_scalar!(i32, u32, i64, u64, f32, f64);
