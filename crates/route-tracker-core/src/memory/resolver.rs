//! Multi-level pointer chain resolution.
//!
//! A chain starts at a root address. For every offset the pointer stored at
//! the current address is dereferenced and the offset is added to it. After
//! the last offset the scalar itself is read at the final address:
//!
//! ```text
//! root ──deref──▶ p0 + off[0] ──deref──▶ p1 + off[1] ── ... ──▶ value
//! ```
//!
//! The only thing that differs between 32-bit and 64-bit targets is the size
//! of the pointers being dereferenced, so the walk is written once and takes a
//! [`PointerWidth`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::memory::{ReadMemory, Scalar};

/// Pointer size of the target process, fixed for the lifetime of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum PointerWidth {
    #[serde(rename = "32-bit")]
    #[strum(serialize = "32-bit")]
    Bits32,
    #[serde(rename = "64-bit")]
    #[strum(serialize = "64-bit")]
    Bits64,
}

impl PointerWidth {
    /// Pointer width of this executable
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            PointerWidth::Bits64
        } else {
            PointerWidth::Bits32
        }
    }

    /// Pointer size in bytes
    pub const fn size(self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }

    fn read_pointer<R: ReadMemory + ?Sized>(self, reader: &R, address: u64) -> crate::Result<u64> {
        match self {
            PointerWidth::Bits32 => reader.read_u32(address).map(u64::from),
            PointerWidth::Bits64 => reader.read_u64(address),
        }
    }

    /// Add a signed offset to a pointer, wrapping within the address space
    fn offset(self, pointer: u64, offset: i32) -> u64 {
        let next = pointer.wrapping_add_signed(i64::from(offset));
        match self {
            PointerWidth::Bits32 => next & 0xFFFF_FFFF,
            PointerWidth::Bits64 => next,
        }
    }
}

/// A fixed recipe: module-relative root plus the offsets to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetChain {
    /// Root address relative to the main module base
    pub root: u64,
    pub offsets: &'static [i32],
}

impl OffsetChain {
    pub const fn new(root: u64, offsets: &'static [i32]) -> Self {
        Self { root, offsets }
    }

    /// Absolute root address for a module loaded at `base`
    pub fn root_address(&self, base: u64) -> u64 {
        base.wrapping_add(self.root)
    }
}

/// Walks pointer chains through a borrowed address space.
pub struct AddressResolver<'a, R: ?Sized> {
    reader: &'a R,
    width: PointerWidth,
}

impl<'a, R: ReadMemory + ?Sized> AddressResolver<'a, R> {
    pub fn new(reader: &'a R, width: PointerWidth) -> Self {
        Self { reader, width }
    }

    pub fn width(&self) -> PointerWidth {
        self.width
    }

    /// Follow `offsets` from `root` and return the final address.
    ///
    /// Returns `None` as soon as a pointer read is short or yields null; no
    /// partially-applied address is ever returned.
    pub fn resolve(&self, root: u64, offsets: &[i32]) -> Option<u64> {
        let mut address = root;

        for &offset in offsets {
            let pointer = match self.width.read_pointer(self.reader, address) {
                Ok(pointer) => pointer,
                Err(e) => {
                    debug!(
                        "[{}] Failed to read pointer at {:#x} (offset {}): {}",
                        self.width,
                        address,
                        signed_hex(offset),
                        e
                    );
                    return None;
                }
            };

            if pointer == 0 {
                debug!(
                    "[{}] Null pointer at {:#x} (offset {})",
                    self.width,
                    address,
                    signed_hex(offset)
                );
                return None;
            }

            address = self.width.offset(pointer, offset);
            trace!(
                "[{}] Address after applying offset {}: {:#x}",
                self.width,
                signed_hex(offset),
                address
            );
        }

        Some(address)
    }

    /// Read one scalar at an already-resolved address
    pub fn read_scalar<T: Scalar>(&self, address: u64) -> Option<T> {
        match self.reader.read_scalar::<T>(address) {
            Ok(value) => {
                trace!("[{}] Read {:?} at {:#x}", self.width, value, address);
                Some(value)
            }
            Err(e) => {
                debug!("[{}] Failed to read value at {:#x}: {}", self.width, address, e);
                None
            }
        }
    }

    /// Resolve the chain and read the scalar at its end
    pub fn read<T: Scalar>(&self, root: u64, offsets: &[i32]) -> Option<T> {
        let address = self.resolve(root, offsets)?;
        self.read_scalar(address)
    }
}

fn signed_hex(value: i32) -> String {
    if value < 0 {
        format!("-{:#X}", value.unsigned_abs())
    } else {
        format!("{:#X}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryBuilder;

    #[test]
    fn test_resolve_64bit_chain() {
        // root -> 0x2000 (+0x10) -> 0x3000 (-0x8) -> value
        let mock = MockMemoryBuilder::new()
            .u64(0x1000, 0x2000)
            .u64(0x2010, 0x3000)
            .i32(0x2FF8, 77)
            .build();
        let resolver = AddressResolver::new(&mock, PointerWidth::Bits64);

        assert_eq!(resolver.resolve(0x1000, &[0x10, -0x8]), Some(0x2FF8));
        assert_eq!(resolver.read::<i32>(0x1000, &[0x10, -0x8]), Some(77));
    }

    #[test]
    fn test_resolve_matches_manual_walk() {
        let mock = MockMemoryBuilder::new()
            .u64(0x500, 0x7000)
            .u64(0x7100, 0x9000)
            .u64(0x9020, 0xA000)
            .f32(0xA004, 63.25)
            .build();
        let offsets = [0x100, 0x20, 0x4];

        let mut address = 0x500u64;
        for offset in offsets {
            let pointer = mock.read_u64(address).unwrap();
            address = pointer.wrapping_add_signed(i64::from(offset));
        }

        let resolver = AddressResolver::new(&mock, PointerWidth::Bits64);
        assert_eq!(resolver.resolve(0x500, &offsets), Some(address));
        assert_eq!(resolver.read::<f32>(0x500, &offsets), Some(63.25));
    }

    #[test]
    fn test_resolve_32bit_reads_four_byte_pointers() {
        // Only four bytes are mapped at each hop, so a 64-bit walk must fail
        let mock = MockMemoryBuilder::new()
            .u32(0x100, 0x4000)
            .u32(0x4284, 0x5000)
            .i32(0x5018, 12)
            .build();

        let resolver = AddressResolver::new(&mock, PointerWidth::Bits32);
        assert_eq!(resolver.read::<i32>(0x100, &[0x284, 0x18]), Some(12));

        let resolver = AddressResolver::new(&mock, PointerWidth::Bits64);
        assert_eq!(resolver.read::<i32>(0x100, &[0x284, 0x18]), None);
    }

    #[test]
    fn test_resolve_32bit_wraps_address_space() {
        let mock = MockMemoryBuilder::new()
            .u32(0x10, 0xFFFF_FFF0)
            .build();
        let resolver = AddressResolver::new(&mock, PointerWidth::Bits32);

        assert_eq!(resolver.resolve(0x10, &[0x20]), Some(0x10));
    }

    #[test]
    fn test_null_pointer_aborts_chain() {
        let mock = MockMemoryBuilder::new()
            .u64(0x1000, 0x2000)
            .u64(0x2010, 0)
            .i32(0x8, 99)
            .build();
        let resolver = AddressResolver::new(&mock, PointerWidth::Bits64);

        // A naive walk would land on 0x0 + 0x8 and read 99
        assert_eq!(resolver.resolve(0x1000, &[0x10, 0x8]), None);
        assert_eq!(resolver.read::<i32>(0x1000, &[0x10, 0x8]), None);
    }

    #[test]
    fn test_short_read_aborts_chain() {
        let mock = MockMemoryBuilder::new().bytes(0x1000, &[0, 0x20, 0, 0]).build();
        let resolver = AddressResolver::new(&mock, PointerWidth::Bits64);

        assert_eq!(resolver.resolve(0x1000, &[0x10]), None);
    }

    #[test]
    fn test_unreadable_final_value() {
        let mock = MockMemoryBuilder::new().u64(0x1000, 0x2000).build();
        let resolver = AddressResolver::new(&mock, PointerWidth::Bits64);

        assert_eq!(resolver.resolve(0x1000, &[0x40]), Some(0x2040));
        assert_eq!(resolver.read::<i32>(0x1000, &[0x40]), None);
    }

    #[test]
    fn test_empty_chain_reads_root() {
        let mock = MockMemoryBuilder::new().i32(0x600, 3).build();
        let resolver = AddressResolver::new(&mock, PointerWidth::Bits64);

        assert_eq!(resolver.read::<i32>(0x600, &[]), Some(3));
    }

    #[test]
    fn test_offset_chain_root_address() {
        let chain = OffsetChain::new(0x49D9774, &[0x284]);
        assert_eq!(chain.root_address(0x1_4000_0000), 0x1_449D_9774);
    }

    #[test]
    fn test_pointer_width_display() {
        assert_eq!(PointerWidth::Bits32.to_string(), "32-bit");
        assert_eq!(PointerWidth::Bits64.to_string(), "64-bit");
        assert_eq!(PointerWidth::Bits32.size(), 4);
        assert_eq!(PointerWidth::Bits64.size(), 8);
    }

    #[test]
    fn test_signed_hex() {
        assert_eq!(signed_hex(-0x1B30), "-0x1B30");
        assert_eq!(signed_hex(0x424), "0x424");
    }
}
