use std::collections::BTreeMap;

use bitflags::bitflags;
use thiserror::Error;
use tracing::debug;

bitflags! {
    /// Region protection flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Perms: u8 {
        const READ = 1;
        const WRITE = 2;
        const EXEC = 4;
    }
}

impl Perms {
    pub const fn rw() -> Self {
        Self::READ.union(Self::WRITE)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("cannot map zero-length region at {base:#x}")]
    ZeroLength { base: u64 },
    #[error("region [{base:#x}, +{len:#x}) overlaps existing [{existing_base:#x}, +{existing_len:#x})")]
    Overlap {
        base: u64,
        len: u64,
        existing_base: u64,
        existing_len: u64,
    },
    #[error("region [{base:#x}, +{len:#x}) wraps the address space")]
    Wraps { base: u64, len: u64 },
    #[error("init bytes ({got}) do not match region length {len:#x}")]
    InitLength { got: usize, len: u64 },
    #[error("unmapped address {addr:#x}")]
    Unmapped { addr: u64 },
    #[error("{perm:?} access to {addr:#x} denied")]
    Protection { addr: u64, perm: Perms },
}

/// Initial contents of a newly mapped region.
#[derive(Debug, Clone)]
pub enum RegionInit {
    /// Zero-filled (data regions).
    Zero,
    /// Backed by the given bytes, e.g. a loaded code image. Must match the
    /// region length exactly.
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
struct Region {
    base: u64,
    data: Vec<u8>,
    perms: Perms,
}

impl Region {
    fn end(&self) -> u64 {
        self.base + self.data.len() as u64
    }

    fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }
}

/// A sparse address space of disjoint mapped regions.
///
/// Mapping is the single point of size/overlap validation; callers layering
/// regions on top (state constructors, loaders) forward its errors rather
/// than re-checking.
#[derive(Debug, Clone, Default)]
pub struct MemoryMap {
    regions: BTreeMap<u64, Region>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `len` bytes at `base` with the given protection.
    pub fn map_region(
        &mut self,
        base: u64,
        len: u64,
        perms: Perms,
        init: RegionInit,
    ) -> Result<(), MemoryError> {
        if len == 0 {
            return Err(MemoryError::ZeroLength { base });
        }
        let end = base
            .checked_add(len)
            .ok_or(MemoryError::Wraps { base, len })?;
        // Regions are disjoint, so the highest base below `end` is the only
        // candidate for overlap.
        if let Some((_, existing)) = self.regions.range(..end).next_back() {
            if existing.end() > base {
                return Err(MemoryError::Overlap {
                    base,
                    len,
                    existing_base: existing.base,
                    existing_len: existing.data.len() as u64,
                });
            }
        }
        let data = match init {
            RegionInit::Zero => vec![0u8; len as usize],
            RegionInit::Bytes(bytes) => {
                if bytes.len() as u64 != len {
                    return Err(MemoryError::InitLength {
                        got: bytes.len(),
                        len,
                    });
                }
                bytes
            }
        };
        debug!(base, len, ?perms, "mapped region");
        self.regions.insert(base, Region { base, data, perms });
        Ok(())
    }

    pub fn is_mapped(&self, addr: u64) -> bool {
        self.region(addr).is_ok()
    }

    pub fn load_byte(&self, addr: u64) -> Result<u8, MemoryError> {
        let region = self.region(addr)?;
        if !region.perms.contains(Perms::READ) {
            return Err(MemoryError::Protection {
                addr,
                perm: Perms::READ,
            });
        }
        Ok(region.data[(addr - region.base) as usize])
    }

    pub fn store_byte(&mut self, addr: u64, byte: u8) -> Result<(), MemoryError> {
        let region = self.region_mut(addr)?;
        if !region.perms.contains(Perms::WRITE) {
            return Err(MemoryError::Protection {
                addr,
                perm: Perms::WRITE,
            });
        }
        let off = (addr - region.base) as usize;
        region.data[off] = byte;
        Ok(())
    }

    fn region(&self, addr: u64) -> Result<&Region, MemoryError> {
        self.regions
            .range(..=addr)
            .next_back()
            .map(|(_, r)| r)
            .filter(|r| r.contains(addr))
            .ok_or(MemoryError::Unmapped { addr })
    }

    fn region_mut(&mut self, addr: u64) -> Result<&mut Region, MemoryError> {
        self.regions
            .range_mut(..=addr)
            .next_back()
            .map(|(_, r)| r)
            .filter(|r| r.contains(addr))
            .ok_or(MemoryError::Unmapped { addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_zeroed_and_reads_back_stores() {
        let mut m = MemoryMap::new();
        m.map_region(0x1000, 0x10, Perms::rw(), RegionInit::Zero)
            .unwrap();
        for addr in 0x1000..0x1010 {
            assert_eq!(m.load_byte(addr).unwrap(), 0);
        }
        m.store_byte(0x1003, 0xab).unwrap();
        assert_eq!(m.load_byte(0x1003).unwrap(), 0xab);
    }

    #[test]
    fn rejects_zero_length() {
        let mut m = MemoryMap::new();
        assert_eq!(
            m.map_region(0x1000, 0, Perms::rw(), RegionInit::Zero),
            Err(MemoryError::ZeroLength { base: 0x1000 })
        );
        assert!(!m.is_mapped(0x1000));
    }

    #[test]
    fn rejects_overlap_but_allows_adjacency() {
        let mut m = MemoryMap::new();
        m.map_region(0x100, 0x100, Perms::rw(), RegionInit::Zero)
            .unwrap();
        // Head, tail and containment overlaps all fail.
        assert!(m
            .map_region(0x80, 0x100, Perms::rw(), RegionInit::Zero)
            .is_err());
        assert!(m
            .map_region(0x1f0, 0x40, Perms::rw(), RegionInit::Zero)
            .is_err());
        assert!(m
            .map_region(0x140, 0x10, Perms::rw(), RegionInit::Zero)
            .is_err());
        // End-exclusive: touching regions are fine.
        m.map_region(0x200, 0x10, Perms::rw(), RegionInit::Zero)
            .unwrap();
        m.map_region(0x80, 0x80, Perms::rw(), RegionInit::Zero)
            .unwrap();
    }

    #[test]
    fn enforces_protection_flags() {
        let mut m = MemoryMap::new();
        m.map_region(0, 4, Perms::READ, RegionInit::Bytes(vec![1, 2, 3, 4]))
            .unwrap();
        assert_eq!(m.load_byte(2).unwrap(), 3);
        assert!(matches!(
            m.store_byte(2, 0),
            Err(MemoryError::Protection { .. })
        ));
    }

    #[test]
    fn unmapped_access_is_an_error() {
        let m = MemoryMap::new();
        assert_eq!(m.load_byte(0x42), Err(MemoryError::Unmapped { addr: 0x42 }));
    }

    #[test]
    fn init_bytes_must_match_length() {
        let mut m = MemoryMap::new();
        assert_eq!(
            m.map_region(0, 4, Perms::READ, RegionInit::Bytes(vec![1, 2])),
            Err(MemoryError::InitLength { got: 2, len: 4 })
        );
    }

    #[test]
    fn rejects_regions_wrapping_the_address_space() {
        let mut m = MemoryMap::new();
        assert!(matches!(
            m.map_region(u64::MAX - 1, 4, Perms::rw(), RegionInit::Zero),
            Err(MemoryError::Wraps { .. })
        ));
    }
}
