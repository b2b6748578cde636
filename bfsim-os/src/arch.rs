use anyhow::Result;

use bfsim_core::{ArchInfo, MachineState};

/// The BF guest architecture: one pointer register, byte-granular data
/// cells.
pub const BF_ARCH: ArchInfo = ArchInfo {
    name: "BF",
    bits: 64,
    registers: &["ptr"],
};

/// Name this environment registers under.
pub const OS_NAME: &str = "bf";

/// Namespace of the syscall library, distinct per architecture so several
/// personalities can coexist in one engine.
pub const SYSCALL_LIBRARY_NAME: &str = "brainfuck";

/// Initial pointer value: the midpoint of the addressable space, so pointer
/// increments and decrements have headroom in both directions. Also the base
/// of the data region, which keeps code and data disjoint.
pub const PTR_START: u64 = 0x8000_0000;

/// Default data-region size in bytes.
pub const DEFAULT_DATA_REGION_SIZE: u64 = 0x8000;

pub const SYS_READ_BYTE: u64 = 0;
pub const SYS_WRITE_BYTE: u64 = 1;

/// The current data-cell address: the `ptr` register seen as a pointer.
///
/// [`data_ptr`] and [`pending_syscall`] are two views over the same register
/// word. During normal execution the word addresses a data cell; at syscall
/// dispatch the same word selects the syscall. Keeping both views on one
/// storage location is load-bearing: the value that selected a syscall must
/// be re-readable by the body as a data address, with no separate argument
/// tracking in between.
pub fn data_ptr(state: &MachineState) -> Result<u64> {
    Ok(state.regs.read("ptr")?)
}

/// The pending syscall number: the `ptr` register seen as a selector at
/// dispatch time. Alias of [`data_ptr`]; see there.
pub fn pending_syscall(state: &MachineState) -> Result<u64> {
    Ok(state.regs.read("ptr")?)
}
