use anyhow::Result;

use bfsim_core::{ArchInfo, CallingConvention, MachineState};

use crate::arch::{pending_syscall, BF_ARCH};

/// Syscall calling convention for BF.
///
/// The architecture has no argument registers: the pointer register itself
/// carries the syscall number at dispatch time, and each syscall body then
/// re-reads the same register as the data address for its one-byte transfer.
/// Applies to syscall dispatch only — BF has no call/return sequences, so
/// the arch's default convention is `bfsim_core::UnknownCc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BfSyscallCc;

impl CallingConvention for BfSyscallCc {
    fn arch(&self) -> &'static str {
        BF_ARCH.name
    }

    fn arg_registers(&self) -> &'static [&'static str] {
        &["ptr"]
    }

    fn syscall_number(&self, state: &MachineState) -> Result<u64> {
        pending_syscall(state)
    }

    /// Never picked up by signature matching; reachable only through
    /// explicit syscall-cc registration.
    fn matches(&self, _arch: &ArchInfo) -> bool {
        false
    }
}
