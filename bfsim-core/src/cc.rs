use anyhow::{bail, Result};

use crate::arch::ArchInfo;
use crate::state::MachineState;

/// How the generic dispatcher extracts a syscall number and arguments for
/// one architecture.
pub trait CallingConvention: Send + Sync {
    /// Arch tag this convention applies to.
    fn arch(&self) -> &'static str;

    /// Registers carrying syscall arguments, in order.
    fn arg_registers(&self) -> &'static [&'static str];

    /// The syscall number, read from the state at dispatch time — before the
    /// syscall body runs.
    fn syscall_number(&self, state: &MachineState) -> Result<u64>;

    /// Whether generic signature-matching heuristics may select this
    /// convention. Syscall-only conventions return false.
    fn matches(&self, arch: &ArchInfo) -> bool;
}

/// The "no known convention" placeholder, registered as the default
/// call/return convention for architectures without a subroutine concept.
#[derive(Debug, Clone, Copy)]
pub struct UnknownCc {
    arch: &'static str,
}

impl UnknownCc {
    pub fn new(arch: &'static str) -> Self {
        Self { arch }
    }
}

impl CallingConvention for UnknownCc {
    fn arch(&self) -> &'static str {
        self.arch
    }

    fn arg_registers(&self) -> &'static [&'static str] {
        &[]
    }

    fn syscall_number(&self, _state: &MachineState) -> Result<u64> {
        bail!("no calling convention known for arch {}", self.arch)
    }

    fn matches(&self, _arch: &ArchInfo) -> bool {
        false
    }
}
