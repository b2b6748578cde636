use anyhow::Result;
use tracing::debug;

use bfsim_core::{ArchInfo, MachineState, OsPersonality, Perms, RegionInit, StateOptions};

use crate::arch::{BF_ARCH, DEFAULT_DATA_REGION_SIZE, OS_NAME, PTR_START, SYSCALL_LIBRARY_NAME};

/// The BF environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct BfOs;

impl BfOs {
    pub fn new() -> Self {
        Self
    }
}

impl OsPersonality for BfOs {
    fn name(&self) -> &'static str {
        OS_NAME
    }

    fn arch(&self) -> &ArchInfo {
        &BF_ARCH
    }

    fn syscall_library(&self) -> &'static str {
        SYSCALL_LIBRARY_NAME
    }

    /// Blank state: zeroed registers, `ptr` at [`PTR_START`], and a
    /// zero-filled read-write data region of `data_region_size` bytes
    /// (default [`DEFAULT_DATA_REGION_SIZE`]) mapped there. Size and overlap
    /// validation live in the mapping primitive; a failure aborts
    /// construction with no partial state.
    fn state_blank(&self, opts: &StateOptions) -> Result<MachineState> {
        let size = opts.data_region_size.unwrap_or(DEFAULT_DATA_REGION_SIZE);
        let mut state = MachineState::base(&BF_ARCH, opts);
        state.regs.write("ptr", PTR_START)?;
        state
            .memory
            .map_region(PTR_START, size, Perms::rw(), RegionInit::Zero)?;
        debug!(size, "built blank BF state");
        Ok(state)
    }

    /// Currently adds nothing over [`Self::state_blank`]; kept separate so
    /// entry-point-specific setup has somewhere to live.
    fn state_entry(&self, opts: &StateOptions) -> Result<MachineState> {
        self.state_blank(opts)
    }
}
