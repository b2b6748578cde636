use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::arch::ArchInfo;
use crate::cc::CallingConvention;
use crate::state::{MachineState, StateOptions};
use crate::syscall::{dispatch_syscall, SyscallLibrary};

/// An OS personality: the execution environment one guest architecture's
/// programs run in — memory layout, syscalls, conventions.
pub trait OsPersonality: Send + Sync {
    /// Name this personality registers under.
    fn name(&self) -> &'static str;

    fn arch(&self) -> &ArchInfo;

    /// Name of the syscall library this personality dispatches through.
    fn syscall_library(&self) -> &'static str;

    /// Build a blank, ready-to-run machine state. Each call yields an
    /// independent state; construction failures leave nothing behind.
    fn state_blank(&self, opts: &StateOptions) -> Result<MachineState>;

    /// Build an entry state. Kept separate from [`Self::state_blank`] as an
    /// extension point for entry-point-specific setup.
    fn state_entry(&self, opts: &StateOptions) -> Result<MachineState>;
}

/// The host engine's registries: personalities, syscall libraries and
/// calling conventions.
///
/// A plain value, not a global — setup code wires personalities in with
/// explicit `register_*` calls before interpretation starts, and everything
/// is reachable for inspection in tests.
#[derive(Default)]
pub struct Engine {
    oses: HashMap<&'static str, Arc<dyn OsPersonality>>,
    libraries: HashMap<&'static str, SyscallLibrary>,
    // arch tag -> variant ("default", ...) -> convention
    syscall_ccs: HashMap<&'static str, HashMap<&'static str, Arc<dyn CallingConvention>>>,
    default_ccs: HashMap<&'static str, Arc<dyn CallingConvention>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_os(&mut self, os: impl OsPersonality + 'static) {
        debug!(name = os.name(), "registered OS personality");
        self.oses.insert(os.name(), Arc::new(os));
    }

    pub fn register_syscall_library(&mut self, library: SyscallLibrary) {
        debug!(name = library.name(), "registered syscall library");
        self.libraries.insert(library.name(), library);
    }

    /// Register `cc` as the syscall convention for its arch under the given
    /// variant key (usually "default").
    pub fn register_syscall_cc(
        &mut self,
        variant: &'static str,
        cc: impl CallingConvention + 'static,
    ) {
        self.syscall_ccs
            .entry(cc.arch())
            .or_default()
            .insert(variant, Arc::new(cc));
    }

    /// Register the default call/return convention for an arch.
    pub fn register_default_cc(&mut self, cc: impl CallingConvention + 'static) {
        self.default_ccs.insert(cc.arch(), Arc::new(cc));
    }

    pub fn os(&self, name: &str) -> Option<&dyn OsPersonality> {
        self.oses.get(name).map(|os| &**os)
    }

    pub fn syscall_library(&self, name: &str) -> Option<&SyscallLibrary> {
        self.libraries.get(name)
    }

    pub fn syscall_cc(&self, arch: &str, variant: &str) -> Option<&dyn CallingConvention> {
        self.syscall_ccs.get(arch)?.get(variant).map(|cc| &**cc)
    }

    pub fn default_cc(&self, arch: &str) -> Option<&dyn CallingConvention> {
        self.default_ccs.get(arch).map(|cc| &**cc)
    }

    /// Dispatch the syscall pending in `state` under the named personality:
    /// resolve its library and its arch's "default" syscall convention, then
    /// run the generic dispatcher.
    pub fn dispatch_syscall(&self, os_name: &str, state: &mut MachineState) -> Result<()> {
        let os = self
            .os(os_name)
            .ok_or_else(|| anyhow!("unknown OS personality: {os_name}"))?;
        let library = self.syscall_library(os.syscall_library()).ok_or_else(|| {
            anyhow!(
                "OS personality {os_name} names unregistered syscall library {}",
                os.syscall_library()
            )
        })?;
        let cc = self
            .syscall_cc(os.arch().name, "default")
            .ok_or_else(|| anyhow!("no syscall convention for arch {}", os.arch().name))?;
        dispatch_syscall(library, cc, state)
    }
}
