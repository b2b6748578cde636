use std::collections::HashMap;

use anyhow::Result;
use thiserror::Error;
use tracing::trace;

use crate::cc::CallingConvention;
use crate::state::MachineState;

/// One syscall body.
///
/// Procedures return no value to the program; anything they produce goes
/// through the machine state or its streams. Stream and memory failures
/// propagate unchanged — there is no local recovery or retry.
pub trait SimProcedure: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, state: &mut MachineState) -> Result<()>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no syscall {number} in library {library} for arch {arch}")]
    UnknownSyscall {
        library: &'static str,
        arch: &'static str,
        number: u64,
    },
}

/// A named syscall library: procedures by name plus per-arch number
/// mappings.
///
/// The name doubles as a namespace so several architectures' libraries can
/// live in one engine without colliding. A personality builds its library
/// once, hands it to the engine registry, and nothing registers into it
/// afterwards.
pub struct SyscallLibrary {
    name: &'static str,
    procedures: HashMap<&'static str, Box<dyn SimProcedure>>,
    numbers: HashMap<&'static str, HashMap<u64, &'static str>>,
}

impl SyscallLibrary {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            procedures: HashMap::new(),
            numbers: HashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn add_procedure(&mut self, procedure: impl SimProcedure + 'static) {
        self.procedures.insert(procedure.name(), Box::new(procedure));
    }

    /// Bind `number` to the named procedure for one arch tag.
    pub fn map_number(&mut self, arch: &'static str, number: u64, name: &'static str) {
        self.numbers.entry(arch).or_default().insert(number, name);
    }

    pub fn procedure(&self, name: &str) -> Option<&dyn SimProcedure> {
        self.procedures.get(name).map(|p| p.as_ref())
    }

    pub fn resolve(&self, arch: &str, number: u64) -> Option<&dyn SimProcedure> {
        let name = self.numbers.get(arch)?.get(&number)?;
        self.procedure(name)
    }
}

/// Generic syscall dispatch.
///
/// The number is extracted through the calling convention *before* the body
/// runs; the body then sees the same, untouched state. Numbers with no
/// mapping surface as [`DispatchError::UnknownSyscall`].
pub fn dispatch_syscall(
    library: &SyscallLibrary,
    cc: &dyn CallingConvention,
    state: &mut MachineState,
) -> Result<()> {
    let number = cc.syscall_number(state)?;
    let procedure =
        library
            .resolve(cc.arch(), number)
            .ok_or(DispatchError::UnknownSyscall {
                library: library.name,
                arch: cc.arch(),
                number,
            })?;
    trace!(
        library = library.name,
        arch = cc.arch(),
        number,
        name = procedure.name(),
        "dispatching syscall"
    );
    procedure.run(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::ArchInfo;
    use crate::state::{MachineState, StateOptions};
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    const TEST_ARCH: ArchInfo = ArchInfo {
        name: "TEST",
        bits: 64,
        registers: &["r0", "r1"],
    };

    struct SetMarker;

    impl SimProcedure for SetMarker {
        fn name(&self) -> &'static str {
            "set_marker"
        }

        fn run(&self, state: &mut MachineState) -> Result<()> {
            state.regs.write("r1", 0xaa)?;
            Ok(())
        }
    }

    struct R0Cc;

    impl CallingConvention for R0Cc {
        fn arch(&self) -> &'static str {
            "TEST"
        }

        fn arg_registers(&self) -> &'static [&'static str] {
            &["r0"]
        }

        fn syscall_number(&self, state: &MachineState) -> Result<u64> {
            Ok(state.regs.read("r0")?)
        }

        fn matches(&self, _arch: &ArchInfo) -> bool {
            false
        }
    }

    #[test]
    fn dispatch_resolves_the_number_through_the_cc() -> Result<()> {
        let mut lib = SyscallLibrary::new("testlib");
        lib.add_procedure(SetMarker);
        lib.map_number("TEST", 3, "set_marker");

        let mut state = MachineState::base(&TEST_ARCH, &StateOptions::default());
        state.regs.write("r0", 3)?;
        dispatch_syscall(&lib, &R0Cc, &mut state)?;
        assert_eq!(state.regs.read("r1")?, 0xaa);
        Ok(())
    }

    #[test]
    fn unknown_numbers_surface_as_dispatch_errors() {
        let lib = SyscallLibrary::new("testlib");
        let mut state = MachineState::base(&TEST_ARCH, &StateOptions::default());
        let err = dispatch_syscall(&lib, &R0Cc, &mut state).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DispatchError>(),
            Some(&DispatchError::UnknownSyscall {
                library: "testlib",
                arch: "TEST",
                number: 0,
            })
        );
    }

    #[test]
    fn number_mappings_are_per_arch() {
        let mut lib = SyscallLibrary::new("testlib");
        lib.add_procedure(SetMarker);
        lib.map_number("TEST", 0, "set_marker");
        assert!(lib.resolve("TEST", 0).is_some());
        assert!(lib.resolve("OTHER", 0).is_none());
        assert!(lib.resolve("TEST", 1).is_none());
    }
}
