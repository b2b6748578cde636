use std::collections::BTreeMap;

use thiserror::Error;

use crate::arch::ArchInfo;
use crate::memory::MemoryMap;
use crate::posix::Posix;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown register: {0}")]
    UnknownRegister(String),
}

/// Word-sized named registers, all zero at creation.
///
/// One storage word per name. If a personality documents several views over
/// a register (say, a pointer that doubles as a syscall selector), those are
/// accessors over the same word here, never extra entries.
#[derive(Debug, Clone, Default)]
pub struct Registers {
    values: BTreeMap<&'static str, u64>,
}

impl Registers {
    pub fn for_arch(arch: &ArchInfo) -> Self {
        Self {
            values: arch.registers.iter().map(|&name| (name, 0)).collect(),
        }
    }

    pub fn read(&self, name: &str) -> Result<u64, StateError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| StateError::UnknownRegister(name.to_owned()))
    }

    pub fn write(&mut self, name: &str, value: u64) -> Result<(), StateError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StateError::UnknownRegister(name.to_owned())),
        }
    }
}

/// Base-state configuration forwarded through an OS personality's
/// constructors. Fields default to `None`; each personality applies its own
/// defaults for the ones it understands.
#[derive(Debug, Clone, Default)]
pub struct StateOptions {
    /// Size of the personality's data region, in bytes.
    pub data_region_size: Option<u64>,
    /// Bytes pre-seeded on standard input.
    pub stdin: Option<Vec<u8>>,
}

/// The mutable execution context for one interpreted program instance.
///
/// A host engine forks paths by cloning: each clone owns independent
/// registers, memory and streams, and no coordination happens between forks.
#[derive(Debug, Clone)]
pub struct MachineState {
    pub regs: Registers,
    pub memory: MemoryMap,
    pub posix: Posix,
}

impl MachineState {
    /// The generic blank-state constructor. OS personalities layer region
    /// mapping and register setup on top of this.
    pub fn base(arch: &ArchInfo, opts: &StateOptions) -> Self {
        let mut posix = Posix::new();
        if let Some(stdin) = &opts.stdin {
            posix.feed_stdin(stdin);
        }
        Self {
            regs: Registers::for_arch(arch),
            memory: MemoryMap::new(),
            posix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARCH: ArchInfo = ArchInfo {
        name: "TEST",
        bits: 64,
        registers: &["a", "b"],
    };

    #[test]
    fn registers_start_zeroed() {
        let state = MachineState::base(&ARCH, &StateOptions::default());
        assert_eq!(state.regs.read("a").unwrap(), 0);
        assert_eq!(state.regs.read("b").unwrap(), 0);
    }

    #[test]
    fn unknown_registers_are_errors() {
        let mut state = MachineState::base(&ARCH, &StateOptions::default());
        assert!(state.regs.read("c").is_err());
        assert_eq!(
            state.regs.write("c", 1),
            Err(StateError::UnknownRegister("c".to_owned()))
        );
    }

    #[test]
    fn options_seed_stdin() {
        let opts = StateOptions {
            stdin: Some(b"in".to_vec()),
            ..Default::default()
        };
        let mut state = MachineState::base(&ARCH, &opts);
        assert_eq!(state.posix.read(crate::posix::STDIN_FD, 2).unwrap(), b"in");
    }

    #[test]
    fn forks_are_independent() {
        let mut a = MachineState::base(&ARCH, &StateOptions::default());
        let b = a.clone();
        a.regs.write("a", 7).unwrap();
        a.posix.feed_stdin(b"z");
        assert_eq!(b.regs.read("a").unwrap(), 0);
        assert_eq!(b.posix.stdin_remaining(), 0);
    }
}
