//! bfsim-core
//!
//! The host-engine model that OS personalities plug into: machine state
//! (registers, a sparse memory map, standard streams), named syscall
//! libraries with a generic dispatcher, the calling-convention seam, and the
//! explicit registries tying them together.
//!
//! This crate knows nothing about any particular guest architecture. A
//! personality crate (e.g. `bfsim-os`) supplies the arch descriptor, the
//! syscall bodies and the conventions, and wires them into an [`Engine`]
//! value with plain registration calls.

pub mod arch;
pub mod cc;
pub mod engine;
pub mod memory;
pub mod posix;
pub mod state;
pub mod syscall;

pub use arch::ArchInfo;
pub use cc::{CallingConvention, UnknownCc};
pub use engine::{Engine, OsPersonality};
pub use memory::{MemoryError, MemoryMap, Perms, RegionInit};
pub use posix::{Posix, StreamError, EOF_FILL_BYTE, STDIN_FD, STDOUT_FD};
pub use state::{MachineState, Registers, StateError, StateOptions};
pub use syscall::{dispatch_syscall, DispatchError, SimProcedure, SyscallLibrary};
