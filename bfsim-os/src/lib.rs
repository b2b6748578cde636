//! bfsim-os
//!
//! The BF execution environment ("OS personality"): the memory layout a
//! program sees (separate code and data spaces, data pointer parked at the
//! midpoint of the address space), the two byte-I/O syscalls, and the
//! calling-convention binding that lets the generic dispatcher find the
//! syscall number in the pointer register.
//!
//! The instruction interpreter itself is out of scope; this crate only
//! defines the environment the interpreter's programs run in.

pub mod arch;
pub mod cc;
pub mod os;
pub mod syscalls;

pub use cc::BfSyscallCc;
pub use os::BfOs;
pub use syscalls::{syscall_library, ReadByteToPtr, WriteByteAtPtr};

use bfsim_core::{Engine, UnknownCc};

/// Wire this environment into an engine: the personality under `"bf"`, the
/// `"brainfuck"` syscall library, the syscall convention for arch `"BF"`,
/// and the unknown default call/return convention (BF has no subroutines).
pub fn register(engine: &mut Engine) {
    engine.register_os(BfOs::new());
    engine.register_syscall_library(syscall_library());
    engine.register_syscall_cc("default", BfSyscallCc);
    engine.register_default_cc(UnknownCc::new(arch::BF_ARCH.name));
}
