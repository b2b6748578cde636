use anyhow::Result;

use bfsim_core::{MachineState, SimProcedure, SyscallLibrary, STDIN_FD, STDOUT_FD};

use crate::arch::{data_ptr, BF_ARCH, SYSCALL_LIBRARY_NAME, SYS_READ_BYTE, SYS_WRITE_BYTE};

/// Syscall 1, the `.` instruction: emit the data cell under the pointer to
/// standard output. Registers are untouched; nothing is returned to the
/// program.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteByteAtPtr;

impl SimProcedure for WriteByteAtPtr {
    fn name(&self) -> &'static str {
        "write_byte_at_ptr"
    }

    fn run(&self, state: &mut MachineState) -> Result<()> {
        let addr = data_ptr(state)?;
        let byte = state.memory.load_byte(addr)?;
        state.posix.write(STDOUT_FD, &[byte])?;
        Ok(())
    }
}

/// Syscall 0, the `,` instruction: read one byte from standard input into
/// the data cell under the pointer.
///
/// The architecture leaves end-of-input unspecified; on exhausted input the
/// stream model stores its documented fill byte
/// ([`bfsim_core::EOF_FILL_BYTE`]) and this procedure does not special-case
/// it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadByteToPtr;

impl SimProcedure for ReadByteToPtr {
    fn name(&self) -> &'static str {
        "read_byte_to_ptr"
    }

    fn run(&self, state: &mut MachineState) -> Result<()> {
        let addr = data_ptr(state)?;
        let bytes = state.posix.read(STDIN_FD, 1)?;
        state.memory.store_byte(addr, bytes[0])?;
        Ok(())
    }
}

/// The `"brainfuck"` syscall library: exactly the two byte-I/O procedures,
/// numbered 0 and 1 for the BF arch. Built once and handed to the engine
/// registry; nothing registers into it afterwards.
pub fn syscall_library() -> SyscallLibrary {
    let mut lib = SyscallLibrary::new(SYSCALL_LIBRARY_NAME);
    lib.add_procedure(ReadByteToPtr);
    lib.add_procedure(WriteByteAtPtr);
    lib.map_number(BF_ARCH.name, SYS_READ_BYTE, "read_byte_to_ptr");
    lib.map_number(BF_ARCH.name, SYS_WRITE_BYTE, "write_byte_at_ptr");
    lib
}
