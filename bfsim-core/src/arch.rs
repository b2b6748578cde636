/// Static description of a guest architecture: its tag string, word size and
/// named register file.
///
/// The tag is what calling conventions and syscall number mappings key on,
/// so several architectures can coexist in one [`crate::Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchInfo {
    pub name: &'static str,
    pub bits: u32,
    pub registers: &'static [&'static str],
}

impl ArchInfo {
    pub fn has_register(&self, name: &str) -> bool {
        self.registers.contains(&name)
    }
}
