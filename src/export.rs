//! Bytecode as AssemblyScript source, ready to paste into a cartridge.
use itertools::Itertools;

const HEADER: &str = "// Generated music code. Click on \"Export to clipboard\" to copy it.";

/// `const music: usize = memory.data<u8>([ 0x.., ... ]);`, under a one line header
pub fn export(bytecode: &[u8]) -> String {
    let bytes = bytecode.iter().map(|b| format!("0x{b:02x}")).join(",");
    format!("{HEADER}\nconst music: usize = memory.data<u8>([ {bytes} ]);")
}

/// [export], preceded by a commented disassembly
pub fn export_with_listing(bytecode: &[u8]) -> String {
    vm::disasm::listing(bytecode)
        .lines()
        .map(|line| format!("// {line}"))
        .chain([export(bytecode)])
        .join("\n")
}
