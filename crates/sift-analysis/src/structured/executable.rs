//! ELF executable import extraction
//!
//! Imports come from both symbol tables when present. Symbol names are
//! split on `::` into a library/function pair; unqualified names carry no
//! provenance and are skipped.

use elf::abi;
use elf::endian::AnyEndian;
use elf::string_table::StringTable;
use elf::symbol::SymbolTable;
use elf::ElfBytes;
use sift_report::{ImportGraph, MetadataEntry};
use tracing::warn;

use super::{ParseError, ParsedReport};

pub(crate) fn parse_elf(data: &[u8]) -> Result<ParsedReport, ParseError> {
    let file = ElfBytes::<AnyEndian>::minimal_parse(data).map_err(|e| ParseError::Malformed {
        format: "elf",
        message: e.to_string(),
    })?;

    let metadata = header_metadata(&file);

    let common = match file.find_common_data() {
        Ok(common) => common,
        Err(e) => {
            warn!(error = %e, "elf section tables unreadable, reporting header only");
            return Ok(ParsedReport {
                metadata,
                ..ParsedReport::default()
            });
        }
    };

    let mut imports = ImportGraph::new();
    if let (Some(syms), Some(strs)) = (common.dynsyms, common.dynsyms_strs) {
        collect_imports(&mut imports, &syms, &strs);
    }
    if let (Some(syms), Some(strs)) = (common.symtab, common.symtab_strs) {
        collect_imports(&mut imports, &syms, &strs);
    }

    Ok(ParsedReport {
        imports,
        metadata,
        ..ParsedReport::default()
    })
}

fn collect_imports(
    imports: &mut ImportGraph,
    symbols: &SymbolTable<AnyEndian>,
    strings: &StringTable,
) {
    for symbol in symbols.iter() {
        let Ok(name) = strings.get(symbol.st_name as usize) else {
            continue;
        };
        let parts: Vec<&str> = name.split("::").collect();
        if parts.len() < 2 {
            continue;
        }
        let library = parts[0];
        let function = parts[parts.len() - 1];
        if library.is_empty() || function.is_empty() {
            continue;
        }
        imports
            .entry(library.to_string())
            .or_default()
            .push(function.to_string());
    }
}

fn header_metadata(file: &ElfBytes<AnyEndian>) -> Vec<MetadataEntry> {
    let class = match file.ehdr.class {
        elf::file::Class::ELF32 => "32-bit",
        elf::file::Class::ELF64 => "64-bit",
    };
    let kind = match file.ehdr.e_type {
        abi::ET_REL => "Relocatable",
        abi::ET_EXEC => "Executable",
        abi::ET_DYN => "Shared object",
        abi::ET_CORE => "Core dump",
        _ => "Unknown",
    };
    let machine = match file.ehdr.e_machine {
        abi::EM_386 => "x86".to_string(),
        abi::EM_X86_64 => "x86-64".to_string(),
        abi::EM_ARM => "ARM".to_string(),
        abi::EM_AARCH64 => "AArch64".to_string(),
        abi::EM_RISCV => "RISC-V".to_string(),
        other => format!("machine {other}"),
    };

    vec![
        MetadataEntry::new("ELF Class", class),
        MetadataEntry::new("ELF Type", kind),
        MetadataEntry::new("Machine", machine),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal valid 64-bit little-endian ELF header with no sections.
    fn minimal_elf() -> Vec<u8> {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(&[0x7F, b'E', b'L', b'F']);
        data[4] = 2; // ELFCLASS64
        data[5] = 1; // little endian
        data[6] = 1; // EV_CURRENT
        data[16] = 2; // e_type = ET_EXEC
        data[18] = 0x3E; // e_machine = EM_X86_64
        data[20] = 1; // e_version
        data[52] = 64; // e_ehsize
        data
    }

    #[test]
    fn header_facts_become_metadata() {
        let report = parse_elf(&minimal_elf()).unwrap();
        let titles: Vec<&str> = report.metadata.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["ELF Class", "ELF Type", "Machine"]);
        assert_eq!(report.metadata[0].value, "64-bit");
        assert_eq!(report.metadata[1].value, "Executable");
        assert_eq!(report.metadata[2].value, "x86-64");
    }

    #[test]
    fn sectionless_binary_has_no_imports() {
        let report = parse_elf(&minimal_elf()).unwrap();
        assert!(report.imports.is_empty());
        assert!(report.items.is_empty());
    }

    #[test]
    fn truncated_bytes_are_malformed() {
        let err = parse_elf(&[0x7F, b'E', b'L']).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { format: "elf", .. }));
    }
}
