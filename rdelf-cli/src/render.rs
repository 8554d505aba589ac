use colored::Colorize;
use rdelf_core::{ElfHeader, ProgramHeader, SectionHeader};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// What was selected on the command line.
pub struct Report<'a> {
    pub file: &'a str,
    pub header: Option<&'a ElfHeader>,
    pub program_headers: Option<&'a [ProgramHeader]>,
    pub section_headers: Option<&'a [SectionHeader]>,
}

fn magic_string(h: &ElfHeader) -> String {
    h.ident
        .magic
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn header_fields(h: &ElfHeader) -> Vec<(&'static str, String)> {
    vec![
        ("Magic", magic_string(h)),
        ("Class", h.ident.class.display_name().to_string()),
        ("Data", h.ident.data.display_name().to_string()),
        ("Version", format!("{:x}", h.ident.version)),
        ("Type", h.e_type.display_name().to_string()),
        ("Machine", h.e_machine.display_name().to_string()),
        ("EntryPoint", format!("{:#x}", h.e_entry)),
        ("Start of Program headers", format!("{} (bytes)", h.e_phoff)),
        ("Start of Section headers", format!("{} (bytes)", h.e_shoff)),
        ("Size of Program headers", format!("{} (bytes)", h.e_phentsize)),
        ("Number of Program headers", h.e_phnum.to_string()),
        ("Size of Section headers", format!("{} (bytes)", h.e_shentsize)),
        ("Number of Section headers", h.e_shnum.to_string()),
        ("Section header string table index", h.e_shstrndx.to_string()),
    ]
}

fn push_line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{} {}\n", format!("{label}:").bold(), value));
}

pub fn text(report: &Report) -> String {
    let mut out = String::new();

    if let Some(h) = report.header {
        push_line(&mut out, "File", report.file);
        for (label, value) in header_fields(h) {
            push_line(&mut out, label, &value);
        }
        out.push('\n');
    }

    for (i, ph) in report.program_headers.unwrap_or_default().iter().enumerate() {
        out.push_str(&format!("{}\n", format!("Program Headers[{i}]:").cyan()));
        push_line(&mut out, "Type", ph.p_type.display_name());
        push_line(&mut out, "Flags", &ph.p_flags.to_string());
        push_line(&mut out, "Offset", &format!("{:#x}", ph.p_offset));
        push_line(&mut out, "VirtAddr", &format!("{:#x}", ph.p_vaddr));
        push_line(&mut out, "PhysAddr", &format!("{:#x}", ph.p_paddr));
        push_line(&mut out, "FileSize", &format!("{:#x}", ph.p_filesz));
        push_line(&mut out, "MemSize", &format!("{:#x}", ph.p_memsz));
        out.push('\n');
    }

    for (i, sh) in report.section_headers.unwrap_or_default().iter().enumerate() {
        out.push_str(&format!("{}\n", format!("Section Headers[{i}]:").cyan()));
        push_line(&mut out, "Name", &sh.name);
        push_line(&mut out, "Type", sh.sh_type.display_name());
        push_line(&mut out, "Flags", &sh.sh_flags.to_string());
        push_line(&mut out, "Address", &format!("{:#x}", sh.sh_addr));
        push_line(&mut out, "Offset", &format!("{:#x}", sh.sh_offset));
        push_line(&mut out, "Size", &format!("{:#x}", sh.sh_size));
        push_line(&mut out, "Link", &sh.sh_link.to_string());
        push_line(&mut out, "Info", &sh.sh_info.to_string());
        push_line(&mut out, "Alignment", &format!("{:#x}", sh.sh_addralign));
        push_line(&mut out, "Entry Size", &format!("{:#x}", sh.sh_entsize));
        out.push('\n');
    }

    out
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "Nr")]
    index: usize,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "VirtAddr")]
    vaddr: String,
    #[tabled(rename = "PhysAddr")]
    paddr: String,
    #[tabled(rename = "FileSize")]
    filesz: String,
    #[tabled(rename = "MemSize")]
    memsz: String,
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Nr")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Address")]
    addr: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Link")]
    link: u32,
    #[tabled(rename = "Info")]
    info: u32,
    #[tabled(rename = "Align")]
    align: u64,
    #[tabled(rename = "EntSize")]
    entsize: String,
}

pub fn table(report: &Report) -> String {
    let mut out = String::new();

    if let Some(h) = report.header {
        let rows = std::iter::once(("File", report.file.to_string()))
            .chain(header_fields(h))
            .map(|(name, value)| FieldRow { name, value });
        out.push_str(&Table::new(rows).with(Style::modern()).to_string());
        out.push('\n');
    }

    if let Some(phdrs) = report.program_headers {
        let rows = phdrs.iter().enumerate().map(|(index, ph)| SegmentRow {
            index,
            kind: ph.p_type.display_name(),
            flags: ph.p_flags.to_string(),
            offset: format!("{:#x}", ph.p_offset),
            vaddr: format!("{:#018x}", ph.p_vaddr),
            paddr: format!("{:#018x}", ph.p_paddr),
            filesz: format!("{:#x}", ph.p_filesz),
            memsz: format!("{:#x}", ph.p_memsz),
        });
        out.push_str(&Table::new(rows).with(Style::modern()).to_string());
        out.push('\n');
    }

    if let Some(shdrs) = report.section_headers {
        let rows = shdrs.iter().enumerate().map(|(index, sh)| SectionRow {
            index,
            name: sh.name.clone(),
            kind: sh.sh_type.display_name(),
            flags: sh.sh_flags.to_string(),
            addr: format!("{:#018x}", sh.sh_addr),
            offset: format!("{:#x}", sh.sh_offset),
            size: format!("{:#x}", sh.sh_size),
            link: sh.sh_link,
            info: sh.sh_info,
            align: sh.sh_addralign,
            entsize: format!("{:#x}", sh.sh_entsize),
        });
        out.push_str(&Table::new(rows).with(Style::modern()).to_string());
        out.push('\n');
    }

    out
}

#[derive(Serialize)]
struct HeaderJson {
    magic: String,
    class: &'static str,
    data: &'static str,
    version: u8,
    #[serde(rename = "type")]
    kind: &'static str,
    machine: &'static str,
    entry_point: u64,
    program_header_offset: u64,
    section_header_offset: u64,
    program_header_size: u16,
    program_header_count: u16,
    section_header_size: u16,
    section_header_count: u16,
    string_table_index: u16,
}

#[derive(Serialize)]
struct SegmentJson {
    #[serde(rename = "type")]
    kind: &'static str,
    flags: String,
    readable: bool,
    writable: bool,
    executable: bool,
    offset: u64,
    virtual_address: u64,
    physical_address: u64,
    file_size: u64,
    memory_size: u64,
}

#[derive(Serialize)]
struct SectionJson {
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    flags: String,
    address: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    alignment: u64,
    entry_size: u64,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<HeaderJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    program_headers: Option<Vec<SegmentJson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section_headers: Option<Vec<SectionJson>>,
}

pub fn json(report: &Report) -> anyhow::Result<String> {
    let doc = ReportJson {
        file: report.file,
        header: report.header.map(|h| HeaderJson {
            magic: magic_string(h),
            class: h.ident.class.display_name(),
            data: h.ident.data.display_name(),
            version: h.ident.version,
            kind: h.e_type.display_name(),
            machine: h.e_machine.display_name(),
            entry_point: h.e_entry,
            program_header_offset: h.e_phoff,
            section_header_offset: h.e_shoff,
            program_header_size: h.e_phentsize,
            program_header_count: h.e_phnum,
            section_header_size: h.e_shentsize,
            section_header_count: h.e_shnum,
            string_table_index: h.e_shstrndx,
        }),
        program_headers: report.program_headers.map(|phdrs| {
            phdrs
                .iter()
                .map(|ph| SegmentJson {
                    kind: ph.p_type.display_name(),
                    flags: ph.p_flags.to_string(),
                    readable: ph.p_flags.readable(),
                    writable: ph.p_flags.writable(),
                    executable: ph.p_flags.executable(),
                    offset: ph.p_offset,
                    virtual_address: ph.p_vaddr,
                    physical_address: ph.p_paddr,
                    file_size: ph.p_filesz,
                    memory_size: ph.p_memsz,
                })
                .collect()
        }),
        section_headers: report.section_headers.map(|shdrs| {
            shdrs
                .iter()
                .map(|sh| SectionJson {
                    name: sh.name.clone(),
                    kind: sh.sh_type.display_name(),
                    flags: sh.sh_flags.to_string(),
                    address: sh.sh_addr,
                    offset: sh.sh_offset,
                    size: sh.sh_size,
                    link: sh.sh_link,
                    info: sh.sh_info,
                    alignment: sh.sh_addralign,
                    entry_size: sh.sh_entsize,
                })
                .collect()
        }),
    };

    let mut s = serde_json::to_string_pretty(&doc)?;
    s.push('\n');
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ElfHeader {
        let mut bytes = vec![0u8; ElfHeader::SIZE];
        bytes[..7].copy_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1]);
        bytes[16] = 2; // ET_EXEC
        bytes[18] = 62; // EM_X86_64
        bytes[24..32].copy_from_slice(&0x401000u64.to_le_bytes());
        ElfHeader::parse(&bytes).unwrap()
    }

    #[test]
    fn text_header_lines() {
        colored::control::set_override(false);
        let h = header();
        let out = text(&Report {
            file: "a.out",
            header: Some(&h),
            program_headers: None,
            section_headers: None,
        });

        assert!(out.starts_with("File: a.out\nMagic: 7f 45 4c 46 02 01 01 00"));
        assert!(out.contains("Class: ELF64\n"));
        assert!(out.contains("Data: little endian\n"));
        assert!(out.contains("Type: An executable file\n"));
        assert!(out.contains("Machine: AMD x86-64\n"));
        assert!(out.contains("EntryPoint: 0x401000\n"));
        assert!(!out.contains("Program Headers"));
    }

    #[test]
    fn json_omits_unselected_parts() {
        let h = header();
        let out = json(&Report {
            file: "a.out",
            header: Some(&h),
            program_headers: None,
            section_headers: Some(&[]),
        })
        .unwrap();

        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["file"], "a.out");
        assert_eq!(v["header"]["machine"], "AMD x86-64");
        assert_eq!(v["header"]["entry_point"], 0x401000);
        assert!(v.get("program_headers").is_none());
        assert_eq!(v["section_headers"].as_array().unwrap().len(), 0);
    }
}
