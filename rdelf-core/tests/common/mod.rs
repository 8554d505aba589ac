#![allow(dead_code)]

use byteorder::{WriteBytesExt, BE, LE};

pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

#[derive(Debug, Clone, Default)]
pub struct Phdr {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

/// Field writer honouring the same byte-order rule as the decoder.
struct Out {
    buf: Vec<u8>,
    little: bool,
}

impl Out {
    fn u16(&mut self, v: u16) {
        if self.little {
            self.buf.write_u16::<LE>(v).unwrap()
        } else {
            self.buf.write_u16::<BE>(v).unwrap()
        }
    }

    fn u32(&mut self, v: u32) {
        if self.little {
            self.buf.write_u32::<LE>(v).unwrap()
        } else {
            self.buf.write_u32::<BE>(v).unwrap()
        }
    }

    fn u64(&mut self, v: u64) {
        if self.little {
            self.buf.write_u64::<LE>(v).unwrap()
        } else {
            self.buf.write_u64::<BE>(v).unwrap()
        }
    }

    fn pad_to(&mut self, len: usize) {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
    }
}

/// Builds a synthetic ELF64 image.
///
/// Layout: header, program headers at 64, the optional string table blob, then
/// the section headers aligned to 8.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    pub class: u8,
    pub data: u8,
    pub version: u8,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_entry: u64,
    pub e_flags: u32,
    pub phentsize: u16,
    pub shentsize: u16,
    pub shstrndx: u16,
    pub phdrs: Vec<Phdr>,
    pub shdrs: Vec<Shdr>,
    /// Placed in the file and pointed to by section `shstrndx`.
    pub strtab: Option<Vec<u8>>,
}

impl ImageBuilder {
    pub fn new(data: u8) -> Self {
        ImageBuilder {
            class: 2,
            data,
            version: 1,
            e_type: 2,
            e_machine: 62,
            e_entry: 0x401000,
            e_flags: 0,
            phentsize: 56,
            shentsize: 64,
            shstrndx: 0,
            phdrs: Vec::new(),
            shdrs: Vec::new(),
            strtab: None,
        }
    }

    pub fn phoff(&self) -> u64 {
        if self.phdrs.is_empty() {
            0
        } else {
            64
        }
    }

    fn strtab_offset(&self) -> usize {
        64 + self.phdrs.len() * usize::from(self.phentsize)
    }

    pub fn shoff(&self) -> u64 {
        if self.shdrs.is_empty() {
            return 0;
        }
        let end = self.strtab_offset() + self.strtab.as_ref().map_or(0, |t| t.len());
        ((end + 7) & !7) as u64
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Out {
            buf: Vec::new(),
            little: self.data == 1,
        };

        out.buf.extend_from_slice(&ELF_MAGIC);
        out.buf.extend_from_slice(&[self.class, self.data, self.version]);
        out.pad_to(16);

        out.u16(self.e_type);
        out.u16(self.e_machine);
        out.u32(1);
        out.u64(self.e_entry);
        out.u64(self.phoff());
        out.u64(self.shoff());
        out.u32(self.e_flags);
        out.u16(64);
        out.u16(self.phentsize);
        out.u16(self.phdrs.len() as u16);
        out.u16(self.shentsize);
        out.u16(self.shdrs.len() as u16);
        out.u16(self.shstrndx);

        for (i, ph) in self.phdrs.iter().enumerate() {
            out.pad_to(64 + i * usize::from(self.phentsize));
            out.u32(ph.p_type);
            out.u32(ph.p_flags);
            out.u64(ph.p_offset);
            out.u64(ph.p_vaddr);
            out.u64(ph.p_paddr);
            out.u64(ph.p_filesz);
            out.u64(ph.p_memsz);
            out.u64(ph.p_align);
        }
        out.pad_to(self.strtab_offset());

        let strtab_offset = out.buf.len() as u64;
        if let Some(strtab) = &self.strtab {
            out.buf.extend_from_slice(strtab);
        }

        let shoff = self.shoff() as usize;
        for (i, sh) in self.shdrs.iter().enumerate() {
            let mut sh = sh.clone();
            if let Some(strtab) = &self.strtab {
                if i == usize::from(self.shstrndx) {
                    sh.sh_offset = strtab_offset;
                    sh.sh_size = strtab.len() as u64;
                }
            }
            out.pad_to(shoff + i * usize::from(self.shentsize));
            out.u32(sh.sh_name);
            out.u32(sh.sh_type);
            out.u64(sh.sh_flags);
            out.u64(sh.sh_addr);
            out.u64(sh.sh_offset);
            out.u64(sh.sh_size);
            out.u32(sh.sh_link);
            out.u32(sh.sh_info);
            out.u64(sh.sh_addralign);
            out.u64(sh.sh_entsize);
        }
        if !self.shdrs.is_empty() {
            out.pad_to(shoff + self.shdrs.len() * usize::from(self.shentsize));
        }

        out.buf
    }
}

/// A small executable: three segments and five named sections.
pub fn sample_executable(data: u8) -> ImageBuilder {
    let mut b = ImageBuilder::new(data);
    b.phdrs = vec![
        Phdr {
            p_type: 6,
            p_flags: 4,
            p_offset: 64,
            p_vaddr: 0x400040,
            p_paddr: 0x400040,
            p_filesz: 168,
            p_memsz: 168,
            p_align: 8,
        },
        Phdr {
            p_type: 1,
            p_flags: 5,
            p_offset: 0,
            p_vaddr: 0x400000,
            p_paddr: 0x400000,
            p_filesz: 0x1000,
            p_memsz: 0x1000,
            p_align: 0x1000,
        },
        Phdr {
            p_type: 0x6474_e551,
            p_flags: 6,
            p_align: 16,
            ..Phdr::default()
        },
    ];

    b.strtab = Some(b"\0.text\0.data\0.bss\0.shstrtab\0".to_vec());
    b.shstrndx = 4;
    b.shdrs = vec![
        Shdr::default(),
        Shdr {
            sh_name: 1,
            sh_type: 1,
            sh_flags: 0x6,
            sh_addr: 0x401000,
            sh_offset: 0x1000,
            sh_size: 0x20,
            sh_addralign: 16,
            ..Shdr::default()
        },
        Shdr {
            sh_name: 7,
            sh_type: 1,
            sh_flags: 0x5,
            sh_addr: 0x402000,
            sh_offset: 0x2000,
            sh_size: 0x10,
            sh_addralign: 8,
            ..Shdr::default()
        },
        Shdr {
            sh_name: 13,
            sh_type: 8,
            sh_flags: 0x3,
            sh_addr: 0x403000,
            sh_size: 0x100,
            sh_addralign: 32,
            ..Shdr::default()
        },
        Shdr {
            sh_name: 18,
            sh_type: 3,
            sh_addralign: 1,
            ..Shdr::default()
        },
    ];
    b
}
