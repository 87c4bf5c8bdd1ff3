//! The non-MMIO address space: BIOS, both work-RAM tiers, video memory,
//! and the cartridge. Everything here is plain storage with address-decode
//! and mirroring quirks; register side effects live in `mmio`.

use gba_dma::DmaBus;

use crate::cartridge::Cartridge;
use crate::video::VideoMemory;
use crate::wram::WorkRam;

const BIOS_SIZE: usize = 16 * 1024;

pub struct BusMemory {
    bios: Vec<u8>,
    wram: WorkRam,
    video: VideoMemory,
    cartridge: Cartridge,
}

impl BusMemory {
    #[must_use]
    pub fn new(bios: Vec<u8>, rom: Vec<u8>, save: Option<Vec<u8>>) -> Self {
        let mut padded_bios = bios;
        padded_bios.resize(BIOS_SIZE, 0);
        Self {
            bios: padded_bios,
            wram: WorkRam::new(),
            video: VideoMemory::new(),
            cartridge: Cartridge::new(rom, save),
        }
    }

    #[must_use]
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    /// Region byte (bits 27-24 of the address) for regions this module
    /// owns. `None` means the address belongs to MMIO or is unmapped.
    fn region(addr: u32) -> Option<u32> {
        match (addr >> 24) & 0xFF {
            r @ (0x00 | 0x01 | 0x02 | 0x03 | 0x05 | 0x06 | 0x07 | 0x08..=0x0D | 0x0E | 0x0F) => Some(r),
            _ => None,
        }
    }

    pub fn read_byte(&self, addr: u32) -> Option<u8> {
        let region = Self::region(addr)?;
        Some(match region {
            0x00 | 0x01 => self.bios[addr as usize % BIOS_SIZE],
            0x02 => self.wram.read_board_byte(addr),
            0x03 => self.wram.read_chip_byte(addr),
            0x05 => self.video.read_palette_byte(addr),
            0x06 => self.video.read_vram_byte(addr),
            0x07 => self.video.read_oam_byte(addr),
            0x08..=0x0D => self.cartridge.read_rom_byte(addr & 0x01FF_FFFF),
            _ => self.cartridge.read_sram_byte(addr),
        })
    }

    pub fn read_half(&self, addr: u32) -> Option<u16> {
        let region = Self::region(addr)?;
        Some(match region {
            0x06 => {
                let a = addr & !1;
                u16::from(self.video.read_vram_byte(a)) | (u16::from(self.video.read_vram_byte(a + 1)) << 8)
            }
            0x08..=0x0D => self.cartridge.read_rom_half(addr & 0x01FF_FFFF),
            _ => {
                let lo = self.read_byte(addr & !1)?;
                let hi = self.read_byte((addr & !1) + 1)?;
                u16::from(lo) | (u16::from(hi) << 8)
            }
        })
    }

    pub fn read_word(&self, addr: u32) -> Option<u32> {
        let region = Self::region(addr)?;
        Some(match region {
            0x08..=0x0D => self.cartridge.read_rom_word(addr & 0x01FF_FFFF),
            _ => {
                let lo = self.read_half(addr & !3)?;
                let hi = self.read_half((addr & !3) + 2)?;
                u32::from(lo) | (u32::from(hi) << 16)
            }
        })
    }

    pub fn write_byte(&mut self, addr: u32, value: u8) {
        match Self::region(addr) {
            Some(0x02) => self.wram.write_board_byte(addr, value),
            Some(0x03) => self.wram.write_chip_byte(addr, value),
            Some(0x05) => self.video.write_palette_byte(addr, value),
            Some(0x06) => self.video.write_vram_byte(addr, value),
            Some(0x07) => self.video.write_oam_byte(addr, value),
            Some(0x0E | 0x0F) => self.cartridge.write_sram_byte(addr, value),
            // BIOS and ROM are read-only; everything else is unmapped.
            _ => {}
        }
    }

    pub fn write_half(&mut self, addr: u32, value: u16) {
        let addr = addr & !1;
        match Self::region(addr) {
            Some(0x05) => self.video.write_palette_half(addr, value),
            Some(0x06) => self.video.write_vram_half(addr, value),
            Some(0x07) => self.video.write_oam_half(addr, value),
            Some(0x02 | 0x03 | 0x0E | 0x0F) => {
                self.write_byte(addr, value as u8);
                self.write_byte(addr + 1, (value >> 8) as u8);
            }
            _ => {}
        }
    }

    pub fn write_word(&mut self, addr: u32, value: u32) {
        let addr = addr & !3;
        self.write_half(addr, value as u16);
        self.write_half(addr + 2, (value >> 16) as u16);
    }
}

impl DmaBus for BusMemory {
    fn dma_read_half(&mut self, addr: u32) -> u16 {
        self.read_half(addr).unwrap_or(0)
    }

    fn dma_read_word(&mut self, addr: u32) -> u32 {
        self.read_word(addr).unwrap_or(0)
    }

    fn dma_write_half(&mut self, addr: u32, value: u16) {
        self.write_half(addr, value);
    }

    fn dma_write_word(&mut self, addr: u32, value: u32) {
        self.write_word(addr, value);
    }
}
