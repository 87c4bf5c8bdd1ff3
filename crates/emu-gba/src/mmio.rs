//! The `0x0400_0000`-`0x0400_03FE` register window: byte-granular access
//! into interrupts, DMA, timers, keypad and the PPU stub's registers.
//! 16/32-bit accesses are synthesized from the byte handlers, matching how
//! `gba-dma` already exposes its own registers.

use gba_interrupts::Interrupts;

use crate::keypad::Keypad;
use crate::mem::BusMemory;
use crate::ppu_stub::PpuStub;
use crate::timer::Timers;

const DISPCNT: u16 = 0x000;
const DISPSTAT: u16 = 0x004;
const VCOUNT: u16 = 0x006;
const TM_BASE: u16 = 0x100;
const TM_STRIDE: u16 = 4;
const KEYINPUT: u16 = 0x130;
const KEYCNT: u16 = 0x132;
const REG_IE: u16 = 0x200;
const REG_IF: u16 = 0x202;
const REG_IME: u16 = 0x208;

pub struct MmioRegs<'a> {
    pub mem: &'a mut BusMemory,
    pub dma: &'a mut gba_dma::DmaChannels,
    pub interrupts: &'a mut Interrupts,
    pub keypad: &'a mut Keypad,
    pub timers: &'a mut Timers,
    pub ppu: &'a mut PpuStub,
    /// Plain storage for DISPCNT; this core never reads it beyond what's
    /// written, since it drives pixel rendering this core doesn't perform.
    pub dispcnt: &'a mut u16,
}

impl MmioRegs<'_> {
    pub fn read_byte(&mut self, offset: u16) -> u8 {
        if offset >= gba_dma::DMA_BASE && offset < gba_dma::DMA_BASE + 4 * gba_dma::DMA_CHANNEL_STRIDE {
            return self.dma.read_byte(offset);
        }
        if (TM_BASE..TM_BASE + 4 * TM_STRIDE).contains(&offset) {
            return timer_byte(self.timers, offset, None).unwrap_or(0);
        }
        match offset {
            DISPCNT | 0x001 => self.dispcnt.to_le_bytes()[(offset - DISPCNT) as usize],
            DISPSTAT | 0x005 => self.ppu.read_dispstat().to_le_bytes()[(offset - DISPSTAT) as usize],
            VCOUNT | 0x007 => self.ppu.read_vcount().to_le_bytes()[(offset - VCOUNT) as usize],
            KEYINPUT | 0x131 => self.keypad.read_keyinput().to_le_bytes()[(offset - KEYINPUT) as usize],
            KEYCNT | 0x133 => self.keypad.read_keycnt().to_le_bytes()[(offset - KEYCNT) as usize],
            REG_IE | 0x201 => self.interrupts.ie.to_le_bytes()[(offset - REG_IE) as usize],
            REG_IF | 0x203 => self.interrupts.iflags.to_le_bytes()[(offset - REG_IF) as usize],
            REG_IME => u8::from(self.interrupts.ime),
            0x209..=0x20B => 0,
            _ => 0,
        }
    }

    /// Returns the number of DMA transfer units moved, if this write
    /// triggered an immediate DMA transfer.
    pub fn write_byte(&mut self, offset: u16, value: u8) -> u32 {
        if offset >= gba_dma::DMA_BASE && offset < gba_dma::DMA_BASE + 4 * gba_dma::DMA_CHANNEL_STRIDE {
            return self.dma.write_byte(offset, value, self.mem, self.interrupts);
        }
        if (TM_BASE..TM_BASE + 4 * TM_STRIDE).contains(&offset) {
            timer_byte(self.timers, offset, Some(value));
            return 0;
        }
        match offset {
            DISPCNT | 0x001 => write_le_half_byte(self.dispcnt, offset - DISPCNT, value),
            DISPSTAT | 0x005 => {
                let mut bytes = self.ppu.read_dispstat().to_le_bytes();
                bytes[(offset - DISPSTAT) as usize] = value;
                self.ppu.write_dispstat(u16::from_le_bytes(bytes));
            }
            KEYCNT | 0x133 => {
                let mut bytes = self.keypad.read_keycnt().to_le_bytes();
                bytes[(offset - KEYCNT) as usize] = value;
                self.keypad.write_keycnt(u16::from_le_bytes(bytes));
            }
            REG_IE | 0x201 => {
                let mut bytes = self.interrupts.ie.to_le_bytes();
                bytes[(offset - REG_IE) as usize] = value;
                self.interrupts.ie = u16::from_le_bytes(bytes);
            }
            REG_IF | 0x203 => {
                let mask = u16::from(value) << (8 * (offset - REG_IF));
                self.interrupts.acknowledge(mask);
            }
            REG_IME => self.interrupts.ime = value & 1 != 0,
            _ => {}
        }
        0
    }
}

fn write_le_half_byte(reg: &mut u16, byte_index: u16, value: u8) {
    let mut bytes = reg.to_le_bytes();
    bytes[byte_index as usize] = value;
    *reg = u16::from_le_bytes(bytes);
}

/// Reads (`write is None`) or writes a byte within the 16-byte, 4-timer
/// `TM0CNT_L`..`TM3CNT_H` block. Returns the read byte, if reading.
fn timer_byte(timers: &mut Timers, offset: u16, write: Option<u8>) -> Option<u8> {
    let rel = offset - TM_BASE;
    let channel = (rel / TM_STRIDE) as usize;
    let reg_offset = rel % TM_STRIDE;
    match (reg_offset, write) {
        (0 | 1, None) => {
            let bytes = timers.read_reload_or_counter(channel).to_le_bytes();
            Some(bytes[reg_offset as usize])
        }
        (0 | 1, Some(value)) => {
            // CNT_L is write-only as "reload"; reconstruct from the other
            // just-written byte the same way gba-dma's CNT_L does.
            let current = timers.read_reload_or_counter(channel).to_le_bytes();
            let merged = if reg_offset == 0 { [value, current[1]] } else { [current[0], value] };
            timers.write_reload(channel, u16::from_le_bytes(merged));
            None
        }
        (2 | 3, None) => {
            let bytes = timers.read_control(channel).to_le_bytes();
            Some(bytes[(reg_offset - 2) as usize])
        }
        (2 | 3, Some(value)) => {
            let mut bytes = timers.read_control(channel).to_le_bytes();
            bytes[(reg_offset - 2) as usize] = value;
            timers.write_control(channel, u16::from_le_bytes(bytes));
            None
        }
        _ => None,
    }
}

/// Reads a 16-bit register by composing two byte reads. MMIO registers are
/// always naturally aligned by the CPU's bus; misalignment isn't a concern
/// here the way it is for general memory.
pub fn read_half(regs: &mut MmioRegs<'_>, offset: u16) -> u16 {
    u16::from(regs.read_byte(offset)) | (u16::from(regs.read_byte(offset + 1)) << 8)
}

pub fn write_half(regs: &mut MmioRegs<'_>, offset: u16, value: u16) -> u32 {
    let low = regs.write_byte(offset, value as u8);
    let high = regs.write_byte(offset + 1, (value >> 8) as u8);
    low + high
}

pub fn read_word(regs: &mut MmioRegs<'_>, offset: u16) -> u32 {
    u32::from(read_half(regs, offset)) | (u32::from(read_half(regs, offset + 2)) << 16)
}

pub fn write_word(regs: &mut MmioRegs<'_>, offset: u16, value: u32) -> u32 {
    let low = write_half(regs, offset, value as u16);
    let high = write_half(regs, offset + 2, (value >> 16) as u16);
    low + high
}
