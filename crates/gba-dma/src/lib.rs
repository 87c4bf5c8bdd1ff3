//! The four-channel GBA DMA engine.
//!
//! Each channel has SAD (source), DAD (destination), CNT_L (length) and
//! CNT_H (control) registers, mapped into MMIO at `0xB0 + 12 * channel`.
//! Transfers are triggered either by a CNT_H enable-edge write (immediate
//! timing) or by the owning machine calling `trigger_hblank`/
//! `trigger_vblank`/`trigger_fifo` when the PPU or APU FIFO signals it.

mod bus;
mod channel;

pub use bus::DmaBus;
pub use channel::{AddrControl, DmaChannel, DmaControl, StartTiming};
use emu_core::{Observable, Value};
use gba_interrupts::Interrupts;

/// MMIO base offset (relative to `0x0400_0000`) of channel 0's SAD register.
pub const DMA_BASE: u16 = 0x00B0;
/// Byte span of one channel's register block (SAD + DAD + CNT_L + CNT_H).
pub const DMA_CHANNEL_STRIDE: u16 = 12;

/// All four DMA channels.
pub struct DmaChannels {
    channels: [DmaChannel; 4],
}

impl DmaChannels {
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|i| DmaChannel::new(i as u8)),
        }
    }

    #[must_use]
    pub fn channel(&self, index: u8) -> &DmaChannel {
        &self.channels[index as usize]
    }

    /// Fire every enabled channel awaiting HBlank timing. Returns the total
    /// transfer units moved, for the caller to cost into the scheduler.
    pub fn trigger_hblank(&mut self, bus: &mut impl DmaBus, interrupts: &mut Interrupts) -> u32 {
        self.channels
            .iter_mut()
            .map(|ch| ch.trigger_hblank(bus, interrupts))
            .sum()
    }

    pub fn trigger_vblank(&mut self, bus: &mut impl DmaBus, interrupts: &mut Interrupts) -> u32 {
        self.channels
            .iter_mut()
            .map(|ch| ch.trigger_vblank(bus, interrupts))
            .sum()
    }

    /// `fifo_idx` is 0 or 1 (sound FIFO A/B), mapping to channels 1 and 2.
    pub fn trigger_fifo(
        &mut self,
        fifo_idx: u8,
        bus: &mut impl DmaBus,
        interrupts: &mut Interrupts,
    ) -> u32 {
        let channel = (fifo_idx + 1) as usize;
        self.channels[channel].trigger_fifo(bus, interrupts)
    }

    /// Read a byte from the DMA register window. `offset` is the MMIO
    /// address with the `0x0400_0000` base already stripped off.
    #[must_use]
    pub fn read_byte(&self, offset: u16) -> u8 {
        let Some((index, reg_offset)) = Self::locate(offset) else {
            return 0;
        };
        let ch = &self.channels[index];
        match reg_offset {
            0..=3 => ch.sad().to_le_bytes()[reg_offset as usize],
            4..=7 => ch.dad().to_le_bytes()[(reg_offset - 4) as usize],
            8..=9 => {
                // CNT_L is write-only on real hardware; reads return 0.
                0
            }
            _ => ch.control().0.to_le_bytes()[(reg_offset - 10) as usize],
        }
    }

    /// Write a byte into the DMA register window. Returns the number of
    /// transfer units moved if the write triggered an immediate transfer.
    pub fn write_byte(
        &mut self,
        offset: u16,
        value: u8,
        bus: &mut impl DmaBus,
        interrupts: &mut Interrupts,
    ) -> u32 {
        let Some((index, reg_offset)) = Self::locate(offset) else {
            return 0;
        };
        let ch = &mut self.channels[index];
        match reg_offset {
            0..=3 => {
                let mut bytes = ch.sad().to_le_bytes();
                bytes[reg_offset as usize] = value;
                ch.set_sad(u32::from_le_bytes(bytes));
                0
            }
            4..=7 => {
                let mut bytes = ch.dad().to_le_bytes();
                bytes[(reg_offset - 4) as usize] = value;
                ch.set_dad(u32::from_le_bytes(bytes));
                0
            }
            8..=9 => {
                let mut bytes = [0u8; 2];
                bytes[(reg_offset - 8) as usize] = value;
                // CNT_L reads back as 0, so only the just-written byte is
                // meaningful; the other half keeps its prior stored value.
                let current = ch.length_register_bytes();
                let merged = if reg_offset == 8 {
                    [value, current[1]]
                } else {
                    [current[0], value]
                };
                ch.set_length(u16::from_le_bytes(merged) as u32);
                0
            }
            _ => {
                let mut bytes = ch.control().0.to_le_bytes();
                bytes[(reg_offset - 10) as usize] = value;
                ch.write_control(u16::from_le_bytes(bytes), bus, interrupts)
            }
        }
    }

    /// Split a DMA-window MMIO offset into (channel index, offset within
    /// that channel's 12-byte register block). `None` if out of range.
    const fn locate(offset: u16) -> Option<(usize, u16)> {
        if offset < DMA_BASE {
            return None;
        }
        let rel = offset - DMA_BASE;
        let index = rel / DMA_CHANNEL_STRIDE;
        if index > 3 {
            return None;
        }
        Some((index as usize, rel % DMA_CHANNEL_STRIDE))
    }
}

impl Default for DmaChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for DmaChannels {
    fn query(&self, path: &str) -> Option<Value> {
        for (index, prefix) in ["ch0.", "ch1.", "ch2.", "ch3."].iter().enumerate() {
            if let Some(rest) = path.strip_prefix(prefix) {
                return self.channels[index].query(rest);
            }
        }
        None
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["ch0.<channel_paths>", "ch1.<channel_paths>", "ch2.<channel_paths>", "ch3.<channel_paths>"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FlatBus {
        mem: Rc<RefCell<Vec<u8>>>,
    }

    impl FlatBus {
        fn new(size: usize) -> Self {
            Self { mem: Rc::new(RefCell::new(vec![0u8; size])) }
        }
    }

    impl DmaBus for FlatBus {
        fn dma_read_half(&mut self, addr: u32) -> u16 {
            let m = self.mem.borrow();
            let a = addr as usize;
            u16::from_le_bytes([m[a], m[a + 1]])
        }
        fn dma_read_word(&mut self, addr: u32) -> u32 {
            let m = self.mem.borrow();
            let a = addr as usize;
            u32::from_le_bytes([m[a], m[a + 1], m[a + 2], m[a + 3]])
        }
        fn dma_write_half(&mut self, addr: u32, value: u16) {
            let mut m = self.mem.borrow_mut();
            let a = addr as usize;
            m[a..a + 2].copy_from_slice(&value.to_le_bytes());
        }
        fn dma_write_word(&mut self, addr: u32, value: u32) {
            let mut m = self.mem.borrow_mut();
            let a = addr as usize;
            m[a..a + 4].copy_from_slice(&value.to_le_bytes());
        }
    }

    #[test]
    fn immediate_word_transfer_copies_block_and_clears_enable() {
        let mut dma = DmaChannels::new();
        let mut bus = FlatBus::new(0x3000);
        let mut irq = Interrupts::new();

        for (i, b) in (0u32..1024).map(|i| (i, (i % 256) as u8)) {
            bus.mem.borrow_mut()[0x2000 + i as usize] = b;
        }

        dma.write_byte(0x00B0, 0x00, &mut bus, &mut irq); // SAD low byte
        dma.write_byte(0x00B1, 0x20, &mut bus, &mut irq);
        dma.write_byte(0x00B2, 0x00, &mut bus, &mut irq);
        dma.write_byte(0x00B3, 0x00, &mut bus, &mut irq);

        dma.write_byte(0x00B4, 0x00, &mut bus, &mut irq); // DAD low byte
        dma.write_byte(0x00B5, 0x30, &mut bus, &mut irq);
        dma.write_byte(0x00B6, 0x00, &mut bus, &mut irq);
        dma.write_byte(0x00B7, 0x00, &mut bus, &mut irq);

        dma.write_byte(0x00B8, 0x00, &mut bus, &mut irq); // CNT_L = 256
        dma.write_byte(0x00B9, 0x01, &mut bus, &mut irq);

        // CNT_H: word transfer (bit 10), enable (bit 15), immediate timing.
        let transferred = {
            dma.write_byte(0x00BA, 0x00, &mut bus, &mut irq);
            dma.write_byte(0x00BB, 0b1000_0100, &mut bus, &mut irq)
        };

        assert_eq!(transferred, 256);
        for i in 0..1024usize {
            assert_eq!(bus.mem.borrow()[0x2000 + i], bus.mem.borrow()[0x3000 + i]);
        }
        assert!(!dma.channel(0).control().enabled());
        assert_eq!(dma.channel(0).internal_src(), 0x0200_0000 + 1024);
        assert_eq!(dma.channel(0).internal_dst(), 0x0300_0000 + 1024);
    }

    #[test]
    fn prohibited_src_increment_reload_clamps_to_increment() {
        let mut dma = DmaChannels::new();
        let mut bus = FlatBus::new(0x100);
        let mut irq = Interrupts::new();

        dma.write_byte(0x00B8, 0x04, &mut bus, &mut irq); // length = 4
        dma.write_byte(0x00B9, 0x00, &mut bus, &mut irq);
        // src_control straddles the CNT_H byte boundary (bits 7-8): low byte
        // bit 7 plus high byte bit 0 together select 0b11, IncrementReload,
        // which is prohibited as a source control.
        dma.write_byte(0x00BA, 0b1000_0000, &mut bus, &mut irq);
        let transferred = dma.write_byte(0x00BB, 0b1000_0101, &mut bus, &mut irq);

        assert_eq!(transferred, 4);
        // Source must have advanced as if Increment (4 words * 4 bytes).
        assert_eq!(dma.channel(0).internal_src(), 16);
    }

    #[test]
    fn hblank_timed_channel_waits_for_external_trigger() {
        let mut dma = DmaChannels::new();
        let mut bus = FlatBus::new(0x100);
        let mut irq = Interrupts::new();

        dma.write_byte(0x00B8, 0x02, &mut bus, &mut irq); // length = 2
        dma.write_byte(0x00B9, 0x00, &mut bus, &mut irq);
        // HBlank timing (bits 12-13 = 0b10), word transfer, enable.
        dma.write_byte(0x00BA, 0x00, &mut bus, &mut irq);
        let immediate = dma.write_byte(0x00BB, 0b1010_0100, &mut bus, &mut irq);
        assert_eq!(immediate, 0, "HBlank timing must not fire on the enable write");

        let fired = dma.trigger_hblank(&mut bus, &mut irq);
        assert_eq!(fired, 2);
    }
}
