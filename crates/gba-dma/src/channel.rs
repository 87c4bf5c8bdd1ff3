//! A single DMA channel: registers, enable-edge latching, and the transfer
//! loop.

use emu_core::{Observable, Value};
use gba_interrupts::{InterruptKind, Interrupts};

use crate::bus::DmaBus;

/// Destination/source address-control policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrControl {
    Increment,
    Decrement,
    Fixed,
    /// Destination only: reset to DAD after every transfer. Prohibited as a
    /// source control — callers should clamp to `Increment` and log.
    IncrementReload,
}

impl AddrControl {
    #[must_use]
    const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => AddrControl::Increment,
            1 => AddrControl::Decrement,
            2 => AddrControl::Fixed,
            _ => AddrControl::IncrementReload,
        }
    }

    #[must_use]
    const fn delta_sign(self) -> i32 {
        match self {
            AddrControl::Increment | AddrControl::IncrementReload => 1,
            AddrControl::Decrement => -1,
            AddrControl::Fixed => 0,
        }
    }
}

/// When a channel's transfer is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTiming {
    Immediate,
    VBlank,
    HBlank,
    /// Sound FIFO (channels 1/2) or video capture (channel 3).
    Special,
}

impl StartTiming {
    #[must_use]
    const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => StartTiming::Immediate,
            1 => StartTiming::VBlank,
            2 => StartTiming::HBlank,
            _ => StartTiming::Special,
        }
    }
}

/// CNT_H, the 16-bit DMA control register, decoded on demand rather than
/// cached as separate fields — this keeps the raw register (what MMIO
/// reads back) and the decoded view (what the trigger logic consumes) from
/// drifting apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DmaControl(pub u16);

impl DmaControl {
    #[must_use]
    pub const fn dest_control(self) -> AddrControl {
        AddrControl::from_bits(self.0 >> 5)
    }

    #[must_use]
    pub const fn src_control(self) -> AddrControl {
        AddrControl::from_bits(self.0 >> 7)
    }

    #[must_use]
    pub const fn repeat(self) -> bool {
        self.0 & (1 << 9) != 0
    }

    #[must_use]
    pub const fn word_size(self) -> u32 {
        if self.0 & (1 << 10) != 0 { 4 } else { 2 }
    }

    #[must_use]
    pub const fn start_timing(self) -> StartTiming {
        StartTiming::from_bits(self.0 >> 12)
    }

    #[must_use]
    pub const fn irq_on_end(self) -> bool {
        self.0 & (1 << 14) != 0
    }

    #[must_use]
    pub const fn enabled(self) -> bool {
        self.0 & (1 << 15) != 0
    }

    fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.0 |= 1 << 15;
        } else {
            self.0 &= !(1 << 15);
        }
    }
}

/// One of the four DMA channels (0..3).
pub struct DmaChannel {
    index: u8,
    /// Programmed source address (SAD), masked to the channel's address width.
    sad: u32,
    /// Programmed destination address (DAD), masked to the channel's address width.
    dad: u32,
    /// Raw length register (CNT_L): 14 bits for ch0-2, 16 bits for ch3.
    length: u32,
    control: DmaControl,
    /// Latched source, copied from SAD on the enable edge; advances across
    /// the transfer and persists across repeat triggers.
    internal_src: u32,
    /// Latched destination, analogous to `internal_src`.
    internal_dst: u32,
}

impl DmaChannel {
    #[must_use]
    pub fn new(index: u8) -> Self {
        Self {
            index,
            sad: 0,
            dad: 0,
            length: 0,
            control: DmaControl::default(),
            internal_src: 0,
            internal_dst: 0,
        }
    }

    const fn sad_mask(&self) -> u32 {
        if self.index == 0 { 0x07FF_FFFF } else { 0x0FFF_FFFF }
    }

    const fn dad_mask(&self) -> u32 {
        if self.index == 3 { 0x0FFF_FFFF } else { 0x07FF_FFFF }
    }

    const fn length_mask(&self) -> u32 {
        if self.index == 3 { 0xFFFF } else { 0x3FFF }
    }

    /// Effective transfer length: a zero length register means "maximum"
    /// (0x4000 for ch0-2, 0x10000 for ch3) — the classic GBA DMA quirk.
    #[must_use]
    pub fn effective_length(&self) -> u32 {
        if self.length == 0 { self.length_mask() + 1 } else { self.length }
    }

    #[must_use]
    pub const fn control(&self) -> DmaControl {
        self.control
    }

    #[must_use]
    pub const fn sad(&self) -> u32 {
        self.sad
    }

    #[must_use]
    pub const fn dad(&self) -> u32 {
        self.dad
    }

    #[must_use]
    pub const fn internal_src(&self) -> u32 {
        self.internal_src
    }

    #[must_use]
    pub const fn internal_dst(&self) -> u32 {
        self.internal_dst
    }

    /// The raw CNT_L register as stored bytes, for byte-granular MMIO
    /// writes that need to merge into the half not being written.
    #[must_use]
    pub fn length_register_bytes(&self) -> [u8; 2] {
        (self.length as u16).to_le_bytes()
    }

    pub fn set_sad(&mut self, value: u32) {
        self.sad = value & self.sad_mask();
    }

    pub fn set_dad(&mut self, value: u32) {
        self.dad = value & self.dad_mask();
    }

    pub fn set_length(&mut self, value: u32) {
        self.length = value & self.length_mask();
    }

    /// Write CNT_H. Detects the enable 0->1 edge: latches SAD/DAD into the
    /// internal source/destination and, for `Immediate` timing, triggers
    /// the transfer synchronously. Returns the number of word/halfword
    /// units transferred if an immediate trigger fired (for cycle costing
    /// and IF-bit delivery), or `0` if none did.
    pub fn write_control(
        &mut self,
        value: u16,
        bus: &mut impl DmaBus,
        interrupts: &mut Interrupts,
    ) -> u32 {
        let new_control = DmaControl(value);
        let rising_edge = !self.control.enabled() && new_control.enabled();
        self.control = new_control;

        if rising_edge {
            self.internal_src = self.sad;
            self.internal_dst = self.dad;
            if new_control.start_timing() == StartTiming::Immediate {
                return self.trigger(bus, interrupts);
            }
        }
        0
    }

    /// Run one full transfer if the channel is enabled and awaiting the
    /// given timing. Returns the number of units transferred (0 if the
    /// channel did not fire).
    fn trigger_if_timing(
        &mut self,
        timing: StartTiming,
        bus: &mut impl DmaBus,
        interrupts: &mut Interrupts,
    ) -> u32 {
        if self.control.enabled() && self.control.start_timing() == timing {
            self.trigger(bus, interrupts)
        } else {
            0
        }
    }

    pub fn trigger_hblank(&mut self, bus: &mut impl DmaBus, interrupts: &mut Interrupts) -> u32 {
        self.trigger_if_timing(StartTiming::HBlank, bus, interrupts)
    }

    pub fn trigger_vblank(&mut self, bus: &mut impl DmaBus, interrupts: &mut Interrupts) -> u32 {
        self.trigger_if_timing(StartTiming::VBlank, bus, interrupts)
    }

    /// Sound FIFO trigger (channels 1/2 only). Forces length=4, word
    /// transfers, fixed destination, per the APU FIFO DMA convention.
    pub fn trigger_fifo(&mut self, bus: &mut impl DmaBus, interrupts: &mut Interrupts) -> u32 {
        if !(self.control.enabled() && self.control.start_timing() == StartTiming::Special) {
            return 0;
        }
        self.transfer(bus, interrupts, Some(FifoOverride))
    }

    /// Run the transfer procedure described in the DMA spec, unconditionally.
    fn trigger(&mut self, bus: &mut impl DmaBus, interrupts: &mut Interrupts) -> u32 {
        self.transfer(bus, interrupts, None)
    }

    fn transfer(
        &mut self,
        bus: &mut impl DmaBus,
        interrupts: &mut Interrupts,
        fifo_override: Option<FifoOverride>,
    ) -> u32 {
        let (len, word_size, dest_control) = if fifo_override.is_some() {
            (4, 4, AddrControl::Fixed)
        } else {
            (self.effective_length(), self.control.word_size(), self.control.dest_control())
        };

        let src_control = match self.control.src_control() {
            // IncrementReload is prohibited as a source control; clamp and
            // log per the error-handling design (recoverable anomaly).
            AddrControl::IncrementReload => {
                #[cfg(debug_assertions)]
                eprintln!(
                    "dma{}: prohibited src_control=IncrementReload, clamping to Increment",
                    self.index
                );
                AddrControl::Increment
            }
            other => other,
        };

        let delta_src = (word_size as i32) * src_control.delta_sign();
        let delta_dst = (word_size as i32) * dest_control.delta_sign();

        for _ in 0..len {
            if word_size == 4 {
                let value = bus.dma_read_word(self.internal_src);
                bus.dma_write_word(self.internal_dst, value);
            } else {
                let value = bus.dma_read_half(self.internal_src);
                bus.dma_write_half(self.internal_dst, value);
            }
            self.internal_src = self.internal_src.wrapping_add_signed(delta_src);
            self.internal_dst = self.internal_dst.wrapping_add_signed(delta_dst);
        }

        if dest_control == AddrControl::IncrementReload {
            self.internal_dst = self.dad;
        }

        if self.control.repeat() && self.control.start_timing() != StartTiming::Immediate {
            // Enable bit stays set, awaiting the next trigger.
        } else {
            self.control.set_enabled(false);
        }

        if self.control.irq_on_end() {
            interrupts.raise(InterruptKind::dma(self.index));
        }

        len
    }
}

/// Zero-sized marker distinguishing a forced FIFO transfer from a normal one
/// in `transfer`'s signature, without adding another boolean parameter.
struct FifoOverride;

const QUERY_PATHS: &[&str] = &["sad", "dad", "length", "control", "internal_src", "internal_dst"];

impl Observable for DmaChannel {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "sad" => Some(Value::U32(self.sad)),
            "dad" => Some(Value::U32(self.dad)),
            "length" => Some(Value::U32(self.length)),
            "control" => Some(Value::U16(self.control.0)),
            "internal_src" => Some(Value::U32(self.internal_src)),
            "internal_dst" => Some(Value::U32(self.internal_dst)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
