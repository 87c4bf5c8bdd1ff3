//! Interrupt enable/flag/master-enable registers and IRQ line assertion.
//!
//! Three registers drive the interrupt line: IE (per-source enable), IF
//! (per-source request, write-1-to-clear), and IME (master enable). The
//! line is asserted whenever `IE & IF != 0 && IME`.

use emu_core::{Observable, Value};

/// Interrupt source bit assignments, as they appear in IE/IF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    VBlank,
    HBlank,
    VCount,
    Timer0,
    Timer1,
    Timer2,
    Timer3,
    Serial,
    Dma0,
    Dma1,
    Dma2,
    Dma3,
    Keypad,
    Gamepak,
}

impl InterruptKind {
    #[must_use]
    pub const fn bit(self) -> u16 {
        match self {
            InterruptKind::VBlank => 0,
            InterruptKind::HBlank => 1,
            InterruptKind::VCount => 2,
            InterruptKind::Timer0 => 3,
            InterruptKind::Timer1 => 4,
            InterruptKind::Timer2 => 5,
            InterruptKind::Timer3 => 6,
            InterruptKind::Serial => 7,
            InterruptKind::Dma0 => 8,
            InterruptKind::Dma1 => 9,
            InterruptKind::Dma2 => 10,
            InterruptKind::Dma3 => 11,
            InterruptKind::Keypad => 12,
            InterruptKind::Gamepak => 13,
        }
    }

    #[must_use]
    pub const fn mask(self) -> u16 {
        1 << self.bit()
    }

    /// Maps a DMA channel index (0..3) to its completion interrupt source.
    #[must_use]
    pub const fn dma(channel: u8) -> Self {
        match channel {
            0 => InterruptKind::Dma0,
            1 => InterruptKind::Dma1,
            2 => InterruptKind::Dma2,
            _ => InterruptKind::Dma3,
        }
    }

    /// Maps a timer index (0..3) to its overflow interrupt source.
    #[must_use]
    pub const fn timer(channel: u8) -> Self {
        match channel {
            0 => InterruptKind::Timer0,
            1 => InterruptKind::Timer1,
            2 => InterruptKind::Timer2,
            _ => InterruptKind::Timer3,
        }
    }
}

/// The GBA's interrupt controller: IE, IF, IME.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interrupts {
    pub ie: u16,
    pub iflags: u16,
    pub ime: bool,
}

impl Interrupts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IF bit for `kind`. Does not itself deliver the interrupt —
    /// the CPU samples [`Interrupts::line_asserted`] at instruction
    /// boundaries and enters IRQ mode there.
    pub fn raise(&mut self, kind: InterruptKind) {
        self.iflags |= kind.mask();
    }

    /// Write-1-to-clear semantics for a host write to the IF register.
    pub fn acknowledge(&mut self, clear_mask: u16) {
        self.iflags &= !clear_mask;
    }

    /// True when `IE & IF != 0` and IME is set — the condition under which
    /// the CPU should enter IRQ mode at the next instruction boundary.
    #[must_use]
    pub const fn line_asserted(&self) -> bool {
        self.ime && (self.ie & self.iflags) != 0
    }

    /// True when any enabled source is pending, regardless of IME. Used to
    /// wake a halted CPU even if the master enable will gate actual entry.
    #[must_use]
    pub const fn any_enabled_pending(&self) -> bool {
        (self.ie & self.iflags) != 0
    }
}

const QUERY_PATHS: &[&str] = &["ie", "if", "ime", "line_asserted"];

impl Observable for Interrupts {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "ie" => Some(Value::U16(self.ie)),
            "if" => Some(Value::U16(self.iflags)),
            "ime" => Some(Value::Bool(self.ime)),
            "line_asserted" => Some(Value::Bool(self.line_asserted())),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_requires_enable_flag_and_master() {
        let mut irq = Interrupts::new();
        irq.raise(InterruptKind::VBlank);
        assert!(!irq.line_asserted(), "IE not set yet");

        irq.ie |= InterruptKind::VBlank.mask();
        assert!(!irq.line_asserted(), "IME not set yet");

        irq.ime = true;
        assert!(irq.line_asserted());
    }

    #[test]
    fn acknowledge_clears_only_named_bits() {
        let mut irq = Interrupts::new();
        irq.raise(InterruptKind::VBlank);
        irq.raise(InterruptKind::Timer0);

        irq.acknowledge(InterruptKind::VBlank.mask());

        assert_eq!(irq.iflags, InterruptKind::Timer0.mask());
    }

    #[test]
    fn dma_and_timer_source_mapping() {
        assert_eq!(InterruptKind::dma(1).bit(), InterruptKind::Dma1.bit());
        assert_eq!(InterruptKind::timer(3).bit(), InterruptKind::Timer3.bit());
    }
}
