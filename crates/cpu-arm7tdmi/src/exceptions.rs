//! Exception entry vectors and the IRQ entry procedure.

use crate::registers::{Mode, RegisterFile};

/// Exception vector addresses, as fixed entries at the base of BIOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vector {
    Reset,
    Undefined,
    SoftwareInterrupt,
    PrefetchAbort,
    DataAbort,
    Irq,
    Fiq,
}

impl Vector {
    #[must_use]
    pub const fn address(self) -> u32 {
        match self {
            Vector::Reset => 0x00,
            Vector::Undefined => 0x04,
            Vector::SoftwareInterrupt => 0x08,
            Vector::PrefetchAbort => 0x0C,
            Vector::DataAbort => 0x10,
            Vector::Irq => 0x18,
            Vector::Fiq => 0x1C,
        }
    }

    #[must_use]
    pub const fn entry_mode(self) -> Mode {
        match self {
            Vector::Reset => Mode::Svc,
            Vector::Undefined => Mode::Und,
            Vector::SoftwareInterrupt => Mode::Svc,
            Vector::PrefetchAbort | Vector::DataAbort => Mode::Abt,
            Vector::Irq => Mode::Irq,
            Vector::Fiq => Mode::Fiq,
        }
    }
}

/// Drive an exception entry: switch mode, save SPSR/LR, clear T, set I (and
/// F for FIQ/Reset), land at the vector. Returns the address the pipeline
/// should restart fetching from.
///
/// `lr_value` is the value to store in R14_new before the jump — callers
/// compute this per exception type (e.g. `pc - 4` for IRQ, already
/// compensating for the pipeline's PC-ahead).
pub fn enter(regs: &mut RegisterFile, vector: Vector, lr_value: u32) -> u32 {
    let saved_cpsr = regs.cpsr;
    regs.switch_mode(vector.entry_mode());
    regs.set_spsr(saved_cpsr);
    regs.r[14] = lr_value;
    regs.cpsr.set_thumb(false);
    regs.cpsr.set_irq_disable(true);
    if matches!(vector, Vector::Reset | Vector::Fiq) {
        regs.cpsr.set_fiq_disable(true);
    }
    vector.address()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Psr;

    #[test]
    fn irq_entry_scenario() {
        let mut regs = RegisterFile::new();
        regs.cpsr.set_mode(Mode::Sys);
        regs.init_bank_sp(Mode::Sys, 0x0300_7F00);
        regs.init_bank_sp(Mode::Irq, 0x0300_7FA0);
        regs.r[13] = 0x0300_7F00;
        regs.r[15] = 0x0800_0100;

        let lr = regs.r[15] - 4;
        let entry = enter(&mut regs, Vector::Irq, lr);

        assert_eq!(entry, 0x18);
        assert_eq!(regs.r[14], 0x0800_00FC);
        assert_eq!(regs.r[13], 0x0300_7FA0);
        assert_eq!(regs.mode(), Mode::Irq);
        assert!(regs.cpsr.irq_disable());
        assert!(!regs.cpsr.thumb());
        assert_eq!(regs.spsr(), Some(Psr(Mode::Sys.bits())));
    }
}
