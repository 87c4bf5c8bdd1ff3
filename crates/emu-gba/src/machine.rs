//! Wires the CPU, bus, and scheduler together into a runnable GBA.

use cpu_arm7tdmi::{Cpu, CARTRIDGE_ENTRY};
use emu_core::Scheduler;
use gba_interrupts::InterruptKind;

use crate::bus::Bus;
use crate::config::GbaConfig;
use crate::ppu_stub::{CYCLES_PER_LINE, HDRAW_CYCLES};
use crate::scheduler_events::SchedEvent;

/// External DMA trigger conditions a caller can force, per the machine's
/// `trigger_dma(event)` interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaTrigger {
    HBlank,
    VBlank,
    /// Sound FIFO A/B (0 or 1).
    Fifo(u8),
}

pub struct GbaMachine {
    pub cpu: Cpu,
    pub bus: Bus,
    scheduler: Scheduler<SchedEvent>,
}

impl GbaMachine {
    #[must_use]
    pub fn new(config: GbaConfig) -> Self {
        let mut bus = Bus::new(config.bios, config.rom, config.save);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus, CARTRIDGE_ENTRY);

        let mut scheduler = Scheduler::new();
        scheduler.schedule(HDRAW_CYCLES, SchedEvent::HBlankStart);
        scheduler.schedule(CYCLES_PER_LINE, SchedEvent::EndOfLine);

        Self { cpu, bus, scheduler }
    }

    /// Execute exactly one CPU instruction, drive every peripheral forward
    /// by the cycles it cost, and deliver any interrupt now asserted.
    /// Returns the cycle cost, for a caller pacing real-time playback.
    pub fn step(&mut self) -> u64 {
        let cycles = self.cpu.step(&mut self.bus);
        if cycles == 0 {
            // Halted with nothing pending; let the scheduler run the clock
            // forward to the next event so a timer/PPU deadline isn't
            // starved forever.
            self.advance_peripherals(1);
            self.deliver_interrupt();
            return 1;
        }

        self.advance_peripherals(cycles);
        self.deliver_interrupt();
        cycles
    }

    /// Run `step` until the scheduler's cycle counter reaches `target`.
    pub fn run_until(&mut self, target: u64) {
        while self.scheduler.now().get() < target {
            self.step();
        }
    }

    pub fn raise_interrupt(&mut self, kind: InterruptKind) {
        self.bus.interrupts.raise(kind);
    }

    /// Force a DMA trigger condition the owning machine observed
    /// externally (normally the PPU-stub/timer bookkeeping in
    /// [`Self::advance_peripherals`] does this itself; exposed for a
    /// caller driving HBlank/VBlank/FIFO timing from outside, e.g. a test
    /// harness or an APU this crate doesn't implement).
    pub fn trigger_dma(&mut self, event: DmaTrigger) -> u32 {
        match event {
            DmaTrigger::HBlank => self.bus.trigger_hblank_dma(),
            DmaTrigger::VBlank => self.bus.trigger_vblank_dma(),
            DmaTrigger::Fifo(idx) => self.bus.trigger_fifo_dma(idx),
        }
    }

    fn advance_peripherals(&mut self, cycles: u64) {
        let Bus { timers, interrupts, .. } = &mut self.bus;
        timers.tick(cycles, interrupts);

        let bus = &mut self.bus;
        self.scheduler.tick(cycles, |sched, event| match event {
            SchedEvent::HBlankStart => {
                if bus.ppu.enter_hblank() {
                    bus.interrupts.raise(InterruptKind::HBlank);
                }
                bus.trigger_hblank_dma();
            }
            SchedEvent::EndOfLine => {
                bus.ppu.leave_hblank();
                let line_event = bus.ppu.advance_line();
                if line_event.entered_vblank {
                    bus.trigger_vblank_dma();
                }
                if line_event.vblank_irq {
                    bus.interrupts.raise(InterruptKind::VBlank);
                }
                if line_event.vcount_irq {
                    bus.interrupts.raise(InterruptKind::VCount);
                }
                sched.schedule(HDRAW_CYCLES, SchedEvent::HBlankStart);
                sched.schedule(CYCLES_PER_LINE, SchedEvent::EndOfLine);
            }
        });
    }

    fn deliver_interrupt(&mut self) {
        if self.cpu.halted && self.bus.interrupts.any_enabled_pending() {
            self.cpu.wake();
        }
        if self.bus.interrupts.line_asserted() && !self.cpu.regs.cpsr.irq_disable() {
            self.cpu.irq();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_with_rom(rom: Vec<u8>) -> GbaMachine {
        GbaMachine::new(GbaConfig { bios: vec![0; 0x4000], rom, save: None })
    }

    #[test]
    fn reset_lands_at_cartridge_entry() {
        let machine = machine_with_rom(vec![0; 0x8000]);
        assert_eq!(machine.cpu.regs.r[15], CARTRIDGE_ENTRY + 8);
    }

    #[test]
    fn halted_cpu_wakes_on_enabled_pending_interrupt() {
        let mut rom = vec![0u8; 0x8000];
        // A HALT-equivalent isn't modeled at the bus level in this test;
        // simulate the halted state directly and confirm wake-on-pending.
        rom[0..4].copy_from_slice(&0xE1A0_0000u32.to_le_bytes()); // MOV R0,R0
        let mut machine = machine_with_rom(rom);
        machine.cpu.halted = true;
        machine.bus.interrupts.ie = InterruptKind::VBlank.mask();
        machine.bus.interrupts.raise(InterruptKind::VBlank);

        machine.step();
        assert!(!machine.cpu.halted);
    }

    #[test]
    fn vblank_fires_after_one_frame_of_scanlines() {
        let mut rom = vec![0u8; 0x8000];
        for i in 0..0x8000 / 4 {
            rom[i * 4..i * 4 + 4].copy_from_slice(&0xE1A0_0000u32.to_le_bytes());
        }
        let mut machine = machine_with_rom(rom);
        machine.bus.interrupts.ime = true;
        machine.bus.interrupts.ie = InterruptKind::VBlank.mask();

        machine.run_until(CYCLES_PER_LINE * 161);
        assert!(machine.bus.ppu.read_dispstat() & 0x0001 != 0, "VBlank flag should be set after line 160");
    }
}
