//! The four programmable timers: 16-bit down... actually up-counters that
//! reload on overflow and can chain (count-up mode) or raise an interrupt.

use gba_interrupts::{InterruptKind, Interrupts};

const PRESCALERS: [u32; 4] = [1, 64, 256, 1024];

#[derive(Default, Clone, Copy)]
struct TimerChannel {
    reload: u16,
    counter: u16,
    control: u16,
    /// Sub-prescaler accumulator; counts actual cycles toward the next
    /// `prescaler()` increment.
    accum: u32,
}

impl TimerChannel {
    const ENABLE: u16 = 1 << 7;
    const IRQ_ENABLE: u16 = 1 << 6;
    const COUNT_UP: u16 = 1 << 2;

    const fn enabled(self) -> bool {
        self.control & Self::ENABLE != 0
    }

    const fn count_up(self) -> bool {
        self.control & Self::COUNT_UP != 0
    }

    const fn prescaler(self) -> u32 {
        PRESCALERS[(self.control & 0b11) as usize]
    }

    /// Increments the counter by one, reloading and reporting overflow.
    fn step_one(&mut self) -> bool {
        let (next, overflowed) = self.counter.overflowing_add(1);
        if overflowed {
            self.counter = self.reload;
            true
        } else {
            self.counter = next;
            false
        }
    }
}

pub struct Timers {
    channels: [TimerChannel; 4],
}

impl Timers {
    #[must_use]
    pub fn new() -> Self {
        Self { channels: [TimerChannel::default(); 4] }
    }

    pub fn read_reload_or_counter(&self, channel: usize) -> u16 {
        self.channels[channel].counter
    }

    pub fn write_reload(&mut self, channel: usize, value: u16) {
        self.channels[channel].reload = value;
    }

    pub fn read_control(&self, channel: usize) -> u16 {
        self.channels[channel].control
    }

    /// Writing control with the enable bit transitioning 0->1 reloads the
    /// counter from the reload value, matching hardware's start-on-enable
    /// behavior.
    pub fn write_control(&mut self, channel: usize, value: u16) {
        let was_enabled = self.channels[channel].enabled();
        self.channels[channel].control = value;
        if !was_enabled && self.channels[channel].enabled() {
            self.channels[channel].counter = self.channels[channel].reload;
            self.channels[channel].accum = 0;
        }
    }

    /// Advance every timer by `cycles` system cycles, cascading overflow
    /// into the next channel's count-up input and raising interrupts for
    /// any channel with its IRQ-enable bit set.
    pub fn tick(&mut self, cycles: u64, interrupts: &mut Interrupts) {
        let mut cascade = false;
        for index in 0..4 {
            let channel = &mut self.channels[index];
            if !channel.enabled() {
                cascade = false;
                continue;
            }

            let overflowed = if index > 0 && channel.count_up() {
                if cascade { channel.step_one() } else { false }
            } else {
                let prescaler = channel.prescaler();
                channel.accum += cycles as u32;
                let mut fired = false;
                while channel.accum >= prescaler {
                    channel.accum -= prescaler;
                    if channel.step_one() {
                        fired = true;
                    }
                }
                fired
            };

            if overflowed && channel.control & TimerChannel::IRQ_ENABLE != 0 {
                interrupts.raise(InterruptKind::timer(index as u8));
            }
            cascade = overflowed;
        }
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_reloads_and_raises_interrupt() {
        let mut timers = Timers::new();
        let mut interrupts = Interrupts::default();
        timers.write_reload(0, 0xFFFE);
        timers.write_control(0, TimerChannel::ENABLE | TimerChannel::IRQ_ENABLE);

        timers.tick(1, &mut interrupts);
        assert_eq!(timers.read_reload_or_counter(0), 0xFFFF);
        timers.tick(1, &mut interrupts);
        assert_eq!(timers.read_reload_or_counter(0), 0xFFFE);
        assert_eq!(interrupts.iflags, InterruptKind::Timer0.mask());
    }

    #[test]
    fn count_up_cascades_from_previous_channel() {
        let mut timers = Timers::new();
        let mut interrupts = Interrupts::default();
        timers.write_reload(0, 0xFFFF);
        timers.write_control(0, TimerChannel::ENABLE);
        timers.write_reload(1, 0);
        timers.write_control(1, TimerChannel::ENABLE | TimerChannel::COUNT_UP);

        timers.tick(1, &mut interrupts);
        assert_eq!(timers.read_reload_or_counter(1), 1, "channel 1 should cascade once on channel 0 overflow");
    }
}
