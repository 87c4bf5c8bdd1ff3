//! ARM7TDMI CPU core: ARM/THUMB decode, the banked register file, the
//! barrel shifter, and the exception entry procedure.
//!
//! Timing is approximated as a flat 1 cycle per instruction (see the
//! `timing` open question in the design notes) rather than modeling the
//! real pipeline's bus-contention cycle counts.

pub mod alu;
mod arm;
pub mod bus;
pub mod condition;
mod cpu;
mod decode;
mod exceptions;
pub mod registers;
pub mod shifter;
mod thumb;

pub use alu::AluResult;
pub use bus::Arm7Bus;
pub use condition::build_condition_lut;
pub use cpu::{Cpu, CARTRIDGE_ENTRY};
pub use exceptions::Vector;
pub use registers::{Mode, Psr, RegisterFile};
pub use shifter::{ShiftKind, ShiftResult};
