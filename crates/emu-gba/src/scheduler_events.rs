//! Events driven through [`emu_core::Scheduler`] to advance the PPU stub's
//! scanline timing independently of CPU instruction boundaries.

/// The two recurring events that walk the PPU stub's scanline clock. Each
/// firing reschedules its own next occurrence `CYCLES_PER_LINE` cycles out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    /// Fires `HDRAW_CYCLES` into the current line: sets the HBlank flag,
    /// raises the HBlank interrupt if enabled, and triggers HBlank DMA.
    HBlankStart,
    /// Fires at the end of the current line: clears HBlank, advances
    /// `VCOUNT`, and handles VBlank/VCount transitions.
    EndOfLine,
}
