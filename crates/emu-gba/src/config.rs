//! GBA machine configuration: the ROM/BIOS images and persisted save data a
//! collaborator supplies to construct a [`crate::GbaMachine`].

/// Construction parameters for a [`crate::GbaMachine`].
///
/// BIOS and ROM bytes are consumed collaborators per the core's external
/// interfaces; provisioning them (reading a file, unzipping an archive) is
/// the caller's job.
pub struct GbaConfig {
    /// Exactly 16 KiB. Mapped read-only at `0x0000_0000`; never executed by
    /// this core directly (reset lands the CPU at [`cpu_arm7tdmi::CARTRIDGE_ENTRY`]
    /// rather than stepping through the BIOS boot sequence).
    pub bios: Vec<u8>,
    /// Cartridge ROM, 32 KiB to 32 MiB. Mapped at `0x0800_0000` and mirrored
    /// to fill the next power-of-two boundary.
    pub rom: Vec<u8>,
    /// Prior SRAM/flash save contents, if resuming a save. `None` starts
    /// with a zeroed backup region.
    pub save: Option<Vec<u8>>,
}
