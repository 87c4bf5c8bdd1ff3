//! Cartridge ROM (`0x0800_0000`-`0x0DFF_FFFF`, read-only, mirrored to the
//! next power-of-two) and the SRAM/flash backup region (`0x0E00_0000`-).

/// A GBA game pak: its ROM image plus whatever persists across sessions.
pub struct Cartridge {
    rom: Vec<u8>,
    /// Mirror period for ROM reads: the smallest power of two `>= rom.len()`.
    /// Real hardware mirrors by address decode, not by ROM size, but this
    /// matches observed behavior for the common case of power-of-two ROMs
    /// and degrades gracefully for odd sizes.
    rom_mirror_mask: u32,
    sram: Vec<u8>,
}

/// Backup storage is modeled as a flat byte array; this core does not
/// distinguish SRAM from flash chip command sequences (Non-goal).
const SRAM_SIZE: usize = 64 * 1024;

impl Cartridge {
    #[must_use]
    pub fn new(rom: Vec<u8>, save: Option<Vec<u8>>) -> Self {
        let mirror_len = rom.len().max(1).next_power_of_two();
        let sram = save.unwrap_or_else(|| vec![0xFF; SRAM_SIZE]);
        Self { rom, rom_mirror_mask: (mirror_len - 1) as u32, sram }
    }

    pub fn read_rom_byte(&self, offset: u32) -> u8 {
        let idx = (offset & self.rom_mirror_mask) as usize;
        self.rom.get(idx).copied().unwrap_or(0xFF)
    }

    pub fn read_rom_half(&self, offset: u32) -> u16 {
        u16::from(self.read_rom_byte(offset)) | (u16::from(self.read_rom_byte(offset + 1)) << 8)
    }

    pub fn read_rom_word(&self, offset: u32) -> u32 {
        u32::from(self.read_rom_half(offset)) | (u32::from(self.read_rom_half(offset + 2)) << 16)
    }

    pub fn read_sram_byte(&self, offset: u32) -> u8 {
        let idx = offset as usize % self.sram.len();
        self.sram[idx]
    }

    pub fn write_sram_byte(&mut self, offset: u32, value: u8) {
        let len = self.sram.len();
        self.sram[offset as usize % len] = value;
    }

    /// Raw backup-region contents, indexed from 0 at cartridge address
    /// `0x0E00_0000`, for a caller that wants to persist the save file.
    #[must_use]
    pub fn save_bytes(&self) -> &[u8] {
        &self.sram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_mirrors_at_the_next_power_of_two() {
        let mut rom = vec![0u8; 0x2000];
        rom[0] = 0x42;
        let cart = Cartridge::new(rom, None);
        assert_eq!(cart.read_rom_byte(0x2000), 0x42);
    }

    #[test]
    fn reads_past_rom_end_within_the_mirror_window_return_open_value() {
        let rom = vec![0x11u8; 0x1800]; // not a power of two
        let cart = Cartridge::new(rom, None);
        assert_eq!(cart.read_rom_byte(0x1900), 0xFF, "padding within the mirror window reads as 0xFF");
    }

    #[test]
    fn sram_writes_persist_and_wrap_at_its_length() {
        let mut cart = Cartridge::new(vec![0; 0x1000], None);
        cart.write_sram_byte(10, 0x55);
        assert_eq!(cart.read_sram_byte(10), 0x55);
        assert_eq!(cart.save_bytes()[10], 0x55);
    }
}
