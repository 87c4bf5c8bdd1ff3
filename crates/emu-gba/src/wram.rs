//! On-board (`0x0200_0000`, 256 KiB, mirrored every `0x4_0000`) and on-chip
//! (`0x0300_0000`, 32 KiB, mirrored every `0x8000`) work RAM.

pub const BOARD_SIZE: usize = 256 * 1024;
pub const CHIP_SIZE: usize = 32 * 1024;

pub struct WorkRam {
    board: Vec<u8>,
    chip: Vec<u8>,
}

impl WorkRam {
    #[must_use]
    pub fn new() -> Self {
        Self { board: vec![0; BOARD_SIZE], chip: vec![0; CHIP_SIZE] }
    }

    fn board_index(offset: u32) -> usize {
        offset as usize % BOARD_SIZE
    }

    fn chip_index(offset: u32) -> usize {
        offset as usize % CHIP_SIZE
    }

    pub fn read_board_byte(&self, offset: u32) -> u8 {
        self.board[Self::board_index(offset)]
    }

    pub fn write_board_byte(&mut self, offset: u32, value: u8) {
        let i = Self::board_index(offset);
        self.board[i] = value;
    }

    pub fn read_chip_byte(&self, offset: u32) -> u8 {
        self.chip[Self::chip_index(offset)]
    }

    pub fn write_chip_byte(&mut self, offset: u32, value: u8) {
        let i = Self::chip_index(offset);
        self.chip[i] = value;
    }
}

impl Default for WorkRam {
    fn default() -> Self {
        Self::new()
    }
}
