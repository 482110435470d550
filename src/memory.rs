//! Plain, un-banked storage for the regions the bus owns directly: work RAM
//! and high RAM. No boot ROM is modeled; the core starts from the documented
//! post-boot register and memory state instead of executing one.

const WRAM_LEN: usize = 0x2000;
const HRAM_LEN: usize = 0x7F;

pub struct InternalMem {
    wram: Box<[u8]>,
    hram: Box<[u8]>,
}

impl InternalMem {
    pub fn new() -> InternalMem {
        InternalMem {
            wram: vec![0; WRAM_LEN].into_boxed_slice(),
            hram: vec![0; HRAM_LEN].into_boxed_slice(),
        }
    }

    pub fn read_wram(&self, addr: u16) -> u8 {
        self.wram[addr as usize]
    }

    pub fn write_wram(&mut self, addr: u16, val: u8) {
        self.wram[addr as usize] = val;
    }

    pub fn read_hram(&self, addr: u16) -> u8 {
        self.hram[addr as usize]
    }

    pub fn write_hram(&mut self, addr: u16, val: u8) {
        self.hram[addr as usize] = val;
    }
}
