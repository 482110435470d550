//! A cycle-stepped Game Boy (DMG) core: CPU interpreter, memory bus,
//! interrupts, timer, joypad and a background-only PPU. Cartridge ingestion
//! beyond "no MBC" and presentation (windowing, audio, input translation)
//! are left to the embedder; see [`Cartridge`] and [`VideoFrameStatus`].

mod address;
mod board;
mod cartridge;
mod cpu;
mod error;
mod interrupt_system;
mod joypad;
mod memory;
mod ppu;
mod serial_port;
mod timer;
mod util;

use board::{Board, BoardImpl};
use cpu::CPU;

pub use cartridge::{Cartridge, CartridgeHeader, NoMbc};
pub use error::{CoreError, CoreResult};
pub use joypad::Buttons;
pub use ppu::{MemPixel, VideoFrameStatus};

/// Top-level handle to a running DMG. Owns the CPU and everything the bus
/// reaches; driving it forward one instruction at a time is the only thing
/// an embedder needs to do.
pub struct Emulator<C> {
    cpu: CPU,
    board: BoardImpl<C>,
}

impl<C: Cartridge> Emulator<C> {
    pub fn new(cartridge: C) -> Self {
        Emulator {
            cpu: CPU::new(),
            board: BoardImpl::new(cartridge),
        }
    }

    /// Runs exactly one CPU step (one instruction, one interrupt dispatch,
    /// or one idle cycle while halted/stopped/stuck) and advances the rest
    /// of the board by the cycles that step took.
    pub fn step(&mut self) -> CoreResult<()> {
        self.cpu.step(&mut self.board)
    }

    pub fn query_video_frame_status(&mut self) -> VideoFrameStatus {
        self.board.query_video_frame_status()
    }

    /// Call this if your frontend encounters a KEY_DOWN event (or sth equivalent).
    /// `Buttons::A | Buttons::B` means A and B were both pressed, with no info
    /// available about the other buttons, which will remain unchanged.
    pub fn notify_buttons_pressed(&mut self, buttons: Buttons) {
        self.board.notify_buttons_pressed(buttons);
    }

    /// Call this if your frontend encounters a KEY_UP event (or sth equivalent).
    /// `Buttons::A | Buttons::B` means A and B were both released, with no info
    /// available about the other buttons, which will remain unchanged.
    pub fn notify_buttons_released(&mut self, buttons: Buttons) {
        self.board.notify_buttons_released(buttons);
    }

    /// Alternative API if your frontend isn't suited for 'KEY_UP'/'KEY_DOWN'
    /// events. `Buttons::A | Buttons::B` means A and B are pressed, and the
    /// rest of the buttons are not pressed.
    pub fn notify_buttons_state(&mut self, buttons: Buttons) {
        self.board.notify_buttons_state(buttons);
    }
}

impl Emulator<NoMbc> {
    /// Convenience constructor for the common case: a flat, bankless ROM
    /// image. Validates the cartridge header before handing back a core.
    pub fn from_rom_bytes(rom: Vec<u8>) -> CoreResult<Self> {
        CartridgeHeader::parse(&rom)?;
        Ok(Self::new(NoMbc::new(rom)))
    }
}
