//! Everything inside the Game Boy except the CPU, behind one [`Board`] trait
//! so the interpreter doesn't have to carry a dozen separate arguments
//! through every handler. [`BoardImpl`] is the only implementation; the
//! trait exists so the CPU's generic bound stays short and the concrete
//! wiring stays in one place.

use std::collections::HashSet;

use crate::address::{Addr, IOReg, VideoMemAddr};
use crate::cartridge::Cartridge;
use crate::interrupt_system::InterruptSystem;
use crate::joypad::{Buttons, JoyPad};
use crate::memory::InternalMem;
use crate::ppu::{VideoFrameStatus, PPU};
use crate::serial_port::SerialPort;
use crate::timer::Timer;

pub trait Board {
    /// Reads a byte, charging one machine cycle to the step in progress.
    fn read8(&mut self, addr: u16) -> u8;

    /// Writes a byte, charging one machine cycle to the step in progress.
    fn write8(&mut self, addr: u16, val: u8);

    /// Charges one machine cycle with no accompanying bus transaction
    /// (internal ALU/address-computation cycles instructions sometimes need).
    fn tick_internal(&mut self);

    fn read16(&mut self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read8(addr), self.read8(addr.wrapping_add(1))])
    }

    fn write16(&mut self, addr: u16, val: u16) {
        let bytes = val.to_le_bytes();
        self.write8(addr, bytes[0]);
        self.write8(addr.wrapping_add(1), bytes[1]);
    }

    fn ir_system(&mut self) -> &mut InterruptSystem;

    /// Drains the cycle count accumulated by bus access and internal ticks
    /// since the last call, resetting the counter to zero.
    fn take_cycles(&mut self) -> u16;

    /// Advances Timer then PPU by exactly `cycles` machine cycles, in that
    /// order, as the last two steps of a CPU step.
    fn advance_components(&mut self, cycles: u16);
}

pub struct BoardImpl<C> {
    mem: InternalMem,
    cartridge: C,
    ppu: PPU,
    ir_system: InterruptSystem,
    joypad: JoyPad,
    timer: Timer,
    serial_port: SerialPort,
    /// Fallback byte-cell storage for registers this core does not
    /// interpret (sound, boot-rom-disable latch): reads/writes are total,
    /// but the bytes have no further effect.
    io_scratch: Box<[u8; 0x80]>,
    warned: HashSet<&'static str>,
    cycles: u16,
}

impl<C: Cartridge> BoardImpl<C> {
    pub fn new(cartridge: C) -> Self {
        BoardImpl {
            mem: InternalMem::new(),
            cartridge,
            ppu: PPU::new(),
            ir_system: InterruptSystem::new(),
            joypad: JoyPad::new(),
            timer: Timer::new(),
            serial_port: SerialPort::new(),
            io_scratch: Box::new([0; 0x80]),
            warned: HashSet::new(),
            cycles: 0,
        }
    }

    pub fn query_video_frame_status(&mut self) -> VideoFrameStatus {
        self.ppu.query_frame_status()
    }

    pub fn notify_buttons_pressed(&mut self, buttons: Buttons) {
        self.joypad
            .notify_buttons_pressed(&mut self.ir_system, buttons);
    }

    pub fn notify_buttons_released(&mut self, buttons: Buttons) {
        self.joypad.notify_buttons_released(buttons);
    }

    pub fn notify_buttons_state(&mut self, buttons: Buttons) {
        self.joypad
            .notify_buttons_state(&mut self.ir_system, buttons);
    }

    fn warn_once(&mut self, category: &'static str, detail: std::fmt::Arguments) {
        if self.warned.insert(category) {
            log::warn!("{}", detail);
        }
    }

    /// Reads a byte without charging a cycle or touching OAM-DMA semantics.
    /// Used only by the OAM DMA copy itself.
    fn raw_read8(&self, addr: u16) -> u8 {
        match Addr::from(addr) {
            Addr::Rom(addr) => self.cartridge.read_rom(addr),
            Addr::CRam(addr) => self.cartridge.read_cram(addr),
            Addr::WRam(addr) => self.mem.read_wram(addr),
            Addr::HRam(addr) => self.mem.read_hram(addr),
            Addr::VideoMem(VideoMemAddr::VRam(addr)) => {
                self.ppu.read_video_mem(VideoMemAddr::VRam(addr))
            }
            Addr::VideoMem(VideoMemAddr::Oam(addr)) => {
                self.ppu.read_video_mem(VideoMemAddr::Oam(addr))
            }
            Addr::Unusable => 0xFF,
            Addr::IO(_) | Addr::IE => 0xFF,
        }
    }

    fn run_oam_dma(&mut self, source_page: u8) {
        let src_base = (source_page as u16) << 8;

        for i in 0..0xA0u16 {
            let byte = self.raw_read8(src_base + i);
            self.ppu.oam_mut()[i as usize] = byte;
        }
    }
}

impl<C: Cartridge> Board for BoardImpl<C> {
    fn read8(&mut self, addr: u16) -> u8 {
        self.cycles += 1;

        match Addr::from(addr) {
            Addr::Rom(addr) => self.cartridge.read_rom(addr),
            Addr::CRam(addr) => self.cartridge.read_cram(addr),
            Addr::WRam(addr) => self.mem.read_wram(addr),
            Addr::HRam(addr) => self.mem.read_hram(addr),
            Addr::VideoMem(vid_addr) => self.ppu.read_video_mem(vid_addr),
            Addr::Unusable => 0xFF,
            Addr::IO(IOReg::P1) => self.joypad.read_p1(),
            Addr::IO(IOReg::Serial(reg)) => self.serial_port.read_reg(reg),
            Addr::IO(IOReg::Timer(reg)) => self.timer.read_reg(reg),
            Addr::IO(IOReg::Ppu(reg)) => self.ppu.read_reg(reg),
            Addr::IO(IOReg::IF) => self.ir_system.read_if(),
            Addr::IO(IOReg::OamDma) => self.io_scratch[0x46],
            Addr::IO(IOReg::BootRomDisable) => self.io_scratch[0x50],
            Addr::IO(IOReg::Unimplemented(addr)) => {
                self.warn_once(
                    "io_read",
                    format_args!("read of unimplemented IO register {:#06X}", addr),
                );
                self.io_scratch[(addr - 0xFF00) as usize]
            }
            Addr::IE => self.ir_system.read_ie(),
        }
    }

    fn write8(&mut self, addr: u16, val: u8) {
        self.cycles += 1;

        match Addr::from(addr) {
            Addr::Rom(addr) => self.cartridge.write_rom(addr, val),
            Addr::CRam(addr) => self.cartridge.write_cram(addr, val),
            Addr::WRam(addr) => self.mem.write_wram(addr, val),
            Addr::HRam(addr) => self.mem.write_hram(addr, val),
            Addr::VideoMem(vid_addr) => self.ppu.write_video_mem(vid_addr, val),
            Addr::Unusable => {}
            Addr::IO(IOReg::P1) => self.joypad.write_p1(val),
            Addr::IO(IOReg::Serial(reg)) => self.serial_port.write_reg(reg, val),
            Addr::IO(IOReg::Timer(reg)) => self.timer.write_reg(reg, val),
            Addr::IO(IOReg::Ppu(reg)) => self.ppu.write_reg(&mut self.ir_system, reg, val),
            Addr::IO(IOReg::OamDma) => {
                self.io_scratch[0x46] = val;
                self.run_oam_dma(val);
            }
            Addr::IO(IOReg::BootRomDisable) => self.io_scratch[0x50] = val,
            Addr::IO(IOReg::IF) => self.ir_system.write_if(val),
            Addr::IO(IOReg::Unimplemented(addr)) => {
                self.warn_once(
                    "io_write",
                    format_args!("write to unimplemented IO register {:#06X}", addr),
                );
                self.io_scratch[(addr - 0xFF00) as usize] = val;
            }
            Addr::IE => self.ir_system.write_ie(val),
        }
    }

    fn tick_internal(&mut self) {
        self.cycles += 1;
    }

    fn ir_system(&mut self) -> &mut InterruptSystem {
        &mut self.ir_system
    }

    fn take_cycles(&mut self) -> u16 {
        std::mem::take(&mut self.cycles)
    }

    fn advance_components(&mut self, cycles: u16) {
        self.timer.tick(cycles, &mut self.ir_system);
        self.ppu.tick(cycles, &mut self.ir_system);
    }
}
