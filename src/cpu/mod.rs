//! The SM83 interpreter: register file, interrupt/HALT/STOP handling, and
//! opcode dispatch. [`CPU::step`] is the only entry point external callers
//! need; everything else in this module exists to support it.

mod execute;
mod operands;
mod registers;

use crate::board::Board;
use crate::error::{CoreError, CoreResult};
use crate::interrupt_system::Interrupt;
use execute::Cond;
use operands::{Dst8, HighRamOperand, HlOperand, Imm8, ImmAddr, Src8};
pub use registers::{Flags, Registers, R16, R8};

/// Opcodes Nintendo never assigned a meaning to. Executing one wedges the
/// CPU permanently, same as on real hardware.
const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HaltState {
    Running,
    /// Entered by HALT; resolved back to Running as soon as any enabled
    /// interrupt is requested, whether or not IME is set.
    Halted,
    /// Entered by STOP. Nothing in this core's scope (no speed-switch, no
    /// button-press wakeup) ever leaves this state again.
    Stopped,
    /// Entered by executing an illegal opcode. Terminal.
    Stuck,
}

pub struct CPU {
    pub reg: Registers,
    pub halt_state: HaltState,
}

impl CPU {
    pub fn new() -> CPU {
        let mut reg = Registers::new();
        reg.set_r16(R16::AF, 0x01B0);
        reg.set_r16(R16::BC, 0x0013);
        reg.set_r16(R16::DE, 0x00D8);
        reg.set_r16(R16::HL, 0x014D);
        reg.set_r16(R16::SP, 0xFFFE);
        reg.set_r16(R16::PC, 0x0100);

        CPU {
            reg,
            halt_state: HaltState::Running,
        }
    }

    /// Runs interrupt arbitration, then one instruction (or one idle cycle,
    /// if halted/stopped/stuck), then advances Timer and PPU by however many
    /// cycles that took.
    pub fn step<B: Board>(&mut self, board: &mut B) -> CoreResult<()> {
        board.ir_system().tick_ei_countdown();

        if let Some(interrupt) = board.ir_system().query_interrupt_request() {
            if self.halt_state == HaltState::Halted {
                self.halt_state = HaltState::Running;
            }

            if board.ir_system().ime() {
                self.service_interrupt(board, interrupt);
                return self.drain_cycles(board);
            }
        }

        match self.halt_state {
            HaltState::Halted | HaltState::Stopped | HaltState::Stuck => {
                board.tick_internal();
            }
            HaltState::Running => {
                let pc = self.reg.get_r16(R16::PC);
                let opcode = self.read8i(board);
                self.dispatch(board, pc, opcode)?;
            }
        }

        self.drain_cycles(board)
    }

    fn drain_cycles<B: Board>(&mut self, board: &mut B) -> CoreResult<()> {
        let cycles = board.take_cycles();
        board.advance_components(cycles);
        Ok(())
    }

    fn service_interrupt<B: Board>(&mut self, board: &mut B, interrupt: Interrupt) {
        board.ir_system().disable_immediate();
        board.ir_system().acknowledge(interrupt);

        board.tick_internal();
        board.tick_internal();
        board.tick_internal();

        let pc = self.reg.get_r16(R16::PC);
        self.push16(board, pc);
        self.reg.set_r16(R16::PC, interrupt.vector());
    }

    pub(crate) fn read8i<B: Board>(&mut self, board: &mut B) -> u8 {
        let pc = self.reg.get_r16(R16::PC);
        self.reg.set_r16(R16::PC, pc.wrapping_add(1));
        board.read8(pc)
    }

    pub(crate) fn read16i<B: Board>(&mut self, board: &mut B) -> u16 {
        let pc = self.reg.get_r16(R16::PC);
        self.reg.set_r16(R16::PC, pc.wrapping_add(2));
        board.read16(pc)
    }

    pub(crate) fn push16<B: Board>(&mut self, board: &mut B, val: u16) {
        let sp = self.reg.get_r16(R16::SP).wrapping_sub(2);
        self.reg.set_r16(R16::SP, sp);
        board.write16(sp, val);
    }

    pub(crate) fn pop16<B: Board>(&mut self, board: &mut B) -> u16 {
        let sp = self.reg.get_r16(R16::SP);
        let val = board.read16(sp);
        self.reg.set_r16(R16::SP, sp.wrapping_add(2));
        val
    }

    pub(crate) fn enter_halt(&mut self) {
        self.halt_state = HaltState::Halted;
    }

    pub(crate) fn enter_stop(&mut self) {
        self.halt_state = HaltState::Stopped;
    }

    fn enter_stuck(&mut self) {
        self.halt_state = HaltState::Stuck;
    }

    fn dispatch<B: Board>(&mut self, board: &mut B, pc: u16, opcode: u8) -> CoreResult<()> {
        use execute::*;
        use R16::*;
        use R8::*;

        if ILLEGAL_OPCODES.contains(&opcode) {
            self.enter_stuck();
            return Err(CoreError::UnsupportedOpcode {
                pc,
                opcode,
                cb_byte: None,
            });
        }

        match opcode {
            0x00 => {}
            0x01 => ld_rr_d16(self, board, BC),
            0x02 => ld8(self, board, BC, A),
            0x03 => inc_rr(self, board, BC),
            0x04 => inc8(self, board, B),
            0x05 => dec8(self, board, B),
            0x06 => ld8(self, board, B, Imm8),
            0x07 => rlca(self),
            0x08 => ld_a16_sp(self, board),
            0x09 => add_hl_rr(self, board, BC),
            0x0A => ld8(self, board, A, BC),
            0x0B => dec_rr(self, board, BC),
            0x0C => inc8(self, board, C),
            0x0D => dec8(self, board, C),
            0x0E => ld8(self, board, C, Imm8),
            0x0F => rrca(self),

            0x10 => stop(self),
            0x11 => ld_rr_d16(self, board, DE),
            0x12 => ld8(self, board, DE, A),
            0x13 => inc_rr(self, board, DE),
            0x14 => inc8(self, board, D),
            0x15 => dec8(self, board, D),
            0x16 => ld8(self, board, D, Imm8),
            0x17 => rla(self),
            0x18 => jr_cond(self, board, Cond::None),
            0x19 => add_hl_rr(self, board, DE),
            0x1A => ld8(self, board, A, DE),
            0x1B => dec_rr(self, board, DE),
            0x1C => inc8(self, board, E),
            0x1D => dec8(self, board, E),
            0x1E => ld8(self, board, E, Imm8),
            0x1F => rra(self),

            0x20 => jr_cond(self, board, Cond::NZ),
            0x21 => ld_rr_d16(self, board, HL),
            0x22 => ld8(self, board, HlOperand::HLi, A),
            0x23 => inc_rr(self, board, HL),
            0x24 => inc8(self, board, H),
            0x25 => dec8(self, board, H),
            0x26 => ld8(self, board, H, Imm8),
            0x27 => daa(self),
            0x28 => jr_cond(self, board, Cond::Z),
            0x29 => add_hl_rr(self, board, HL),
            0x2A => ld8(self, board, A, HlOperand::HLi),
            0x2B => dec_rr(self, board, HL),
            0x2C => inc8(self, board, L),
            0x2D => dec8(self, board, L),
            0x2E => ld8(self, board, L, Imm8),
            0x2F => cpl(self),

            0x30 => jr_cond(self, board, Cond::NC),
            0x31 => ld_rr_d16(self, board, SP),
            0x32 => ld8(self, board, HlOperand::HLd, A),
            0x33 => inc_rr(self, board, SP),
            0x34 => inc8(self, board, HL),
            0x35 => dec8(self, board, HL),
            0x36 => ld8(self, board, HL, Imm8),
            0x37 => scf(self),
            0x38 => jr_cond(self, board, Cond::C),
            0x39 => add_hl_rr(self, board, SP),
            0x3A => ld8(self, board, A, HlOperand::HLd),
            0x3B => dec_rr(self, board, SP),
            0x3C => inc8(self, board, A),
            0x3D => dec8(self, board, A),
            0x3E => ld8(self, board, A, Imm8),
            0x3F => ccf(self),

            0x76 => halt(self),
            0x40..=0x7F => {
                let dst = Reg8Col::from_bits(opcode >> 3);
                let src = Reg8Col::from_bits(opcode);
                ld8(self, board, dst, src);
            }

            0x80..=0xBF => {
                let src = Reg8Col::from_bits(opcode);
                match (opcode >> 3) & 0x7 {
                    0 => add8(self, board, src),
                    1 => adc8(self, board, src),
                    2 => sub8(self, board, src),
                    3 => sbc8(self, board, src),
                    4 => and8(self, board, src),
                    5 => xor8(self, board, src),
                    6 => or8(self, board, src),
                    7 => cp8(self, board, src),
                    _ => unreachable!(),
                }
            }

            0xC0 => ret_cond(self, board, Cond::NZ),
            0xC1 => pop(self, board, BC),
            0xC2 => jp_cond(self, board, Cond::NZ),
            0xC3 => jp_cond(self, board, Cond::None),
            0xC4 => call_cond(self, board, Cond::NZ),
            0xC5 => push(self, board, BC),
            0xC6 => add8(self, board, Imm8),
            0xC7 => rst(self, board, 0x00),
            0xC8 => ret_cond(self, board, Cond::Z),
            0xC9 => ret(self, board),
            0xCA => jp_cond(self, board, Cond::Z),
            0xCB => {
                let cb_pc = self.reg.get_r16(R16::PC);
                let cb = self.read8i(board);
                self.dispatch_cb(board, cb_pc, cb)?;
            }
            0xCC => call_cond(self, board, Cond::Z),
            0xCD => call_cond(self, board, Cond::None),
            0xCE => adc8(self, board, Imm8),
            0xCF => rst(self, board, 0x08),

            0xD0 => ret_cond(self, board, Cond::NC),
            0xD1 => pop(self, board, DE),
            0xD2 => jp_cond(self, board, Cond::NC),
            0xD4 => call_cond(self, board, Cond::NC),
            0xD5 => push(self, board, DE),
            0xD6 => sub8(self, board, Imm8),
            0xD7 => rst(self, board, 0x10),
            0xD8 => ret_cond(self, board, Cond::C),
            0xD9 => reti(self, board),
            0xDA => jp_cond(self, board, Cond::C),
            0xDC => call_cond(self, board, Cond::C),
            0xDE => sbc8(self, board, Imm8),
            0xDF => rst(self, board, 0x18),

            0xE0 => ld8(self, board, HighRamOperand::Imm8, A),
            0xE1 => pop(self, board, HL),
            0xE2 => ld8(self, board, HighRamOperand::C, A),
            0xE5 => push(self, board, HL),
            0xE6 => and8(self, board, Imm8),
            0xE7 => rst(self, board, 0x20),
            0xE8 => add_sp_r8(self, board),
            0xE9 => jp_hl(self),
            0xEA => ld8(self, board, ImmAddr, A),
            0xEE => xor8(self, board, Imm8),
            0xEF => rst(self, board, 0x28),

            0xF0 => ld8(self, board, A, HighRamOperand::Imm8),
            0xF1 => pop(self, board, AF),
            0xF2 => ld8(self, board, A, HighRamOperand::C),
            0xF3 => di(board),
            0xF5 => push(self, board, AF),
            0xF6 => or8(self, board, Imm8),
            0xF7 => rst(self, board, 0x30),
            0xF8 => ld_hl_sp_r8(self, board),
            0xF9 => ld_sp_hl(self, board),
            0xFA => ld8(self, board, A, ImmAddr),
            0xFB => ei(board),
            0xFE => cp8(self, board, Imm8),
            0xFF => rst(self, board, 0x38),

            _ => unreachable!("illegal opcode {:#04X} already filtered out", opcode),
        }

        Ok(())
    }

    fn dispatch_cb<B: Board>(&mut self, board: &mut B, pc: u16, cb: u8) -> CoreResult<()> {
        use execute::*;

        let operand = Reg8Col::from_bits(cb);
        let _ = pc; // reserved for future diagnostics; CB has no illegal opcodes

        match cb >> 6 {
            0 => match (cb >> 3) & 0x7 {
                0 => rlc(self, board, operand),
                1 => rrc(self, board, operand),
                2 => rl(self, board, operand),
                3 => rr(self, board, operand),
                4 => sla(self, board, operand),
                5 => sra(self, board, operand),
                6 => swap(self, board, operand),
                7 => srl(self, board, operand),
                _ => unreachable!(),
            },
            1 => bit(self, board, (cb >> 3) & 0x7, operand),
            2 => res(self, board, (cb >> 3) & 0x7, operand),
            3 => set(self, board, (cb >> 3) & 0x7, operand),
            _ => unreachable!(),
        }

        Ok(())
    }
}

/// Maps the 3-bit register-select field shared by the `LD r,r'`/ALU/CB
/// opcode blocks onto the actual operand, so those blocks can be decoded by
/// bit-masking the opcode instead of writing out all 64-or-so combinations.
#[derive(Copy, Clone)]
enum Reg8Col {
    B,
    C,
    D,
    E,
    H,
    L,
    HlInd,
    A,
}

impl Reg8Col {
    fn from_bits(bits: u8) -> Reg8Col {
        match bits & 0x7 {
            0 => Reg8Col::B,
            1 => Reg8Col::C,
            2 => Reg8Col::D,
            3 => Reg8Col::E,
            4 => Reg8Col::H,
            5 => Reg8Col::L,
            6 => Reg8Col::HlInd,
            7 => Reg8Col::A,
            _ => unreachable!(),
        }
    }
}

impl operands::Src8 for Reg8Col {
    fn read<B: Board>(self, cpu: &mut CPU, board: &mut B) -> u8 {
        match self {
            Reg8Col::B => R8::B.read(cpu, board),
            Reg8Col::C => R8::C.read(cpu, board),
            Reg8Col::D => R8::D.read(cpu, board),
            Reg8Col::E => R8::E.read(cpu, board),
            Reg8Col::H => R8::H.read(cpu, board),
            Reg8Col::L => R8::L.read(cpu, board),
            Reg8Col::HlInd => R16::HL.read(cpu, board),
            Reg8Col::A => R8::A.read(cpu, board),
        }
    }
}

impl operands::Dst8 for Reg8Col {
    fn write<B: Board>(self, cpu: &mut CPU, board: &mut B, val: u8) {
        match self {
            Reg8Col::B => R8::B.write(cpu, board, val),
            Reg8Col::C => R8::C.write(cpu, board, val),
            Reg8Col::D => R8::D.write(cpu, board, val),
            Reg8Col::E => R8::E.write(cpu, board, val),
            Reg8Col::H => R8::H.write(cpu, board, val),
            Reg8Col::L => R8::L.write(cpu, board, val),
            Reg8Col::HlInd => R16::HL.write(cpu, board, val),
            Reg8Col::A => R8::A.write(cpu, board, val),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardImpl;
    use crate::cartridge::NoMbc;

    fn board_with(program: &[u8]) -> BoardImpl<NoMbc> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
        BoardImpl::new(NoMbc::new(rom))
    }

    #[test]
    fn post_boot_registers_match_documented_values() {
        let cpu = CPU::new();
        assert_eq!(cpu.reg.get_r16(R16::AF), 0x01B0);
        assert_eq!(cpu.reg.get_r16(R16::BC), 0x0013);
        assert_eq!(cpu.reg.get_r16(R16::DE), 0x00D8);
        assert_eq!(cpu.reg.get_r16(R16::HL), 0x014D);
        assert_eq!(cpu.reg.get_r16(R16::SP), 0xFFFE);
        assert_eq!(cpu.reg.get_r16(R16::PC), 0x0100);
    }

    #[test]
    fn add_sets_half_carry_and_carry() {
        // LD A,0x0F ; ADD A,0x01
        let mut board = board_with(&[0x3E, 0x0F, 0xC6, 0x01]);
        let mut cpu = CPU::new();
        cpu.step(&mut board).unwrap();
        cpu.step(&mut board).unwrap();
        assert_eq!(cpu.reg.get_r8(R8::A), 0x10);
        assert!(cpu.reg.flags.contains(Flags::H));
        assert!(!cpu.reg.flags.contains(Flags::C));
        assert!(!cpu.reg.flags.contains(Flags::Z));
    }

    #[test]
    fn sub_sets_borrow_flags() {
        // LD A,0x00 ; SUB 0x01
        let mut board = board_with(&[0x3E, 0x00, 0xD6, 0x01]);
        let mut cpu = CPU::new();
        cpu.step(&mut board).unwrap();
        cpu.step(&mut board).unwrap();
        assert_eq!(cpu.reg.get_r8(R8::A), 0xFF);
        assert!(cpu.reg.flags.contains(Flags::N));
        assert!(cpu.reg.flags.contains(Flags::H));
        assert!(cpu.reg.flags.contains(Flags::C));
    }

    #[test]
    fn conditional_jump_not_taken_falls_through() {
        // XOR A (Z=1) ; JR NZ,+5 ; NOP
        let mut board = board_with(&[0xAF, 0x20, 0x05, 0x00]);
        let mut cpu = CPU::new();
        cpu.step(&mut board).unwrap();
        let pc_before = cpu.reg.get_r16(R16::PC);
        cpu.step(&mut board).unwrap();
        assert_eq!(cpu.reg.get_r16(R16::PC), pc_before + 2);
    }

    #[test]
    fn call_then_ret_round_trips_pc_and_sp() {
        // CALL 0x0200 ; at 0x0200: RET
        let mut rom = vec![0u8; 0x8000];
        rom[0x0100..0x0103].copy_from_slice(&[0xCD, 0x00, 0x02]);
        rom[0x0200] = 0xC9;
        let mut board = BoardImpl::new(NoMbc::new(rom));
        let mut cpu = CPU::new();
        let sp_before = cpu.reg.get_r16(R16::SP);
        cpu.step(&mut board).unwrap();
        assert_eq!(cpu.reg.get_r16(R16::PC), 0x0200);
        cpu.step(&mut board).unwrap();
        assert_eq!(cpu.reg.get_r16(R16::PC), 0x0103);
        assert_eq!(cpu.reg.get_r16(R16::SP), sp_before);
    }

    #[test]
    fn ei_followed_by_di_leaves_ime_false() {
        // EI ; DI
        let mut board = board_with(&[0xFB, 0xF3]);
        let mut cpu = CPU::new();
        cpu.step(&mut board).unwrap();
        cpu.step(&mut board).unwrap();
        assert!(!board.ir_system().ime());
    }

    #[test]
    fn illegal_opcode_sticks_the_cpu() {
        let mut board = board_with(&[0xD3]);
        let mut cpu = CPU::new();
        assert!(cpu.step(&mut board).is_err());
        assert_eq!(cpu.halt_state, HaltState::Stuck);
    }
}
