//! Storage and arbitration for the five interrupt sources, plus the master
//! enable flip-flop (IME) and its one-instruction EI delay.

use super::util::BitOps;

/// Storage for IF, IE, IME and the EI-armed pending-enable flag.
///
/// `ei_countdown` counts steps since EI executed: 2 means "this instruction's
/// successor has not even started yet", 1 means "the successor is executing
/// now, IME still false", and reaching 0 promotes IME to true just before
/// the *following* step's arbitration. This reproduces the well known
/// "interrupts enable after the instruction after EI" delay without needing
/// to special-case the step EI itself ran in.
pub struct InterruptSystem {
    if_reg: u8,
    ie_reg: u8,
    ime: bool,
    ei_countdown: u8,
}

/// All interrupts that can occur on the Game Boy system. The value of each
/// variant is a bitmask that can be used on IF/IE to set the corresponding bit.
#[derive(Copy, Clone, Debug)]
#[repr(u8)]
pub enum Interrupt {
    VBlank = 1 << 0,
    LcdStat = 1 << 1,
    Timer = 1 << 2,
    Serial = 1 << 3,
    Joypad = 1 << 4,
}

impl Interrupt {
    /// The fixed jump target serviced interrupts transfer control to.
    pub fn vector(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x40,
            Interrupt::LcdStat => 0x48,
            Interrupt::Timer => 0x50,
            Interrupt::Serial => 0x58,
            Interrupt::Joypad => 0x60,
        }
    }
}

/// The read-mask of the IF register: the upper three bits always read as 1.
const IF_MASK: u8 = 0b_1110_0000;

impl InterruptSystem {
    pub fn new() -> InterruptSystem {
        InterruptSystem {
            if_reg: IF_MASK,
            ie_reg: 0x0,
            ime: false,
            ei_countdown: 0,
        }
    }

    pub fn read_if(&self) -> u8 {
        self.if_reg
    }

    pub fn write_if(&mut self, val: u8) {
        self.if_reg = val | IF_MASK;
    }

    pub fn read_ie(&self) -> u8 {
        self.ie_reg
    }

    pub fn write_ie(&mut self, val: u8) {
        self.ie_reg = val;
    }

    pub fn ime(&self) -> bool {
        self.ime
    }

    /// DI takes effect immediately and also cancels a still-pending EI.
    pub fn disable_immediate(&mut self) {
        self.ime = false;
        self.ei_countdown = 0;
    }

    /// RETI takes effect immediately, unlike EI.
    pub fn enable_immediate(&mut self) {
        self.ime = true;
        self.ei_countdown = 0;
    }

    /// EI arms a two-step countdown; see the field doc on [`InterruptSystem`].
    pub fn request_enable_after_next_instr(&mut self) {
        self.ei_countdown = 2;
    }

    /// Must be called once at the start of every CPU step, before interrupt
    /// arbitration for that step.
    pub fn tick_ei_countdown(&mut self) {
        if self.ei_countdown > 0 {
            self.ei_countdown -= 1;
            if self.ei_countdown == 0 {
                self.ime = true;
            }
        }
    }

    /// True whenever any enabled interrupt is requested, independent of IME.
    /// Used to resolve HALT regardless of the master enable flag.
    pub fn any_pending(&self) -> bool {
        self.if_reg & self.ie_reg & 0x1F != 0
    }

    /// If an interrupt is requested (IF) *and* enabled (IE), this function
    /// will return it. If multiple interrupts are scheduled, the one with
    /// the lowest bit index (highest priority) is returned.
    pub fn query_interrupt_request(&self) -> Option<Interrupt> {
        let request = self.if_reg & self.ie_reg & 0x1F;

        if request == 0 {
            return None;
        }

        for bit in 0..5 {
            if request.bit(bit) {
                return Some(match bit {
                    0 => Interrupt::VBlank,
                    1 => Interrupt::LcdStat,
                    2 => Interrupt::Timer,
                    3 => Interrupt::Serial,
                    4 => Interrupt::Joypad,
                    _ => unreachable!(),
                });
            }
        }

        unreachable!()
    }

    /// Sets the bit in IF that corresponds to the given interrupt.
    pub fn schedule_interrupt(&mut self, interrupt: Interrupt) {
        self.if_reg |= interrupt as u8;
    }

    /// Clears the bit in IF that corresponds to the given interrupt.
    pub fn acknowledge(&mut self, interrupt: Interrupt) {
        self.if_reg &= !(interrupt as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_indexed_pending_interrupt_wins() {
        let mut ir = InterruptSystem::new();
        ir.write_ie(0x1F);
        ir.schedule_interrupt(Interrupt::Timer);
        ir.schedule_interrupt(Interrupt::VBlank);

        assert!(matches!(
            ir.query_interrupt_request(),
            Some(Interrupt::VBlank)
        ));
    }

    #[test]
    fn unrequested_or_undisabled_source_is_not_returned() {
        let mut ir = InterruptSystem::new();
        ir.schedule_interrupt(Interrupt::Timer);
        assert!(ir.query_interrupt_request().is_none()); // IE bit not set

        ir.write_ie(1 << 2);
        assert!(ir.query_interrupt_request().is_some());
        ir.acknowledge(Interrupt::Timer);
        assert!(ir.query_interrupt_request().is_none());
    }

    #[test]
    fn ei_takes_effect_after_one_full_step_delay() {
        let mut ir = InterruptSystem::new();
        ir.request_enable_after_next_instr();

        ir.tick_ei_countdown(); // start of the step running EI's successor
        assert!(!ir.ime());

        ir.tick_ei_countdown(); // start of the step after that
        assert!(ir.ime());
    }

    #[test]
    fn any_pending_ignores_ime() {
        let mut ir = InterruptSystem::new();
        ir.write_ie(1);
        ir.schedule_interrupt(Interrupt::VBlank);
        assert!(!ir.ime());
        assert!(ir.any_pending());
    }
}
