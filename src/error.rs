//! The error taxonomy surfaced by the core. Bus reads/writes never fail at the
//! interface level (see [`crate::board`]); only decode-time and load-time
//! conditions reach here.

use thiserror::Error;

/// Fatal and non-fatal conditions the core can report. Only the non-`DiagnosticOnly`
/// variants are meant to bubble out of [`crate::Emulator::step`] as `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("failed to load cartridge: {reason}")]
    LoadFailure { reason: String },

    #[error("unsupported opcode {opcode:#04X} at PC={pc:#06X}{cb_suffix}", cb_suffix = cb_byte.map(|b| format!(" (CB {:#04X})", b)).unwrap_or_default())]
    UnsupportedOpcode {
        pc: u16,
        opcode: u8,
        cb_byte: Option<u8>,
    },

    #[error("invalid bus access at {addr:#06X} from instruction at {pc:#06X}")]
    InvalidBusAccess { addr: u16, pc: u16 },

    /// Non-fatal. Logged once per category at `warn` when verbose; never returned
    /// from the public stepping API.
    #[error("{0}")]
    DiagnosticOnly(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
