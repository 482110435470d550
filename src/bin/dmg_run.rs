//! Headless CLI driver: loads a ROM, steps the core, exits after `--frames`
//! completed frames (or runs until a fatal error / Ctrl-C).

use std::process::ExitCode;

use clap::Parser;
use dmg_core::{Emulator, VideoFrameStatus};

#[derive(Parser)]
#[command(name = "dmg-core", version, about = "Game Boy (DMG) core runner")]
struct Args {
    /// Raises logging to debug level, surfacing diagnostic-only conditions.
    #[arg(short, long)]
    verbose: bool,

    /// Run for at most N completed frames, then exit 0.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Path to a ROM image.
    #[arg(default_value = "rom.gb")]
    rom_path: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            log::error!("{}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let rom = std::fs::read(&args.rom_path)
        .map_err(|e| format!("failed to read {}: {}", args.rom_path, e))?;

    let mut emu = Emulator::from_rom_bytes(rom).map_err(|e| e.to_string())?;

    let mut frames = 0u64;
    loop {
        emu.step().map_err(|e| e.to_string())?;

        if let VideoFrameStatus::Ready(_) = emu.query_video_frame_status() {
            frames += 1;
            if let Some(limit) = args.frames {
                if frames >= limit {
                    return Ok(());
                }
            }
        }
    }
}
