use anyhow::{Context, Result};
use clap::Parser;
use dmg_core::{AudioSink, Frame, FrameSink, NullHost, SerialSink};
use dmg_gb::{Cartridge, GameBoy};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    /// Path to the cartridge ROM image
    rom: PathBuf,

    /// Optional 256-byte boot ROM image; without one the engine starts
    /// directly at the cartridge entry point with post-boot register state
    #[arg(long)]
    boot_rom: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Dump the final frame to this path as a PPM image
    #[arg(long)]
    frame_out: Option<PathBuf>,

    /// Suppress the per-run summary line
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Default)]
struct LastFrame(Option<Frame>);

impl FrameSink for LastFrame {
    fn present(&mut self, frame: &Frame) {
        self.0 = Some(frame.clone());
    }
}

#[derive(Default)]
struct SampleCounter(u64);

impl AudioSink for SampleCounter {
    fn push_block(&mut self, samples: &[f32]) {
        self.0 += samples.len() as u64;
    }
}

#[derive(Default)]
struct SerialLog(Vec<u8>);

impl SerialSink for SerialLog {
    fn recv_byte(&mut self, byte: u8) {
        self.0.push(byte);
    }
}

fn write_ppm(path: &PathBuf, frame: &Frame) -> Result<()> {
    let mut f = fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write!(f, "P6\n{} {}\n255\n", frame.width, frame.height)?;
    let mut bytes = Vec::with_capacity(frame.pixels.len() * 3);
    for pixel in &frame.pixels {
        // Pixels are packed RGBA8888; PPM wants plain RGB.
        bytes.push((pixel >> 24) as u8);
        bytes.push((pixel >> 16) as u8);
        bytes.push((pixel >> 8) as u8);
    }
    f.write_all(&bytes)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom).with_context(|| format!("reading {}", args.rom.display()))?;
    let cartridge = Cartridge::load(rom).context("loading cartridge")?;

    let mut gb = match args.boot_rom {
        Some(path) => {
            let boot_rom =
                fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            GameBoy::with_boot_rom(cartridge, boot_rom).context("loading boot rom")?
        }
        None => GameBoy::new(cartridge),
    };

    let mut frame_sink = LastFrame::default();
    let mut audio_sink = SampleCounter::default();
    let mut serial_sink = SerialLog::default();
    let mut input = NullHost;

    for _ in 0..args.frames {
        gb.run_frame(&mut frame_sink, &mut audio_sink, &mut serial_sink, &mut input);
    }

    if let Some(path) = args.frame_out.as_ref() {
        if let Some(frame) = frame_sink.0.as_ref() {
            write_ppm(path, frame)?;
        }
    }

    if !serial_sink.0.is_empty() {
        print!("{}", String::from_utf8_lossy(&serial_sink.0));
    }

    if !args.quiet {
        println!(
            "{}: ran {} frame(s), {} audio sample(s)",
            gb.cartridge_title(),
            args.frames,
            audio_sink.0
        );
    }

    Ok(())
}
