//! ivory - play the synthesizer from the computer keyboard
//!
//! Run with: cargo run --release -- [--config ivory.toml] [-v]

use std::{
    io::stdout,
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::{ArgAction, Parser};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use tracing::Level;

use ivory::{
    io::{
        keymap::{pitch_for_key, HeldKeys, PANIC_KEY, QUIT_KEY},
        open_output, OutputStream,
    },
    NoteSender, Session, SynthConfig,
};

const KEY_VELOCITY: u8 = 100;

#[derive(Parser, Debug)]
#[command(name = "ivory", about = "Polyphonic keyboard synthesizer")]
struct Cli {
    /// TOML file with engine and effect settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the sample rate (Hz)
    #[arg(long)]
    sample_rate: Option<f32>,

    /// Override the device block size (frames)
    #[arg(long)]
    block_size: Option<usize>,

    /// Override the voice limit
    #[arg(long)]
    max_voices: Option<usize>,

    /// -v for debug logging, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let note_duration = config.note_duration;
    let (session, mut tx) = Session::new(config).wrap_err("failed to initialise session")?;
    // validated above as finite and positive
    let note_length = Duration::from_secs_f32(note_duration);
    let stream = open_output(session).wrap_err("failed to open audio output")?;

    println!("=== ivory ===");
    println!("Device: {}", stream.device_name());
    println!("Sample rate: {} Hz, channels: {}", stream.sample_rate(), stream.channels());
    println!();
    println!("a s d f g h j k  -> C4 D4 E4 F4 G4 A4 B4 C5");
    println!("z x c v b        -> C#4 D#4 F#4 G#4 A#4");
    println!("space            -> all notes off");
    println!("{QUIT_KEY} or Esc to quit");

    let result = RawTerminal::enter().and_then(|raw| {
        let mut keys = HeldKeys::new(raw.enhanced, note_length);
        play(&mut tx, &stream, &mut keys)
    });

    drop(stream);
    println!("Stopped.");
    result
}

/// Raw mode (plus key-release reporting where the terminal has it) for as
/// long as this lives. Restored on drop, error paths included.
struct RawTerminal {
    enhanced: bool,
}

impl RawTerminal {
    fn enter() -> EyreResult<Self> {
        terminal::enable_raw_mode().wrap_err("failed to enter raw mode")?;
        let mut guard = Self { enhanced: false };
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .wrap_err("failed to enable key release reporting")?;
            guard.enhanced = true;
        }
        Ok(guard)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = terminal::disable_raw_mode();
    }
}

fn load_config(cli: &Cli) -> EyreResult<SynthConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&text).wrap_err_with(|| format!("failed to parse {}", path.display()))?
        }
        None => SynthConfig::default(),
    };
    if let Some(sample_rate) = cli.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    if let Some(max_voices) = cli.max_voices {
        config.max_voices = max_voices;
    }
    Ok(config)
}

/// Turn key events into notes until quit or a device failure.
fn play(tx: &mut NoteSender, stream: &OutputStream, keys: &mut HeldKeys) -> EyreResult<()> {
    loop {
        if stream.has_failed() {
            return Err(eyre!("audio output stream failed"));
        }
        if !event::poll(Duration::from_millis(20))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        let c = match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Char(c) if c.eq_ignore_ascii_case(&QUIT_KEY) => return Ok(()),
            KeyCode::Char(PANIC_KEY) if key.kind == KeyEventKind::Press => {
                keys.clear();
                if let Err(err) = tx.all_notes_off() {
                    tracing::warn!(%err, "all-notes-off dropped");
                }
                continue;
            }
            KeyCode::Char(c) => c,
            _ => continue,
        };
        let Some(pitch) = pitch_for_key(c) else {
            continue;
        };

        let sent = match key.kind {
            KeyEventKind::Press if keys.press(pitch, Instant::now()) => {
                tx.note_on(pitch, KEY_VELOCITY)
            }
            KeyEventKind::Release if keys.release(pitch) => tx.note_off(pitch),
            _ => Ok(()),
        };
        if let Err(err) = sent {
            tracing::warn!(%err, "note event dropped");
        }
    }
}
