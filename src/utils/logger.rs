//! Stderr logger with coloured level tags.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Environment variable overriding the verbosity (`error` .. `trace`).
pub const LOG_ENV: &str = "SDIX_LOG";

#[derive(Debug)]
struct StderrLogger {
    level: LevelFilter,
    choice: ColorChoice,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("sdix")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = StandardStream::stderr(self.choice);
        let color = match record.level() {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Green,
            Level::Debug => Color::Cyan,
            Level::Trace => Color::Magenta,
        };
        // Logging must never fail the caller.
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(stderr, "{:>5}", record.level());
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {}", record.args());
    }

    fn flush(&self) {}
}

/// Level for `verbose` repetitions of `-v`: warn, info, debug, then trace.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the logger. `SDIX_LOG` wins over `verbose` when it parses.
pub fn init(verbose: u8, color: bool) -> Result<(), log::SetLoggerError> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or_else(|| level_for(verbose));
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    log::set_boxed_logger(Box::new(StderrLogger { level, choice }))?;
    log::set_max_level(level);
    Ok(())
}
