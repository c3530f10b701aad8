//! Terminal output for the `show` and `build` commands

use crate::cache::CacheConfig;
use crate::int_vector::IntVector;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print a header line followed by up to `limit` elements of `v`, one
/// `index<TAB>value` pair per line.
pub fn print_vector(name: &str, v: &IntVector, limit: usize, color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    write!(out, "{}", name)?;
    out.reset()?;
    writeln!(out, ": {} elements, width {}", v.len(), v.width())?;

    for (i, value) in v.iter().take(limit).enumerate() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{}", i)?;
        out.reset()?;
        writeln!(out, "\t{}", value)?;
    }
    if v.len() > limit {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, "... {} more", v.len() - limit)?;
        out.reset()?;
    }
    Ok(())
}

/// Print every registered key of a run with its file.
pub fn print_registry(config: &CacheConfig, color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    let width = config.file_map.keys().map(|k| k.len()).max().unwrap_or(0);
    for (key, file) in &config.file_map {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{:<width$}", key, width = width)?;
        out.reset()?;
        writeln!(out, "  {} ({} bytes)", file, config.storage().file_size(file))?;
    }
    Ok(())
}
