//! Output styling and terminal width.

use owo_colors::{OwoColorize, Style, colors::css};
use supports_color::Stream;

/// Columns the wide `catalog` layout needs: id, category and part name.
pub const CATALOG_TABLE_WIDTH: u16 = 60;

/// Whether the terminal is too narrow for the wide catalog layout.
///
/// Output that is not a terminal (a pipe or a file) is never narrow.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < CATALOG_TABLE_WIDTH)
}

fn colour_enabled() -> bool {
    supports_color::on(Stream::Stdout).is_some()
}

/// What a piece of output tells the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Success,
    Warning,
    Heading,
    Muted,
}

impl Tone {
    const fn style(self) -> Style {
        match self {
            Self::Success => Style::new().fg::<css::Green>(),
            Self::Warning => Style::new().fg::<css::Orange>(),
            Self::Heading => Style::new().fg::<css::LightBlue>().bold(),
            Self::Muted => Style::new().dimmed(),
        }
    }
}

fn paint(text: &str, tone: Tone, colour: bool) -> String {
    if colour {
        text.style(tone.style()).to_string()
    } else {
        text.to_string()
    }
}

/// Styles command output, falling back to plain text when stdout has no
/// colour support.
pub trait Colorize {
    /// A completed run.
    fn success(&self) -> String;
    /// Excluded or suspicious records.
    fn warning(&self) -> String;
    /// A section heading.
    fn heading(&self) -> String;
    /// Secondary detail such as ids and categories.
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Tone::Success, colour_enabled())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Tone::Warning, colour_enabled())
    }

    fn heading(&self) -> String {
        paint(self.as_ref(), Tone::Heading, colour_enabled())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Tone::Muted, colour_enabled())
    }
}
