#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Text rendering of the monitor's screens.
//!
//! Each screen is a short list of lines at fixed positions, tinted by a
//! [`Tone`]. [`ConsoleDisplay`] prints them to any `Write`, optionally with
//! ANSI colours standing in for the panel's.

use std::io::Write;

use pmon_core::{Measurement, PresentationSink, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Yellow on the panel.
    Title,
    /// Green.
    Ok,
    /// Red.
    Error,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Title => "\x1b[33m",
            Tone::Ok => "\x1b[32m",
            Tone::Error => "\x1b[31m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub tone: Tone,
    pub x: u16,
    pub y: u16,
}

fn line(text: impl Into<String>, x: u16, y: u16, tone: Tone) -> Line {
    Line {
        text: text.into(),
        tone,
        x,
        y,
    }
}

/// One full-panel redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub lines: Vec<Line>,
}

impl Screen {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

pub fn measurement_screen(m: &Measurement, online: bool) -> Screen {
    let title = if online {
        "Airborne particles"
    } else {
        "Particles (offline)"
    };
    Screen {
        lines: vec![
            line(title, 0, 10, Tone::Title),
            line(format!("PM1:   {}", m.pm10_standard), 20, 50, Tone::Ok),
            line(format!("PM2.5: {}", m.pm25_standard), 20, 80, Tone::Ok),
            line(format!("PM10:  {}", m.pm100_standard), 20, 110, Tone::Ok),
        ],
    }
}

pub fn initializing_screen() -> Screen {
    Screen {
        lines: vec![line("Initializing...", 30, 60, Tone::Ok)],
    }
}

pub fn connection_failed_screen(stage: Stage) -> Screen {
    Screen {
        lines: vec![
            line(format!("{stage} connection"), 0, 20, Tone::Error),
            line("failed!", 0, 50, Tone::Error),
            line("Entering offline", 0, 90, Tone::Ok),
            line("mode...", 0, 120, Tone::Ok),
        ],
    }
}

pub fn retrying_screen(stage: Stage) -> Screen {
    Screen {
        lines: vec![
            line(stage.label(), 0, 20, Tone::Error),
            line("failed!", 0, 50, Tone::Error),
            line("Retrying...", 0, 90, Tone::Title),
        ],
    }
}

/// `PresentationSink` that prints each screen as a block of text.
///
/// Write errors are logged and dropped; the loop never waits on the display.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, color: false }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, screen: &Screen) {
        if let Err(e) = self.render(screen) {
            tracing::warn!(error = %e, "display write failed");
        }
    }

    fn render(&mut self, screen: &Screen) -> std::io::Result<()> {
        writeln!(self.out, "+{}+", "-".repeat(26))?;
        for l in &screen.lines {
            let indent = " ".repeat(usize::from(l.x / 10));
            if self.color {
                writeln!(self.out, "| {indent}{}{}\x1b[0m", l.tone.ansi(), l.text)?;
            } else {
                writeln!(self.out, "| {indent}{}", l.text)?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> PresentationSink for ConsoleDisplay<W> {
    fn show_initializing(&mut self) {
        self.draw(&initializing_screen());
    }

    fn show_measurement(&mut self, m: &Measurement, online: bool) {
        self.draw(&measurement_screen(m, online));
    }

    fn show_connection_failed(&mut self, stage: Stage) {
        self.draw(&connection_failed_screen(stage));
    }

    fn show_retrying(&mut self, stage: Stage) {
        self.draw(&retrying_screen(stage));
    }
}
