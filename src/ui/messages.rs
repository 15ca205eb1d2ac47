//! Console feedback for commands. Status lines go to stdout, errors to stderr.

use ansi_term::{Colour, Style};
use std::fmt;
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Copy)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn icon(self) -> &'static str {
        match self {
            Level::Info => "ℹ️",
            Level::Success => "✅",
            Level::Warning => "⚠️",
            Level::Error => "❌",
        }
    }

    fn style(self) -> Style {
        let colour = match self {
            Level::Info => Colour::Blue,
            Level::Success => Colour::Green,
            Level::Warning => Colour::Yellow,
            Level::Error => Colour::Red,
        };
        colour.bold()
    }

    fn line<T: fmt::Display>(self, msg: T) -> String {
        format!("{} {}", self.style().paint(self.icon()), msg)
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", Level::Info.line(msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", Level::Success.line(msg));
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", Level::Warning.line(msg));
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", Level::Error.line(msg));
}

/// Title of a listing or report, underlined to its display width.
pub fn header<T: fmt::Display>(title: T) {
    let title = title.to_string();
    let rule = "─".repeat(UnicodeWidthStr::width(title.as_str()).max(1));
    let style = Colour::Blue.bold();
    println!("{}\n{}\n", style.paint(title.as_str()), style.paint(rule));
}
