use crate::ui::Icons;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static PALETTE: OnceLock<Palette> = OnceLock::new();

/// Styles for CLI output. All plain when stdout is not a terminal.
#[derive(Debug, Clone)]
pub struct Palette {
    pub heading: Style,
    pub ok: Style,
    pub fail: Style,
    pub caution: Style,
    pub label: Style,
    /// Habit completed today
    pub done: Style,
    /// Habit still open today
    pub pending: Style,
}

impl Palette {
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            heading: pick(Style::new().cyan().bold()),
            ok: pick(Style::new().green().bold()),
            fail: pick(Style::new().red().bold()),
            caution: pick(Style::new().yellow().bold()),
            label: pick(Style::new().dimmed()),
            done: pick(Style::new().green()),
            pending: pick(Style::new().bright_black()),
        }
    }
}

pub fn palette() -> &'static Palette {
    PALETTE.get_or_init(|| Palette::new(console::Term::stdout().is_term()))
}

pub fn header(text: &str) {
    println!("{} {}", Icons::CALENDAR, text.style(palette().heading.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(palette().ok.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(palette().fail.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(palette().caution.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(palette().label.clone()), value);
}

/// Completion marker for a habit row
pub fn mark(completed: bool) -> String {
    if completed {
        Icons::DONE.style(palette().done.clone()).to_string()
    } else {
        Icons::PENDING.style(palette().pending.clone()).to_string()
    }
}
