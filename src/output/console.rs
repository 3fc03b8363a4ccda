use std::sync::atomic::{AtomicU8, Ordering};

use colored::{ColoredString, Colorize};

static VERBOSITY: AtomicU8 = AtomicU8::new(0);

pub fn set_verbosity(level: u8) {
    VERBOSITY.store(level, Ordering::Relaxed);
}

pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

pub fn disable_color() {
    colored::control::set_override(false);
}

fn tagged(tag: ColoredString, message: &str) -> String {
    format!(
        "{}{}{} {}",
        "[".bold().white(),
        tag,
        "]".bold().white(),
        message
    )
}

pub fn info(message: &str) {
    eprintln!("{}", tagged("INF".bold().blue(), message));
}

pub fn warn(message: &str) {
    eprintln!("{}", tagged("WRN".bold().yellow(), message));
}

pub fn error(message: &str) {
    eprintln!("{}", tagged("ERR".bold().red(), message));
}

/// Printed only with `-v`.
pub fn debug(message: &str) {
    if verbosity() > 0 {
        eprintln!("{}", tagged("DBG".bold().purple(), message));
    }
}

pub fn kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}
