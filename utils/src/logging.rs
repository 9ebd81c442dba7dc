use std::io::{self, Write};

use chrono::Local;
use colored::{Color, ColoredString, Colorize};
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

#[derive(Debug, Clone)]
pub struct Logger {
    level: LevelFilter,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn filter_level(&mut self, filter_level: LevelFilter) -> &mut Self {
        self.level = filter_level;
        self
    }

    /// Initializes logging for the application.
    ///
    /// Logging goes to stderr so the output of the engine processes,
    /// which is passed through to stdout, stays untouched.
    ///
    /// # Panics
    /// Will panic if a logger was already initialized.
    pub fn init(&self) {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(self.level)
            .format(format_log(self.level))
            .target(env_logger::Target::Stderr);

        builder.try_init().expect("Logger should initialize");
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}

/// Builds the log formatter for `log_level`. Debug adds a
/// timestamp to the header, trace also the source location.
pub fn format_log(
    log_level: LevelFilter,
) -> impl Fn(&mut Formatter, &Record) -> io::Result<()> + Sync + Send {
    move |buf: &mut Formatter, record: &Record| {
        header(log_level, record).map_or(Ok(()), |header| {
            writeln!(buf, "{header} {} {}", "=>".bold(), record.args())
        })
    }
}

fn header(log_level: LevelFilter, record: &Record) -> Option<String> {
    let level = level_color(record.level());

    match log_level {
        LevelFilter::Off => None,
        LevelFilter::Error | LevelFilter::Warn | LevelFilter::Info => Some(format!("{level:5}")),
        LevelFilter::Debug => Some(format!(
            "[{} {level:>5}]",
            Local::now().format("%H:%M:%S")
        )),
        LevelFilter::Trace => {
            let line = record.line().map(|l| format!(":{l}")).unwrap_or_default();
            Some(format!(
                "[{} {level:5} {}{}]",
                Local::now().format("%H:%M:%S%.3f"),
                record.target().bright_yellow(),
                line.bright_green(),
            ))
        }
    }
}

fn level_color(level: Level) -> ColoredString {
    let color = match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Cyan,
    };
    level.as_str().color(color)
}
