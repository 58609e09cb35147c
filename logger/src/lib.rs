//! Helper crate for fast log initializing.
//!
//! This crate reexports all macros from [`log`] crate and uses [`env_logger`]
//! crate for logger initializing.
//!
//! The demos draw over the whole terminal, so records written to stderr would
//! be torn apart by the next frame. When [`LOG_FILE_ENV`] names a file, records
//! are appended there. Without it nothing is logged unless [`LOG_LEVEL_ENV`]
//! asks for it explicitly (useful together with `2>demo.log`).
//!
//! Example:
//! ```no_run
//! use logger::*;
//!
//! init_logger().expect("opening the log file");
//!
//! info!("Logger initialized successfully!");
//! ```

pub use log::{debug, error, info, trace, warn};

/// Default log level for debug compilations.
const DEBUG_LOG_LEVEL: &str = "trace";

/// Default log level for release compilations.
const RELEASE_LOG_LEVEL: &str = "info";

/// Default log level when records would land on the terminal.
const TERMINAL_LOG_LEVEL: &str = "off";

/// Environment variable for log level setting.
pub const LOG_LEVEL_ENV: &str = "DEMO_LOG";

/// Environment variable for log style setting.
pub const LOG_STYLE_ENV: &str = "DEMO_LOG_STYLE";

/// Environment variable naming a file to append log records to.
pub const LOG_FILE_ENV: &str = "DEMO_LOG_FILE";

/// Default log style.
const LOG_STYLE: &str = "auto";

use env_logger::{fmt::Formatter, Target};
use log::Record;
use std::{env, fs::OpenOptions, io};

/// Logger initializer. Run this function in binary crate to initialize logging.
/// This function should be ran only once.
///
/// Fails only if the file named by [`LOG_FILE_ENV`] can't be opened.
pub fn init_logger() -> io::Result<()> {
	let file = match env::var_os(LOG_FILE_ENV) {
		Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
		None => None,
	};

	let log_level = match (&file, cfg!(debug_assertions)) {
		(None, _) => TERMINAL_LOG_LEVEL,
		(Some(_), true) => DEBUG_LOG_LEVEL,
		(Some(_), false) => RELEASE_LOG_LEVEL,
	};

	let mut builder = env_logger::Builder::from_env(
		env_logger::Env::default()
			.filter_or(LOG_LEVEL_ENV, log_level)
			.write_style_or(LOG_STYLE_ENV, LOG_STYLE),
	);
	builder.format(format);

	if let Some(file) = file {
		builder
			.target(Target::Pipe(Box::new(file)))
			.write_style(env_logger::WriteStyle::Never);
	}

	builder.init();
	Ok(())
}

/// Logging output format.
fn format(buf: &'_ mut Formatter, record: &'_ Record<'_>) -> io::Result<()> {
	use env_logger::fmt::Color;
	use log::Level;
	use std::io::Write;

	let mut level_style = buf.style();

	match record.level() {
		Level::Error => level_style.set_color(Color::Red).set_bold(true),
		Level::Warn => level_style.set_color(Color::Yellow),
		Level::Info => level_style.set_color(Color::Cyan),
		Level::Debug => level_style.set_color(Color::Magenta),
		Level::Trace => level_style.set_color(Color::Blue),
	};

	writeln!(
		buf,
		"{} {}\t[{}] {}",
		buf.timestamp_millis(),
		level_style.value(record.level()),
		record.target(),
		record.args()
	)
}
