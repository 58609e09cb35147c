//! Client settings.
//!
//! Settings start from the demo's defaults, take the store address from the
//! command line and finally accept environment overrides:
//!
//! | variable              | meaning                                  | example |
//! |-----------------------|------------------------------------------|---------|
//! | `DEMO_TICK`           | interval between two evaluations         | `100ms` |
//! | `DEMO_TIMEOUT`        | bound of one round trip to the store     | `2s`    |
//! | `DEMO_MAX_FAILURES`   | consecutive connection failures tolerated | `10`    |

use crate::error::{Error, Result};
use std::{env, time::Duration};

/// Environment variable overriding [`Settings::tick`].
pub const TICK_ENV: &str = "DEMO_TICK";

/// Environment variable overriding [`Settings::timeout`].
pub const TIMEOUT_ENV: &str = "DEMO_TIMEOUT";

/// Environment variable overriding [`Settings::max_failures`].
pub const MAX_FAILURES_ENV: &str = "DEMO_MAX_FAILURES";

/// Settings shared by every demo client.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
	/// Host the store listens on.
	pub host: String,

	/// Port the store listens on.
	pub port: u16,

	/// Interval between two ticks.
	pub tick: Duration,

	/// Connect, read and write timeout of a round trip.
	pub timeout: Duration,

	/// How many connection failures in a row end the demo.
	pub max_failures: u32,
}

impl Settings {
	/// Default store host.
	pub const HOST: &'static str = "localhost";

	/// Default store port.
	pub const PORT: u16 = 6379;

	/// Default round trip timeout.
	pub const TIMEOUT: Duration = Duration::from_secs(1);

	/// Default number of tolerated consecutive connection failures.
	pub const MAX_FAILURES: u32 = 5;

	/// Default tick when a demo doesn't pick its own.
	pub const TICK: Duration = Duration::from_millis(50);

	/// Return default [`Settings`] with the given tick.
	pub fn new(tick: Duration) -> Self {
		Self {
			tick,
			..Self::default()
		}
	}

	/// Replace host and port by the ones given on the command line.
	pub fn with_address(mut self, host: Option<&str>, port: Option<&str>) -> Result<Self> {
		if let Some(host) = host {
			self.host = host.to_string();
		}
		if let Some(port) = port {
			self.port = port
				.parse()
				.map_err(|_| Error::Config(format!("\"{}\" is not a port number", port)))?;
		}
		Ok(self)
	}

	/// Apply overrides from the process environment.
	pub fn from_env(self) -> Result<Self> {
		self.with_overrides(|name| env::var(name).ok())
	}

	/// Apply overrides found by `lookup`, which maps a variable name to its
	/// value.
	pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(val) = lookup(TICK_ENV) {
			self.tick = parse_duration(TICK_ENV, &val)?;
		}
		if let Some(val) = lookup(TIMEOUT_ENV) {
			self.timeout = parse_duration(TIMEOUT_ENV, &val)?;
		}
		if let Some(val) = lookup(MAX_FAILURES_ENV) {
			self.max_failures = val.trim().parse().map_err(|_| {
				Error::Config(format!("{} must be a number, got \"{}\"", MAX_FAILURES_ENV, val))
			})?;
		}
		if self.timeout.is_zero() {
			return Err(Error::Config(format!("{} can't be zero", TIMEOUT_ENV)));
		}
		Ok(self)
	}

	/// Connection url of the store.
	pub fn url(&self) -> String {
		format!("redis://{}:{}/", self.host, self.port)
	}
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			host: Self::HOST.to_string(),
			port: Self::PORT,
			tick: Self::TICK,
			timeout: Self::TIMEOUT,
			max_failures: Self::MAX_FAILURES,
		}
	}
}

/// Parse a human readable duration like `150ms` or `1s 500ms`.
fn parse_duration(name: &str, val: &str) -> Result<Duration> {
	humantime::parse_duration(val.trim())
		.map_err(|e| Error::Config(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn defaults() {
		let settings = Settings::new(Duration::from_millis(33));
		assert_eq!(settings.tick, Duration::from_millis(33));
		assert_eq!(settings.url(), "redis://localhost:6379/");
	}

	#[test]
	fn address_from_cli() -> Result<()> {
		let settings = Settings::default().with_address(Some("10.0.0.2"), Some("6380"))?;
		assert_eq!(settings.url(), "redis://10.0.0.2:6380/");

		assert!(Settings::default().with_address(None, Some("port")).is_err());
		Ok(())
	}

	#[test]
	fn env_overrides() -> Result<()> {
		let env: HashMap<&str, &str> = [
			(TICK_ENV, "120ms"),
			(TIMEOUT_ENV, "2s 500ms"),
			(MAX_FAILURES_ENV, "9"),
		]
		.into_iter()
		.collect();

		let settings = Settings::default().with_overrides(|k| env.get(k).map(|v| v.to_string()))?;
		assert_eq!(settings.tick, Duration::from_millis(120));
		assert_eq!(settings.timeout, Duration::from_millis(2500));
		assert_eq!(settings.max_failures, 9);
		Ok(())
	}

	#[test]
	fn bad_overrides() {
		let bad_tick = Settings::default().with_overrides(|k| (k == TICK_ENV).then(|| "soon".to_string()));
		assert!(matches!(bad_tick, Err(Error::Config(_))));

		let zero = Settings::default().with_overrides(|k| (k == TIMEOUT_ENV).then(|| "0s".to_string()));
		assert!(matches!(zero, Err(Error::Config(_))));
	}
}
