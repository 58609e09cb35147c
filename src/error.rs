//! Errors returned by functions related to this crate.

use std::{error, fmt, io};

/// This is an alias for standart [`Result`](std::result::Result) type which
/// represents failure.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by crate's functions.
#[derive(Debug)]
pub enum Error {
	/// The store can't be reached or the connection to it was lost.
	Connection(String),

	/// The store executed the script and reported an error.
	Script(String),

	/// A reply could not be turned into a frame.
	Decode(DecodeError),

	/// The terminal couldn't be switched into raw mode.
	Input(io::Error),

	/// Writing to the terminal failed.
	Io(io::Error),

	/// A command line argument or environment override is invalid.
	Config(String),
}

impl Error {
	/// Return `true` if the error may go away by itself on the next tick.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Connection(_))
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Connection(reason) => write!(f, "connection to the store failed: {}", reason),
			Self::Script(reason) => write!(f, "script error: {}", reason),
			Self::Decode(e) => write!(f, "can't decode reply: {}", e),
			Self::Input(e) => write!(f, "can't set terminal mode: {}", e),
			Self::Io(e) => write!(f, "terminal output failed: {}", e),
			Self::Config(reason) => write!(f, "invalid configuration: {}", reason),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Self::Decode(e) => Some(e),
			Self::Input(e) | Self::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<DecodeError> for Error {
	fn from(e: DecodeError) -> Self {
		Self::Decode(e)
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Self::Io(e)
	}
}

impl From<redis::RedisError> for Error {
	fn from(e: redis::RedisError) -> Self {
		if e.is_io_error() || e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal() {
			Self::Connection(e.to_string())
		} else {
			Self::Script(e.to_string())
		}
	}
}

/// Error returned if a reply payload doesn't describe the expected frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
	/// Payload length doesn't match the declared grid dimensions.
	Length {
		/// Number of cells the dimensions call for.
		expected: usize,
		/// Number of bytes actually received.
		actual: usize,
	},

	/// Reply has a different shape than the demo expects.
	Shape(String),

	/// Reply isn't valid json for the demo's state.
	Json(String),
}

impl fmt::Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Length { expected, actual } => write!(
				f,
				"payload has {} cells but {} were expected",
				actual, expected
			),
			Self::Shape(what) => write!(f, "unexpected reply shape: {}", what),
			Self::Json(e) => write!(f, "malformed json state: {}", e),
		}
	}
}

impl error::Error for DecodeError {}

impl From<serde_json::Error> for DecodeError {
	fn from(e: serde_json::Error) -> Self {
		Self::Json(e.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn connection_errors_are_transient() {
		assert!(Error::Connection("refused".into()).is_transient());
		assert!(!Error::Script("ERR boom".into()).is_transient());
		assert!(!Error::Decode(DecodeError::Shape("nil".into())).is_transient());
	}

	#[test]
	fn redis_errors_classified() {
		let io = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
		assert!(matches!(Error::from(redis::RedisError::from(io)), Error::Connection(_)));

		let script = redis::RedisError::from((redis::ErrorKind::ResponseError, "ERR user_script:1"));
		assert!(matches!(Error::from(script), Error::Script(_)));
	}
}
