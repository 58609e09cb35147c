//! Store connection.
//!
//! The store is treated as an opaque script engine: a script goes in together
//! with its keys and arguments and one reply comes back. Each call is atomic
//! on the store's side; nothing here relies on more than that.

use crate::{
	config::Settings,
	error::{DecodeError, Error, Result},
};
use std::{fmt, time::Duration};

/// Lua script sent to the store.
pub struct Script {
	source: &'static str,
	inner: redis::Script,
}

impl Script {
	/// Return a new [`Script`] from its source.
	pub fn new(source: &'static str) -> Self {
		Self {
			source,
			inner: redis::Script::new(source),
		}
	}

	/// Script source.
	pub fn source(&self) -> &'static str {
		self.source
	}

	/// SHA1 the store caches the script under.
	pub fn hash(&self) -> &str {
		self.inner.get_hash()
	}
}

impl fmt::Debug for Script {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Script").field("hash", &self.hash()).finish()
	}
}

/// Value returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
	/// No value.
	Nil,

	/// Integer reply.
	Int(i64),

	/// String reply, binary safe.
	Bytes(Vec<u8>),

	/// Array reply.
	List(Vec<Reply>),
}

impl Reply {
	/// Return the string payload.
	pub fn into_bytes(self) -> std::result::Result<Vec<u8>, DecodeError> {
		match self {
			Self::Bytes(bytes) => Ok(bytes),
			other => Err(DecodeError::Shape(format!("expected a string, got {}", other.kind()))),
		}
	}

	/// Return the array items.
	pub fn into_list(self) -> std::result::Result<Vec<Reply>, DecodeError> {
		match self {
			Self::List(items) => Ok(items),
			other => Err(DecodeError::Shape(format!("expected an array, got {}", other.kind()))),
		}
	}

	/// Return the integer, accepting integers sent as strings.
	pub fn to_int(&self) -> std::result::Result<i64, DecodeError> {
		match self {
			Self::Int(n) => Ok(*n),
			Self::Bytes(bytes) => String::from_utf8_lossy(bytes)
				.trim()
				.parse()
				.map_err(|_| DecodeError::Shape("expected an integer string".to_string())),
			other => Err(DecodeError::Shape(format!("expected an integer, got {}", other.kind()))),
		}
	}

	fn kind(&self) -> &'static str {
		match self {
			Self::Nil => "nil",
			Self::Int(_) => "an integer",
			Self::Bytes(_) => "a string",
			Self::List(_) => "an array",
		}
	}
}

impl From<redis::Value> for Reply {
	fn from(value: redis::Value) -> Self {
		match value {
			redis::Value::Nil => Self::Nil,
			redis::Value::Int(n) => Self::Int(n),
			redis::Value::Data(bytes) => Self::Bytes(bytes),
			redis::Value::Bulk(items) => Self::List(items.into_iter().map(Self::from).collect()),
			redis::Value::Status(status) => Self::Bytes(status.into_bytes()),
			redis::Value::Okay => Self::Bytes(b"OK".to_vec()),
		}
	}
}

/// Trait which should be implemented for store connections.
pub trait Engine {
	/// Check the store answers. Used as the handshake.
	fn ping(&mut self) -> Result<()>;

	/// Evaluate `script` atomically with `keys` and `args`.
	fn eval(&mut self, script: &Script, keys: &[String], args: &[String]) -> Result<Reply>;

	/// Read a string key.
	fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

	/// Delete keys.
	fn del(&mut self, keys: &[String]) -> Result<()>;
}

/// [`Engine`] talking to a Redis-protocol server.
///
/// A connection that failed with an I/O error is thrown away; the next call
/// dials again.
pub struct RedisEngine {
	client: redis::Client,
	timeout: Duration,
	connection: Option<redis::Connection>,
}

impl RedisEngine {
	/// Return a new [`RedisEngine`]. Doesn't connect yet.
	pub fn open(settings: &Settings) -> Result<Self> {
		let client = redis::Client::open(settings.url())
			.map_err(|e| Error::Config(format!("{}: {}", settings.url(), e)))?;
		Ok(Self {
			client,
			timeout: settings.timeout,
			connection: None,
		})
	}

	/// Return the live connection, dialing if there's none.
	fn connection(&mut self) -> Result<&mut redis::Connection> {
		if self.connection.is_none() {
			log::debug!("Connecting to {:?}", self.client.get_connection_info().addr);
			let connection = self.client.get_connection_with_timeout(self.timeout)?;
			connection.set_read_timeout(Some(self.timeout))?;
			connection.set_write_timeout(Some(self.timeout))?;
			self.connection = Some(connection);
		}
		self.connection
			.as_mut()
			.ok_or_else(|| Error::Connection("not connected".to_string()))
	}

	/// Run `f` on the connection, dropping the connection if it broke.
	fn call<T, F>(&mut self, f: F) -> Result<T>
	where
		F: FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
	{
		let result = f(self.connection()?).map_err(Error::from);
		if let Err(e) = &result {
			if e.is_transient() {
				log::warn!("Dropping connection: {}", e);
				self.connection = None;
			}
		}
		result
	}
}

impl Engine for RedisEngine {
	fn ping(&mut self) -> Result<()> {
		let pong: String = self.call(|con| redis::cmd("PING").query(con))?;
		log::debug!("Store answered {}", pong);
		Ok(())
	}

	fn eval(&mut self, script: &Script, keys: &[String], args: &[String]) -> Result<Reply> {
		let mut invocation = script.inner.prepare_invoke();
		for key in keys {
			invocation.key(key);
		}
		for arg in args {
			invocation.arg(arg);
		}
		let value: redis::Value = self.call(|con| invocation.invoke(con))?;
		Ok(value.into())
	}

	fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
		self.call(|con| redis::cmd("GET").arg(key).query(con))
	}

	fn del(&mut self, keys: &[String]) -> Result<()> {
		if keys.is_empty() {
			return Ok(());
		}
		let mut cmd = redis::cmd("DEL");
		for key in keys {
			cmd.arg(key);
		}
		let removed: i64 = self.call(|con| cmd.query(con))?;
		log::debug!("Deleted {} of {:?}", removed, keys);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reply_from_value() {
		let value = redis::Value::Bulk(vec![
			redis::Value::Data(vec![0, 1, 1]),
			redis::Value::Int(2),
		]);
		assert_eq!(
			Reply::from(value),
			Reply::List(vec![Reply::Bytes(vec![0, 1, 1]), Reply::Int(2)])
		);
		assert_eq!(Reply::from(redis::Value::Okay), Reply::Bytes(b"OK".to_vec()));
	}

	#[test]
	fn reply_accessors() {
		assert_eq!(Reply::Bytes(b"42".to_vec()).to_int(), Ok(42));
		assert!(Reply::Nil.into_bytes().is_err());
		assert!(Reply::Int(1).into_list().is_err());
	}

	#[test]
	fn script_hash_is_stable() {
		let a = Script::new("return 1");
		let b = Script::new("return 1");
		assert_eq!(a.hash(), b.hash());
		assert_eq!(a.hash().len(), 40);
	}

	#[test]
	fn open_does_not_dial() -> Result<()> {
		let settings = Settings::default().with_address(Some("127.0.0.1"), Some("1"))?;
		let engine = RedisEngine::open(&settings)?;
		assert!(engine.connection.is_none());
		Ok(())
	}
}
