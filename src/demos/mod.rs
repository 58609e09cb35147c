//! The shipped demos.
//!
//! A demo knows which script to send, with what keys and arguments, how to
//! decode the reply into a scene and how to paint that scene. Everything else
//! (input, cadence, failures, terminal handling) is the [`tick`](crate::tick)
//! loop's business.

pub mod fire;
pub mod life;
pub mod snake;

pub use fire::Fire;
pub use life::Life;
pub use snake::Snake;

use crate::{
	command::Command,
	engine::{Engine, Reply, Script},
	error::{DecodeError, Result},
	render::Canvas,
};

/// Terminal size assumed when the real one can't be queried.
pub const FALLBACK_TERMINAL_SIZE: (usize, usize) = (80, 24);

/// Return terminal `(columns, rows)`.
pub fn terminal_size() -> (usize, usize) {
	match crossterm::terminal::size() {
		Ok((cols, rows)) => (cols as usize, rows as usize),
		Err(e) => {
			log::warn!("Can't query terminal size, assuming 80x24: {}", e);
			FALLBACK_TERMINAL_SIZE
		}
	}
}

/// Trait which should be implemented for every demo.
pub trait Demo {
	/// What one reply decodes into.
	type Scene;

	/// Demo name used in logs.
	fn name(&self) -> &str;

	/// Script evaluated every tick.
	fn script(&self) -> &Script;

	/// Keys the script touches.
	fn keys(&self) -> Vec<String>;

	/// Arguments of the next evaluation. Called exactly once per tick, so
	/// one-shot intents may be consumed here.
	fn args(&mut self) -> Vec<String>;

	/// React to a command other than quit. Ignored by default.
	fn command(&mut self, _command: Command) {}

	/// Turn a reply into a scene.
	fn decode(&mut self, reply: Reply) -> std::result::Result<Self::Scene, DecodeError>;

	/// Size of the canvas the demo paints, without the error line.
	fn canvas_size(&self) -> (usize, usize);

	/// Paint `scene` into `canvas`. `scene` is none until the first reply
	/// decodes.
	fn paint(&self, scene: Option<&Self::Scene>, canvas: &mut Canvas);

	/// Prepare the store before the first tick. Clears the demo's keys by
	/// default.
	fn setup(&mut self, engine: &mut dyn Engine) -> Result<()> {
		engine.del(&self.keys())
	}

	/// Clean the store up after the last tick. Clears the demo's keys by
	/// default.
	fn teardown(&mut self, engine: &mut dyn Engine) -> Result<()> {
		engine.del(&self.keys())
	}

	/// Line printed after the terminal is given back.
	fn farewell(&self) -> String;
}
