//! Tick loop.
//!
//! ```text
//! Connecting --ping ok--> Running --quit / signal / fatal--> Terminated
//!                           ^   |
//!                           +---+ poll input, eval, draw, sleep
//! ```
//!
//! Ticks run at a fixed interval. A tick whose round trip overruns the
//! interval is followed immediately by the next one; missed ticks are not
//! made up for.
//!
//! Failures while running:
//! * connection errors leave the last frame on screen and are retried on the
//!   next tick, until [`Settings::max_failures`] of them happen in a row;
//! * script errors are shown on the error line below the demo;
//! * undecodable replies are logged and the previous scene is drawn again.

use crate::{
	command::Command,
	config::Settings,
	demos::Demo,
	engine::{Engine, RedisEngine},
	error::{Error, Result},
	input::{self, Backend, Crossterm, EventSource, Input, RawMode, TerminalEvents},
	render::{Canvas, Cell, Renderer},
};
use crossterm::style::Color;
use std::{
	io::{self, Write},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	thread,
	time::Instant,
};

/// Run `demo` on the process' terminal against the store described by
/// `settings` and return the demo's farewell line.
pub fn play<D: Demo>(demo: D, settings: Settings) -> Result<String> {
	let engine = RedisEngine::open(&settings)?;
	let mut tick_loop = TickLoop::new(demo, engine, settings)?;
	tick_loop.run()?;
	Ok(tick_loop.demo().farewell())
}

/// Tick loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
	/// Waiting for the store to answer the handshake.
	Connecting,

	/// Ticking.
	Running,

	/// Terminal handed back; nothing more happens.
	Terminated,
}

/// Drives one demo against one store on one terminal.
pub struct TickLoop<D, E, S = TerminalEvents, W = io::Stdout, B = Crossterm>
where
	D: Demo,
	E: Engine,
	S: EventSource,
	W: Write,
	B: Backend,
{
	demo: D,
	engine: E,
	input: Input<S>,
	renderer: Renderer<W>,
	raw: RawMode<B>,
	settings: Settings,
	stop: Arc<AtomicBool>,
	state: State,
	scene: Option<D::Scene>,
	notice: Option<String>,
	failures: u32,
	ticks: u64,
}

impl<D: Demo, E: Engine> TickLoop<D, E> {
	/// Return a [`TickLoop`] on the process' terminal. Raw mode is entered
	/// right away; panics and termination signals give the terminal back.
	pub fn new(demo: D, engine: E, settings: Settings) -> Result<Self> {
		let raw = RawMode::acquire(Crossterm)?;
		input::restore_on_panic(raw.release_handle());
		let tick_loop = Self::with_terminal(
			demo,
			engine,
			settings,
			Input::new(TerminalEvents),
			Renderer::stdout(),
			raw,
		);
		input::stop_on_signals(&tick_loop.stop)?;
		Ok(tick_loop)
	}
}

impl<D, E, S, W, B> TickLoop<D, E, S, W, B>
where
	D: Demo,
	E: Engine,
	S: EventSource,
	W: Write,
	B: Backend,
{
	/// Return a [`TickLoop`] on explicitly given terminal parts.
	pub fn with_terminal(
		demo: D,
		engine: E,
		settings: Settings,
		input: Input<S>,
		renderer: Renderer<W>,
		raw: RawMode<B>,
	) -> Self {
		Self {
			demo,
			engine,
			input,
			renderer,
			raw,
			settings,
			stop: Arc::new(AtomicBool::new(false)),
			state: State::Connecting,
			scene: None,
			notice: None,
			failures: 0,
			ticks: 0,
		}
	}

	/// Run until quit or a fatal error. The terminal is restored either way.
	pub fn run(&mut self) -> Result<()> {
		self.connect()?;
		while self.state == State::Running {
			let started = Instant::now();
			self.tick()?;
			if self.state == State::Running {
				thread::sleep(self.settings.tick.saturating_sub(started.elapsed()));
			}
		}
		self.terminate()
	}

	/// Take over the screen and shake hands with the store.
	pub fn connect(&mut self) -> Result<()> {
		if self.state != State::Connecting {
			return Ok(());
		}
		log::info!("Starting {} against {}", self.demo.name(), self.settings.url());

		if let Err(e) = self.renderer.enter() {
			return Err(self.abort(e.into()));
		}
		if let Err(e) = self.engine.ping() {
			return Err(self.abort(e));
		}
		if let Err(e) = self.demo.setup(&mut self.engine) {
			return Err(self.abort(e));
		}

		self.state = State::Running;
		Ok(())
	}

	/// One iteration: read input, evaluate, draw. Does not sleep.
	pub fn tick(&mut self) -> Result<()> {
		if self.state != State::Running {
			return Ok(());
		}
		if self.stop.load(Ordering::SeqCst) {
			log::info!("Stop signal received after {} ticks", self.ticks);
			return self.terminate();
		}

		let commands = match self.input.drain() {
			Ok(commands) => commands,
			Err(e) => return Err(self.abort(e.into())),
		};
		for command in commands {
			match command {
				Command::Quit => {
					log::info!("Quit requested after {} ticks", self.ticks);
					return self.terminate();
				}
				other => self.demo.command(other),
			}
		}

		let keys = self.demo.keys();
		let args = self.demo.args();
		match self.engine.eval(self.demo.script(), &keys, &args) {
			Ok(reply) => {
				self.failures = 0;
				match self.demo.decode(reply) {
					Ok(scene) => {
						self.scene = Some(scene);
						self.notice = None;
					}
					Err(e) => {
						log::warn!("Keeping previous {} frame: {}", self.demo.name(), e);
						self.notice = Some(format!("bad frame: {}", e));
					}
				}
			}
			Err(Error::Script(reason)) => {
				self.failures = 0;
				log::warn!("Store rejected the {} script: {}", self.demo.name(), reason);
				self.notice = Some(format!("script error: {}", reason));
			}
			Err(e) if e.is_transient() => {
				self.failures += 1;
				log::warn!(
					"Tick {} failed ({}/{}): {}",
					self.ticks,
					self.failures,
					self.settings.max_failures,
					e
				);
				if self.failures >= self.settings.max_failures {
					return Err(self.abort(e));
				}
				self.notice = Some(format!(
					"{} (retry {}/{})",
					e, self.failures, self.settings.max_failures
				));
			}
			Err(e) => return Err(self.abort(e)),
		}

		self.ticks += 1;
		if let Err(e) = self.draw() {
			return Err(self.abort(e));
		}
		Ok(())
	}

	/// Paint the current scene and the error line, then draw.
	fn draw(&mut self) -> Result<()> {
		let (width, height) = self.demo.canvas_size();
		let mut canvas = Canvas::new(width, height + 1);
		self.demo.paint(self.scene.as_ref(), &mut canvas);
		if let Some(notice) = &self.notice {
			canvas.put_str(0, height, &format!(" {}", notice), Cell::default().fg(Color::Red).bold());
		}
		self.renderer.draw(&canvas)?;
		Ok(())
	}

	/// Clean the store up, give the screen back and restore the terminal
	/// mode. Calling it again does nothing.
	pub fn terminate(&mut self) -> Result<()> {
		if self.state == State::Terminated {
			return Ok(());
		}
		let was_running = self.state == State::Running;
		self.state = State::Terminated;

		if was_running {
			if let Err(e) = self.demo.teardown(&mut self.engine) {
				log::warn!("Failed to clean {} keys up: {}", self.demo.name(), e);
			}
		}

		let left = self.renderer.leave();
		self.raw.restore().map_err(Error::Input)?;
		left?;
		Ok(())
	}

	/// Terminate and hand `e` back.
	fn abort(&mut self, e: Error) -> Error {
		if let Err(cleanup) = self.terminate() {
			log::error!("Failed to restore the terminal: {}", cleanup);
		}
		e
	}

	/// Flag that ends the loop at the start of the next tick once raised.
	pub fn stop_flag(&self) -> Arc<AtomicBool> {
		Arc::clone(&self.stop)
	}

	/// Current state.
	pub fn state(&self) -> State {
		self.state
	}

	/// The demo being driven.
	pub fn demo(&self) -> &D {
		&self.demo
	}

	/// Last decoded scene.
	pub fn scene(&self) -> Option<&D::Scene> {
		self.scene.as_ref()
	}

	/// Text of the error line, if any.
	pub fn notice(&self) -> Option<&str> {
		self.notice.as_deref()
	}

	/// Connection failures in a row.
	pub fn failures(&self) -> u32 {
		self.failures
	}

	/// Completed ticks.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Input the loop reads commands from.
	pub fn input_mut(&mut self) -> &mut Input<S> {
		&mut self.input
	}

	/// Renderer the loop draws with.
	pub fn renderer(&self) -> &Renderer<W> {
		&self.renderer
	}

	/// The store connection.
	pub fn engine_mut(&mut self) -> &mut E {
		&mut self.engine
	}
}
