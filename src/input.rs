//! Keyboard input capture.
//!
//! [`RawMode`] owns the terminal mode for as long as it lives and
//! [`Input`] turns pending key events into [`Command`]s without blocking.

use crate::{
	command::{Command, Direction},
	error::{Error, Result},
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use std::{
	collections::VecDeque,
	io,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::Duration,
};

/// Most commands taken from the event queue in one tick.
const DRAIN_LIMIT: usize = 32;

/// Something able to switch the terminal in and out of raw mode.
pub trait Backend {
	/// Enter raw mode.
	fn enable(&mut self) -> io::Result<()>;

	/// Leave raw mode.
	fn disable(&mut self) -> io::Result<()>;
}

/// [`Backend`] of the process' controlling terminal.
#[derive(Debug, Default)]
pub struct Crossterm;

impl Backend for Crossterm {
	fn enable(&mut self) -> io::Result<()> {
		crossterm::terminal::enable_raw_mode()
	}

	fn disable(&mut self) -> io::Result<()> {
		crossterm::terminal::disable_raw_mode()
	}
}

/// Scoped raw mode. The terminal is restored by [`restore`](Self::restore)
/// or, failing that, when the guard is dropped; never twice.
pub struct RawMode<B: Backend = Crossterm> {
	backend: B,
	held: Arc<AtomicBool>,
}

impl<B: Backend> RawMode<B> {
	/// Enable raw mode through `backend`.
	pub fn acquire(mut backend: B) -> Result<Self> {
		backend.enable().map_err(Error::Input)?;
		Ok(Self {
			backend,
			held: Arc::new(AtomicBool::new(true)),
		})
	}

	/// Put the terminal back into its original mode. Calling it again does
	/// nothing.
	pub fn restore(&mut self) -> io::Result<()> {
		if !self.held.swap(false, Ordering::SeqCst) {
			return Ok(());
		}
		self.backend.disable()
	}

	/// Return `true` while raw mode is held.
	pub fn is_active(&self) -> bool {
		self.held.load(Ordering::SeqCst)
	}

	/// Return a [`Release`] sharing this guard's state.
	pub fn release_handle(&self) -> Release {
		Release {
			held: Arc::clone(&self.held),
		}
	}
}

impl<B: Backend> Drop for RawMode<B> {
	fn drop(&mut self) {
		if let Err(e) = self.restore() {
			log::error!("Failed to restore terminal mode: {}", e);
		}
	}
}

/// Lets code outside the guard, like a panic hook, take over restoring raw
/// mode.
#[derive(Debug, Clone)]
pub struct Release {
	held: Arc<AtomicBool>,
}

impl Release {
	/// Return `true` if the caller is now the one who must disable raw mode.
	/// The guard won't disable it afterwards.
	pub fn claim(&self) -> bool {
		self.held.swap(false, Ordering::SeqCst)
	}
}

/// Install a panic hook that gives the terminal back before the default hook
/// prints the panic message.
pub fn restore_on_panic(release: Release) {
	let default_hook = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		if release.claim() {
			let _ = crossterm::terminal::disable_raw_mode();
		}
		let _ = crossterm::execute!(
			io::stdout(),
			crossterm::style::ResetColor,
			crossterm::cursor::Show,
			crossterm::terminal::LeaveAlternateScreen
		);
		default_hook(info);
	}));
}

/// Raise `stop` on SIGINT, SIGTERM or SIGHUP instead of dying, so the tick
/// loop can restore the terminal. A second signal of the same kind while
/// `stop` is raised ends the process right away.
pub fn stop_on_signals(stop: &Arc<AtomicBool>) -> io::Result<()> {
	for signal in [SIGINT, SIGTERM, SIGHUP] {
		signal_hook::flag::register_conditional_shutdown(signal, 1, Arc::clone(stop))?;
		signal_hook::flag::register(signal, Arc::clone(stop))?;
	}
	Ok(())
}

/// Source of terminal events.
pub trait EventSource {
	/// Return the next event if one arrives within `timeout`.
	fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

/// [`EventSource`] reading the real terminal.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
	fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
		if event::poll(timeout)? {
			event::read().map(Some)
		} else {
			Ok(None)
		}
	}
}

/// [`EventSource`] replaying queued events, for headless runs.
#[derive(Debug, Default)]
pub struct QueuedEvents {
	events: VecDeque<Event>,
}

impl QueuedEvents {
	/// Return a new [`QueuedEvents`] holding `events`.
	pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
		Self {
			events: events.into_iter().collect(),
		}
	}

	/// Queue one more event.
	pub fn push(&mut self, event: Event) {
		self.events.push_back(event);
	}
}

impl EventSource for QueuedEvents {
	fn next_event(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
		Ok(self.events.pop_front())
	}
}

/// Non-blocking command reader.
pub struct Input<S: EventSource = TerminalEvents> {
	source: S,
}

impl<S: EventSource> Input<S> {
	/// Return a new [`Input`] reading from `source`.
	pub fn new(source: S) -> Self {
		Self { source }
	}

	/// Return the next pending command, or `None` when nothing recognised is
	/// waiting. Never waits for a key.
	pub fn poll(&mut self) -> io::Result<Option<Command>> {
		while let Some(event) = self.source.next_event(Duration::ZERO)? {
			if let Some(command) = command_for(&event) {
				return Ok(Some(command));
			}
		}
		Ok(None)
	}

	/// Take every pending command.
	pub fn drain(&mut self) -> io::Result<Vec<Command>> {
		let mut commands = Vec::new();
		while commands.len() < DRAIN_LIMIT {
			match self.poll()? {
				Some(command) => commands.push(command),
				None => break,
			}
		}
		Ok(commands)
	}

	/// Return mutable reference to the event source.
	pub fn source_mut(&mut self) -> &mut S {
		&mut self.source
	}
}

/// Translate a terminal event into a command. Anything unrecognised maps to
/// `None`.
pub fn command_for(event: &Event) -> Option<Command> {
	let KeyEvent {
		code,
		modifiers,
		kind,
		..
	} = match event {
		Event::Key(key) => *key,
		_ => return None,
	};

	if kind == KeyEventKind::Release {
		return None;
	}

	match code {
		KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
		KeyCode::Up | KeyCode::Char('w') => Some(Command::Move(Direction::Up)),
		KeyCode::Down | KeyCode::Char('s') => Some(Command::Move(Direction::Down)),
		KeyCode::Left | KeyCode::Char('a') => Some(Command::Move(Direction::Left)),
		KeyCode::Right | KeyCode::Char('d') => Some(Command::Move(Direction::Right)),
		KeyCode::Char('r') => Some(Command::Respawn),
		KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::{cell::Cell, rc::Rc, time::Instant};

	fn key(code: KeyCode) -> Event {
		Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
	}

	#[derive(Default, Clone)]
	struct Counting {
		enabled: Rc<Cell<usize>>,
		disabled: Rc<Cell<usize>>,
	}

	impl Backend for Counting {
		fn enable(&mut self) -> io::Result<()> {
			self.enabled.set(self.enabled.get() + 1);
			Ok(())
		}

		fn disable(&mut self) -> io::Result<()> {
			self.disabled.set(self.disabled.get() + 1);
			Ok(())
		}
	}

	struct Broken;

	impl Backend for Broken {
		fn enable(&mut self) -> io::Result<()> {
			Err(io::Error::new(io::ErrorKind::Other, "not a tty"))
		}

		fn disable(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn restore_once() -> Result<()> {
		let backend = Counting::default();
		let mut raw = RawMode::acquire(backend.clone())?;
		assert_eq!(backend.enabled.get(), 1);

		raw.restore()?;
		raw.restore()?;
		assert!(!raw.is_active());
		drop(raw);

		assert_eq!(backend.disabled.get(), 1);
		Ok(())
	}

	#[test]
	fn restore_on_drop() -> Result<()> {
		let backend = Counting::default();
		{
			let _raw = RawMode::acquire(backend.clone())?;
		}
		assert_eq!(backend.disabled.get(), 1);
		Ok(())
	}

	#[test]
	fn claimed_release_skips_guard() -> Result<()> {
		let backend = Counting::default();
		let raw = RawMode::acquire(backend.clone())?;
		let release = raw.release_handle();

		assert!(release.claim());
		assert!(!release.claim());
		assert!(!raw.is_active());
		drop(raw);
		assert_eq!(backend.disabled.get(), 0);
		Ok(())
	}

	#[test]
	fn restored_guard_leaves_nothing_to_claim() -> Result<()> {
		let backend = Counting::default();
		let mut raw = RawMode::acquire(backend.clone())?;
		let release = raw.release_handle();

		raw.restore()?;
		assert!(!release.claim());
		assert_eq!(backend.disabled.get(), 1);
		Ok(())
	}

	#[test]
	fn raw_mode_failure_is_input_error() {
		assert!(matches!(RawMode::acquire(Broken), Err(Error::Input(_))));
	}

	#[test]
	fn empty_poll_is_immediate() -> io::Result<()> {
		let mut input = Input::new(QueuedEvents::default());
		let started = Instant::now();
		assert_eq!(input.poll()?, None);
		assert!(started.elapsed() < Duration::from_millis(50));
		Ok(())
	}

	#[test]
	fn unknown_keys_skipped() -> io::Result<()> {
		let mut input = Input::new(QueuedEvents::new(vec![
			key(KeyCode::Char('x')),
			Event::FocusGained,
			key(KeyCode::Left),
		]));
		assert_eq!(input.poll()?, Some(Command::Move(Direction::Left)));
		assert_eq!(input.poll()?, None);
		Ok(())
	}

	#[test]
	fn drain_keeps_order() -> io::Result<()> {
		let mut input = Input::new(QueuedEvents::new(vec![
			key(KeyCode::Char('w')),
			key(KeyCode::Char('r')),
			key(KeyCode::Char('q')),
		]));
		assert_eq!(
			input.drain()?,
			vec![
				Command::Move(Direction::Up),
				Command::Respawn,
				Command::Quit
			]
		);
		Ok(())
	}

	#[test]
	fn key_map() {
		assert_eq!(command_for(&key(KeyCode::Down)), Some(Command::Move(Direction::Down)));
		assert_eq!(command_for(&key(KeyCode::Char('s'))), Some(Command::Move(Direction::Down)));
		assert_eq!(command_for(&key(KeyCode::Char('a'))), Some(Command::Move(Direction::Left)));
		assert_eq!(command_for(&key(KeyCode::Right)), Some(Command::Move(Direction::Right)));
		assert_eq!(command_for(&key(KeyCode::Char('d'))), Some(Command::Move(Direction::Right)));
		assert_eq!(command_for(&key(KeyCode::Esc)), Some(Command::Quit));
		assert_eq!(
			command_for(&Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))),
			Some(Command::Quit)
		);
		assert_eq!(command_for(&key(KeyCode::Char('c'))), None);
		assert_eq!(command_for(&key(KeyCode::Enter)), None);
	}
}
