//! User intents produced by [`input`](crate::input).

use std::fmt;

/// Structure which determines direction of something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Up.
	Up,

	/// Down.
	Down,

	/// Left.
	Left,

	/// Right.
	Right,
}

impl Default for Direction {
	fn default() -> Self {
		Self::Right
	}
}

/// Formats as the upper-case token the snake script compares against.
impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let upper_case = format!("{:?}", self).to_uppercase();
		write!(f, "{}", upper_case)
	}
}

/// A single user intent. Lives for one tick at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Steer the player's snake.
	Move(Direction),

	/// Bring a dead snake back.
	Respawn,

	/// Leave the demo.
	Quit,
}
