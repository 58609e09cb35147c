//! Multiplayer snake.
//!
//! Every client evaluates the same script against one shared game state. The
//! script records the caller's direction and, if the tick lock has expired,
//! advances the whole game one step. Clients only read the returned state and
//! draw it, so any number of terminals can play together.
//!
//! # Game state
//! The script returns the game as json:
//! ```json
//! {
//!     "w": 60, "h": 30, "tick": 412,
//!     "food": {"x": 17, "y": 9},
//!     "players": [
//!         {
//!             "name": "alice",
//!             "body": [{"x": 5, "y": 3}, {"x": 4, "y": 3}],
//!             "dir": "RIGHT", "score": 2, "alive": true, "last_seen": 411
//!         }
//!     ]
//! }
//! ```
//! Lua's json encoder can't tell an empty array from an empty object, so
//! empty `players` and `body` arrive as `{}`.

use super::Demo;
use crate::{
	command::{Command, Direction},
	engine::{Engine, Reply, Script},
	error::{DecodeError, Result},
	render::{Canvas, Cell},
};
use crossterm::style::Color;
use serde::{de::IgnoredAny, Deserialize, Deserializer};
use std::time::Duration;

/// Key holding the game state.
pub const GAME_KEY: &str = "snake:game";

/// Key whose expiry lets the next caller advance the game.
pub const TICK_KEY: &str = "snake:tick";

/// Interval between two client round trips.
pub const TICK: Duration = Duration::from_millis(50);

/// Interval between two game steps, enforced by the store.
pub const GAME_TICK: Duration = Duration::from_millis(100);

/// Widest board.
pub const MAX_WIDTH: usize = 60;

/// Tallest board.
pub const MAX_HEIGHT: usize = 30;

/// Smallest board the script can spawn snakes on.
pub const MIN_SIZE: usize = 8;

/// Snake colors, assigned by join order.
pub const PLAYER_COLORS: [Color; 6] = [
	Color::Green,
	Color::Cyan,
	Color::Magenta,
	Color::Yellow,
	Color::Red,
	Color::Blue,
];

/// Board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Point {
	/// Column.
	#[serde(deserialize_with = "number")]
	pub x: i64,

	/// Row, growing downwards.
	#[serde(deserialize_with = "number")]
	pub y: i64,
}

/// One player as the script sees it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Player {
	/// Player name, unique within a game.
	pub name: String,

	/// Segments, head first.
	#[serde(default, deserialize_with = "list")]
	pub body: Vec<Point>,

	/// Food eaten plus snakes beaten.
	#[serde(default, deserialize_with = "number")]
	pub score: i64,

	/// Dead snakes stay on the board until respawned.
	#[serde(default)]
	pub alive: bool,
}

/// Whole game state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Board {
	/// Board width.
	#[serde(deserialize_with = "number")]
	pub w: i64,

	/// Board height.
	#[serde(deserialize_with = "number")]
	pub h: i64,

	/// Steps taken since the game started.
	#[serde(default, deserialize_with = "number")]
	pub tick: i64,

	/// Food position.
	pub food: Point,

	/// Everyone in the game.
	#[serde(default, deserialize_with = "list")]
	pub players: Vec<Player>,
}

impl Board {
	/// Parse the json state.
	pub fn from_slice(json: &[u8]) -> std::result::Result<Self, DecodeError> {
		Ok(serde_json::from_slice(json)?)
	}

	/// Return `true` if anybody but `name` is playing.
	pub fn has_others(&self, name: &str) -> bool {
		self.players.iter().any(|p| p.name != name)
	}
}

/// Accept integers however Lua chose to print them.
fn number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
	let n = f64::deserialize(deserializer)?;
	Ok(n.round() as i64)
}

/// Accept `{}` as an empty list.
fn list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum ListOrEmpty<I> {
		List(Vec<I>),
		Empty(IgnoredAny),
	}

	Ok(match ListOrEmpty::<T>::deserialize(deserializer)? {
		ListOrEmpty::List(items) => items,
		ListOrEmpty::Empty(_) => Vec::new(),
	})
}

/// Snake demo client.
pub struct Snake {
	name: String,
	width: usize,
	height: usize,
	columns: usize,
	direction: Direction,
	respawn: bool,
	script: Script,
}

impl Snake {
	/// Return a new [`Snake`] client playing as `name` on a `width`×`height`
	/// board.
	pub fn new(name: impl Into<String>, width: usize, height: usize) -> Self {
		let width = width.max(MIN_SIZE);
		Self {
			name: name.into(),
			width,
			height: height.max(MIN_SIZE),
			columns: width + 2,
			direction: Direction::default(),
			respawn: false,
			script: Script::new(include_str!("scripts/snake.lua")),
		}
	}

	/// Return a [`Snake`] client whose board fits a terminal of
	/// `cols`×`rows`, leaving room below for the error line and the parked
	/// cursor.
	pub fn for_terminal(name: impl Into<String>, (cols, rows): (usize, usize)) -> Self {
		let mut snake = Self::new(
			name,
			cols.saturating_sub(2).min(MAX_WIDTH),
			rows.saturating_sub(7).min(MAX_HEIGHT),
		);
		snake.columns = snake.columns.max(cols);
		snake
	}

	/// Player name.
	pub fn player(&self) -> &str {
		&self.name
	}

	/// Direction sent with the next evaluation.
	pub fn direction(&self) -> Direction {
		self.direction
	}

	/// Canvas position of a board point, if it lies on the board.
	fn cell_at(&self, p: Point) -> Option<(usize, usize)> {
		let (x, y) = (usize::try_from(p.x).ok()?, usize::try_from(p.y).ok()?);
		if x < self.width && y < self.height {
			Some((x + 1, y + 2))
		} else {
			None
		}
	}

	fn paint_border(&self, canvas: &mut Canvas) {
		let (right, bottom) = (self.width + 1, self.height + 2);
		for x in 1..right {
			canvas.set(x, 1, Cell::plain('─'));
			canvas.set(x, bottom, Cell::plain('─'));
		}
		for y in 2..bottom {
			canvas.set(0, y, Cell::plain('│'));
			canvas.set(right, y, Cell::plain('│'));
		}
		canvas.set(0, 1, Cell::plain('┌'));
		canvas.set(right, 1, Cell::plain('┐'));
		canvas.set(0, bottom, Cell::plain('└'));
		canvas.set(right, bottom, Cell::plain('┘'));
	}

	fn paint_board(&self, board: &Board, canvas: &mut Canvas) {
		if let Some((x, y)) = self.cell_at(board.food) {
			canvas.set(x, y, Cell::plain('*').fg(Color::Red).bold());
		}

		let mut scores = Vec::with_capacity(board.players.len());
		for (i, player) in board.players.iter().enumerate() {
			let you = player.name == self.name;
			let tag = if you { " (YOU)" } else { "" };
			let dead = match (player.alive, you) {
				(true, _) => "",
				(false, true) => " [dead, R=respawn]",
				(false, false) => " [dead]",
			};
			scores.push(format!("{}: {}{}{}", player.name, player.score, tag, dead));

			let color = PLAYER_COLORS[i % PLAYER_COLORS.len()];
			for (j, segment) in player.body.iter().enumerate() {
				let cell = match (player.alive, j == 0) {
					(true, true) => Cell::plain('@').fg(color).bold(),
					(true, false) => Cell::plain('o').fg(color).bold(),
					(false, true) => Cell::plain('x').dim(),
					(false, false) => Cell::plain('.').dim(),
				};
				if let Some((x, y)) = self.cell_at(*segment) {
					canvas.set(x, y, cell);
				}
			}
		}

		canvas.put_str(0, self.height + 3, &scores.join("  |  "), Cell::default());
	}
}

impl Demo for Snake {
	type Scene = Board;

	fn name(&self) -> &str {
		"snake"
	}

	fn script(&self) -> &Script {
		&self.script
	}

	fn keys(&self) -> Vec<String> {
		vec![GAME_KEY.to_string(), TICK_KEY.to_string()]
	}

	fn args(&mut self) -> Vec<String> {
		let respawn = if std::mem::take(&mut self.respawn) { "1" } else { "0" };
		vec![
			GAME_TICK.as_millis().to_string(),
			self.width.to_string(),
			self.height.to_string(),
			self.name.clone(),
			self.direction.to_string(),
			respawn.to_string(),
		]
	}

	fn command(&mut self, command: Command) {
		match command {
			Command::Move(direction) => self.direction = direction,
			Command::Respawn => self.respawn = true,
			Command::Quit => (),
		}
	}

	fn decode(&mut self, reply: Reply) -> std::result::Result<Board, DecodeError> {
		Board::from_slice(&reply.into_bytes()?)
	}

	fn canvas_size(&self) -> (usize, usize) {
		(self.columns.max(self.width + 2), self.height + 5)
	}

	fn paint(&self, scene: Option<&Board>, canvas: &mut Canvas) {
		let tick = scene.map_or_else(|| "-".to_string(), |b| b.tick.to_string());
		canvas.put_str(
			0,
			0,
			&format!(" SNAKE x DRAGONFLY  |  You: {}  |  tick {}", self.name, tick),
			Cell::default().bold(),
		);

		self.paint_border(canvas);
		if let Some(board) = scene {
			self.paint_board(board, canvas);
		}

		canvas.put_str(
			0,
			self.height + 4,
			" Arrows/WASD=move  Q=quit  R=respawn",
			Cell::default().dim(),
		);
	}

	/// Multiplayer state belongs to everyone, nothing to clear on join.
	fn setup(&mut self, _engine: &mut dyn Engine) -> Result<()> {
		Ok(())
	}

	/// The last player to leave removes the game.
	fn teardown(&mut self, engine: &mut dyn Engine) -> Result<()> {
		let raw = match engine.get(GAME_KEY)? {
			Some(raw) => raw,
			None => return Ok(()),
		};
		let board = Board::from_slice(&raw)?;
		if !board.has_others(&self.name) {
			log::info!("Last player left, removing the game");
			engine.del(&self.keys())?;
		}
		Ok(())
	}

	fn farewell(&self) -> String {
		format!("{} left the game.", self.name)
	}
}
