//! Conway's Game of Life on a torus.
//!
//! The store owns the universe and computes one generation per evaluation.
//! The client shows it with braille glyphs, eight cells per terminal cell.

use super::Demo;
use crate::{
	braille,
	engine::{Reply, Script},
	error::DecodeError,
	frame::Frame,
	render::{Canvas, Cell},
};
use std::time::Duration;

/// Key holding the universe.
pub const KEY: &str = "life:grid";

/// Interval between two generations, 15 per second.
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / 15);

/// Widest universe in cells.
pub const MAX_WIDTH: usize = 200;

/// Tallest universe in cells.
pub const MAX_HEIGHT: usize = 160;

/// One generation as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
	/// Cell grid.
	pub frame: Frame,

	/// Number of live cells.
	pub population: usize,
}

/// Game of Life demo.
pub struct Life {
	width: usize,
	height: usize,
	generation: u64,
	script: Script,
}

impl Life {
	/// Return a new [`Life`] with a `width`×`height` cell universe.
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width: width.max(1),
			height: height.max(1),
			generation: 0,
			script: Script::new(include_str!("scripts/life.lua")),
		}
	}

	/// Return a [`Life`] whose universe fills a terminal of `cols`×`rows`.
	pub fn for_terminal((cols, rows): (usize, usize)) -> Self {
		Self::new(
			(cols.saturating_sub(2) * braille::BLOCK_WIDTH).min(MAX_WIDTH),
			(rows.saturating_sub(3) * braille::BLOCK_HEIGHT).min(MAX_HEIGHT),
		)
	}

	/// Number of generations received so far.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	fn status(&self, population: usize) -> String {
		format!(
			" GAME OF LIFE x DRAGONFLY  |  gen {}  |  {} alive  |  {}x{} universe",
			self.generation, population, self.width, self.height
		)
	}
}

impl Demo for Life {
	type Scene = Generation;

	fn name(&self) -> &str {
		"life"
	}

	fn script(&self) -> &Script {
		&self.script
	}

	fn keys(&self) -> Vec<String> {
		vec![KEY.to_string()]
	}

	fn args(&mut self) -> Vec<String> {
		vec![self.width.to_string(), self.height.to_string()]
	}

	fn decode(&mut self, reply: Reply) -> Result<Generation, DecodeError> {
		let mut items = reply.into_list()?.into_iter();
		let payload = items
			.next()
			.ok_or_else(|| DecodeError::Shape("empty array".to_string()))?
			.into_bytes()?;
		let frame = Frame::decode(&payload, self.width, self.height)?;
		let population = match items.next() {
			Some(pop) => usize::try_from(pop.to_int()?)
				.map_err(|_| DecodeError::Shape("negative population".to_string()))?,
			None => frame.population(),
		};

		self.generation += 1;
		Ok(Generation { frame, population })
	}

	fn canvas_size(&self) -> (usize, usize) {
		let (cols, rows) = braille::glyphs_for(self.width, self.height);
		(cols.max(self.status(0).chars().count() + 8), rows + 1)
	}

	fn paint(&self, scene: Option<&Generation>, canvas: &mut Canvas) {
		let population = scene.map_or(0, |g| g.population);
		canvas.put_str(0, 0, &self.status(population), Cell::default());
		if let Some(generation) = scene {
			braille::paint(&generation.frame, canvas, 0, 1, Cell::default());
		}
	}

	fn farewell(&self) -> String {
		format!("Universe collapsed after {} generations.", self.generation)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn reply(payload: Vec<u8>, pop: i64) -> Reply {
		Reply::List(vec![Reply::Bytes(payload), Reply::Int(pop)])
	}

	#[test]
	fn sized_to_terminal() {
		let life = Life::for_terminal((80, 24));
		assert_eq!((life.width, life.height), (156, 84));

		let life = Life::for_terminal((300, 100));
		assert_eq!((life.width, life.height), (MAX_WIDTH, MAX_HEIGHT));
	}

	#[test]
	fn decode_counts_generations() -> Result<(), DecodeError> {
		let mut life = Life::new(4, 4);
		let mut payload = vec![0; 16];
		payload[5] = 1;

		let generation = life.decode(reply(payload.clone(), 1))?;
		assert_eq!(generation.population, 1);
		assert!(generation.frame.alive(1, 1));

		life.decode(reply(payload, 1))?;
		assert_eq!(life.generation(), 2);
		assert_eq!(life.farewell(), "Universe collapsed after 2 generations.");
		Ok(())
	}

	#[test]
	fn bad_replies_do_not_count() {
		let mut life = Life::new(4, 4);
		assert!(life.decode(reply(vec![0; 3], 0)).is_err());
		assert!(life.decode(Reply::Bytes(vec![0; 16])).is_err());
		assert!(life.decode(Reply::List(vec![])).is_err());
		assert_eq!(life.generation(), 0);
	}

	#[test]
	fn population_falls_back_to_frame() -> Result<(), DecodeError> {
		let mut life = Life::new(2, 2);
		let generation = life.decode(Reply::List(vec![Reply::Bytes(vec![1, 0, 1, 1])]))?;
		assert_eq!(generation.population, 3);
		Ok(())
	}

	#[test]
	fn paints_status_and_glyphs() -> Result<(), DecodeError> {
		let mut life = Life::new(4, 8);
		let generation = life.decode(reply(vec![1; 32], 32))?;

		let (w, h) = life.canvas_size();
		assert_eq!(h, 3);
		let mut canvas = Canvas::new(w, h);
		life.paint(Some(&generation), &mut canvas);

		assert_eq!(canvas.get(1, 0).ch, 'G');
		assert_eq!(canvas.get(0, 1).ch, braille::FULL);
		assert_eq!(canvas.get(1, 2).ch, braille::FULL);
		Ok(())
	}
}
