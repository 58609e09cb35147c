//! DOOM fire effect.
//!
//! The store keeps a grid of heat intensities and makes the fire rise one
//! step per evaluation. Each intensity is shown as a background-coloured
//! space using the palette of the PSX port of DOOM.

use super::Demo;
use crate::{
	engine::{Reply, Script},
	error::DecodeError,
	frame::Frame,
	render::{Canvas, Cell},
};
use crossterm::style::Color;
use std::time::Duration;

/// Key holding the intensity grid.
pub const KEY: &str = "doom:fire";

/// Interval between two frames, 30 per second.
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// Widest fire drawn.
pub const MAX_WIDTH: usize = 120;

/// Tallest fire drawn.
pub const MAX_HEIGHT: usize = 50;

/// Fire palette from black to white, indexed by intensity.
pub const PALETTE: [(u8, u8, u8); 37] = [
	(0x07, 0x07, 0x07),
	(0x1F, 0x07, 0x07),
	(0x2F, 0x0F, 0x07),
	(0x47, 0x0F, 0x07),
	(0x57, 0x17, 0x07),
	(0x67, 0x1F, 0x07),
	(0x77, 0x1F, 0x07),
	(0x8F, 0x27, 0x07),
	(0x9F, 0x2F, 0x07),
	(0xAF, 0x3F, 0x07),
	(0xBF, 0x47, 0x07),
	(0xC7, 0x47, 0x07),
	(0xDF, 0x4F, 0x07),
	(0xDF, 0x57, 0x07),
	(0xDF, 0x57, 0x07),
	(0xD7, 0x5F, 0x07),
	(0xD7, 0x5F, 0x07),
	(0xD7, 0x67, 0x0F),
	(0xCF, 0x6F, 0x0F),
	(0xCF, 0x77, 0x0F),
	(0xCF, 0x7F, 0x0F),
	(0xCF, 0x87, 0x17),
	(0xC7, 0x87, 0x17),
	(0xC7, 0x8F, 0x17),
	(0xC7, 0x97, 0x1F),
	(0xBF, 0x9F, 0x1F),
	(0xBF, 0x9F, 0x1F),
	(0xBF, 0xA7, 0x27),
	(0xBF, 0xA7, 0x27),
	(0xBF, 0xAF, 0x2F),
	(0xB7, 0xAF, 0x2F),
	(0xB7, 0xB7, 0x2F),
	(0xB7, 0xB7, 0x37),
	(0xCF, 0xCF, 0x6F),
	(0xDF, 0xDF, 0x9F),
	(0xEF, 0xEF, 0xC7),
	(0xFF, 0xFF, 0xFF),
];

/// Return the color of an intensity. Values past the palette are white.
pub fn heat_color(intensity: u8) -> Color {
	let (r, g, b) = PALETTE[(intensity as usize).min(PALETTE.len() - 1)];
	Color::Rgb { r, g, b }
}

/// Paint a frame of intensities with its top-left pixel at `(col, row)`.
pub fn paint_heat(frame: &Frame, canvas: &mut Canvas, col: usize, row: usize) {
	for y in 0..frame.height() {
		for x in 0..frame.width() {
			canvas.set(col + x, row + y, Cell::plain(' ').bg(heat_color(frame.get(x, y))));
		}
	}
}

/// Fire demo.
pub struct Fire {
	width: usize,
	height: usize,
	script: Script,
}

impl Fire {
	/// Return a new [`Fire`] of `width`×`height` pixels.
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width: width.max(1),
			height: height.max(1),
			script: Script::new(include_str!("scripts/fire.lua")),
		}
	}

	/// Return a [`Fire`] fitting a terminal of `cols`×`rows`.
	pub fn for_terminal((cols, rows): (usize, usize)) -> Self {
		Self::new(cols.min(MAX_WIDTH), rows.saturating_sub(3).min(MAX_HEIGHT))
	}

	fn title(&self) -> String {
		format!(
			" DOOM FIRE x DRAGONFLY  --  {}x{} pixels computed inside the database",
			self.width, self.height
		)
	}
}

impl Demo for Fire {
	type Scene = Frame;

	fn name(&self) -> &str {
		"fire"
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

	fn decode(&mut self, reply: Reply) -> Result<Frame, DecodeError> {
		Frame::decode(&reply.into_bytes()?, self.width, self.height)
	}

	fn canvas_size(&self) -> (usize, usize) {
		(self.width.max(self.title().chars().count()), self.height + 1)
	}

	fn paint(&self, scene: Option<&Frame>, canvas: &mut Canvas) {
		canvas.put_str(0, 0, &self.title(), Cell::default());
		if let Some(frame) = scene {
			paint_heat(frame, canvas, 0, 1);
		}
	}

	fn farewell(&self) -> String {
		"Fire extinguished.".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sized_to_terminal() {
		let fire = Fire::for_terminal((200, 80));
		assert_eq!((fire.width, fire.height), (MAX_WIDTH, MAX_HEIGHT));

		let fire = Fire::for_terminal((80, 24));
		assert_eq!((fire.width, fire.height), (80, 21));
	}

	#[test]
	fn palette_clamps() {
		assert_eq!(heat_color(0), Color::Rgb { r: 7, g: 7, b: 7 });
		assert_eq!(heat_color(36), Color::Rgb { r: 255, g: 255, b: 255 });
		assert_eq!(heat_color(200), heat_color(36));
	}

	#[test]
	fn one_hot_cell_stands_out() -> Result<(), DecodeError> {
		let mut fire = Fire::new(10, 10);
		let mut payload = vec![0; 100];
		payload[3 * 10 + 3] = 36;
		let frame = fire.decode(Reply::Bytes(payload))?;

		let (w, h) = fire.canvas_size();
		let mut canvas = Canvas::new(w, h);
		fire.paint(Some(&frame), &mut canvas);

		let hot = canvas.get(3, 4);
		let mut distinct = 0;
		for y in 1..=10 {
			for x in 0..10 {
				if canvas.get(x, y) != hot {
					distinct += 1;
				}
			}
		}
		assert_eq!(distinct, 99);
		assert_eq!(hot.bg, heat_color(36));
		Ok(())
	}

	#[test]
	fn short_payload_rejected() {
		let mut fire = Fire::new(4, 4);
		assert!(matches!(
			fire.decode(Reply::Bytes(vec![0; 15])),
			Err(DecodeError::Length { expected: 16, actual: 15 })
		));
		assert!(fire.decode(Reply::Nil).is_err());
	}
}
