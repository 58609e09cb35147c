//! Braille packing: one glyph shows a 2×4 block of boolean cells.
//!
//! Dot numbering follows the Unicode braille patterns block:
//! ```text
//! 1 4      0x01 0x08
//! 2 5      0x02 0x10
//! 3 6      0x04 0x20
//! 7 8      0x40 0x80
//! ```

use crate::{
	frame::Frame,
	render::{Canvas, Cell},
};

/// First codepoint of the braille patterns block, the glyph with no dots.
pub const BLANK: char = '\u{2800}';

/// Glyph with all eight dots raised.
pub const FULL: char = '\u{28FF}';

/// Cells covered by one glyph horizontally.
pub const BLOCK_WIDTH: usize = 2;

/// Cells covered by one glyph vertically.
pub const BLOCK_HEIGHT: usize = 4;

/// A 2×4 block indexed as `block[dx][dy]`.
pub type Block = [[bool; BLOCK_HEIGHT]; BLOCK_WIDTH];

/// Return the dot bit for a cell inside a block.
fn bit(dx: usize, dy: usize) -> u32 {
	match (dx, dy) {
		(0, 0) => 0x01,
		(0, 1) => 0x02,
		(0, 2) => 0x04,
		(0, 3) => 0x40,
		(1, 0) => 0x08,
		(1, 1) => 0x10,
		(1, 2) => 0x20,
		(1, 3) => 0x80,
		_ => 0x00,
	}
}

/// Encode a block into its braille glyph.
pub fn pack(block: &Block) -> char {
	let mut mask = 0;
	for (dx, column) in block.iter().enumerate() {
		for (dy, &set) in column.iter().enumerate() {
			if set {
				mask |= bit(dx, dy);
			}
		}
	}
	char::from_u32(BLANK as u32 + mask).unwrap_or(BLANK)
}

/// Cut the block whose top-left cell is `(x, y)` out of a frame. Cells past
/// the frame edge are unset.
pub fn block_at(frame: &Frame, x: usize, y: usize) -> Block {
	let mut block = [[false; BLOCK_HEIGHT]; BLOCK_WIDTH];
	for (dx, column) in block.iter_mut().enumerate() {
		for (dy, cell) in column.iter_mut().enumerate() {
			*cell = frame.alive(x + dx, y + dy);
		}
	}
	block
}

/// Terminal columns and rows needed to show a frame.
pub fn glyph_size(frame: &Frame) -> (usize, usize) {
	glyphs_for(frame.width(), frame.height())
}

/// Terminal columns and rows needed to show `width`×`height` cells.
pub fn glyphs_for(width: usize, height: usize) -> (usize, usize) {
	(
		(width + BLOCK_WIDTH - 1) / BLOCK_WIDTH,
		(height + BLOCK_HEIGHT - 1) / BLOCK_HEIGHT,
	)
}

/// Paint a whole frame as braille glyphs, top-left glyph at `(col, row)`.
pub fn paint(frame: &Frame, canvas: &mut Canvas, col: usize, row: usize, template: Cell) {
	let (cols, rows) = glyph_size(frame);
	for gy in 0..rows {
		for gx in 0..cols {
			let ch = pack(&block_at(frame, gx * BLOCK_WIDTH, gy * BLOCK_HEIGHT));
			canvas.set(col + gx, row + gy, Cell { ch, ..template });
		}
	}
}
