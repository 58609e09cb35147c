//! Terminal output.
//!
//! Demos paint a [`Canvas`] each tick and hand it to a [`Renderer`], which
//! keeps the canvas it drew last and only rewrites the cells that differ.

use crossterm::{
	cursor::{Hide, MoveTo, Show},
	queue,
	style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
	terminal::{
		BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
		LeaveAlternateScreen,
	},
};
use std::io::{self, Write};

/// One styled terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
	/// Glyph shown in the cell. Must be one column wide.
	pub ch: char,

	/// Foreground color.
	pub fg: Color,

	/// Background color.
	pub bg: Color,

	/// Bold attribute.
	pub bold: bool,

	/// Dim attribute.
	pub dim: bool,
}

impl Cell {
	/// Return a [`Cell`] with `ch` in the terminal's default colors.
	pub fn plain(ch: char) -> Self {
		Self {
			ch,
			..Self::default()
		}
	}

	/// Return a copy with another foreground color.
	pub fn fg(self, fg: Color) -> Self {
		Self { fg, ..self }
	}

	/// Return a copy with another background color.
	pub fn bg(self, bg: Color) -> Self {
		Self { bg, ..self }
	}

	/// Return a bold copy.
	pub fn bold(self) -> Self {
		Self { bold: true, ..self }
	}

	/// Return a dimmed copy.
	pub fn dim(self) -> Self {
		Self { dim: true, ..self }
	}
}

impl Default for Cell {
	fn default() -> Self {
		Self {
			ch: ' ',
			fg: Color::Reset,
			bg: Color::Reset,
			bold: false,
			dim: false,
		}
	}
}

/// Grid of cells a demo paints one tick into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
	width: usize,
	height: usize,
	cells: Vec<Cell>,
}

impl Canvas {
	/// Return a blank [`Canvas`].
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			cells: vec![Cell::default(); width * height],
		}
	}

	/// Blank every cell.
	pub fn clear(&mut self) {
		self.cells.fill(Cell::default());
	}

	/// Set a cell. Writes outside the canvas are ignored.
	pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
		if x < self.width && y < self.height {
			self.cells[y * self.width + x] = cell;
		}
	}

	/// Return a cell, or a blank one outside the canvas.
	pub fn get(&self, x: usize, y: usize) -> Cell {
		if x < self.width && y < self.height {
			self.cells[y * self.width + x]
		} else {
			Cell::default()
		}
	}

	/// Write `s` from `(x, y)` rightwards, styled like `template`. Clipped at
	/// the right edge.
	pub fn put_str(&mut self, x: usize, y: usize, s: &str, template: Cell) {
		for (i, ch) in s.chars().enumerate() {
			if x + i >= self.width {
				break;
			}
			self.set(x + i, y, Cell { ch, ..template });
		}
	}

	/// Iterate all cells row by row.
	pub fn cells(&self) -> impl Iterator<Item = &Cell> {
		self.cells.iter()
	}

	/// Canvas size as `(width, height)`.
	pub fn size(&self) -> (usize, usize) {
		(self.width, self.height)
	}
}

/// Double-buffered writer of canvases.
pub struct Renderer<W: Write> {
	out: W,
	previous: Option<Canvas>,
}

impl Renderer<io::Stdout> {
	/// Return a [`Renderer`] drawing to standard output.
	pub fn stdout() -> Self {
		Self::new(io::stdout())
	}
}

impl<W: Write> Renderer<W> {
	/// Return a new [`Renderer`] writing into `out`.
	pub fn new(out: W) -> Self {
		Self { out, previous: None }
	}

	/// Switch to the alternate screen, clear it and hide the cursor.
	pub fn enter(&mut self) -> io::Result<()> {
		queue!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All), MoveTo(0, 0))?;
		self.previous = None;
		self.out.flush()
	}

	/// Undo [`enter`](Self::enter).
	pub fn leave(&mut self) -> io::Result<()> {
		queue!(
			self.out,
			SetAttribute(Attribute::Reset),
			ResetColor,
			Show,
			LeaveAlternateScreen
		)?;
		self.out.flush()
	}

	/// Forget the last drawn canvas so the next draw repaints everything.
	pub fn invalidate(&mut self) {
		self.previous = None;
	}

	/// Draw `canvas`, touching only cells that changed since the last call,
	/// and return how many cells were written.
	///
	/// The cursor is always left at the start of the row below the canvas.
	pub fn draw(&mut self, canvas: &Canvas) -> io::Result<usize> {
		let (width, height) = canvas.size();
		let previous = self.previous.as_ref().filter(|p| p.size() == canvas.size());

		let mut updated = 0;
		let mut cursor = None;
		let mut style = None;

		for y in 0..height {
			for x in 0..width {
				let cell = canvas.get(x, y);
				if previous.map_or(false, |p| p.get(x, y) == cell) {
					continue;
				}

				if updated == 0 {
					queue!(self.out, BeginSynchronizedUpdate)?;
					if previous.is_none() {
						queue!(self.out, Clear(ClearType::All))?;
					}
				}

				if cursor != Some((x, y)) {
					queue!(self.out, MoveTo(x as u16, y as u16))?;
				}

				let wanted = (cell.fg, cell.bg, cell.bold, cell.dim);
				if style != Some(wanted) {
					queue!(
						self.out,
						SetAttribute(Attribute::Reset),
						SetForegroundColor(cell.fg),
						SetBackgroundColor(cell.bg)
					)?;
					if cell.bold {
						queue!(self.out, SetAttribute(Attribute::Bold))?;
					}
					if cell.dim {
						queue!(self.out, SetAttribute(Attribute::Dim))?;
					}
					style = Some(wanted);
				}

				queue!(self.out, Print(cell.ch))?;
				cursor = Some((x + 1, y));
				updated += 1;
			}
		}

		if updated > 0 {
			queue!(
				self.out,
				SetAttribute(Attribute::Reset),
				ResetColor,
				EndSynchronizedUpdate
			)?;
		}

		queue!(self.out, MoveTo(0, height as u16))?;
		self.out.flush()?;

		self.previous = Some(canvas.clone());
		Ok(updated)
	}

	/// Return a reference to the underlying writer.
	pub fn get_ref(&self) -> &W {
		&self.out
	}

	/// Return a mutable reference to the underlying writer.
	pub fn get_mut(&mut self) -> &mut W {
		&mut self.out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn drawn(renderer: &mut Renderer<Vec<u8>>) -> String {
		String::from_utf8(std::mem::take(renderer.get_mut())).unwrap()
	}

	#[test]
	fn first_draw_paints_everything() -> io::Result<()> {
		let mut renderer = Renderer::new(Vec::new());
		let canvas = Canvas::new(4, 3);
		assert_eq!(renderer.draw(&canvas)?, 12);
		Ok(())
	}

	#[test]
	fn identical_frames_draw_nothing() -> io::Result<()> {
		let mut renderer = Renderer::new(Vec::new());
		let mut canvas = Canvas::new(10, 10);
		canvas.put_str(0, 0, "hello", Cell::default().bold());

		renderer.draw(&canvas)?;
		drawn(&mut renderer);

		assert_eq!(renderer.draw(&canvas)?, 0);
		// only the cursor park remains
		assert_eq!(drawn(&mut renderer), "\x1b[11;1H");
		Ok(())
	}

	#[test]
	fn only_changed_cells_redrawn() -> io::Result<()> {
		let mut renderer = Renderer::new(Vec::new());
		let mut canvas = Canvas::new(10, 10);
		renderer.draw(&canvas)?;
		drawn(&mut renderer);

		canvas.set(3, 3, Cell::plain('#').fg(Color::Green));
		assert_eq!(renderer.draw(&canvas)?, 1);

		let out = drawn(&mut renderer);
		assert!(out.contains("\x1b[4;4H"));
		assert_eq!(out.matches('#').count(), 1);
		assert!(out.ends_with("\x1b[11;1H"));
		Ok(())
	}

	#[test]
	fn resize_forces_full_repaint() -> io::Result<()> {
		let mut renderer = Renderer::new(Vec::new());
		renderer.draw(&Canvas::new(2, 2))?;
		assert_eq!(renderer.draw(&Canvas::new(3, 2))?, 6);

		renderer.invalidate();
		assert_eq!(renderer.draw(&Canvas::new(3, 2))?, 6);
		Ok(())
	}

	#[test]
	fn put_str_clips() {
		let mut canvas = Canvas::new(3, 1);
		canvas.put_str(1, 0, "abc", Cell::default());
		assert_eq!(canvas.get(1, 0).ch, 'a');
		assert_eq!(canvas.get(2, 0).ch, 'b');
		assert_eq!(canvas.get(3, 0).ch, ' ');
	}
}
