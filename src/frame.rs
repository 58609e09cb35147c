//! Frame buffer abstractions.
//!
//! A frame is one tick of a grid simulation as the store returns it: a flat,
//! row-major string with one byte per cell.

use crate::error::DecodeError;

/// One decoded tick of a rectangular grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	width: usize,
	height: usize,
	cells: Vec<u8>,
}

impl Frame {
	/// Return a new [`Frame`] with every cell set to zero.
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			cells: vec![0; width * height],
		}
	}

	/// Decode a raw `payload` into a `width`×`height` frame.
	///
	/// The payload must hold exactly one byte per cell.
	pub fn decode(payload: &[u8], width: usize, height: usize) -> Result<Self, DecodeError> {
		let expected = width * height;
		if payload.len() != expected {
			return Err(DecodeError::Length {
				expected,
				actual: payload.len(),
			});
		}
		Ok(Self {
			width,
			height,
			cells: payload.to_vec(),
		})
	}

	/// Return the flat payload this frame decodes from.
	pub fn encode(&self) -> Vec<u8> {
		self.cells.clone()
	}

	/// Set a cell. Writes outside the grid are ignored.
	pub fn set(&mut self, x: usize, y: usize, value: u8) {
		if x < self.width && y < self.height {
			self.cells[y * self.width + x] = value;
		}
	}

	/// Return a cell value, or zero outside the grid.
	pub fn get(&self, x: usize, y: usize) -> u8 {
		if x < self.width && y < self.height {
			self.cells[y * self.width + x]
		} else {
			0
		}
	}

	/// Return `true` if the cell is set.
	pub fn alive(&self, x: usize, y: usize) -> bool {
		self.get(x, y) != 0
	}

	/// Number of non-zero cells.
	pub fn population(&self) -> usize {
		self.cells.iter().filter(|&&c| c != 0).count()
	}

	/// Frame width in cells.
	pub fn width(&self) -> usize {
		self.width
	}

	/// Frame height in cells.
	pub fn height(&self) -> usize {
		self.height
	}

	/// Iterate rows top to bottom.
	pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
		// chunks panics on zero, an empty frame has no rows anyway
		self.cells.chunks(self.width.max(1))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decode_counts_cells() -> Result<(), DecodeError> {
		let frame = Frame::decode(&[0; 12], 4, 3)?;
		assert_eq!(frame.rows().count(), 3);
		assert!(frame.rows().all(|row| row.len() == 4));
		assert_eq!(frame.rows().map(<[u8]>::len).sum::<usize>(), 12);
		Ok(())
	}

	#[test]
	fn synthetic_round_trip() -> Result<(), DecodeError> {
		let mut frame = Frame::new(7, 5);
		frame.set(0, 0, 1);
		frame.set(6, 4, 36);
		frame.set(3, 2, 9);

		let decoded = Frame::decode(&frame.encode(), 7, 5)?;
		assert_eq!(decoded, frame);
		assert_eq!(decoded.get(6, 4), 36);
		assert_eq!(decoded.population(), 3);
		Ok(())
	}

	#[test]
	fn length_mismatch() {
		assert_eq!(
			Frame::decode(&[1, 0, 1], 2, 2),
			Err(DecodeError::Length {
				expected: 4,
				actual: 3
			})
		);
		assert!(Frame::decode(&[0; 5], 2, 2).is_err());
	}

	#[test]
	fn reads_outside_are_dead() {
		let mut frame = Frame::new(2, 2);
		frame.set(5, 5, 1);
		assert_eq!(frame.population(), 0);
		assert!(!frame.alive(2, 0));
	}
}
