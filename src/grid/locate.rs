use serde::{Deserialize, Serialize};

/// A rectangle in absolute pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Maps a room number to its cell in an image of the given size.
///
/// Rooms are numbered `floor * 100 + index` with a 1-based index; floor 1 is
/// the top row. Cell edges are placed at `i * size / count`, so when the
/// image size is not a multiple of the grid the leftover pixels are spread
/// over the cells and the cells still tile the image exactly.
///
/// The room must belong to the configured grid; out-of-range rooms are the
/// caller's responsibility.
pub fn locate(
    room_number: u32,
    image_width: u32,
    image_height: u32,
    floors: u32,
    rooms_per_floor: u32,
) -> CellRect {
    let col = ((room_number % 100).saturating_sub(1)) % rooms_per_floor;
    let row = (room_number / 100).saturating_sub(1);

    let (x, width) = span(col, rooms_per_floor, image_width);
    let (y, height) = span(row, floors, image_height);

    CellRect { x, y, width, height }
}

/// Start and length of slot `index` when `total` pixels are split into `count` slots.
fn span(index: u32, count: u32, total: u32) -> (u32, u32) {
    let edge = |i: u32| (i as u64 * total as u64 / count as u64) as u32;
    let start = edge(index);
    (start, edge(index + 1) - start)
}
