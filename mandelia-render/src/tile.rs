/// Side of a square work unit handed to one Rayon task.
pub const TILE_SIZE: u32 = 64;

/// A block of pixels computed as one unit; edge tiles may be clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixel columns covered, left to right.
    pub fn columns(&self) -> std::ops::Range<u32> {
        self.x..self.x + self.width
    }

    /// Pixel rows covered, top to bottom.
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.y..self.y + self.height
    }
}

/// Cut a `width × height` frame into row-major tiles that cover every
/// pixel exactly once.
pub fn build_tile_grid(width: u32, height: u32) -> Vec<Tile> {
    (0..height)
        .step_by(TILE_SIZE as usize)
        .flat_map(|y| {
            (0..width).step_by(TILE_SIZE as usize).map(move |x| Tile {
                x,
                y,
                width: TILE_SIZE.min(width - x),
                height: TILE_SIZE.min(height - y),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_each_pixel_once() {
        let (w, h) = (200u32, 150u32);
        let mut hits = vec![0u8; (w * h) as usize];
        for tile in build_tile_grid(w, h) {
            for y in tile.rows() {
                for x in tile.columns() {
                    hits[(y * w + x) as usize] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&n| n == 1));
    }

    #[test]
    fn edge_tiles_are_clipped() {
        let tiles = build_tile_grid(130, 70);
        assert_eq!(tiles.len(), 3 * 2);
        let last = tiles.last().unwrap();
        assert_eq!((last.x, last.y, last.width, last.height), (128, 64, 2, 6));
        assert!(tiles.iter().all(|t| t.width <= TILE_SIZE && t.height <= TILE_SIZE));
    }

    #[test]
    fn single_pixel_frame() {
        let tiles = build_tile_grid(1, 1);
        assert_eq!(tiles, vec![Tile { x: 0, y: 0, width: 1, height: 1 }]);
    }

    #[test]
    fn empty_grid() {
        assert!(build_tile_grid(0, 10).is_empty());
    }
}
