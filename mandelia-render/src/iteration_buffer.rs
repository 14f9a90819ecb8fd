use crate::tile::Tile;

/// Per-pixel escape counts for a full frame.
///
/// This is the raw output of the renderer before coloring. Values lie in
/// `0..=max_iterations`; a value equal to `max_iterations` marks an interior
/// pixel. Keeping counts separate from colored pixels lets the coloration
/// change without re-computing iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationBuffer {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub data: Vec<u32>,
}

impl IterationBuffer {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            data: vec![max_iterations; size],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn is_interior(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == Some(self.max_iterations)
    }

    /// Sum of every count in the frame.
    pub fn sum(&self) -> u64 {
        self.data.iter().map(|&n| n as u64).sum()
    }

    /// Average count per pixel, `0.0` for an empty buffer.
    pub fn per_pixel(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.sum() as f64 / self.data.len() as f64
    }

    /// Copy a tile's row-major counts into place, clipping at the edges.
    pub fn blit_tile(&mut self, tile: &Tile, tile_data: &[u32]) {
        debug_assert_eq!(tile_data.len(), tile.pixel_count());
        if tile.width == 0 || tile.x >= self.width {
            return;
        }
        let len = tile.width.min(self.width - tile.x) as usize;
        for (src, y) in tile_data.chunks_exact(tile.width as usize).zip(tile.rows()) {
            if y >= self.height {
                break;
            }
            let start = y as usize * self.width as usize + tile.x as usize;
            self.data[start..start + len].copy_from_slice(&src[..len]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_all_interior() {
        let buf = IterationBuffer::new(4, 3, 50);
        assert_eq!(buf.data.len(), 12);
        assert!(buf.is_interior(3, 2));
        assert_eq!(buf.get(4, 0), None);
    }

    #[test]
    fn get_indexes_past_u32_range() {
        let buf = IterationBuffer {
            width: 70_000,
            height: 70_000,
            max_iterations: 5,
            data: Vec::new(),
        };
        assert_eq!(buf.get(69_999, 69_999), None);
    }

    #[test]
    fn statistics() {
        let mut buf = IterationBuffer::new(2, 2, 10);
        buf.data = vec![1, 2, 3, 10];
        assert_eq!(buf.sum(), 16);
        assert!((buf.per_pixel() - 4.0).abs() < f64::EPSILON);
        assert!(!buf.is_interior(0, 0));
        assert!(buf.is_interior(1, 1));
    }

    #[test]
    fn empty_buffer_per_pixel_is_zero() {
        let buf = IterationBuffer::new(0, 0, 10);
        assert_eq!(buf.per_pixel(), 0.0);
    }

    #[test]
    fn blit_tile_writes_region() {
        let mut buf = IterationBuffer::new(6, 4, 9);
        let tile = Tile {
            x: 2,
            y: 1,
            width: 3,
            height: 2,
        };
        buf.blit_tile(&tile, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(buf.get(2, 1), Some(1));
        assert_eq!(buf.get(4, 2), Some(6));
        assert_eq!(buf.get(0, 0), Some(9));
    }
}
