/// Regular lat/lon grid of a `.zbin` file. Values are stored row by row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularGrid {
    pub nrows: usize,
    pub ncols: usize,
    pub min_lat: f32,
    pub min_lon: f32,
    pub max_lat: f32,
    pub max_lon: f32,
}

impl RegularGrid {
    pub fn new(
        nrows: usize,
        ncols: usize,
        min_lat: f32,
        min_lon: f32,
        max_lat: f32,
        max_lon: f32,
    ) -> Self {
        RegularGrid {
            nrows,
            ncols,
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.nrows, self.ncols]
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.nrows * self.ncols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size() {
        let grid = RegularGrid::new(3, 5, 40.0, 10.0, 42.0, 14.0);
        assert_eq!(grid.shape(), [3, 5]);
        assert_eq!(grid.len(), 15);
        assert!(!grid.is_empty());
        assert!(RegularGrid::new(0, 5, 40.0, 10.0, 40.0, 14.0).is_empty());
    }
}
