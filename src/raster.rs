//! Raster grid and affine transform types
//!
//! A [`RasterGrid`] is a row-major 2D array of `f64` cell values plus the
//! six-coefficient affine [`GridTransform`] that georeferences it. The
//! masking operations here reduce the edge-extent raster to the boolean
//! border mask that feeds zone vectorization: cells at the fully-resolved
//! sentinel are zeroed, and cells already claimed by a prior process are
//! suppressed through a secondary mask grid.

/// Affine transform mapping (column, row) grid positions to map coordinates
///
/// Uses the same coefficient layout as the common GIS affine convention:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// For a north-up raster, `b` and `d` are zero, `a` is the pixel width,
/// `e` is the negative pixel height, and `(c, f)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    /// X scale (pixel width)
    pub a: f64,
    /// X rotation/shear
    pub b: f64,
    /// X offset (left edge of the grid)
    pub c: f64,
    /// Y rotation/shear
    pub d: f64,
    /// Y scale (negative pixel height for north-up rasters)
    pub e: f64,
    /// Y offset (top edge of the grid)
    pub f: f64,
}

impl GridTransform {
    /// Create a transform from explicit coefficients
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create a north-up transform from the top-left corner and pixel sizes
    ///
    /// # Arguments
    ///
    /// * `west` - X coordinate of the grid's left edge
    /// * `north` - Y coordinate of the grid's top edge
    /// * `xres` - Pixel width in map units
    /// * `yres` - Pixel height in map units (positive; stored negated)
    ///
    /// # Example
    ///
    /// ```
    /// use geo_border_dissolve::GridTransform;
    ///
    /// let transform = GridTransform::from_origin(100.0, 200.0, 10.0, 10.0);
    /// assert_eq!(transform.apply(0.0, 0.0), (100.0, 200.0));
    /// assert_eq!(transform.apply(1.0, 1.0), (110.0, 190.0));
    /// ```
    pub fn from_origin(west: f64, north: f64, xres: f64, yres: f64) -> Self {
        Self {
            a: xres,
            b: 0.0,
            c: west,
            d: 0.0,
            e: -yres,
            f: north,
        }
    }

    /// Identity transform (map coordinates equal grid coordinates)
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Map a (column, row) grid position to (x, y) map coordinates
    ///
    /// Fractional positions are valid; pixel corners sit at integer
    /// positions and pixel centers at offsets of 0.5.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }
}

/// A single-band raster: row-major cell values with a georeferencing
/// transform and an optional nodata value
#[derive(Debug, Clone)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    cells: Vec<f64>,
    transform: GridTransform,
    nodata: Option<f64>,
}

impl RasterGrid {
    /// Create a grid from row-major cell values
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<f64>, transform: GridTransform) -> Self {
        assert_eq!(
            cells.len(),
            width * height,
            "cell buffer length must equal width * height"
        );
        Self {
            width,
            height,
            cells,
            transform,
            nodata: None,
        }
    }

    /// Set the nodata value used by [`RasterGrid::is_set`]
    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// Grid width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Georeferencing transform
    pub fn transform(&self) -> GridTransform {
        self.transform
    }

    /// Cell value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.width + col]
    }

    /// Overwrite the cell value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.width + col] = value;
    }

    /// Whether the cell holds data: not nodata when a nodata value is
    /// declared, otherwise any non-zero value
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        let value = self.get(row, col);
        match self.nodata {
            Some(nodata) => value != nodata,
            None => value != 0.0,
        }
    }

    /// Zero every cell equal to the fully-resolved sentinel value
    ///
    /// Interior cells carry the sentinel (full coverage by exactly one
    /// county); only the remaining non-zero cells are ambiguous border
    /// pixels.
    pub fn zero_sentinel(&mut self, sentinel: f64) {
        for cell in &mut self.cells {
            if *cell == sentinel {
                *cell = 0.0;
            }
        }
    }

    /// Zero every cell that is set in `resolved`, suppressing border pixels
    /// a prior process has already counted
    ///
    /// # Panics
    ///
    /// Panics if `resolved` does not share this grid's dimensions.
    pub fn suppress_resolved(&mut self, resolved: &RasterGrid) {
        assert_eq!(
            (self.width, self.height),
            (resolved.width, resolved.height),
            "resolved mask must share the extent raster's grid"
        );
        for row in 0..self.height {
            for col in 0..self.width {
                if resolved.is_set(row, col) {
                    self.set(row, col, 0.0);
                }
            }
        }
    }

    /// Reduce the grid to a boolean border mask (non-zero becomes true)
    ///
    /// The cell values themselves are discarded at this point; zones carry
    /// no class value after vectorization.
    pub fn border_mask(&self) -> Vec<bool> {
        self.cells.iter().map(|&v| v != 0.0).collect()
    }
}
