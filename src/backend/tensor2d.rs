use crate::backend::Backend;
use std::fmt;
use std::marker::PhantomData;

/// Backend-typed 2D tensor.
///
/// Wraps a backend's native storage (`B::Tensor2D`) and carries the backend as a
/// phantom type, so tensors of different backends cannot be mixed:
///
/// ```compile_fail
/// use tabletrain::backend::{Backend, Tensor2D};
///
/// fn mix<A: Backend, B: Backend>(a: &Tensor2D<A>, b: &Tensor2D<B>) -> Tensor2D<A> {
///     a.sub(b) // mismatched backends
/// }
/// ```
///
/// `rows` is the first axis (samples), `cols` the second (features or labels).
/// Every operation returns a fresh tensor; `clone()` is a deep copy.
#[derive(Clone)]
pub struct Tensor2D<B: Backend> {
    pub(crate) data: B::Tensor2D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> fmt::Debug for Tensor2D<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor2D")
            .field("shape", &self.shape())
            .field("data", &self.data)
            .finish()
    }
}

impl<B: Backend> PartialEq for Tensor2D<B> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.to_vec() == other.to_vec()
    }
}

impl<B: Backend> Tensor2D<B> {
    pub(crate) fn from_raw(data: B::Tensor2D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Creates a tensor from row-major data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        Self::from_raw(B::from_vec_2d(data, rows, cols))
    }

    /// Creates a tensor from per-row vectors.
    ///
    /// # Panics
    /// If the rows have different lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "All rows must have same length"
        );
        let data = rows.iter().flat_map(|r| r.iter()).copied().collect();
        Self::new(data, n, cols)
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_raw(B::zeros_2d(rows, cols))
    }

    /// Creates a tensor with every element set to `value`.
    pub fn full(rows: usize, cols: usize, value: f64) -> Self {
        Self::from_raw(B::full_2d(rows, cols, value))
    }

    pub fn shape(&self) -> (usize, usize) {
        B::shape(&self.data)
    }

    /// Number of rows (first axis).
    pub fn rows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns (second axis).
    pub fn cols(&self) -> usize {
        self.shape().1
    }

    /// `true` if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        let (r, c) = self.shape();
        r == 0 || c == 0
    }

    /// Element at `(row, col)`.
    ///
    /// # Panics
    /// If the index is out of bounds. Use [`Tensor2D::at`] for a checked read.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        B::get_2d(&self.data, row, col)
    }

    /// Bounds-checked element access.
    pub fn at(&self, row: usize, col: usize) -> Option<f64> {
        let (r, c) = self.shape();
        (row < r && col < c).then(|| B::get_2d(&self.data, row, col))
    }

    /// Rows `[begin, end)` along the first axis.
    ///
    /// # Panics
    /// If the range is out of bounds.
    pub fn slice_rows(&self, begin: usize, end: usize) -> Self {
        Self::from_raw(B::slice_rows_2d(&self.data, begin, end))
    }

    /// Columns at `indices`, in that order.
    ///
    /// # Panics
    /// If an index is out of bounds.
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        Self::from_raw(B::select_columns_2d(&self.data, indices))
    }

    /// Horizontal concatenation `[self | other]`.
    ///
    /// # Panics
    /// If the row counts differ.
    pub fn hcat(&self, other: &Self) -> Self {
        Self::from_raw(B::hcat_2d(&self.data, &other.data))
    }

    pub fn transpose(&self) -> Self {
        Self::from_raw(B::transpose(&self.data))
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::from_raw(B::add_2d(&self.data, &other.data))
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::from_raw(B::sub_2d(&self.data, &other.data))
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::from_raw(B::mul_2d(&self.data, &other.data))
    }

    pub fn div(&self, other: &Self) -> Self {
        Self::from_raw(B::div_2d(&self.data, &other.data))
    }

    pub fn scale(&self, s: f64) -> Self {
        Self::from_raw(B::mul_scalar_2d(&self.data, s))
    }

    pub fn add_scalar(&self, s: f64) -> Self {
        Self::from_raw(B::add_scalar_2d(&self.data, s))
    }

    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self::from_raw(B::map_2d(&self.data, f))
    }

    /// Rewrites every element in place with `f(column_index, value)`.
    pub fn map_columns_inplace<F: Fn(usize, f64) -> f64>(&mut self, f: F) {
        B::map_columns_2d(&mut self.data, f);
    }

    /// Matrix product `self · other`.
    ///
    /// # Panics
    /// If `self.cols() != other.rows()`.
    pub fn matmul(&self, other: &Self) -> Self {
        Self::from_raw(B::matmul(&self.data, &other.data))
    }

    /// Euclidean norm over all elements.
    pub fn norm(&self) -> f64 {
        B::norm_2d(&self.data)
    }

    /// Sum of element-wise products (Frobenius inner product).
    pub fn dot(&self, other: &Self) -> f64 {
        B::sum_all_2d(&B::mul_2d(&self.data, &other.data))
    }

    pub fn sum(&self) -> f64 {
        B::sum_all_2d(&self.data)
    }

    pub fn mean(&self) -> f64 {
        B::mean_all_2d(&self.data)
    }

    pub fn col_min(&self) -> Vec<f64> {
        B::col_min_2d(&self.data)
    }

    pub fn col_max(&self) -> Vec<f64> {
        B::col_max_2d(&self.data)
    }

    pub fn col_mean(&self) -> Vec<f64> {
        B::col_mean_2d(&self.data)
    }

    /// Per-column standard deviation; `ddof = 0` gives the population std.
    pub fn col_std(&self, ddof: usize) -> Vec<f64> {
        B::col_std_2d(&self.data, ddof)
    }

    /// Copy of row `i`.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.slice_rows(i, i + 1).to_vec()
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.select_columns(&[j]).to_vec()
    }

    /// Row-major copy of all elements.
    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_2d(&self.data)
    }
}
