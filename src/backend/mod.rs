//! # Backend Abstraction
//!
//! Every numeric operation the data-table, normalization and training layers need is
//! routed through the [`Backend`] trait. A backend owns the storage of a 2-D tensor and
//! implements a small set of static operations over it; the
//! [`Tensor2D`] wrapper turns those into a conventional array API.
//!
//! ## Available Backends
//!
//! | Backend          | Feature   | Storage                         |
//! |------------------|-----------|---------------------------------|
//! | `CpuBackend`     | `cpu`     | row-major `Vec<f64>`            |
//! | `NdarrayBackend` | `ndarray` | `ndarray::Array2<f64>`          |
//!
//! ## Example
//!
//! ```rust
//! use tabletrain::backend::{CpuBackend, Tensor2D};
//!
//! let a = Tensor2D::<CpuBackend>::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
//! let at = a.transpose();
//! assert_eq!(a.matmul(&at).to_vec(), vec![5.0, 11.0, 11.0, 25.0]);
//! ```
//!
//! ## Implementing a New Backend
//!
//! 1. Create a module with a feature gate
//! 2. Pick a tensor storage type that owns its data (`Clone` must be a deep copy)
//! 3. Implement [`Backend`]
//! 4. Re-export it from this module

use std::fmt::Debug;

#[cfg(feature = "cpu")]
pub mod cpu;
#[cfg(feature = "cpu")]
/// Pure-Rust CPU backend implementation with zero external dependencies.
pub use cpu::{CpuBackend, CpuTensor2D};

#[cfg(feature = "ndarray")]
mod ndarray_backend;
#[cfg(feature = "ndarray")]
/// Backend backed by the `ndarray` crate for ecosystem interoperability.
pub use ndarray_backend::{NdarrayBackend, NdarrayTensor2D};

/// Two-dimensional tensor abstraction.
pub mod tensor2d;

pub use tensor2d::Tensor2D;

/// Abstraction over 2-D tensor storage and the operations performed on it.
///
/// All elements are `f64`. Operations are static functions on the associated
/// storage type so that the generic layers above never see the concrete storage.
///
/// # Panics
///
/// Shape-checked operations (`add_2d`, `matmul`, `hcat_2d`, ...) panic on
/// incompatible shapes. Callers in this crate validate shapes first and report
/// mismatches as typed errors, so the panics only fire on internal bugs.
pub trait Backend: Clone + Copy + Debug + 'static {
    /// Two-dimensional tensor type. `Clone` must produce an independent copy.
    type Tensor2D: Clone + Debug + Send + Sync;

    // --- Constructors ---

    /// Creates a 2D tensor filled with zeros.
    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D;

    /// Creates a 2D tensor with every element set to `value`.
    fn full_2d(rows: usize, cols: usize, value: f64) -> Self::Tensor2D;

    /// Constructs a 2D tensor from row-major ordered data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D;

    // --- Data access ---

    /// Returns the shape of a 2D tensor as (rows, cols).
    fn shape(t: &Self::Tensor2D) -> (usize, usize);

    /// Reads a single element.
    ///
    /// # Panics
    /// If `(row, col)` is out of bounds.
    fn get_2d(t: &Self::Tensor2D, row: usize, col: usize) -> f64;

    /// Copies the tensor into a row-major `Vec`.
    fn to_vec_2d(t: &Self::Tensor2D) -> Vec<f64>;

    // --- Slicing and layout ---

    /// Returns rows `[begin, end)` as a new tensor.
    ///
    /// # Panics
    /// If `begin > end` or `end > rows`.
    fn slice_rows_2d(t: &Self::Tensor2D, begin: usize, end: usize) -> Self::Tensor2D;

    /// Extracts the given columns, in the given order, preserving row order.
    ///
    /// # Panics
    /// If any column index is out of bounds.
    fn select_columns_2d(t: &Self::Tensor2D, columns: &[usize]) -> Self::Tensor2D;

    /// Horizontally concatenates two tensors: `[a | b]`.
    ///
    /// # Panics
    /// If the row counts differ.
    fn hcat_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D;

    /// Returns the transpose of a 2D tensor.
    fn transpose(t: &Self::Tensor2D) -> Self::Tensor2D;

    // --- Element-wise operations ---

    /// Element-wise addition. Panics on shape mismatch.
    fn add_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D;

    /// Element-wise subtraction. Panics on shape mismatch.
    fn sub_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D;

    /// Element-wise multiplication. Panics on shape mismatch.
    fn mul_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D;

    /// Element-wise division. Panics on shape mismatch.
    fn div_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D;

    /// Multiplies each element by a scalar.
    fn mul_scalar_2d(t: &Self::Tensor2D, s: f64) -> Self::Tensor2D;

    /// Adds a scalar to each element.
    fn add_scalar_2d(t: &Self::Tensor2D, s: f64) -> Self::Tensor2D;

    /// Applies `f` to every element, producing a new tensor.
    fn map_2d<F: Fn(f64) -> f64>(t: &Self::Tensor2D, f: F) -> Self::Tensor2D;

    /// Applies `f(column_index, value)` to every element in place.
    fn map_columns_2d<F: Fn(usize, f64) -> f64>(t: &mut Self::Tensor2D, f: F);

    // --- Linear algebra ---

    /// Matrix product `a · b` of an (m × k) and a (k × n) tensor.
    ///
    /// # Panics
    /// If `a.cols != b.rows`.
    fn matmul(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D;

    /// Euclidean norm over all elements (Frobenius norm).
    fn norm_2d(t: &Self::Tensor2D) -> f64;

    // --- Reductions ---

    /// Sum of all elements.
    fn sum_all_2d(t: &Self::Tensor2D) -> f64;

    /// Arithmetic mean of all elements (`NaN` for an empty tensor).
    fn mean_all_2d(t: &Self::Tensor2D) -> f64;

    // --- Column-wise statistics ---

    /// Minimum of each column.
    fn col_min_2d(t: &Self::Tensor2D) -> Vec<f64>;

    /// Maximum of each column.
    fn col_max_2d(t: &Self::Tensor2D) -> Vec<f64>;

    /// Mean of each column.
    fn col_mean_2d(t: &Self::Tensor2D) -> Vec<f64>;

    /// Standard deviation of each column.
    ///
    /// `ddof` is the delta degrees of freedom: 0 for population std, 1 for sample std.
    fn col_std_2d(t: &Self::Tensor2D, ddof: usize) -> Vec<f64>;
}
