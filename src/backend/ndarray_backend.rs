use super::Backend;
use ndarray::{s, Array2, Axis};

/// Backend implementation using the `ndarray` crate.
///
/// # Type mappings
/// - `Tensor2D`: `NdarrayTensor2D` wrapper around `ndarray::Array2<f64>`
///
/// Matrix products go through `Array2::dot`, which picks up ndarray's optimized
/// kernels; everything else is a thin adapter.
#[derive(Clone, Debug, Copy)]
pub struct NdarrayBackend;

/// Wrapper type for 2D tensors using ndarray's `Array2<f64>`.
///
/// # Example
/// ```
/// use tabletrain::backend::NdarrayTensor2D;
/// let tensor = NdarrayTensor2D::from(&[
///     vec![1.0f64, 2.0f64, 3.0f64],
///     vec![4.0f64, 5.0f64, 6.0f64],
/// ][..]);
/// assert_eq!(tensor.0.shape(), &[2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NdarrayTensor2D(pub Array2<f64>);

impl From<&[Vec<f64>]> for NdarrayTensor2D {
    /// Converts a slice of row vectors into a 2D tensor.
    ///
    /// # Panics
    /// Panics if rows have inconsistent lengths.
    fn from(x: &[Vec<f64>]) -> Self {
        let rows = x.len();
        if rows == 0 {
            return NdarrayTensor2D(Array2::zeros((0, 0)));
        }
        let cols = x[0].len();
        assert!(
            x.iter().all(|r| r.len() == cols),
            "All rows must have same length"
        );
        let data: Vec<f64> = x.iter().flat_map(|r| r.iter()).copied().collect();
        NdarrayBackend::from_vec_2d(data, rows, cols)
    }
}

fn assert_same_shape(a: &Array2<f64>, b: &Array2<f64>) {
    assert_eq!(a.dim(), b.dim(), "Shape mismatch in element-wise op");
}

impl Backend for NdarrayBackend {
    type Tensor2D = NdarrayTensor2D;

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        NdarrayTensor2D(Array2::zeros((rows, cols)))
    }

    fn full_2d(rows: usize, cols: usize, value: f64) -> Self::Tensor2D {
        NdarrayTensor2D(Array2::from_elem((rows, cols), value))
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        match Array2::from_shape_vec((rows, cols), data) {
            Ok(array) => NdarrayTensor2D(array),
            Err(e) => panic!("Inconsistent shape: {}", e),
        }
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        t.0.dim()
    }

    fn get_2d(t: &Self::Tensor2D, row: usize, col: usize) -> f64 {
        t.0[[row, col]]
    }

    fn to_vec_2d(t: &Self::Tensor2D) -> Vec<f64> {
        t.0.iter().copied().collect()
    }

    fn slice_rows_2d(t: &Self::Tensor2D, begin: usize, end: usize) -> Self::Tensor2D {
        assert!(
            begin <= end && end <= t.0.nrows(),
            "Row range {}..{} out of bounds for {} rows",
            begin,
            end,
            t.0.nrows()
        );
        NdarrayTensor2D(t.0.slice(s![begin..end, ..]).to_owned())
    }

    fn select_columns_2d(t: &Self::Tensor2D, columns: &[usize]) -> Self::Tensor2D {
        let ncols = t.0.ncols();
        for &col in columns {
            assert!(
                col < ncols,
                "Column index {} out of bounds for {} columns",
                col,
                ncols
            );
        }
        NdarrayTensor2D(t.0.select(Axis(1), columns))
    }

    fn hcat_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_eq!(a.0.nrows(), b.0.nrows(), "hcat requires equal row counts");
        match ndarray::concatenate(Axis(1), &[a.0.view(), b.0.view()]) {
            Ok(array) => NdarrayTensor2D(array),
            Err(e) => panic!("hcat failed: {}", e),
        }
    }

    fn transpose(t: &Self::Tensor2D) -> Self::Tensor2D {
        NdarrayTensor2D(t.0.t().to_owned())
    }

    fn add_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_same_shape(&a.0, &b.0);
        NdarrayTensor2D(&a.0 + &b.0)
    }

    fn sub_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_same_shape(&a.0, &b.0);
        NdarrayTensor2D(&a.0 - &b.0)
    }

    fn mul_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_same_shape(&a.0, &b.0);
        NdarrayTensor2D(&a.0 * &b.0)
    }

    fn div_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_same_shape(&a.0, &b.0);
        NdarrayTensor2D(&a.0 / &b.0)
    }

    fn mul_scalar_2d(t: &Self::Tensor2D, s: f64) -> Self::Tensor2D {
        NdarrayTensor2D(&t.0 * s)
    }

    fn add_scalar_2d(t: &Self::Tensor2D, s: f64) -> Self::Tensor2D {
        NdarrayTensor2D(&t.0 + s)
    }

    fn map_2d<F: Fn(f64) -> f64>(t: &Self::Tensor2D, f: F) -> Self::Tensor2D {
        NdarrayTensor2D(t.0.mapv(f))
    }

    fn map_columns_2d<F: Fn(usize, f64) -> f64>(t: &mut Self::Tensor2D, f: F) {
        for (j, mut column) in t.0.columns_mut().into_iter().enumerate() {
            column.mapv_inplace(|v| f(j, v));
        }
    }

    fn matmul(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_eq!(
            a.0.ncols(),
            b.0.nrows(),
            "matmul shape mismatch: {:?} x {:?}",
            a.0.dim(),
            b.0.dim()
        );
        NdarrayTensor2D(a.0.dot(&b.0))
    }

    fn norm_2d(t: &Self::Tensor2D) -> f64 {
        t.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn sum_all_2d(t: &Self::Tensor2D) -> f64 {
        t.0.sum()
    }

    fn mean_all_2d(t: &Self::Tensor2D) -> f64 {
        t.0.mean().unwrap_or(f64::NAN)
    }

    fn col_min_2d(t: &Self::Tensor2D) -> Vec<f64> {
        t.0.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v))
            .to_vec()
    }

    fn col_max_2d(t: &Self::Tensor2D) -> Vec<f64> {
        t.0.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v))
            .to_vec()
    }

    fn col_mean_2d(t: &Self::Tensor2D) -> Vec<f64> {
        match t.0.mean_axis(Axis(0)) {
            Some(means) => means.to_vec(),
            None => vec![f64::NAN; t.0.ncols()],
        }
    }

    fn col_std_2d(t: &Self::Tensor2D, ddof: usize) -> Vec<f64> {
        let means = Self::col_mean_2d(t);
        let divisor = t.0.nrows().saturating_sub(ddof) as f64;
        t.0.columns()
            .into_iter()
            .zip(means)
            .map(|(column, mean)| {
                let var_sum: f64 = column.iter().map(|&v| (v - mean) * (v - mean)).sum();
                (var_sum / divisor).sqrt()
            })
            .collect()
    }
}
