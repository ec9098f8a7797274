use super::Backend;

/// Pure-Rust backend storing tensors as row-major `Vec<f64>`.
#[derive(Clone, Debug, Copy)]
pub struct CpuBackend;

/// Row-major 2D tensor: `(data, rows, cols)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTensor2D(pub Vec<f64>, pub usize, pub usize);

impl CpuTensor2D {
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        Self(data, rows, cols)
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.2 + col
    }
}

impl From<&[Vec<f64>]> for CpuTensor2D {
    fn from(x: &[Vec<f64>]) -> Self {
        if x.is_empty() {
            return CpuTensor2D::new(Vec::new(), 0, 0);
        }
        let rows = x.len();
        let cols = x[0].len();
        assert!(
            x.iter().all(|row| row.len() == cols),
            "All rows must have same length"
        );
        let data: Vec<f64> = x.iter().flat_map(|row| row.iter()).copied().collect();
        CpuTensor2D::new(data, rows, cols)
    }
}

fn zip_with(a: &CpuTensor2D, b: &CpuTensor2D, f: impl Fn(f64, f64) -> f64) -> CpuTensor2D {
    assert_eq!((a.1, a.2), (b.1, b.2), "Shape mismatch in element-wise op");
    CpuTensor2D::new(
        a.0.iter().zip(b.0.iter()).map(|(&x, &y)| f(x, y)).collect(),
        a.1,
        a.2,
    )
}

impl Backend for CpuBackend {
    type Tensor2D = CpuTensor2D;

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(vec![0.; rows * cols], rows, cols)
    }

    fn full_2d(rows: usize, cols: usize, value: f64) -> Self::Tensor2D {
        CpuTensor2D::new(vec![value; rows * cols], rows, cols)
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(data, rows, cols)
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        (t.1, t.2)
    }

    fn get_2d(t: &Self::Tensor2D, row: usize, col: usize) -> f64 {
        assert!(
            row < t.1 && col < t.2,
            "Index ({}, {}) out of bounds for shape ({}, {})",
            row,
            col,
            t.1,
            t.2
        );
        t.0[t.idx(row, col)]
    }

    fn to_vec_2d(t: &Self::Tensor2D) -> Vec<f64> {
        t.0.clone()
    }

    fn slice_rows_2d(t: &Self::Tensor2D, begin: usize, end: usize) -> Self::Tensor2D {
        assert!(
            begin <= end && end <= t.1,
            "Row range {}..{} out of bounds for {} rows",
            begin,
            end,
            t.1
        );
        CpuTensor2D::new(t.0[begin * t.2..end * t.2].to_vec(), end - begin, t.2)
    }

    fn select_columns_2d(t: &Self::Tensor2D, columns: &[usize]) -> Self::Tensor2D {
        for &col in columns {
            assert!(
                col < t.2,
                "Column index {} out of bounds for {} columns",
                col,
                t.2
            );
        }
        let mut data = Vec::with_capacity(t.1 * columns.len());
        for r in 0..t.1 {
            for &c in columns {
                data.push(t.0[t.idx(r, c)]);
            }
        }
        CpuTensor2D::new(data, t.1, columns.len())
    }

    fn hcat_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_eq!(a.1, b.1, "hcat requires equal row counts");
        let cols = a.2 + b.2;
        let mut data = Vec::with_capacity(a.1 * cols);
        for r in 0..a.1 {
            data.extend_from_slice(&a.0[r * a.2..(r + 1) * a.2]);
            data.extend_from_slice(&b.0[r * b.2..(r + 1) * b.2]);
        }
        CpuTensor2D::new(data, a.1, cols)
    }

    fn transpose(t: &Self::Tensor2D) -> Self::Tensor2D {
        let (rows, cols) = (t.1, t.2);
        let mut data = vec![0.0; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                data[c * rows + r] = t.0[r * cols + c];
            }
        }
        CpuTensor2D::new(data, cols, rows)
    }

    fn add_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        zip_with(a, b, |x, y| x + y)
    }

    fn sub_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        zip_with(a, b, |x, y| x - y)
    }

    fn mul_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        zip_with(a, b, |x, y| x * y)
    }

    fn div_2d(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        zip_with(a, b, |x, y| x / y)
    }

    fn mul_scalar_2d(t: &Self::Tensor2D, s: f64) -> Self::Tensor2D {
        CpuTensor2D::new(t.0.iter().map(|x| *x * s).collect(), t.1, t.2)
    }

    fn add_scalar_2d(t: &Self::Tensor2D, s: f64) -> Self::Tensor2D {
        CpuTensor2D::new(t.0.iter().map(|x| *x + s).collect(), t.1, t.2)
    }

    fn map_2d<F: Fn(f64) -> f64>(t: &Self::Tensor2D, f: F) -> Self::Tensor2D {
        CpuTensor2D::new(t.0.iter().map(|&x| f(x)).collect(), t.1, t.2)
    }

    fn map_columns_2d<F: Fn(usize, f64) -> f64>(t: &mut Self::Tensor2D, f: F) {
        let cols = t.2;
        if cols == 0 {
            return;
        }
        for row in t.0.chunks_exact_mut(cols) {
            for (j, v) in row.iter_mut().enumerate() {
                *v = f(j, *v);
            }
        }
    }

    fn matmul(a: &Self::Tensor2D, b: &Self::Tensor2D) -> Self::Tensor2D {
        assert_eq!(
            a.2, b.1,
            "matmul shape mismatch: ({}, {}) x ({}, {})",
            a.1, a.2, b.1, b.2
        );
        let (m, k, n) = (a.1, a.2, b.2);
        let mut out = vec![0.0; m * n];
        // i-k-j order keeps the inner loop on contiguous memory
        for i in 0..m {
            for p in 0..k {
                let aik = a.0[i * k + p];
                let b_row = &b.0[p * n..(p + 1) * n];
                let out_row = &mut out[i * n..(i + 1) * n];
                for (o, &bv) in out_row.iter_mut().zip(b_row) {
                    *o += aik * bv;
                }
            }
        }
        CpuTensor2D::new(out, m, n)
    }

    fn norm_2d(t: &Self::Tensor2D) -> f64 {
        t.0.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn sum_all_2d(t: &Self::Tensor2D) -> f64 {
        t.0.iter().sum::<f64>()
    }

    fn mean_all_2d(t: &Self::Tensor2D) -> f64 {
        t.0.iter().sum::<f64>() / t.0.len() as f64
    }

    fn col_min_2d(t: &Self::Tensor2D) -> Vec<f64> {
        let mut mins = vec![f64::INFINITY; t.2];
        for r in 0..t.1 {
            for (c, m) in mins.iter_mut().enumerate() {
                let v = t.0[r * t.2 + c];
                if v < *m {
                    *m = v;
                }
            }
        }
        mins
    }

    fn col_max_2d(t: &Self::Tensor2D) -> Vec<f64> {
        let mut maxs = vec![f64::NEG_INFINITY; t.2];
        for r in 0..t.1 {
            for (c, m) in maxs.iter_mut().enumerate() {
                let v = t.0[r * t.2 + c];
                if v > *m {
                    *m = v;
                }
            }
        }
        maxs
    }

    fn col_mean_2d(t: &Self::Tensor2D) -> Vec<f64> {
        let mut sums = vec![0.0; t.2];
        for r in 0..t.1 {
            for (c, s) in sums.iter_mut().enumerate() {
                *s += t.0[r * t.2 + c];
            }
        }
        let n = t.1 as f64;
        sums.into_iter().map(|s| s / n).collect()
    }

    fn col_std_2d(t: &Self::Tensor2D, ddof: usize) -> Vec<f64> {
        let means = Self::col_mean_2d(t);
        let mut var_sums = vec![0.0; t.2];
        for r in 0..t.1 {
            for (c, s) in var_sums.iter_mut().enumerate() {
                let diff = t.0[r * t.2 + c] - means[c];
                *s += diff * diff;
            }
        }
        let divisor = t.1.saturating_sub(ddof) as f64;
        var_sums.into_iter().map(|s| (s / divisor).sqrt()).collect()
    }
}
