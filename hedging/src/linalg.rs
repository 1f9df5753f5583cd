use crate::error::HedgeError;
use ndarray::{Array1, Array2};

/// Whether `value` can be divided by, given the absolute threshold.
fn is_divisible(value: f64, threshold: f64) -> bool {
    value.is_finite() && value.abs() > threshold
}

/// Round to `decimals` places, ties to even (numpy's `round`).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

pub fn round_matrix(matrix: &Array2<f64>, decimals: u32) -> Array2<f64> {
    matrix.mapv(|v| round_to(v, decimals))
}

fn max_abs(matrix: &Array2<f64>) -> f64 {
    matrix.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// Solves `matrix * x = rhs` by Gaussian elimination with partial pivoting.
///
/// Written directly on `ndarray` rather than through a LAPACK backed crate: the
/// systems have one row per hedge instrument.
///
/// A pivot not exceeding `pivot_tolerance` times the largest absolute entry of the
/// matrix makes the system singular.
pub fn solve(
    matrix: &Array2<f64>,
    rhs: &Array1<f64>,
    pivot_tolerance: f64,
) -> Result<Array1<f64>, HedgeError> {
    let n = matrix.nrows();
    if matrix.ncols() != n || rhs.len() != n {
        return Err(HedgeError::DimensionMismatch {
            rows: n,
            cols: matrix.ncols(),
        });
    }

    let threshold = pivot_tolerance * max_abs(matrix);
    let mut a = matrix.to_owned();
    let mut b = rhs.to_owned();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        let pivot = a[[pivot_row, col]];
        if !is_divisible(pivot, threshold) {
            return Err(HedgeError::SingularMatrix {
                pivot,
                tolerance: threshold,
            });
        }
        if pivot_row != col {
            for k in 0..n {
                a.swap([col, k], [pivot_row, k]);
            }
            b.swap(col, pivot_row);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / pivot;
            for k in col..n {
                let step = factor * a[[col, k]];
                a[[row, k]] -= step;
            }
            let step = factor * b[col];
            b[row] -= step;
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

/// The inverse, column by column.
pub fn invert(matrix: &Array2<f64>, pivot_tolerance: f64) -> Result<Array2<f64>, HedgeError> {
    let n = matrix.nrows();
    let mut inverse = Array2::<f64>::zeros((n, n));
    for col in 0..n {
        let mut unit = Array1::<f64>::zeros(n);
        unit[col] = 1.0;
        let x = solve(matrix, &unit, pivot_tolerance)?;
        inverse.column_mut(col).assign(&x);
    }
    Ok(inverse)
}

fn norm_inf(matrix: &Array2<f64>) -> f64 {
    matrix
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Condition number in the maximum row sum norm, `|A| * |A^-1|`.
pub fn condition_number(matrix: &Array2<f64>, pivot_tolerance: f64) -> Result<f64, HedgeError> {
    let inverse = invert(matrix, pivot_tolerance)?;
    Ok(norm_inf(matrix) * norm_inf(&inverse))
}
