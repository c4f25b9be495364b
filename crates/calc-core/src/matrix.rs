//! Dense M×N matrices with shape-checked arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::fmt;
use crate::step::{Solution, Step};

/// Row-major matrix. Serializes as a list of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build from rows. Rejects empty input, ragged rows and non-finite entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> CalcResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(CalcError::validation("matrix must have at least one entry"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(CalcError::Dimension(format!(
                "row {} has {} columns, expected {cols}",
                i + 1,
                row.len()
            )));
        }
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        if data.iter().any(|v| !v.is_finite()) {
            return Err(CalcError::validation("matrix entries must be finite numbers"));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    fn set(&mut self, r: usize, c: usize, v: f64) {
        self.data[r * self.cols + c] = v;
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }

    fn same_shape(&self, other: &Matrix, op: &str) -> CalcResult<()> {
        if self.shape() != other.shape() {
            return Err(CalcError::Dimension(format!(
                "cannot {op} {}x{} and {}x{} matrices",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    pub fn add(&self, other: &Matrix) -> CalcResult<Matrix> {
        self.same_shape(other, "add")?;
        Ok(self.zip_with(other, |a, b| a + b))
    }

    pub fn sub(&self, other: &Matrix) -> CalcResult<Matrix> {
        self.same_shape(other, "subtract")?;
        Ok(self.zip_with(other, |a, b| a - b))
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }

    /// Row-by-column product; requires `self.cols == other.rows`.
    pub fn mul(&self, other: &Matrix) -> CalcResult<Matrix> {
        if self.cols != other.rows {
            return Err(CalcError::Dimension(format!(
                "cannot multiply {}x{} by {}x{}: inner dimensions differ",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let dot = (0..self.cols).map(|k| self.get(i, k) * other.get(k, j)).sum();
                out.set(i, j, dot);
            }
        }
        Ok(out)
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j));
            }
        }
        out
    }

    /// Gaussian elimination with partial pivoting.
    pub fn determinant(&self) -> CalcResult<f64> {
        if self.rows != self.cols {
            return Err(CalcError::Dimension(format!(
                "determinant needs a square matrix, got {}x{}",
                self.rows, self.cols
            )));
        }
        let n = self.rows;
        let mut m = self.clone();
        let mut det = 1.0;
        for col in 0..n {
            let pivot = (col..n)
                .max_by(|&a, &b| m.get(a, col).abs().total_cmp(&m.get(b, col).abs()))
                .unwrap_or(col);
            if m.get(pivot, col) == 0.0 {
                return Ok(0.0);
            }
            if pivot != col {
                for k in 0..n {
                    let tmp = m.get(col, k);
                    m.set(col, k, m.get(pivot, k));
                    m.set(pivot, k, tmp);
                }
                det = -det;
            }
            let p = m.get(col, col);
            det *= p;
            for row in (col + 1)..n {
                let factor = m.get(row, col) / p;
                for k in col..n {
                    let v = m.get(row, k) - factor * m.get(col, k);
                    m.set(row, k, v);
                }
            }
        }
        Ok(det)
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = CalcError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Matrix::from_rows(rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .to_rows()
            .iter()
            .map(|r| r.iter().map(|v| fmt(*v)).collect::<Vec<_>>().join(", "))
            .map(|r| format!("[{r}]"))
            .collect();
        write!(f, "[{}]", rows.join(", "))
    }
}

impl std::str::FromStr for Matrix {
    type Err = CalcError;

    /// `"1,2;3,4"` is the 2×2 matrix with rows `[1,2]` and `[3,4]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .split(';')
            .map(|row| {
                row.split(',')
                    .map(|v| {
                        v.trim().parse::<f64>().map_err(|_| {
                            CalcError::Validation(format!("invalid matrix entry: {}", v.trim()))
                        })
                    })
                    .collect::<CalcResult<Vec<f64>>>()
            })
            .collect::<CalcResult<Vec<Vec<f64>>>>()?;
        Matrix::from_rows(rows)
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixOp {
    Add,
    Subtract,
    Multiply,
    Transpose,
    Determinant,
}

impl fmt::Display for MatrixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Subtract => write!(f, "subtract"),
            Self::Multiply => write!(f, "multiply"),
            Self::Transpose => write!(f, "transpose"),
            Self::Determinant => write!(f, "determinant"),
        }
    }
}

impl std::str::FromStr for MatrixOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" | "+" => Ok(Self::Add),
            "subtract" | "sub" | "-" => Ok(Self::Subtract),
            "multiply" | "mul" | "*" => Ok(Self::Multiply),
            "transpose" => Ok(Self::Transpose),
            "determinant" | "det" => Ok(Self::Determinant),
            _ => Err(format!("invalid matrix operation: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum MatrixOutcome {
    Matrix(Matrix),
    Scalar(f64),
}

pub fn calculate(
    op: MatrixOp,
    a: &Matrix,
    b: Option<&Matrix>,
) -> CalcResult<Solution<MatrixOutcome>> {
    let need_b =
        || b.ok_or_else(|| CalcError::Validation(format!("{op} needs a second matrix")));
    let binary = matches!(op, MatrixOp::Add | MatrixOp::Subtract | MatrixOp::Multiply);
    let (outcome, rule) = match op {
        MatrixOp::Add => (
            MatrixOutcome::Matrix(a.add(need_b()?)?),
            "C[i][j] = A[i][j] + B[i][j]",
        ),
        MatrixOp::Subtract => (
            MatrixOutcome::Matrix(a.sub(need_b()?)?),
            "C[i][j] = A[i][j] - B[i][j]",
        ),
        MatrixOp::Multiply => (
            MatrixOutcome::Matrix(a.mul(need_b()?)?),
            "C[i][j] = Σₖ A[i][k] × B[k][j]",
        ),
        MatrixOp::Transpose => (MatrixOutcome::Matrix(a.transpose()), "Aᵀ[j][i] = A[i][j]"),
        MatrixOp::Determinant => (
            MatrixOutcome::Scalar(a.determinant()?),
            "Row-reduce to upper triangular form; det = product of pivots",
        ),
    };

    let mut steps = vec![Step::new("Matrix A", a.to_string())];
    if let Some(b) = b.filter(|_| binary) {
        steps.push(Step::new("Matrix B", b.to_string()));
    }
    steps.push(Step::new(format!("Apply {op}"), rule));
    let shown = match &outcome {
        MatrixOutcome::Matrix(m) => m.to_string(),
        MatrixOutcome::Scalar(v) => fmt(*v),
    };
    steps.push(Step::new("Result", shown));

    Ok(Solution::new(outcome, steps))
}
