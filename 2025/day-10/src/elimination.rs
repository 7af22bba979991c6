//! Gauss-Jordan elimination over an arbitrary field.
//!
//! The same routine reduces the light system over GF(2) and the joltage system
//! over exact rationals. Matrices are stored flat and row-major, with one extra
//! augmented column holding the target vector.

use std::fmt::Debug;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

use num::rational::Ratio;
use num::traits::{One, Zero};

use crate::error::SolveError;

/// Exact rational scalar. `Ratio` keeps itself in lowest terms.
pub type Rational = Ratio<i64>;

/// Scalars the elimination can run over.
pub trait Field:
    Clone + PartialEq + Debug + Zero + One + Sub<Output = Self> + Mul<Output = Self> + Div<Output = Self>
{
}

impl<T> Field for T where
    T: Clone
        + PartialEq
        + Debug
        + Zero
        + One
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
{
}

/// The two-element field. Addition and subtraction are both XOR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gf2(pub bool);

impl From<bool> for Gf2 {
    fn from(bit: bool) -> Self {
        Self(bit)
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Add for Gf2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Sub for Gf2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Mul for Gf2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Div for Gf2 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        assert!(rhs.0, "attempt to divide by zero in GF(2)");
        self
    }
}

impl Zero for Gf2 {
    fn zero() -> Self {
        Self(false)
    }

    fn is_zero(&self) -> bool {
        !self.0
    }
}

impl One for Gf2 {
    fn one() -> Self {
        Self(true)
    }
}

/// A pivot entry of the reduced matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub row: usize,
    pub col: usize,
}

/// Augmented matrix `[A | b]`, `rows x (cols + 1)`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<F> {
    rows: usize,
    cols: usize,
    data: Vec<F>,
}

impl<F: Field> Matrix<F> {
    /// `rows` equations over `cols` unknowns, all coefficients zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![F::zero(); rows * (cols + 1)],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of unknowns (excludes the augmented column).
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn width(&self) -> usize {
        self.cols + 1
    }

    pub fn augmented(&self, row: usize) -> &F {
        &self[(row, self.cols)]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let width = self.width();
        for c in 0..width {
            self.data.swap(a * width + c, b * width + c);
        }
    }

    /// Reduces the matrix in place to Reduced Row Echelon Form.
    ///
    /// Columns are visited left to right. A column with no nonzero entry at or
    /// below the current pivot row is free and consumes no row. Returned pivots
    /// are in increasing row order, so pivot `k` always sits on row `k`.
    pub fn rref(&mut self) -> Vec<Pivot> {
        let width = self.width();
        let mut pivots = Vec::new();

        for col in 0..self.cols {
            let row = pivots.len();
            if row >= self.rows {
                break;
            }

            let Some(found) = (row..self.rows).find(|&r| !self[(r, col)].is_zero()) else {
                continue;
            };
            self.swap_rows(row, found);

            // Normalize so the pivot becomes one
            let scale = self[(row, col)].clone();
            for c in 0..width {
                let value = self[(row, c)].clone() / scale.clone();
                self[(row, c)] = value;
            }

            // Eliminate both below AND above for RREF
            for r in 0..self.rows {
                if r == row || self[(r, col)].is_zero() {
                    continue;
                }
                let factor = self[(r, col)].clone();
                for c in 0..width {
                    let value = self[(r, c)].clone() - factor.clone() * self[(row, c)].clone();
                    self[(r, c)] = value;
                }
            }

            pivots.push(Pivot { row, col });
        }

        pivots
    }
}

impl<F> Index<(usize, usize)> for Matrix<F> {
    type Output = F;

    fn index(&self, (row, col): (usize, usize)) -> &F {
        &self.data[row * (self.cols + 1) + col]
    }
}

impl<F> IndexMut<(usize, usize)> for Matrix<F> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut F {
        &mut self.data[row * (self.cols + 1) + col]
    }
}

/// A consistent system in RREF, split into pivot and free columns.
///
/// Every assignment of the free columns determines exactly one solution.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionSpace<F> {
    matrix: Matrix<F>,
    pivots: Vec<Pivot>,
    free: Vec<usize>,
}

impl<F: Field> SolutionSpace<F> {
    /// Reduces `matrix` and checks it for a `0 = c` row with `c != 0`.
    pub fn new(mut matrix: Matrix<F>) -> Result<Self, SolveError> {
        let pivots = matrix.rref();

        // Rows past the rank have all-zero coefficients by construction
        if (pivots.len()..matrix.rows()).any(|r| !matrix.augmented(r).is_zero()) {
            return Err(SolveError::Infeasible);
        }

        let mut is_pivot = vec![false; matrix.cols()];
        for p in &pivots {
            is_pivot[p.col] = true;
        }
        let free = (0..matrix.cols()).filter(|&c| !is_pivot[c]).collect();

        Ok(Self {
            matrix,
            pivots,
            free,
        })
    }

    pub fn matrix(&self) -> &Matrix<F> {
        &self.matrix
    }

    pub fn pivots(&self) -> &[Pivot] {
        &self.pivots
    }

    pub fn free_columns(&self) -> &[usize] {
        &self.free
    }

    pub fn rank(&self) -> usize {
        self.pivots.len()
    }
}
