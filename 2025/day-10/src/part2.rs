use miette::*;
use num::traits::{One, Zero};
use num_integer::Integer;
use rayon::prelude::*;

use crate::config::Limits;
use crate::elimination::{Matrix, Rational, SolutionSpace};
use crate::error::SolveError;
use crate::machine::{self, Machine};
use crate::search;
use crate::Solution;

/// One pivot variable as an affine function of the free variables:
/// `scale * pivot = constant - Σ coef * free[idx]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AffineExpr {
    column: usize,
    constant: i128,
    terms: Vec<(usize, i128)>,
}

impl AffineExpr {
    /// The pivot value, or `None` when it is fractional or negative.
    fn eval(&self, free: &[u64], scale: i128) -> Option<u64> {
        let scaled = self
            .terms
            .iter()
            .fold(self.constant, |acc, &(idx, coef)| {
                acc - coef * i128::from(free[idx])
            });

        let (value, rem) = scaled.div_rem(&scale);
        if rem != 0 {
            return None;
        }
        u64::try_from(value).ok()
    }
}

/// The joltage system after exact elimination, in integer form.
struct CounterSystem {
    num_vars: usize,
    free: Vec<usize>,
    exprs: Vec<AffineExpr>,
    /// Least common multiple of every denominator left in the pivot rows.
    scale: i128,
    /// Largest joltage requirement; free variables are searched in `0..=upper`.
    upper: u64,
}

impl CounterSystem {
    fn new(machine: &Machine) -> Result<Self, SolveError> {
        let num_eqs = machine.joltage().len();
        let num_vars = machine.buttons().len();

        let mut matrix = Matrix::zeros(num_eqs, num_vars);
        for (c, button) in machine.buttons().iter().enumerate() {
            for &r in button.indices().iter().filter(|&&r| r < num_eqs) {
                matrix[(r, c)] = Rational::one();
            }
        }
        for (r, &target) in machine.joltage().iter().enumerate() {
            matrix[(r, num_vars)] = Rational::from_integer(i64::from(target));
        }

        let space = SolutionSpace::new(matrix)?;
        let reduced = space.matrix();
        let free = space.free_columns().to_vec();

        let mut scale = 1i64;
        for p in space.pivots() {
            scale = scale.lcm(reduced.augmented(p.row).denom());
            for &f in &free {
                scale = scale.lcm(reduced[(p.row, f)].denom());
            }
        }

        let exprs = space
            .pivots()
            .iter()
            .map(|p| AffineExpr {
                column: p.col,
                constant: i128::from((*reduced.augmented(p.row) * scale).to_integer()),
                terms: free
                    .iter()
                    .enumerate()
                    .filter(|&(_, &f)| !reduced[(p.row, f)].is_zero())
                    .map(|(idx, &f)| (idx, i128::from((reduced[(p.row, f)] * scale).to_integer())))
                    .collect(),
            })
            .collect();

        let upper = machine.joltage().iter().copied().max().map_or(0, u64::from);

        tracing::debug!(
            rank = space.rank(),
            free = free.len(),
            scale,
            upper,
            "reduced joltage system"
        );

        Ok(Self {
            num_vars,
            free,
            exprs,
            scale: i128::from(scale),
            upper,
        })
    }

    /// Total presses for one free assignment, or `None` if it is infeasible or
    /// cannot beat `bound`.
    fn evaluate(&self, free: &[u64], bound: Option<u64>) -> Option<u64> {
        let beaten = |total: u64| bound.is_some_and(|b| total >= b);

        let mut total: u64 = free.iter().sum();
        if beaten(total) {
            return None;
        }
        for expr in &self.exprs {
            total += expr.eval(free, self.scale)?;
            if beaten(total) {
                return None;
            }
        }
        Some(total)
    }

    fn assignment(&self, free: &[u64]) -> Option<Vec<u64>> {
        let mut presses = vec![0; self.num_vars];
        for (&col, &value) in self.free.iter().zip(free) {
            presses[col] = value;
        }
        for expr in &self.exprs {
            presses[expr.column] = expr.eval(free, self.scale)?;
        }
        Some(presses)
    }
}

/// Fewest non-negative integer presses that hit every joltage requirement exactly.
///
/// Free variables are only searched up to the largest requirement. That bound
/// covers puzzle inputs but is not a general optimality proof.
#[tracing::instrument(skip_all, fields(buttons = machine.buttons().len()))]
pub fn solve(machine: &Machine, limits: &Limits) -> Result<Solution, SolveError> {
    let system = CounterSystem::new(machine)?;
    let k = system.free.len();
    let candidates = search::space_size(system.upper + 1, k, limits.max_candidates)?;
    tracing::debug!(%candidates, "searching free presses");

    let (_, free) = search::minimize(search::grid(k, system.upper), |free, bound| {
        system.evaluate(free, bound)
    })
    .ok_or(SolveError::Infeasible)?;

    let presses = system.assignment(&free).ok_or(SolveError::Infeasible)?;
    Ok(Solution { presses })
}

/// Sums the joltage solution of every machine. Any unsolvable machine fails the run.
pub fn total_presses(machines: &[Machine], limits: &Limits) -> Result<u64> {
    let presses = machines
        .par_iter()
        .enumerate()
        .map(|(i, m)| {
            solve(m, limits)
                .map(|s| s.total())
                .wrap_err_with(|| format!("joltage of machine on line {}", i + 1))
        })
        .collect::<Result<Vec<u64>>>()?;

    Ok(presses.iter().sum())
}

#[tracing::instrument]
pub fn process(input: &str) -> Result<String> {
    let machines = machine::parse(input)?;
    let total = total_presses(&machines, &Limits::default())?;
    Ok(total.to_string())
}
