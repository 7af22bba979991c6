use miette::*;
use rayon::prelude::*;

use crate::config::Limits;
use crate::elimination::{Gf2, Matrix, SolutionSpace};
use crate::error::SolveError;
use crate::machine::{self, Machine, Row};
use crate::search;
use crate::Solution;

/// Fewest presses (each button 0 or 1 times) that light exactly `machine.target()`.
#[tracing::instrument(skip_all, fields(buttons = machine.buttons().len()))]
pub fn solve(machine: &Machine, limits: &Limits) -> Result<Solution, SolveError> {
    if machine.buttons().len() <= limits.brute_force_buttons {
        tracing::debug!("enumerating button subsets");
        brute_force(machine, limits)
    } else {
        tracing::debug!("eliminating over GF(2)");
        LightSystem::new(machine)?.solve_min_weight(limits)
    }
}

/// Tries every subset of buttons, skipping those that cannot beat the best so far.
fn brute_force(machine: &Machine, limits: &Limits) -> Result<Solution, SolveError> {
    let n = machine.buttons().len();
    search::space_size(2, n, limits.max_candidates)?;

    let masks = machine.light_masks();
    let mut state = Row::repeat(false, machine.light_count());

    let (_, best) = search::minimize(search::subsets(n), |&subset, bound| {
        let weight = u64::from(subset.count_ones());
        if bound.is_some_and(|b| weight >= b) {
            return None;
        }

        state.fill(false);
        for (i, mask) in masks.iter().enumerate() {
            if (subset >> i) & 1 == 1 {
                state ^= mask;
            }
        }
        (state == *machine.target()).then_some(weight)
    })
    .ok_or(SolveError::Infeasible)?;

    Ok(Solution {
        presses: (0..n).map(|i| (best >> i) & 1).collect(),
    })
}

struct LightSystem {
    /// Augmented matrix [A | b] in Reduced Row Echelon Form
    space: SolutionSpace<Gf2>,
}

impl LightSystem {
    fn new(machine: &Machine) -> Result<Self, SolveError> {
        let num_eqs = machine.light_count();
        let num_vars = machine.buttons().len();

        let mut matrix = Matrix::zeros(num_eqs, num_vars);
        for (c, button) in machine.buttons().iter().enumerate() {
            for &r in button.indices().iter().filter(|&&r| r < num_eqs) {
                matrix[(r, c)] = Gf2(true);
            }
        }
        for (r, bit) in machine.target().iter().by_vals().enumerate() {
            matrix[(r, num_vars)] = Gf2(bit);
        }

        let space = SolutionSpace::new(matrix)?;
        tracing::debug!(
            rank = space.rank(),
            free = space.free_columns().len(),
            "reduced light system"
        );
        Ok(Self { space })
    }

    /// Extracts the particular solution and the basis of the null space.
    fn extract_solution_space(&self) -> (Row, Vec<Row>) {
        let matrix = self.space.matrix();
        let num_vars = matrix.cols();

        // Particular Solution (x_p): all free variables at 0, so each pivot
        // variable simply takes the value of its augmented entry.
        let mut x_p = Row::repeat(false, num_vars);
        for p in self.space.pivots() {
            x_p.set(p.col, matrix.augmented(p.row).0);
        }

        // Null Space Basis: one vector per free variable f with x_f = 1. In RREF
        // each pivot variable depends on f only through its own row.
        let basis = self
            .space
            .free_columns()
            .iter()
            .map(|&f| {
                let mut v = Row::repeat(false, num_vars);
                v.set(f, true);
                for p in self.space.pivots() {
                    if matrix[(p.row, f)].0 {
                        v.set(p.col, true);
                    }
                }
                v
            })
            .collect();

        (x_p, basis)
    }

    /// Walks every free assignment in Gray code order, so each step is one XOR.
    fn solve_min_weight(&self, limits: &Limits) -> Result<Solution, SolveError> {
        let k = self.space.free_columns().len();
        let max_bits = limits.max_free_bits.min(63);
        if k > max_bits {
            return Err(SolveError::SearchTooLarge {
                size: 1u128.checked_shl(k as u32).unwrap_or(u128::MAX),
                limit: 1u128 << max_bits,
            });
        }

        let (x_p, null_basis) = self.extract_solution_space();
        let mut current = x_p.clone();

        let (weight, (_, code)) = search::minimize(search::gray_code(k), |&(step, _), _| {
            // The bit that flips between gray(step - 1) and gray(step) is the
            // lowest set bit of step.
            if step > 0 {
                current ^= &null_basis[step.trailing_zeros() as usize];
            }
            Some(current.count_ones() as u64)
        })
        .ok_or(SolveError::Infeasible)?;

        let mut best = x_p;
        for (i, v) in null_basis.iter().enumerate() {
            if (code >> i) & 1 == 1 {
                best ^= v;
            }
        }
        debug_assert_eq!(best.count_ones() as u64, weight);

        Ok(Solution {
            presses: best.iter().by_vals().map(u64::from).collect(),
        })
    }
}

/// Sums the light solution of every machine. Any unsolvable machine fails the run.
pub fn total_presses(machines: &[Machine], limits: &Limits) -> Result<u64> {
    let presses = machines
        .par_iter()
        .enumerate()
        .map(|(i, m)| {
            solve(m, limits)
                .map(|s| s.total())
                .wrap_err_with(|| format!("indicator lights of machine on line {}", i + 1))
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

#[cfg(test)]
mod tests {
    use super::*;

    use bitvec::prelude::*;
    use rstest::rstest;

    const EXAMPLE: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";

    /// Never brute forces, always goes through elimination.
    const ELIMINATE: Limits = Limits {
        brute_force_buttons: 0,
        max_free_bits: 25,
        max_candidates: 1 << 32,
    };

    fn parse_line(line: &str) -> Machine {
        machine::parse(line).unwrap().remove(0)
    }

    fn with_target(template: &Machine, bits: u64) -> Machine {
        let target = (0..template.light_count())
            .map(|i| (bits >> i) & 1 == 1)
            .collect::<Row>();
        Machine::new(
            target,
            template.buttons().to_vec(),
            template.joltage().to_vec(),
        )
    }

    #[test]
    fn it_works() -> Result<()> {
        assert_eq!("7", process(EXAMPLE)?);
        Ok(())
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 3)]
    #[case(2, 2)]
    fn example_machines(#[case] line: usize, #[case] expected: u64) {
        let m = parse_line(EXAMPLE.lines().nth(line).unwrap());

        for limits in [Limits::default(), ELIMINATE] {
            let solution = solve(&m, &limits).unwrap();
            assert_eq!(solution.total(), expected);
            assert_eq!(m.toggle(&solution.presses), *m.target());
        }
    }

    #[rstest]
    #[case::brute_force(Limits::default())]
    #[case::elimination(ELIMINATE)]
    fn unreachable_light_is_infeasible(#[case] limits: Limits) {
        let m = parse_line("[#.] (1) {0,0}");
        assert_eq!(solve(&m, &limits), Err(SolveError::Infeasible));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn elimination_agrees_with_brute_force(#[case] line: usize) {
        let template = parse_line(EXAMPLE.lines().nth(line).unwrap());

        for bits in 0..(1u64 << template.light_count()) {
            let m = with_target(&template, bits);
            let expected = solve(&m, &Limits::default());
            let actual = solve(&m, &ELIMINATE);

            assert_eq!(
                actual.as_ref().map(Solution::total),
                expected.as_ref().map(Solution::total),
                "target {bits:b}"
            );
            if let Ok(solution) = actual {
                assert_eq!(m.toggle(&solution.presses), *m.target());
            }
        }
    }

    #[test]
    fn many_buttons_use_elimination() {
        // 22 single-light buttons spread over 5 lights
        let buttons = (0..22).map(|i| machine::Button::new([i % 5])).collect();
        let m = Machine::new(bitvec![usize, Lsb0; 1; 5], buttons, vec![0; 5]);

        let solution = solve(&m, &Limits::default()).unwrap();
        assert_eq!(solution.total(), 5);
        assert_eq!(m.toggle(&solution.presses), *m.target());
    }

    #[test]
    fn free_column_ceiling() {
        let m = parse_line(EXAMPLE.lines().next().unwrap());
        let limits = Limits {
            max_free_bits: 1,
            ..ELIMINATE
        };

        assert!(matches!(
            solve(&m, &limits),
            Err(SolveError::SearchTooLarge { limit: 2, .. })
        ));
    }

    #[test]
    fn reports_failing_machine() {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}\n[#.] (1) {0,0}";
        let report = process(input).unwrap_err();
        assert!(format!("{report}").contains("line 2"));
    }
}
