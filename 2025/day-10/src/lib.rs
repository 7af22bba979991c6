use miette::*;

pub mod config;
pub mod elimination;
pub mod error;
pub mod machine;
pub mod part1;
pub mod part2;
pub mod search;

pub use config::Limits;
pub use error::SolveError;
pub use machine::{Button, Machine};

/// Press count per button, in button order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub presses: Vec<u64>,
}

impl Solution {
    pub fn total(&self) -> u64 {
        self.presses.iter().sum()
    }
}

/// Both puzzle answers for one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub lights: u64,
    pub joltage: u64,
}

/// Parses the input once and solves both puzzles for every machine.
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<Totals> {
    let machines = machine::parse(input)?;
    let limits = Limits::default();
    tracing::info!(machines = machines.len(), "parsed input");

    Ok(Totals {
        lights: part1::total_presses(&machines, &limits)?,
        joltage: part2::total_presses(&machines, &limits)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}
";
        assert_eq!(
            Totals {
                lights: 7,
                joltage: 33
            },
            process(input)?
        );
        Ok(())
    }

    #[test]
    fn one_bad_machine_fails_the_run() {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[#.] (1) {1,0}";
        assert!(process(input).is_err());
    }

    #[test]
    fn empty_presses_total_zero() {
        let solution = Solution { presses: vec![] };
        assert_eq!(solution.total(), 0);
    }
}
