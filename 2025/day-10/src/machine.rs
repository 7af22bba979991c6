use bitvec::prelude::*;
use chumsky::prelude::*;
use miette::*;

/// A bit vector backed by `usize` words with Least Significant Bit first ordering.
pub type Row = BitVec<usize, Lsb0>;

/// The set of light/counter indices a single press touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Sorted and de-duplicated.
    indices: Vec<usize>,
}

impl Button {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Toggle mask over `len` lights. Indices past `len` have no observable effect.
    pub fn mask(&self, len: usize) -> Row {
        let mut row = Row::repeat(false, len);
        for &i in self.indices.iter().filter(|&&i| i < len) {
            row.set(i, true);
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Indicator light diagram (b vector of the GF(2) system).
    target: Row,
    /// Button wiring (columns of the A matrix).
    buttons: Vec<Button>,
    /// Joltage requirements (b vector of the counter system).
    joltage: Vec<u32>,
}

impl Machine {
    pub fn new(target: Row, buttons: Vec<Button>, joltage: Vec<u32>) -> Self {
        Self {
            target,
            buttons,
            joltage,
        }
    }

    pub fn light_count(&self) -> usize {
        self.target.len()
    }

    pub fn target(&self) -> &Row {
        &self.target
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn joltage(&self) -> &[u32] {
        &self.joltage
    }

    pub fn light_masks(&self) -> Vec<Row> {
        self.buttons
            .iter()
            .map(|b| b.mask(self.light_count()))
            .collect()
    }

    /// Light pattern after pressing button `i` exactly `presses[i]` times.
    pub fn toggle(&self, presses: &[u64]) -> Row {
        let mut state = Row::repeat(false, self.light_count());
        for (mask, &count) in self.light_masks().iter().zip(presses) {
            if count % 2 == 1 {
                state ^= mask;
            }
        }
        state
    }

    /// Counter values after pressing button `i` exactly `presses[i]` times.
    pub fn increment(&self, presses: &[u64]) -> Vec<u64> {
        let mut counters = vec![0; self.joltage.len()];
        for (button, &count) in self.buttons.iter().zip(presses) {
            for &i in button.indices() {
                if let Some(counter) = counters.get_mut(i) {
                    *counter += count;
                }
            }
        }
        counters
    }
}

pub fn parser<'a>() -> impl Parser<'a, &'a str, Vec<Machine>, extra::Err<Rich<'a, char>>> {
    // Custom whitespace parser that excludes newlines
    let hspace = any().filter(|c: &char| *c == ' ' || *c == '\t').repeated();

    let light = choice((just('.').to(false), just('#').to(true)));

    // [.##.]
    let diagram = light
        .repeated()
        .collect::<Vec<bool>>()
        .map(|v| v.into_iter().collect::<Row>())
        .delimited_by(just('['), just(']'));

    // (0,2,3)
    let button = text::int(10)
        .from_str::<usize>()
        .unwrapped()
        .separated_by(just(','))
        .collect::<Vec<usize>>()
        .delimited_by(just('('), just(')'))
        .map(Button::new);

    // (0,2) (1,3) ...
    let buttons = button
        .padded_by(hspace)
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>();

    // {3,5,4}
    let joltage = text::int(10)
        .from_str::<u32>()
        .unwrapped()
        .separated_by(just(','))
        .collect::<Vec<u32>>()
        .delimited_by(just('{'), just('}'));

    let machine = diagram
        .then_ignore(hspace)
        .then(buttons)
        .then(joltage)
        .then_ignore(hspace)
        .map(|((target, buttons), joltage)| Machine::new(target, buttons, joltage));

    machine
        .separated_by(text::newline())
        .allow_trailing()
        .collect::<Vec<_>>()
        .padded()
}

#[tracing::instrument(skip(input), fields(len = input.len()))]
pub fn parse(input: &str) -> Result<Vec<Machine>> {
    parser()
        .parse(input)
        .into_result()
        .map_err(|e| miette!("Parse failed: {:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    const EXAMPLE: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}
";

    #[test]
    fn parses_first_machine() -> Result<()> {
        let machines = parse(EXAMPLE)?;
        assert_eq!(machines.len(), 3);

        let first = &machines[0];
        assert_eq!(first.light_count(), 4);
        assert_eq!(*first.target(), bitvec![usize, Lsb0; 0, 1, 1, 0]);
        assert_eq!(first.buttons().len(), 6);
        assert_eq!(first.buttons()[1].indices(), &[1, 3]);
        assert_eq!(first.joltage(), &[3, 5, 4, 7]);
        Ok(())
    }

    #[rstest]
    #[case(0, 4, 6)]
    #[case(1, 5, 5)]
    #[case(2, 6, 4)]
    fn parses_shapes(
        #[case] index: usize,
        #[case] lights: usize,
        #[case] buttons: usize,
    ) -> Result<()> {
        let machines = parse(EXAMPLE)?;
        assert_eq!(machines[index].light_count(), lights);
        assert_eq!(machines[index].buttons().len(), buttons);
        assert_eq!(machines[index].joltage().len(), lights);
        Ok(())
    }

    #[rstest]
    #[case("[.#] {1,2}")]
    #[case("[.x] (0) {1,2}")]
    #[case("[.#] (0) (1)")]
    #[case("[.#] (0,) {1}")]
    fn rejects_malformed_lines(#[case] input: &str) {
        assert!(parse(input).is_err());
    }

    #[test]
    fn buttons_are_sets() {
        let button = Button::new([3, 1, 3, 0]);
        assert_eq!(button.indices(), &[0, 1, 3]);
        assert_eq!(button.mask(2), bitvec![usize, Lsb0; 1, 1]);
    }

    #[test]
    fn simulates_presses() -> Result<()> {
        let machines = parse(EXAMPLE)?;
        let first = &machines[0];

        // (0,2) and (0,1) once each
        assert_eq!(first.toggle(&[0, 0, 0, 0, 1, 1]), *first.target());
        // Pressing twice cancels out
        assert_eq!(first.toggle(&[2, 0, 0, 0, 0, 0]).count_ones(), 0);

        assert_eq!(first.increment(&[1, 3, 0, 3, 1, 2]), vec![3, 5, 4, 7]);
        Ok(())
    }

    #[test]
    fn ignores_out_of_range_indices() {
        let machine = Machine::new(
            bitvec![usize, Lsb0; 1, 0],
            vec![Button::new([0, 5])],
            vec![2, 0],
        );
        assert_eq!(machine.toggle(&[1]), bitvec![usize, Lsb0; 1, 0]);
        assert_eq!(machine.increment(&[2]), vec![2, 0]);
    }
}
