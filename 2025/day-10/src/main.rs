use miette::*;

use aoc2025_day_10::process;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let input = include_str!("../input1.txt");
    let totals = process(input)?;
    println!("{}", totals.lights);
    println!("{}", totals.joltage);
    Ok(())
}
