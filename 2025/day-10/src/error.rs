use miette::Diagnostic;
use thiserror::Error;

/// Failure modes of a single machine solve.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SolveError {
    /// No assignment satisfies the equations in the required domain.
    #[error("no combination of button presses reaches the target")]
    #[diagnostic(code(day10::infeasible))]
    Infeasible,

    /// The enumeration would visit more candidates than the configured ceiling.
    /// This is a resource limit, not a proof of unsolvability.
    #[error("search space of {size} candidates exceeds the ceiling of {limit}")]
    #[diagnostic(
        code(day10::search_too_large),
        help("raise the matching field of `Limits` if the run is expected to finish")
    )]
    SearchTooLarge { size: u128, limit: u128 },
}
