use itertools::{Either, Itertools};

use crate::error::SolveError;

/// Returns the lowest-scoring candidate together with its score.
///
/// `score` sees each candidate and the best score found so far, and returns
/// `None` to reject it. Ties keep the earliest candidate.
pub fn minimize<C, I, S>(candidates: I, mut score: S) -> Option<(u64, C)>
where
    I: IntoIterator<Item = C>,
    S: FnMut(&C, Option<u64>) -> Option<u64>,
{
    let mut best: Option<(u64, C)> = None;

    for candidate in candidates {
        let bound = best.as_ref().map(|(s, _)| *s);
        let Some(s) = score(&candidate, bound) else {
            continue;
        };
        if bound.is_none_or(|b| s < b) {
            tracing::trace!(score = s, "improved minimum");
            best = Some((s, candidate));
        }
    }

    best
}

/// Every subset of `n` elements as a bit mask. `n` must be below 64.
pub fn subsets(n: usize) -> impl Iterator<Item = u64> {
    0..(1u64 << n)
}

/// `(step, code)` pairs in reflected Gray order over `k` bits.
///
/// Consecutive codes differ in exactly one bit: the lowest set bit of `step`.
pub fn gray_code(k: usize) -> impl Iterator<Item = (u64, u64)> {
    (0..(1u64 << k)).map(|i| (i, i ^ (i >> 1)))
}

/// Every vector in `[0, upper]^dims`, last coordinate varying fastest.
pub fn grid(dims: usize, upper: u64) -> impl Iterator<Item = Vec<u64>> {
    if dims == 0 {
        Either::Left(std::iter::once(Vec::new()))
    } else {
        Either::Right(std::iter::repeat_n(0..=upper, dims).multi_cartesian_product())
    }
}

/// Number of candidates in a `base^dims` search, or `SearchTooLarge` past `limit`.
pub fn space_size(base: u64, dims: usize, limit: u128) -> Result<u128, SolveError> {
    let size = u32::try_from(dims)
        .ok()
        .and_then(|dims| u128::from(base).checked_pow(dims))
        .unwrap_or(u128::MAX);

    if size > limit {
        return Err(SolveError::SearchTooLarge { size, limit });
    }
    Ok(size)
}
