use strsim::normalized_levenshtein;

/// Edit-distance ratio in [0, 1]. Symmetric, 1.0 on identical input.
/// Assumes both sides are already normalized for comparison. Two empty
/// strings score 1.0, so fuzzy callers must require non-empty operands.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}
