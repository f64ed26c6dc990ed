//! Partition assignment fairness (Gini coefficient).

use groupwatch_types::MemberObservation;

/// Gini coefficient over a distribution of counts.
///
/// With counts sorted ascending `c_1..c_k`:
/// `G = 2 * Σ(i * c_i) / (k * Σc_i) - (k + 1) / k`.
///
/// Zero members or a zero total is perfectly fair by definition. The result
/// is clamped to `[0, 1]` so float noise never leaks a negative index.
pub fn gini(counts: &[u32]) -> f64 {
    let k = counts.len();
    if k == 0 {
        return 0.0;
    }

    let mut sorted = counts.to_vec();
    sorted.sort_unstable();

    let total: u64 = sorted.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0.0;
    }

    let weighted: u64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as u64 + 1) * c as u64)
        .sum();

    let k = k as f64;
    let g = 2.0 * weighted as f64 / (k * total as f64) - (k + 1.0) / k;
    g.clamp(0.0, 1.0)
}

/// Fairness of partition assignment across group members.
pub fn fairness_gini(members: &[MemberObservation]) -> f64 {
    let counts: Vec<u32> = members.iter().map(|m| m.partition_count).collect();
    gini(&counts)
}
