// Point-gap tiering.

/// Tier numbers for a points-descending sequence.
///
/// The first entry is tier 1; the tier increments by one whenever the drop
/// from the previous entry to the current one is at least `gap`.
pub fn assign_tiers(points: &[f64], gap: f64) -> Vec<u32> {
    let mut tiers = Vec::with_capacity(points.len());
    let mut tier = 1u32;
    for (i, p) in points.iter().enumerate() {
        if i > 0 && points[i - 1] - p >= gap {
            tier += 1;
        }
        tiers.push(tier);
    }
    tiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_single() {
        assert!(assign_tiers(&[], 10.0).is_empty());
        assert_eq!(assign_tiers(&[123.0], 10.0), vec![1]);
    }

    #[test]
    fn gap_boundary_is_inclusive() {
        let points = [300.0, 295.0, 285.0, 284.9, 250.0];
        assert_eq!(assign_tiers(&points, 10.0), vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn tiers_never_jump_by_two() {
        let points = [400.0, 300.0, 100.0, 99.0, 0.0];
        let tiers = assign_tiers(&points, 10.0);
        assert_eq!(tiers, vec![1, 2, 3, 3, 4]);
        for w in tiers.windows(2) {
            assert!(w[1] == w[0] || w[1] == w[0] + 1);
        }
    }

    #[test]
    fn flat_sequence_stays_one_tier() {
        assert_eq!(assign_tiers(&[50.0; 6], 0.5), vec![1; 6]);
    }
}
