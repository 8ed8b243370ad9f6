//! Distance to LOD level mapping
//!
//! The LOD level is the block edge length generated inside a chunk: level 1
//! immediately adjacent to the viewpoint, doubling as distance doubles.
//! Geometry per unit area falls off as roughly `1/level^2`, which bounds the
//! total instance count independent of the view radius.

/// LOD level for a chunk at Chebyshev distance `dist` from the viewpoint
///
/// `level = clamp(2^floor(log2(dist - 1)), 1, chunk_size)`, with the
/// distance floored at 1 so the viewpoint's own chunk never feeds a
/// degenerate value into the log.
///
/// # Examples
/// ```
/// use cubeland::streaming::level_for_distance;
///
/// assert_eq!(level_for_distance(0, 64), 1); // own chunk, forced to dist 1
/// assert_eq!(level_for_distance(1, 64), 1);
/// assert_eq!(level_for_distance(5, 64), 4); // 2^floor(log2(4))
/// assert_eq!(level_for_distance(1000, 64), 64); // clamped to chunk size
/// ```
pub fn level_for_distance(dist: u32, chunk_size: u32) -> u32 {
    let dist = dist.max(1);
    if dist == 1 {
        return 1;
    }
    let level = 1u32 << (dist - 1).ilog2();
    level.clamp(1, chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_near_viewpoint() {
        // dist 0 is the viewpoint's own chunk, forced to dist 1.
        assert_eq!(level_for_distance(0, 64), 1);
        assert_eq!(level_for_distance(1, 64), 1);
        assert_eq!(level_for_distance(2, 64), 1);
    }

    #[test]
    fn test_level_doubles_with_distance() {
        assert_eq!(level_for_distance(3, 64), 2);
        assert_eq!(level_for_distance(4, 64), 2);
        assert_eq!(level_for_distance(5, 64), 4);
        assert_eq!(level_for_distance(8, 64), 4);
        assert_eq!(level_for_distance(9, 64), 8);
        assert_eq!(level_for_distance(17, 64), 16);
        assert_eq!(level_for_distance(33, 64), 32);
        assert_eq!(level_for_distance(65, 64), 64);
    }

    #[test]
    fn test_level_clamped_to_chunk_size() {
        assert_eq!(level_for_distance(10_000, 64), 64);
        assert_eq!(level_for_distance(10_000, 16), 16);
        assert_eq!(level_for_distance(5, 2), 2);
    }

    #[test]
    fn test_level_is_power_of_two() {
        for dist in 0..500 {
            let level = level_for_distance(dist, 64);
            assert!(level.is_power_of_two(), "level {} at dist {}", level, dist);
            assert!((1..=64).contains(&level));
        }
    }

    #[test]
    fn test_level_monotonic_in_distance() {
        let mut prev = 0;
        for dist in 0..2000 {
            let level = level_for_distance(dist, 64);
            assert!(
                level >= prev,
                "level must be non-decreasing with distance (dist {})",
                dist
            );
            prev = level;
        }
    }
}
