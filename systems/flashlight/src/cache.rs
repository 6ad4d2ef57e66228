use std::collections::HashMap;

use ghost_maze_core::RaySegment;

/// Cast rays keyed by their angle quantized to hundredths of a radian.
///
/// Entries are only valid for the origin they were cast from; the owner
/// clears the cache whenever that origin changes.
#[derive(Debug)]
pub(crate) struct RayCache {
    limit: usize,
    rays: HashMap<i32, RaySegment>,
}

impl RayCache {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            rays: HashMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.rays.len()
    }

    pub(crate) fn clear(&mut self) {
        self.rays.clear();
    }

    pub(crate) fn get_or_insert_with<F>(&mut self, angle: f32, cast: F) -> RaySegment
    where
        F: FnOnce() -> RaySegment,
    {
        *self.rays.entry(quantize(angle)).or_insert_with(cast)
    }

    /// Clears everything once the entry count exceeds the limit.
    pub(crate) fn enforce_limit(&mut self) {
        if self.rays.len() > self.limit {
            self.rays.clear();
        }
    }
}

fn quantize(angle: f32) -> i32 {
    (angle * 100.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn segment(distance: f32) -> RaySegment {
        RaySegment {
            start: Vec2::ZERO,
            end: Vec2::new(distance, 0.0),
            distance,
            hit: false,
        }
    }

    #[test]
    fn nearby_angles_share_a_key() {
        let mut cache = RayCache::new(1000);
        let first = cache.get_or_insert_with(0.101, || segment(10.0));
        let second = cache.get_or_insert_with(0.104, || segment(20.0));
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn exceeding_limit_clears_everything() {
        let mut cache = RayCache::new(2);
        for index in 0..3 {
            let _ = cache.get_or_insert_with(index as f32, || segment(1.0));
        }
        assert_eq!(cache.len(), 3);
        cache.enforce_limit();
        assert_eq!(cache.len(), 0);
    }
}
