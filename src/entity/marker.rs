//! Session waypoint markers
//!
//! Markers are decorative waypoints with an independent lifecycle: they are
//! not owned by any chunk, survive every streaming pass, and live only in
//! the session's runtime memory.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One waypoint at a world (x, z) position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: f32,
    pub z: f32,
    pub found: bool,
}

/// Collection of session markers with proximity detection
pub struct MarkerSet {
    markers: Vec<Marker>,
    found_radius: f32,
}

impl MarkerSet {
    pub fn new(found_radius: f32) -> Self {
        Self {
            markers: Vec::new(),
            found_radius,
        }
    }

    /// Add an unfound marker at (x, z)
    pub fn add(&mut self, x: f32, z: f32) {
        self.markers.push(Marker { x, z, found: false });
    }

    /// Flag markers within the found radius of the viewpoint
    ///
    /// Returns how many markers were newly found this call. A found marker
    /// stays found for the rest of the session.
    pub fn update(&mut self, viewpoint: Vec3) -> usize {
        let mut newly_found = 0;
        for marker in &mut self.markers {
            if marker.found {
                continue;
            }
            let dx = marker.x - viewpoint.x;
            let dz = marker.z - viewpoint.z;
            if (dx * dx + dz * dz).sqrt() < self.found_radius {
                marker.found = true;
                newly_found += 1;
            }
        }
        newly_found
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn found_count(&self) -> usize {
        self.markers.iter().filter(|m| m.found).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_start_unfound() {
        let mut set = MarkerSet::new(50.0);
        set.add(100.0, 100.0);
        set.add(-200.0, 300.0);

        assert_eq!(set.markers().len(), 2);
        assert_eq!(set.found_count(), 0);
    }

    #[test]
    fn test_update_flags_nearby_markers() {
        let mut set = MarkerSet::new(50.0);
        set.add(100.0, 0.0);
        set.add(1000.0, 0.0);

        let found = set.update(Vec3::new(80.0, 10.0, 0.0));
        assert_eq!(found, 1);
        assert!(set.markers()[0].found);
        assert!(!set.markers()[1].found);
    }

    #[test]
    fn test_found_markers_stay_found() {
        let mut set = MarkerSet::new(50.0);
        set.add(0.0, 0.0);

        assert_eq!(set.update(Vec3::ZERO), 1);
        // Walking away does not reset the flag, and it is not re-found.
        assert_eq!(set.update(Vec3::new(1e6, 0.0, 0.0)), 0);
        assert_eq!(set.update(Vec3::ZERO), 0);
        assert_eq!(set.found_count(), 1);
    }

    #[test]
    fn test_height_ignored_for_proximity() {
        let mut set = MarkerSet::new(10.0);
        set.add(0.0, 0.0);

        // Marker proximity is planar; the viewpoint altitude is irrelevant.
        assert_eq!(set.update(Vec3::new(0.0, 5000.0, 0.0)), 1);
    }
}
