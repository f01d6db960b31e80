//! Geofencing: how far a caller is from a mission, and what that allows.
//!
//! Distances are great-circle distances on a spherical Earth (haversine).
//! Two fixed radii apply, both inclusive:
//!
//! - [`NEARBY_RADIUS_M`] for discovery listings.
//! - [`INTERACTION_RADIUS_M`] for starting and submitting a mission.

use crate::model::Location;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Missions within this distance show up in "near me" listings.
pub const NEARBY_RADIUS_M: f64 = 1000.0;

/// Callers must be within this distance to start or submit a mission.
pub const INTERACTION_RADIUS_M: f64 = 100.0;

/// Great-circle distance between two points, in meters.
pub fn distance_meters(a: Location, b: Location) -> f64 {
    let phi_1 = a.latitude.to_radians();
    let phi_2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi_1.cos() * phi_2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Inclusive radius check on an already computed distance.
pub fn within_radius(distance_m: f64, radius_m: f64) -> bool {
    distance_m <= radius_m
}

pub fn is_nearby(user: Location, mission: Location) -> bool {
    within_radius(distance_meters(user, mission), NEARBY_RADIUS_M)
}

pub fn is_within_interaction_range(user: Location, mission: Location) -> bool {
    within_radius(distance_meters(user, mission), INTERACTION_RADIUS_M)
}

/// A latitude/longitude box that contains every point within some radius
/// of a center. Used to cut down candidates before exact distance checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,

    /// `None` when the box spans every longitude: near a pole, or when it
    /// would wrap across the antimeridian.
    pub longitude: Option<(f64, f64)>,
}

impl BoundingBox {
    pub fn around(center: Location, radius_m: f64) -> Self {
        let angular = radius_m / EARTH_RADIUS_M;
        let lat = center.latitude.to_radians();
        let min_lat = lat - angular;
        let max_lat = lat + angular;

        let half_pi = std::f64::consts::FRAC_PI_2;
        if min_lat <= -half_pi || max_lat >= half_pi {
            return Self {
                min_latitude: min_lat.to_degrees().max(-90.0),
                max_latitude: max_lat.to_degrees().min(90.0),
                longitude: None,
            };
        }

        let ratio = angular.sin() / lat.cos();
        if ratio >= 1.0 {
            return Self {
                min_latitude: min_lat.to_degrees(),
                max_latitude: max_lat.to_degrees(),
                longitude: None,
            };
        }

        let delta_lon = ratio.asin().to_degrees();
        let min_lon = center.longitude - delta_lon;
        let max_lon = center.longitude + delta_lon;
        let longitude = if min_lon < -180.0 || max_lon > 180.0 {
            None
        } else {
            Some((min_lon, max_lon))
        };

        Self {
            min_latitude: min_lat.to_degrees(),
            max_latitude: max_lat.to_degrees(),
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE_M: f64 = 1e-6;

    fn budapest_a() -> Location {
        Location::new(19.0619, 47.4731)
    }

    fn budapest_b() -> Location {
        Location::new(19.0454, 47.5069)
    }

    fn in_box(area: &BoundingBox, point: Location) -> bool {
        let lat_ok = (area.min_latitude..=area.max_latitude).contains(&point.latitude);
        let lon_ok = area
            .longitude
            .is_none_or(|(min, max)| (min..=max).contains(&point.longitude));
        lat_ok && lon_ok
    }

    /// A point `meters` due north of `origin`.
    fn north_of(origin: Location, meters: f64) -> Location {
        let delta = (meters / EARTH_RADIUS_M).to_degrees();
        Location::new(origin.longitude, origin.latitude + delta)
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (budapest_a(), budapest_b()),
            (
                Location::new(-73.9857, 40.7484),
                Location::new(2.2945, 48.8584),
            ),
            (Location::new(179.9, -10.0), Location::new(-179.9, 10.0)),
            (Location::new(0.0, 89.9), Location::new(180.0, 89.9)),
        ];
        for (a, b) in pairs {
            let ab = distance_meters(a, b);
            let ba = distance_meters(b, a);
            assert!((ab - ba).abs() < TOLERANCE_M, "{ab} != {ba}");
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in [
            budapest_a(),
            Location::new(-180.0, -90.0),
            Location::new(0.0, 0.0),
        ] {
            assert!(distance_meters(p, p).abs() < TOLERANCE_M);
        }
    }

    #[test]
    fn distance_is_non_negative() {
        let d = distance_meters(Location::new(10.0, 10.0), Location::new(-10.0, -10.0));
        assert!(d > 0.0);
    }

    #[test]
    fn budapest_landmarks_are_about_four_kilometers_apart() {
        let d = distance_meters(budapest_a(), budapest_b());
        assert!((3950.0..3965.0).contains(&d), "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_the_circumference_apart() {
        let d = distance_meters(Location::new(0.0, 0.0), Location::new(180.0, 0.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half).abs() < 1.0);
    }

    #[test]
    fn radius_cutoff_is_inclusive_and_sharp() {
        assert!(within_radius(100.0, INTERACTION_RADIUS_M));
        assert!(!within_radius(100.01, INTERACTION_RADIUS_M));
        assert!(within_radius(1000.0, NEARBY_RADIUS_M));
        assert!(!within_radius(1000.01, NEARBY_RADIUS_M));
    }

    #[test]
    fn interaction_range_by_coordinates() {
        let mission = budapest_b();
        assert!(is_within_interaction_range(mission, mission));
        assert!(is_within_interaction_range(north_of(mission, 99.9), mission));
        assert!(!is_within_interaction_range(north_of(mission, 100.1), mission));
    }

    #[test]
    fn interaction_gate_holds_at_the_boundary() {
        let mission = budapest_b();

        // As close to 100 m as degree rounding allows.
        let edge = north_of(mission, INTERACTION_RADIUS_M - TOLERANCE_M);
        let d = distance_meters(edge, mission);
        assert!((d - INTERACTION_RADIUS_M).abs() < 1e-5, "got {d}");
        assert!(is_within_interaction_range(edge, mission));

        let outside = north_of(mission, INTERACTION_RADIUS_M + 0.01);
        assert!(!is_within_interaction_range(outside, mission));
    }

    #[test]
    fn nearby_gate_holds_at_the_boundary() {
        let mission = budapest_b();

        let edge = north_of(mission, NEARBY_RADIUS_M - TOLERANCE_M);
        let d = distance_meters(edge, mission);
        assert!((d - NEARBY_RADIUS_M).abs() < 1e-5, "got {d}");
        assert!(is_nearby(edge, mission));

        let outside = north_of(mission, NEARBY_RADIUS_M + 0.01);
        assert!(!is_nearby(outside, mission));
    }

    #[test]
    fn nearby_by_coordinates() {
        let mission = budapest_b();
        assert!(is_nearby(north_of(mission, 999.0), mission));
        assert!(!is_nearby(north_of(mission, 1001.0), mission));
        assert!(!is_nearby(budapest_a(), mission));
    }

    #[test]
    fn bounding_box_contains_the_whole_circle() {
        let center = budapest_b();
        let area = BoundingBox::around(center, NEARBY_RADIUS_M);
        for bearing_deg in (0..360).step_by(15) {
            let bearing = f64::from(bearing_deg).to_radians();
            let d_lat = (NEARBY_RADIUS_M * bearing.cos() / EARTH_RADIUS_M).to_degrees();
            let d_lon = (NEARBY_RADIUS_M * bearing.sin()
                / (EARTH_RADIUS_M * center.latitude.to_radians().cos()))
            .to_degrees();
            // Slightly inside the circle to stay clear of rounding.
            let point = Location::new(
                center.longitude + d_lon * 0.99,
                center.latitude + d_lat * 0.99,
            );
            assert!(in_box(&area, point), "bearing {bearing_deg}");
        }
        assert!(!in_box(&area, budapest_a()));
    }

    #[test]
    fn bounding_box_spans_all_longitudes_near_poles_and_antimeridian() {
        assert!(
            BoundingBox::around(Location::new(0.0, 89.995), NEARBY_RADIUS_M)
                .longitude
                .is_none()
        );
        assert!(
            BoundingBox::around(Location::new(179.999, 0.0), NEARBY_RADIUS_M)
                .longitude
                .is_none()
        );
        assert!(
            BoundingBox::around(Location::new(19.0, 47.5), NEARBY_RADIUS_M)
                .longitude
                .is_some()
        );
    }
}
