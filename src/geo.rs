/// A (longitude, latitude) pair in degrees, matching the GeoJSON coordinate order
/// stored on vendor and delivery locations.
pub type LngLat = (f64, f64);

const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance between two points in miles (haversine), rounded to
/// two decimals.
pub fn distance_miles(a: LngLat, b: LngLat) -> f64 {
    let (lon1, lat1) = a;
    let (lon2, lat2) = b;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    round2(EARTH_RADIUS_MILES * c)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert_eq!(distance_miles((-73.9857, 40.7484), (-73.9857, 40.7484)), 0.0);
    }

    #[test]
    fn new_york_to_los_angeles() {
        // Empire State Building to LA City Hall, roughly 2,448 miles.
        let d = distance_miles((-73.9857, 40.7484), (-118.2426, 34.0537));
        assert!((d - 2448.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        let d = distance_miles((-73.9857, 40.7484), (-74.0445, 40.6892));
        assert_eq!(d, round2(d));
    }

    #[test]
    fn symmetric() {
        let a = (-87.6298, 41.8781);
        let b = (-122.4194, 37.7749);
        assert_eq!(distance_miles(a, b), distance_miles(b, a));
    }
}
