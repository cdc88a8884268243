//! Inverse-distance-weighted temperature field over the sensor triangle.
//!
//! The padded bounding box of the three sensors is cut into a
//! `resolution × resolution` lattice. Cell centres that fall inside the
//! sensor polygon get an IDW value; everything outside is dropped, so the
//! result is a sparse point cloud rather than a raster.
//!
//! Positions are `(latitude, longitude)` pairs treated as planar
//! coordinates. At the scale of one city block the distortion is negligible.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{GridPoint, SensorObservation};

/// Default IDW exponent (inverse-square weighting).
pub const DEFAULT_POWER: f64 = 2.0;

/// Smallest distance used in a weight, so a cell on top of a sensor stays finite.
pub const DISTANCE_FLOOR: f64 = 1e-10;

/// Fraction of the bounding box added on every side before gridding.
const PADDING: f64 = 0.1;

type Point = (f64, f64);

// ---

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Degenerate box around a single point.
    pub fn around(point: Point) -> Self {
        Bounds {
            min_lat: point.0,
            max_lat: point.0,
            min_lng: point.1,
            max_lng: point.1,
        }
    }

    /// Smallest box holding both `self` and `point`.
    pub fn extend(self, point: Point) -> Self {
        Bounds {
            min_lat: self.min_lat.min(point.0),
            max_lat: self.max_lat.max(point.0),
            min_lng: self.min_lng.min(point.1),
            max_lng: self.max_lng.max(point.1),
        }
    }

    /// Smallest box holding every point. `None` when `points` is empty.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        Some(rest.iter().copied().fold(Bounds::around(first), Bounds::extend))
    }

    /// Grow the box by `fraction` of its height and width on each side.
    pub fn padded(self, fraction: f64) -> Self {
        // ---
        let lat_pad = (self.max_lat - self.min_lat) * fraction;
        let lng_pad = (self.max_lng - self.min_lng) * fraction;

        Bounds {
            min_lat: self.min_lat - lat_pad,
            max_lat: self.max_lat + lat_pad,
            min_lng: self.min_lng - lng_pad,
            max_lng: self.max_lng + lng_pad,
        }
    }

    /// Centre of cell `(i, j)` of a `resolution × resolution` lattice.
    fn cell_centre(&self, resolution: usize, i: usize, j: usize) -> Point {
        // ---
        let lat_step = (self.max_lat - self.min_lat) / resolution as f64;
        let lng_step = (self.max_lng - self.min_lng) / resolution as f64;

        (
            self.min_lat + (i as f64 + 0.5) * lat_step,
            self.min_lng + (j as f64 + 0.5) * lng_step,
        )
    }
}

/// Crossing-number point-in-polygon test.
///
/// Casts a ray from `point` along the first axis and counts edge crossings;
/// an odd count means inside. Points exactly on an edge may land either way.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    // ---
    let (x, y) = point;
    let mut inside = false;

    let mut j = polygon.len().wrapping_sub(1);
    for (i, &(xi, yi)) in polygon.iter().enumerate() {
        let (xj, yj) = polygon[j];

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// IDW estimate at `point` from `observations`.
///
/// `weight_i = 1 / max(distance_i, DISTANCE_FLOOR)^power`; the result is the
/// weight-normalised sum of temperatures. An empty slice yields NaN.
///
/// Distances are divided by the nearest one before raising to `power`, so
/// the nearest weight is exactly 1 and a large exponent cannot underflow
/// `distance^power` to zero at sub-metre coordinate scales. The ratios, and so the result,
/// are unchanged.
pub fn idw_value(point: Point, observations: &[SensorObservation], power: f64) -> f64 {
    // ---
    let distance = |obs: &SensorObservation| {
        (point.0 - obs.latitude)
            .hypot(point.1 - obs.longitude)
            .max(DISTANCE_FLOOR)
    };
    let nearest = observations.iter().map(distance).fold(f64::INFINITY, f64::min);

    let (weighted, total) = observations.iter().fold((0.0, 0.0), |(weighted, total), obs| {
        let weight = (nearest / distance(obs)).powf(power);
        (weighted + weight * obs.temperature, total + weight)
    });

    weighted / total
}

/// Lazily interpolate the temperature field inside the sensor triangle.
///
/// The polygon is the observations in the order given (1 → 2 → 3 → close).
/// Cost is `O(resolution²)`; a resolution of zero yields nothing.
pub fn generate_heatmap_grid(
    observations: &[SensorObservation; 3],
    resolution: usize,
    power: f64,
) -> impl Iterator<Item = GridPoint> + '_ {
    // ---
    let polygon: [Point; 3] = observations
        .each_ref()
        .map(|o| (o.latitude, o.longitude));
    let bounds = Bounds::enclosing(&polygon).map(|b| b.padded(PADDING));

    bounds
        .into_iter()
        .flat_map(move |bounds| {
            (0..resolution).flat_map(move |i| {
                (0..resolution).map(move |j| bounds.cell_centre(resolution, i, j))
            })
        })
        .filter(move |&p| point_in_polygon(p, &polygon))
        .map(move |p| GridPoint {
            latitude: p.0,
            longitude: p.1,
            value: idw_value(p, observations, power),
        })
}

/// Lowest and highest temperature among `observations`.
pub fn temperature_range(observations: &[SensorObservation]) -> Option<(f64, f64)> {
    // ---
    let mut temps = observations.iter().map(|o| o.temperature);
    let first = temps.next()?;

    Some(temps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
}

// ---

/// An 8-bit RGB colour, rendered as `rgb(r, g, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
    pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn channel(x: f64) -> u8 {
    (255.0 * x).round().clamp(0.0, 255.0) as u8
}

/// Map `value` onto a blue → cyan → green → yellow → red gradient over `[min, max]`.
///
/// Values at or below `min` are pure blue, at or above `max` pure red. When
/// the range is degenerate (`min == max`) or the normalised value is not a
/// number, the midpoint colour (pure green) is returned.
pub fn color_for_value(value: f64, min: f64, max: f64) -> Rgb {
    // ---
    let span = max - min;
    if span == 0.0 {
        return Rgb::GREEN;
    }

    let n = (value - min) / span;
    if n.is_nan() {
        return Rgb::GREEN;
    }
    if n <= 0.0 {
        return Rgb::BLUE;
    }
    if n >= 1.0 {
        return Rgb::RED;
    }

    if n < 0.25 {
        let t = n / 0.25;
        Rgb { r: 0, g: channel(t), b: 255 }
    } else if n < 0.5 {
        let t = (n - 0.25) / 0.25;
        Rgb { r: 0, g: 255, b: channel(1.0 - t) }
    } else if n < 0.75 {
        let t = (n - 0.5) / 0.25;
        Rgb { r: channel(t), g: 255, b: 0 }
    } else {
        let t = (n - 0.75) / 0.25;
        Rgb { r: 255, g: channel(1.0 - t), b: 0 }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::SENSOR_SITES;

    fn site_observations(temps: [f64; 3]) -> [SensorObservation; 3] {
        // ---
        [0, 1, 2].map(|i| SensorObservation::at_site(&SENSOR_SITES[i], temps[i]))
    }

    #[test]
    fn test_point_in_triangle() {
        // ---
        let triangle = [(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)];

        assert!(point_in_polygon((1.0, 1.0), &triangle));
        assert!(point_in_polygon((1.0, 0.1), &triangle));
        assert!(!point_in_polygon((5.0, 5.0), &triangle));
        assert!(!point_in_polygon((0.1, 1.9), &triangle));
        assert!(!point_in_polygon((1.0, 1.0), &[]));
    }

    #[test]
    fn test_idw_at_sensor_location_returns_sensor_value() {
        // ---
        let obs = site_observations([24.0, 27.5, 31.0]);

        for o in &obs {
            let v = idw_value((o.latitude, o.longitude), &obs, DEFAULT_POWER);
            assert!((v - o.temperature).abs() < 1e-6, "{} vs {}", v, o.temperature);
        }
    }

    #[test]
    fn test_idw_equidistant_is_plain_mean() {
        // ---
        let obs = vec![
            SensorObservation {
                latitude: -1.0,
                longitude: 0.0,
                temperature: 10.0,
                device_id: "a".into(),
            },
            SensorObservation {
                latitude: 1.0,
                longitude: 0.0,
                temperature: 20.0,
                device_id: "b".into(),
            },
        ];

        assert!((idw_value((0.0, 0.0), &obs, 2.0) - 15.0).abs() < 1e-12);
        assert!((idw_value((0.0, 0.0), &obs, 1.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_idw_closer_sensor_dominates_more_with_higher_power() {
        // ---
        let obs = vec![
            SensorObservation {
                latitude: 0.0,
                longitude: 0.0,
                temperature: 10.0,
                device_id: "near".into(),
            },
            SensorObservation {
                latitude: 3.0,
                longitude: 0.0,
                temperature: 20.0,
                device_id: "far".into(),
            },
        ];

        let linear = idw_value((1.0, 0.0), &obs, 1.0);
        let square = idw_value((1.0, 0.0), &obs, 2.0);
        assert!(square < linear);
        assert!(linear < 15.0);
    }

    #[test]
    fn test_grid_points_lie_inside_triangle() {
        // ---
        let obs = site_observations([24.0, 27.5, 31.0]);
        let polygon: Vec<Point> = obs.iter().map(|o| (o.latitude, o.longitude)).collect();

        let points: Vec<GridPoint> = generate_heatmap_grid(&obs, 50, DEFAULT_POWER).collect();

        assert!(!points.is_empty());
        assert!(points.len() < 50 * 50);
        for p in &points {
            assert!(point_in_polygon((p.latitude, p.longitude), &polygon));
        }
    }

    #[test]
    fn test_grid_values_within_sensor_range() {
        // ---
        let obs = site_observations([24.0, 27.5, 31.0]);
        let (lo, hi) = temperature_range(&obs).unwrap();

        for p in generate_heatmap_grid(&obs, 40, DEFAULT_POWER) {
            assert!(p.value >= lo - 1e-9 && p.value <= hi + 1e-9, "{p:?}");
        }
    }

    #[test]
    fn test_grid_on_unit_triangle() {
        // ---
        let obs = [(0.0, 0.0, 10.0), (2.0, 0.0, 20.0), (1.0, 2.0, 30.0)].map(|(lat, lng, t)| {
            SensorObservation {
                latitude: lat,
                longitude: lng,
                temperature: t,
                device_id: String::new(),
            }
        });

        let points: Vec<GridPoint> = generate_heatmap_grid(&obs, 10, DEFAULT_POWER).collect();

        // Triangle covers half of the unpadded box, which is 1/1.44 of the padded one.
        let expected = 100.0 * 0.5 / 1.44;
        assert!((points.len() as f64 - expected).abs() < 12.0, "{}", points.len());
    }

    #[test]
    fn test_grid_is_lazy_and_deterministic() {
        // ---
        let obs = site_observations([24.0, 27.5, 31.0]);

        let first: Vec<GridPoint> = generate_heatmap_grid(&obs, 100, DEFAULT_POWER).take(5).collect();
        assert_eq!(first.len(), 5);

        let a: Vec<GridPoint> = generate_heatmap_grid(&obs, 30, DEFAULT_POWER).collect();
        let b: Vec<GridPoint> = generate_heatmap_grid(&obs, 30, DEFAULT_POWER).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_resolution_yields_nothing() {
        // ---
        let obs = site_observations([24.0, 27.5, 31.0]);
        assert_eq!(generate_heatmap_grid(&obs, 0, DEFAULT_POWER).count(), 0);
    }

    #[test]
    fn test_large_power_stays_finite_and_in_range() {
        // ---
        let obs = site_observations([24.0, 27.5, 31.0]);
        let (lo, hi) = temperature_range(&obs).unwrap();

        for power in [50.0, 150.0, 1000.0] {
            let points: Vec<GridPoint> = generate_heatmap_grid(&obs, 20, power).collect();
            assert!(!points.is_empty());
            for p in &points {
                assert!(p.value.is_finite(), "power={power}: {p:?}");
                assert!(p.value >= lo - 1e-9 && p.value <= hi + 1e-9, "power={power}: {p:?}");
            }
        }
    }

    #[test]
    fn test_large_power_snaps_to_nearest_sensor() {
        // ---
        let obs = site_observations([24.0, 27.5, 31.0]);
        let near_first = (
            obs[0].latitude + (obs[1].latitude - obs[0].latitude) * 0.1,
            obs[0].longitude + (obs[1].longitude - obs[0].longitude) * 0.1,
        );

        let v = idw_value(near_first, &obs, 150.0);
        assert!((v - 24.0).abs() < 1e-6, "{v}");
    }

    #[test]
    fn test_bounds_padding() {
        // ---
        let b = Bounds::enclosing(&[(0.0, 10.0), (10.0, 20.0), (5.0, 15.0)])
            .unwrap()
            .padded(0.1);

        assert_eq!(b.min_lat, -1.0);
        assert_eq!(b.max_lat, 11.0);
        assert_eq!(b.min_lng, 9.0);
        assert_eq!(b.max_lng, 21.0);
        assert_eq!(Bounds::enclosing(&[]), None);
    }

    #[test]
    fn test_color_endpoints() {
        // ---
        assert_eq!(color_for_value(10.0, 10.0, 30.0), Rgb::BLUE);
        assert_eq!(color_for_value(30.0, 10.0, 30.0), Rgb::RED);
        assert_eq!(color_for_value(-5.0, 10.0, 30.0), Rgb::BLUE);
        assert_eq!(color_for_value(99.0, 10.0, 30.0), Rgb::RED);
    }

    #[test]
    fn test_color_gradient_stops() {
        // ---
        assert_eq!(color_for_value(20.0, 10.0, 30.0), Rgb::GREEN);
        assert_eq!(color_for_value(15.0, 10.0, 30.0), Rgb { r: 0, g: 255, b: 255 });
        assert_eq!(color_for_value(25.0, 10.0, 30.0), Rgb { r: 255, g: 255, b: 0 });

        // Halfway between blue and cyan.
        assert_eq!(color_for_value(12.5, 10.0, 30.0), Rgb { r: 0, g: 128, b: 255 });
        // Halfway between yellow and red.
        assert_eq!(color_for_value(27.5, 10.0, 30.0), Rgb { r: 255, g: 128, b: 0 });
    }

    #[test]
    fn test_color_degenerate_range_is_midpoint() {
        // ---
        assert_eq!(color_for_value(22.0, 22.0, 22.0), Rgb::GREEN);
        assert_eq!(color_for_value(f64::NAN, 10.0, 30.0), Rgb::GREEN);
    }

    #[test]
    fn test_color_rendering() {
        // ---
        assert_eq!(Rgb::BLUE.to_string(), "rgb(0, 0, 255)");
        assert_eq!(Rgb::RED.to_string(), "rgb(255, 0, 0)");
        assert_eq!(serde_json::to_string(&Rgb::GREEN).unwrap(), r#""rgb(0, 255, 0)""#);
    }

    #[test]
    fn test_temperature_range() {
        // ---
        let obs = site_observations([24.0, 31.0, 27.5]);
        assert_eq!(temperature_range(&obs), Some((24.0, 31.0)));
        assert_eq!(temperature_range(&[]), None);
    }
}
