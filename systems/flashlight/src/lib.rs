#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cone raycasting for the player's flashlight.
//!
//! Each tick the flashlight casts a fan of rays across its field of view,
//! consulting the wall grid so that only cells in the ray's quadrant are
//! inspected. The resulting segments form the visibility fan: the renderer
//! draws it as a polygon and the ghost engine hit-tests against it.

mod cache;
mod meter;

use std::time::Duration;

use ghost_maze_core::{RaySegment, Wall};
use ghost_maze_system_spatial::WallGrid;
use glam::Vec2;
use tracing::trace;

use cache::RayCache;
pub use meter::FrameRateMeter;

const PARALLEL_EPSILON: f32 = 1e-4;

/// Configuration parameters required to construct the flashlight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    fov: f32,
    ray_count: u32,
    min_ray_count: u32,
    max_distance: f32,
    cache_limit: usize,
    adaptive: bool,
}

impl Config {
    /// Creates a configuration with the provided cone width, ray budget and reach.
    #[must_use]
    pub const fn new(fov: f32, ray_count: u32, max_distance: f32) -> Self {
        Self {
            fov,
            ray_count,
            min_ray_count: 30,
            max_distance,
            cache_limit: 1000,
            adaptive: true,
        }
    }

    /// Sets the smallest ray count the frame-rate adaptation may choose.
    #[must_use]
    pub const fn with_min_ray_count(mut self, min_ray_count: u32) -> Self {
        self.min_ray_count = min_ray_count;
        self
    }

    /// Sets how many cached rays are kept before the cache is cleared.
    #[must_use]
    pub const fn with_cache_limit(mut self, cache_limit: usize) -> Self {
        self.cache_limit = cache_limit;
        self
    }

    /// Enables or disables adapting the ray count to the measured frame rate.
    #[must_use]
    pub const fn with_adaptive_ray_count(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Width of the cone in radians.
    #[must_use]
    pub const fn fov(&self) -> f32 {
        self.fov
    }

    /// Reach of each ray in world units.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }
}

/// Stateful raycaster that owns the per-tick visibility fan and the ray cache.
#[derive(Debug)]
pub struct Flashlight {
    angle: f32,
    fov: f32,
    ray_count: u32,
    min_ray_count: u32,
    max_ray_count: u32,
    max_distance: f32,
    adaptive: bool,
    cache: RayCache,
    meter: FrameRateMeter,
    origin: Vec2,
    segments: Vec<RaySegment>,
}

impl Flashlight {
    /// Creates a flashlight pointing along the positive x axis.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let max_ray_count = config.ray_count.max(1);
        Self {
            angle: 0.0,
            fov: config.fov,
            ray_count: max_ray_count,
            min_ray_count: config.min_ray_count.clamp(1, max_ray_count),
            max_ray_count,
            max_distance: config.max_distance,
            adaptive: config.adaptive,
            cache: RayCache::new(config.cache_limit),
            meter: FrameRateMeter::default(),
            origin: Vec2::ZERO,
            segments: Vec::new(),
        }
    }

    /// Direction of the cone bisector in radians.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Points the cone bisector at `angle`.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    /// Width of the cone in radians.
    #[must_use]
    pub const fn fov(&self) -> f32 {
        self.fov
    }

    /// Number of angular steps across the cone; `ray_count + 1` rays are cast.
    #[must_use]
    pub const fn ray_count(&self) -> u32 {
        self.ray_count
    }

    /// Reach of each ray in world units.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Segments cast by the most recent [`Flashlight::cast`].
    #[must_use]
    pub fn segments(&self) -> &[RaySegment] {
        &self.segments
    }

    /// Number of rays currently held by the cache.
    #[must_use]
    pub fn cached_rays(&self) -> usize {
        self.cache.len()
    }

    /// Feeds one frame's duration to the meter, adapting the ray count when a
    /// new frame-rate sample completes.
    pub fn record_frame(&mut self, dt: Duration) {
        let Some(fps) = self.meter.record(dt) else {
            return;
        };
        if !self.adaptive {
            return;
        }
        let ray_count = (fps / 2).clamp(self.min_ray_count, self.max_ray_count);
        if ray_count != self.ray_count {
            trace!(fps, ray_count, "adapted flashlight ray count");
            self.ray_count = ray_count;
        }
    }

    /// Rebuilds the visibility fan from `origin`.
    ///
    /// Cached rays are reused while the origin stays put; moving the origin
    /// drops the whole cache.
    pub fn cast(&mut self, origin: Vec2, grid: &WallGrid) -> &[RaySegment] {
        if origin != self.origin {
            self.cache.clear();
            self.origin = origin;
        }

        self.segments.clear();
        let step = self.fov / self.ray_count as f32;
        let first = self.angle - self.fov / 2.0;
        for index in 0..=self.ray_count {
            let angle = first + step * index as f32;
            let max_distance = self.max_distance;
            let segment = self
                .cache
                .get_or_insert_with(angle, || cast_ray(origin, angle, max_distance, grid));
            self.segments.push(segment);
        }
        self.cache.enforce_limit();

        &self.segments
    }

    /// Empties the visibility fan, as when the flashlight is switched off.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Drops every cached ray, as required after the wall set changes.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
    }

    /// Ordered outline of the lit area: the origin followed by each ray's end point.
    ///
    /// Empty while the fan is empty.
    #[must_use]
    pub fn visibility_polygon(&self) -> Vec<Vec2> {
        let Some(first) = self.segments.first() else {
            return Vec::new();
        };
        std::iter::once(first.start)
            .chain(self.segments.iter().map(|segment| segment.end))
            .collect()
    }

    /// Reports whether a body of `radius` at `point` lies on any ray of the current fan.
    #[must_use]
    pub fn is_illuminated(&self, point: Vec2, radius: f32) -> bool {
        is_illuminated(&self.segments, point, radius)
    }
}

/// Casts `ray_count + 1` rays evenly spaced across `[angle - fov / 2, angle + fov / 2]`.
#[must_use]
pub fn cast_fan(
    origin: Vec2,
    angle: f32,
    fov: f32,
    ray_count: u32,
    max_distance: f32,
    grid: &WallGrid,
) -> Vec<RaySegment> {
    let ray_count = ray_count.max(1);
    let step = fov / ray_count as f32;
    let first = angle - fov / 2.0;
    (0..=ray_count)
        .map(|index| cast_ray(origin, first + step * index as f32, max_distance, grid))
        .collect()
}

/// Casts a single ray and resolves its closest wall intersection.
///
/// Misses end exactly `max_distance` away with `hit == false`.
#[must_use]
pub fn cast_ray(origin: Vec2, angle: f32, max_distance: f32, grid: &WallGrid) -> RaySegment {
    let direction = Vec2::new(angle.cos(), angle.sin());
    let end = origin + direction * max_distance;
    let dimensions = grid.dimensions();

    let (column, row) = dimensions.grid_coords(origin);
    let radius = if dimensions.cell_size() > 0.0 {
        (max_distance / dimensions.cell_size()).ceil() as i64
    } else {
        0
    };
    let last_column = i64::from(dimensions.columns()) - 1;
    let last_row = i64::from(dimensions.rows()) - 1;
    let columns = quadrant_span(column, radius, direction.x, last_column);
    let rows = quadrant_span(row, radius, direction.y, last_row);

    let mut closest: Option<(Vec2, f32)> = None;
    for grid_column in columns.0..=columns.1 {
        for grid_row in rows.0..=rows.1 {
            for wall in grid.query(grid_column, grid_row) {
                let Some((point, distance)) = facing_edge_hit(origin, end, wall) else {
                    continue;
                };
                let nearer = closest.map_or(distance < max_distance, |(_, best)| distance < best);
                if nearer {
                    closest = Some((point, distance));
                }
            }
        }
    }

    match closest {
        Some((point, distance)) => RaySegment {
            start: origin,
            end: point,
            distance,
            hit: true,
        },
        None => RaySegment {
            start: origin,
            end,
            distance: max_distance,
            hit: false,
        },
    }
}

/// Reports whether a body of `radius` at `point` lies on any of the segments.
///
/// The point must project inside a segment and sit closer than `radius` to
/// its supporting line. Zero-length segments light nothing.
#[must_use]
pub fn is_illuminated(segments: &[RaySegment], point: Vec2, radius: f32) -> bool {
    segments.iter().any(|segment| {
        let along = segment.end - segment.start;
        let length = along.length();
        if length <= f32::EPSILON {
            return false;
        }
        let direction = along / length;
        let offset = point - segment.start;
        let projection = offset.dot(direction);
        if projection < 0.0 || projection > length {
            return false;
        }
        offset.perp_dot(direction).abs() < radius
    })
}

/// Grid span searched along one axis: from the origin cell toward the ray's sign.
fn quadrant_span(origin: i64, radius: i64, direction: f32, last: i64) -> (i64, i64) {
    if direction >= 0.0 {
        (origin.max(0), (origin + radius).min(last))
    } else {
        ((origin - radius).max(0), origin.min(last))
    }
}

/// Intersects the ray with the wall edges whose outward normal opposes it.
fn facing_edge_hit(origin: Vec2, end: Vec2, wall: &Wall) -> Option<(Vec2, f32)> {
    let direction = end - origin;
    let min = wall.min();
    let max = wall.max();
    let mut edges: [Option<(Vec2, Vec2)>; 4] = [None; 4];

    if direction.y > 0.0 {
        edges[0] = Some((min, Vec2::new(max.x, min.y)));
    }
    if direction.x < 0.0 {
        edges[1] = Some((Vec2::new(max.x, min.y), max));
    }
    if direction.y < 0.0 {
        edges[2] = Some((Vec2::new(min.x, max.y), max));
    }
    if direction.x > 0.0 {
        edges[3] = Some((min, Vec2::new(min.x, max.y)));
    }

    edges
        .into_iter()
        .flatten()
        .filter_map(|(a, b)| segment_intersection(origin, end, a, b))
        .min_by(|left, right| left.1.total_cmp(&right.1))
}

/// Parametric intersection of segment `p1..p2` with segment `p3..p4`.
///
/// Near-parallel pairs report no intersection.
fn segment_intersection(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<(Vec2, f32)> {
    let denominator = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / denominator;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / denominator;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    let point = p1 + (p2 - p1) * t;
    Some((point, t * p1.distance(p2)))
}
