use std::{f32::consts::FRAC_PI_4, sync::Arc, time::Duration};

use ghost_maze_core::{MazeDimensions, RaySegment, Wall};
use ghost_maze_system_flashlight::{cast_fan, cast_ray, Config, Flashlight};
use ghost_maze_system_spatial::WallGrid;
use glam::Vec2;

fn grid_with(walls: Vec<Wall>) -> WallGrid {
    WallGrid::build(MazeDimensions::new(3500.0, 3500.0, 100.0), Arc::from(walls))
}

#[test]
fn ray_stops_on_near_edge_of_wall_ahead() {
    let grid = grid_with(vec![Wall::new(100.0, -50.0, 50.0, 100.0)]);
    let segment = cast_ray(Vec2::ZERO, 0.0, 800.0, &grid);

    assert!(segment.hit);
    assert!((segment.distance - 100.0).abs() < 1e-3);
    assert!((segment.end.x - 100.0).abs() < 1e-3);
    assert!(segment.end.y.abs() < 1e-3);
}

fn assert_hits_at(segment: RaySegment, expected: Vec2) {
    assert!(segment.hit, "ray toward {expected} missed");
    assert!((segment.distance - 100.0).abs() < 1e-3);
    assert!(
        segment.end.distance(expected) < 1e-3,
        "hit {} instead of {expected}",
        segment.end
    );
}

#[test]
fn ray_toward_negative_x_stops_on_right_face() {
    let grid = grid_with(vec![Wall::new(-150.0, -50.0, 50.0, 100.0)]);
    let segment = cast_ray(Vec2::ZERO, std::f32::consts::PI, 800.0, &grid);
    assert_hits_at(segment, Vec2::new(-100.0, 0.0));
}

#[test]
fn ray_toward_positive_y_stops_on_top_face() {
    let grid = grid_with(vec![Wall::new(-50.0, 100.0, 100.0, 50.0)]);
    let segment = cast_ray(Vec2::ZERO, std::f32::consts::FRAC_PI_2, 800.0, &grid);
    assert_hits_at(segment, Vec2::new(0.0, 100.0));
}

#[test]
fn ray_toward_negative_y_stops_on_bottom_face() {
    let grid = grid_with(vec![Wall::new(-50.0, -150.0, 100.0, 50.0)]);
    let segment = cast_ray(Vec2::ZERO, -std::f32::consts::FRAC_PI_2, 800.0, &grid);
    assert_hits_at(segment, Vec2::new(0.0, -100.0));
}

#[test]
fn closest_of_several_walls_wins() {
    let grid = grid_with(vec![
        Wall::new(300.0, -50.0, 100.0, 100.0),
        Wall::new(200.0, -50.0, 100.0, 100.0),
    ]);
    let segment = cast_ray(Vec2::new(10.0, 0.0), 0.0, 800.0, &grid);
    assert!(segment.hit);
    assert!((segment.end.x - 200.0).abs() < 1e-3);
}

#[test]
fn misses_end_at_exact_max_distance() {
    let grid = grid_with(vec![Wall::new(100.0, -50.0, 50.0, 100.0)]);
    let fan = cast_fan(Vec2::ZERO, std::f32::consts::PI, FRAC_PI_4, 60, 800.0, &grid);

    assert_eq!(fan.len(), 61);
    for segment in &fan {
        assert!(!segment.hit);
        assert_eq!(segment.distance, 800.0);
    }
}

#[test]
fn walls_beyond_reach_are_ignored() {
    let grid = grid_with(vec![Wall::new(900.0, -50.0, 100.0, 100.0)]);
    let segment = cast_ray(Vec2::ZERO, 0.0, 800.0, &grid);
    assert!(!segment.hit);
    assert_eq!(segment.distance, 800.0);
}

#[test]
fn walls_behind_the_cone_are_not_hit() {
    let grid = grid_with(vec![Wall::new(-150.0, -50.0, 50.0, 100.0)]);
    let segment = cast_ray(Vec2::ZERO, 0.0, 800.0, &grid);
    assert!(!segment.hit);
}

#[test]
fn fan_spans_the_field_of_view() {
    let grid = grid_with(Vec::new());
    let mut flashlight = Flashlight::new(Config::new(FRAC_PI_4, 4, 800.0));
    flashlight.set_angle(1.0);
    let segments = flashlight.cast(Vec2::ZERO, &grid).to_vec();

    assert_eq!(segments.len(), 5);
    let first = segments[0].end.y.atan2(segments[0].end.x);
    let last = segments[4].end.y.atan2(segments[4].end.x);
    assert!((first - (1.0 - FRAC_PI_4 / 2.0)).abs() < 1e-4);
    assert!((last - (1.0 + FRAC_PI_4 / 2.0)).abs() < 1e-4);
}

#[test]
fn visibility_polygon_starts_at_origin() {
    let grid = grid_with(Vec::new());
    let mut flashlight = Flashlight::new(Config::new(FRAC_PI_4, 10, 800.0));
    let origin = Vec2::new(20.0, -30.0);
    let _ = flashlight.cast(origin, &grid);

    let polygon = flashlight.visibility_polygon();
    assert_eq!(polygon.len(), 12);
    assert_eq!(polygon[0], origin);

    flashlight.clear();
    assert!(flashlight.visibility_polygon().is_empty());
}

#[test]
fn cache_survives_standing_still_and_drops_on_move() {
    let grid = grid_with(vec![Wall::new(100.0, -50.0, 50.0, 100.0)]);
    let mut flashlight = Flashlight::new(Config::new(FRAC_PI_4, 60, 800.0));

    let _ = flashlight.cast(Vec2::ZERO, &grid);
    let cached = flashlight.cached_rays();
    assert!(cached > 0);
    let _ = flashlight.cast(Vec2::ZERO, &grid);
    assert_eq!(flashlight.cached_rays(), cached);

    let moved = flashlight.cast(Vec2::new(-60.0, 0.0), &grid).to_vec();
    let center = &moved[30];
    assert!(center.hit);
    assert!((center.distance - 160.0).abs() < 1e-2, "stale cache reused");
}

#[test]
fn cache_is_cleared_past_its_limit() {
    let grid = grid_with(Vec::new());
    let mut flashlight =
        Flashlight::new(Config::new(FRAC_PI_4, 60, 800.0).with_cache_limit(100));
    for step in 0..4 {
        flashlight.set_angle(step as f32);
        let _ = flashlight.cast(Vec2::ZERO, &grid);
        assert!(flashlight.cached_rays() <= 100);
    }
}

#[test]
fn illumination_requires_projection_inside_segment() {
    let grid = grid_with(vec![Wall::new(100.0, -50.0, 50.0, 100.0)]);
    let mut flashlight = Flashlight::new(Config::new(FRAC_PI_4, 60, 800.0));
    let _ = flashlight.cast(Vec2::ZERO, &grid);

    assert!(flashlight.is_illuminated(Vec2::new(60.0, 5.0), 20.0));
    assert!(!flashlight.is_illuminated(Vec2::new(400.0, 0.0), 20.0), "behind wall");
    assert!(!flashlight.is_illuminated(Vec2::new(-60.0, 0.0), 20.0), "behind player");
    assert!(!flashlight.is_illuminated(Vec2::new(60.0, 300.0), 20.0), "outside cone");
}

#[test]
fn ray_count_follows_half_the_frame_rate_within_bounds() {
    let mut flashlight = Flashlight::new(Config::new(FRAC_PI_4, 60, 800.0));
    assert_eq!(flashlight.ray_count(), 60);

    for _ in 0..100 {
        flashlight.record_frame(Duration::from_millis(10));
    }
    assert_eq!(flashlight.ray_count(), 50);

    for _ in 0..20 {
        flashlight.record_frame(Duration::from_millis(50));
    }
    assert_eq!(flashlight.ray_count(), 30);

    let mut fixed = Flashlight::new(
        Config::new(FRAC_PI_4, 60, 800.0).with_adaptive_ray_count(false),
    );
    for _ in 0..20 {
        fixed.record_frame(Duration::from_millis(50));
    }
    assert_eq!(fixed.ray_count(), 60);
}
