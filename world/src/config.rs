//! Session configuration. Every section carries the game's defaults so a
//! partial TOML file only needs to name the fields it overrides.

use std::{f32::consts::FRAC_PI_4, time::Duration};

use ghost_maze_core::MazeDimensions;
use serde::{Deserialize, Serialize};

/// Everything required to build a [`crate::World`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the simulation's random source.
    pub seed: u64,
    /// Maze extent and carving parameters.
    pub maze: MazeConfig,
    /// Player body and movement parameters.
    pub player: PlayerConfig,
    /// Flashlight cone parameters.
    pub flashlight: FlashlightConfig,
    /// Ghost population parameters.
    pub ghosts: GhostConfig,
}

/// Maze extent and carving parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Maze width in world units.
    pub width: f32,
    /// Maze height in world units.
    pub height: f32,
    /// Side length of one cell in world units.
    pub cell_size: f32,
    /// Column offset of the carving start relative to the center cell.
    pub start_column_offset: i64,
    /// Row offset of the carving start relative to the center cell.
    pub start_row_offset: i64,
    /// Radius, in cells, of the disk forced open around the start.
    pub safe_radius: u32,
    /// Chebyshev radius around the center that may not hold the exit.
    pub exit_exclusion: u32,
    /// Generation attempts before a level request gives up.
    pub max_attempts: u32,
}

impl MazeConfig {
    /// World extent described by this section.
    #[must_use]
    pub const fn dimensions(&self) -> MazeDimensions {
        MazeDimensions::new(self.width, self.height, self.cell_size)
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 3500.0,
            height: 3500.0,
            cell_size: 100.0,
            start_column_offset: 1,
            start_row_offset: 1,
            safe_radius: 3,
            exit_exclusion: 10,
            max_attempts: 32,
        }
    }
}

/// Player body and movement parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Body radius used for ghost contact.
    pub size: f32,
    /// Margin used when testing the player against walls.
    pub collider_size: f32,
    /// Distance covered by one movement step.
    pub step: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 10.0,
            collider_size: 10.0,
            step: 2.0,
        }
    }
}

/// Flashlight cone parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashlightConfig {
    /// Cone width in radians.
    pub fov: f32,
    /// Upper bound of rays per fan.
    pub ray_count: u32,
    /// Lower bound the frame-rate adaptation may pick.
    pub min_ray_count: u32,
    /// Ray reach in world units.
    pub max_distance: f32,
    /// Cached rays kept before the cache is cleared.
    pub cache_limit: usize,
    /// Whether the ray count follows the measured frame rate.
    pub adaptive: bool,
    /// Whether the flashlight starts switched on.
    pub starts_on: bool,
}

impl Default for FlashlightConfig {
    fn default() -> Self {
        Self {
            fov: FRAC_PI_4,
            ray_count: 60,
            min_ray_count: 30,
            max_distance: 800.0,
            cache_limit: 1000,
            adaptive: true,
            starts_on: true,
        }
    }
}

/// Ghost population parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    /// Ghosts the backfill keeps alive.
    pub population_cap: usize,
    /// Half-width, in cells, of the spawn-free box around the player.
    pub spawn_exclusion_cells: f32,
    /// Milliseconds a ghost-inflicted debuff lasts.
    pub debuff_millis: u64,
    /// Milliseconds a charger recovers after a ram or a miss.
    pub charger_cooldown_millis: u64,
    /// Shortest teleport interval in milliseconds.
    pub teleport_min_millis: u64,
    /// Longest teleport interval in milliseconds.
    pub teleport_max_millis: u64,
}

impl GhostConfig {
    pub(crate) fn engine_config(&self) -> ghost_maze_system_ghosts::Config {
        ghost_maze_system_ghosts::Config::new(self.population_cap)
            .with_spawn_exclusion_cells(self.spawn_exclusion_cells)
            .with_debuff_duration(Duration::from_millis(self.debuff_millis))
            .with_charger_cooldown(Duration::from_millis(self.charger_cooldown_millis))
            .with_teleport_interval(
                Duration::from_millis(self.teleport_min_millis)
                    ..Duration::from_millis(self.teleport_max_millis),
            )
    }
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            population_cap: 200,
            spawn_exclusion_cells: 3.0,
            debuff_millis: 3000,
            charger_cooldown_millis: 3000,
            teleport_min_millis: 2000,
            teleport_max_millis: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            seed = 7

            [ghosts]
            population_cap = 12

            [maze]
            width = 2100.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.ghosts.population_cap, 12);
        assert_eq!(config.ghosts.debuff_millis, 3000);
        assert_eq!(config.maze.width, 2100.0);
        assert_eq!(config.maze.height, 3500.0);
        assert_eq!(config.flashlight, FlashlightConfig::default());
    }

    #[test]
    fn default_dimensions_form_a_35_cell_square() {
        let dimensions = MazeConfig::default().dimensions();
        assert_eq!(dimensions.columns(), 35);
        assert_eq!(dimensions.rows(), 35);
    }
}
