//! Scripted stand-in for a human player, used by headless runs.

use std::f32::consts::TAU;

use ghost_maze_rendering::FrameInput;
use ghost_maze_world::{query, World};
use glam::Vec2;

const SWEEP_PER_FRAME: f32 = 0.04;
const DARK_EVERY: u32 = 240;
const DARK_FRAMES: u32 = 45;
const ARRIVAL_RADIUS: f32 = 4.0;

/// Walks the exit path while sweeping the flashlight back and forth.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    waypoint: usize,
    frame: u32,
}

impl Autopilot {
    /// Forgets progress along the previous level's exit path.
    pub(crate) fn restart(&mut self) {
        self.waypoint = 0;
    }

    /// Produces the input for the next frame.
    pub(crate) fn next_input(&mut self, world: &World) -> FrameInput {
        self.frame = self.frame.wrapping_add(1);
        let maze = query::maze(world);
        let position = query::player(world).position();

        let mut target = None;
        while let Some(cell) = maze.exit_path().get(self.waypoint) {
            let center = maze.dimensions().cell_center(*cell);
            if center.distance(position) > ARRIVAL_RADIUS {
                target = Some(center);
                break;
            }
            self.waypoint += 1;
        }
        let movement = target.map_or(Vec2::ZERO, |center| center - position);

        let heading = movement.y.atan2(movement.x);
        let sweep = (self.frame as f32 * SWEEP_PER_FRAME) % TAU;
        let phase = self.frame % DARK_EVERY;

        FrameInput {
            movement,
            facing: Some(heading + sweep.sin() * 0.6),
            toggle_flashlight: phase == 0 || phase == DARK_FRAMES,
            toggle_debug: false,
            toggle_pause: false,
        }
    }
}
