//! Headless rendering backend that counts frames and can log them as text.

use std::io::Write;

use ghost_maze_rendering::{RenderingBackend, RenderingError, Scene};

/// Totals gathered over every presented frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameTotals {
    pub(crate) frames: u64,
    pub(crate) flashed: u64,
    pub(crate) peak_ghosts: usize,
}

/// Presents scenes without a window.
///
/// When a log is attached, every frame becomes one line describing what
/// would have been drawn.
#[derive(Debug)]
pub(crate) struct FrameRecorder<W> {
    log: Option<W>,
    totals: FrameTotals,
}

impl<W: Write> FrameRecorder<W> {
    pub(crate) fn new(log: Option<W>) -> Self {
        Self {
            log,
            totals: FrameTotals::default(),
        }
    }

    pub(crate) const fn totals(&self) -> FrameTotals {
        self.totals
    }
}

impl<W: Write> RenderingBackend for FrameRecorder<W> {
    fn present(&mut self, scene: &Scene) -> Result<(), RenderingError> {
        let frame = self.totals.frames;
        self.totals.frames += 1;
        if scene.hit_flash.is_some() {
            self.totals.flashed += 1;
        }
        self.totals.peak_ghosts = self.totals.peak_ghosts.max(scene.ghosts.len());

        let Some(log) = self.log.as_mut() else {
            return Ok(());
        };
        let flash = scene.hit_flash.map_or(0.0, |tint| tint.alpha);
        writeln!(
            log,
            "{frame} {:?} player {:.1},{:.1} ghosts {} warnings {} lit {} flash {flash:.2}",
            scene.play_mode,
            scene.player.position.x,
            scene.player.position.y,
            scene.ghosts.len(),
            scene.warnings.len(),
            !scene.visibility_polygon.is_empty(),
        )
        .map_err(|source| RenderingError::Output { frame, source })
    }

    fn finish(&mut self) -> Result<(), RenderingError> {
        let frame = self.totals.frames;
        match self.log.as_mut() {
            Some(log) => log
                .flush()
                .map_err(|source| RenderingError::Output { frame, source }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use ghost_maze_core::{CellCoord, GhostView, Maze, MazeDimensions, PlayMode, Player};
    use ghost_maze_rendering::{Color, SceneSources};
    use glam::Vec2;

    use super::*;

    fn scene(hit_flash: Option<Color>) -> Scene {
        let maze = Maze::from_occupancy(
            MazeDimensions::new(300.0, 300.0, 100.0),
            vec![false, false, false, false, true, false, false, false, false],
            CellCoord::new(1, 1),
            CellCoord::new(1, 1),
            vec![CellCoord::new(1, 1)],
        );
        let player = Player::new(Vec2::new(3.0, -4.0), 10.0, 10.0);
        Scene::compose(SceneSources {
            maze: &maze,
            player: &player,
            flashlight_on: false,
            visibility_polygon: &[],
            ghosts: &GhostView::from_snapshots(Vec::new()),
            warnings: &[],
            hit_flash,
            play_mode: PlayMode::Exploring,
        })
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn counts_flashed_frames() {
        let mut recorder = FrameRecorder::<Vec<u8>>::new(None);
        let tint = Some(Color::new(1.0, 0.0, 0.0, 0.5));
        for hit_flash in [None, tint, tint, None] {
            recorder.present(&scene(hit_flash)).expect("present");
        }
        assert_eq!(
            recorder.totals(),
            FrameTotals {
                frames: 4,
                flashed: 2,
                peak_ghosts: 0,
            }
        );
    }

    #[test]
    fn logs_one_line_per_frame() {
        let mut recorder = FrameRecorder::new(Some(Vec::new()));
        recorder.present(&scene(None)).expect("present");
        recorder
            .present(&scene(Some(Color::new(0.0, 1.0, 0.0, 0.25))))
            .expect("present");
        recorder.finish().expect("flush");

        let log = String::from_utf8(recorder.log.take().expect("log attached")).expect("utf-8");
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0 Exploring player 3.0,-4.0 ghosts 0 warnings 0 lit false flash 0.00"
        );
        assert!(lines[1].ends_with("flash 0.25"));
    }

    #[test]
    fn write_failure_names_the_frame() {
        let mut recorder = FrameRecorder::new(Some(Closed));
        let error = recorder.present(&scene(None)).expect_err("closed log");
        assert!(matches!(error, RenderingError::Output { frame: 0, .. }));
    }
}
