#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session statistics sink.
//!
//! Tallies kills and hits per ghost kind, acquired debuffs per kind and
//! level clears by observing world events. The tallies live in memory only;
//! persisting them is left to whoever owns the session.

use std::time::Duration;

use ghost_maze_core::{DebuffKind, Event, GhostKind};
use serde::{
    ser::{SerializeMap, SerializeStruct},
    Serialize, Serializer,
};

/// Pure system that folds world events into [`SessionStats`].
#[derive(Debug, Default)]
pub struct Analytics {
    stats: SessionStats,
}

impl Analytics {
    /// Creates a sink with zeroed tallies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Consumes world events and updates the tallies.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.stats.time_played = self.stats.time_played.saturating_add(*dt);
                }
                Event::LevelGenerated { .. } => {
                    self.stats.levels = self.stats.levels.saturating_add(1);
                }
                Event::GhostKilled { kind, .. } => bump(&mut self.stats.kills, kind.index()),
                Event::PlayerHit { kind, .. } => bump(&mut self.stats.hits, kind.index()),
                Event::DebuffApplied { kind, .. } => {
                    bump(&mut self.stats.debuffs, debuff_index(*kind));
                }
                Event::ExitReached { .. } => {
                    self.stats.clears = self.stats.clears.saturating_add(1);
                }
                _ => {}
            }
        }
    }

    /// Zeroes every tally.
    pub fn reset(&mut self) {
        self.stats = SessionStats::default();
    }
}

/// Running tallies for one session.
///
/// Serializes with per-kind tallies keyed by kind tag and the time played in
/// whole milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    kills: [u32; GhostKind::ALL.len()],
    hits: [u32; GhostKind::ALL.len()],
    debuffs: [u32; DebuffKind::ALL.len()],
    clears: u32,
    levels: u32,
    time_played: Duration,
}

impl SessionStats {
    /// Ghosts of `kind` killed by the flashlight.
    #[must_use]
    pub fn kills(&self, kind: GhostKind) -> u32 {
        self.kills.get(kind.index()).copied().unwrap_or(0)
    }

    /// Times a ghost of `kind` touched the player.
    #[must_use]
    pub fn hits(&self, kind: GhostKind) -> u32 {
        self.hits.get(kind.index()).copied().unwrap_or(0)
    }

    /// Times the player acquired a debuff of `kind`.
    #[must_use]
    pub fn debuffs(&self, kind: DebuffKind) -> u32 {
        self.debuffs.get(debuff_index(kind)).copied().unwrap_or(0)
    }

    /// Ghosts killed across every kind.
    #[must_use]
    pub fn total_kills(&self) -> u32 {
        self.kills.iter().sum()
    }

    /// Hits taken across every kind.
    #[must_use]
    pub fn total_hits(&self) -> u32 {
        self.hits.iter().sum()
    }

    /// Levels whose exit was reached.
    #[must_use]
    pub const fn clears(&self) -> u32 {
        self.clears
    }

    /// Levels generated.
    #[must_use]
    pub const fn levels(&self) -> u32 {
        self.levels
    }

    /// Simulated time that elapsed while exploring.
    #[must_use]
    pub const fn time_played(&self) -> Duration {
        self.time_played
    }
}

impl Serialize for SessionStats {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let time_played_ms = u64::try_from(self.time_played.as_millis()).unwrap_or(u64::MAX);
        let mut state = serializer.serialize_struct("SessionStats", 6)?;
        state.serialize_field("levels", &self.levels)?;
        state.serialize_field("clears", &self.clears)?;
        state.serialize_field("time_played_ms", &time_played_ms)?;
        state.serialize_field(
            "kills",
            &Tally::new(GhostKind::ALL.map(GhostKind::tag), &self.kills),
        )?;
        state.serialize_field(
            "hits",
            &Tally::new(GhostKind::ALL.map(GhostKind::tag), &self.hits),
        )?;
        state.serialize_field(
            "debuffs",
            &Tally::new(DebuffKind::ALL.map(DebuffKind::tag), &self.debuffs),
        )?;
        state.end()
    }
}

/// Counters keyed by kind tag.
struct Tally<'a, const N: usize> {
    tags: [&'static str; N],
    counts: &'a [u32; N],
}

impl<'a, const N: usize> Tally<'a, N> {
    const fn new(tags: [&'static str; N], counts: &'a [u32; N]) -> Self {
        Self { tags, counts }
    }
}

impl<const N: usize> Serialize for Tally<'_, N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(N))?;
        for (tag, count) in self.tags.iter().zip(self.counts) {
            map.serialize_entry(tag, count)?;
        }
        map.end()
    }
}

fn debuff_index(kind: DebuffKind) -> usize {
    DebuffKind::ALL
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or(0)
}

fn bump(counters: &mut [u32], index: usize) {
    if let Some(counter) = counters.get_mut(index) {
        *counter = counter.saturating_add(1);
    }
}
