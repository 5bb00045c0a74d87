use std::time::Duration;

use array_macro::array;
use tap::Tap;

use crate::{
    cells_at, ActivePiece, Cell, Controller, Definition, Direction, Kind, KindSource, MoveOutcome,
    Playfield, RandomKinds, Spawn, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

pub const LINES_PER_LEVEL: u32 = 10;
pub const POINTS_PER_LINE: u64 = 100;
pub const BASE_TICK_MS: u64 = 1000;
pub const TICK_STEP_MS: u64 = 100;
pub const MIN_TICK_MS: u64 = 100;

pub fn level_for(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Gravity interval at `level`: a second at level 1, a tenth faster per
/// level, never under [MIN_TICK_MS].
pub fn tick_interval_for(level: u32) -> Duration {
    let faster_by = u64::from(level.saturating_sub(1)).saturating_mul(TICK_STEP_MS);
    Duration::from_millis(BASE_TICK_MS.saturating_sub(faster_by).max(MIN_TICK_MS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Constructed or reset, waiting for `start`.
    #[default]
    Idle,
    Playing,
    Paused,
    /// A piece couldn't spawn. Only `reset` leaves this phase.
    Over,
}

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not applicable right now, nothing changed.
    Ignored,
    Applied,
    /// The move or rotation was rejected, nothing changed.
    Blocked,
    /// The falling piece locked and the next one spawned.
    Locked { rows_cleared: usize },
    /// The next piece had no room. Terminal until `reset`.
    GameOver,
}

/// One game: a playfield, the falling piece, the lookahead, and the score.
///
/// Commands are processed one at a time, in the order they're called. If a
/// host shares a session between threads it should guard the whole session,
/// not its parts.
#[derive(Debug, Clone)]
pub struct Session<
    const WIDTH: usize = DEFAULT_WIDTH,
    const HEIGHT: usize = DEFAULT_HEIGHT,
    S = RandomKinds,
> {
    field: Playfield<WIDTH, HEIGHT>,
    controller: Controller,
    source: S,
    next: Option<Kind>,
    score: u64,
    lines: u32,
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RandomKinds::default())
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, S: KindSource> Session<WIDTH, HEIGHT, S> {
    pub fn new(source: S) -> Self {
        Self::with_playfield(Playfield::default(), source)
    }

    /// Starts on a field that already has locked cells.
    pub fn with_playfield(field: Playfield<WIDTH, HEIGHT>, source: S) -> Self {
        Self {
            field,
            controller: Controller::new(),
            source,
            next: None,
            score: 0,
            lines: 0,
            phase: Phase::Idle,
        }
    }

    pub fn playfield(&self) -> &Playfield<WIDTH, HEIGHT> {
        &self.field
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.controller.active()
    }

    pub fn next_kind(&self) -> Option<Kind> {
        self.next
    }

    pub fn next_definition(&self) -> Option<Definition> {
        self.next.map(Kind::definition)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        level_for(self.lines)
    }

    pub fn tick_interval(&self) -> Duration {
        tick_interval_for(self.level())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    /// The locked cells with the falling piece drawn over them.
    pub fn display_grid(&self) -> [[Cell; WIDTH]; HEIGHT] {
        array![row_n => array![col_n => self.display_cell(row_n, col_n); WIDTH]; HEIGHT]
    }

    fn display_cell(&self, row_n: usize, col_n: usize) -> Cell {
        let covering = self.controller.active().filter(|piece| {
            cells_at(&piece.shape, piece.position)
                .any(|(row, col)| (row, col) == (row_n as i32, col_n as i32))
        });
        match covering {
            Some(piece) => Cell::Filled(piece.color),
            None => self.field.rows()[row_n][col_n],
        }
    }

    pub fn start(&mut self) -> Status {
        match self.phase {
            Phase::Playing => Status::Ignored,
            Phase::Over => Status::GameOver,
            Phase::Idle | Phase::Paused => {
                if self.controller.active().is_none() && self.spawn() == Spawn::ToppedOut {
                    return self.game_over();
                }
                self.phase = Phase::Playing;
                Status::Applied
            }
        }
    }

    pub fn pause(&mut self) -> Status {
        if !self.is_playing() {
            return Status::Ignored;
        }
        self.phase = Phase::Paused;
        Status::Applied
    }

    pub fn resume(&mut self) -> Status {
        if !self.is_paused() {
            return Status::Ignored;
        }
        self.phase = Phase::Playing;
        Status::Applied
    }

    /// Back to the state right after construction. The kind source carries on
    /// where it was.
    pub fn reset(&mut self) -> Status {
        self.field.reset();
        self.controller.clear();
        self.next = None;
        self.score = 0;
        self.lines = 0;
        self.phase = Phase::Idle;
        Status::Applied
    }

    /// Gravity.
    pub fn tick(&mut self) -> Status {
        self.step(Direction::Down)
    }

    /// Soft drop: one row down, locking if the piece has landed.
    pub fn move_down(&mut self) -> Status {
        self.step(Direction::Down)
    }

    pub fn move_left(&mut self) -> Status {
        self.step(Direction::Left)
    }

    pub fn move_right(&mut self) -> Status {
        self.step(Direction::Right)
    }

    pub fn rotate(&mut self) -> Status {
        if !self.is_playing() {
            return Status::Ignored;
        }
        if self.controller.try_rotate(&self.field) {
            Status::Applied
        } else {
            Status::Blocked
        }
    }

    /// Drops the piece as far as it goes and locks it. Scores like any other
    /// lock.
    pub fn hard_drop(&mut self) -> Status {
        if !self.is_playing() {
            return Status::Ignored;
        }
        loop {
            match self.controller.try_move(Direction::Down, &mut self.field) {
                MoveOutcome::Moved => continue,
                MoveOutcome::Blocked => return Status::Ignored,
                MoveOutcome::Locked { rows_cleared } => return self.locked(rows_cleared),
            }
        }
    }

    fn step(&mut self, direction: Direction) -> Status {
        if !self.is_playing() {
            return Status::Ignored;
        }
        match self.controller.try_move(direction, &mut self.field) {
            MoveOutcome::Moved => Status::Applied,
            MoveOutcome::Blocked if self.controller.active().is_none() => Status::Ignored,
            MoveOutcome::Blocked => Status::Blocked,
            MoveOutcome::Locked { rows_cleared } => self.locked(rows_cleared),
        }
    }

    fn locked(&mut self, rows_cleared: usize) -> Status {
        // score at the level the clear happened on
        let level = self.level();
        self.score += rows_cleared as u64 * POINTS_PER_LINE * u64::from(level);
        self.lines += rows_cleared as u32;
        if self.level() != level {
            log::info!("reached level {} after {} lines", self.level(), self.lines);
        }
        match self.spawn() {
            Spawn::Spawned => Status::Locked { rows_cleared },
            Spawn::ToppedOut => self.game_over(),
        }
    }

    /// Spawns the queued kind (or a fresh one) and queues the next only if
    /// the spawn succeeded.
    fn spawn(&mut self) -> Spawn {
        let kind = match self.next {
            Some(kind) => kind,
            None => self.source.next_kind(),
        };
        let spawn = self.controller.spawn(kind, &self.field);
        if spawn == Spawn::Spawned {
            self.next = Some(self.source.next_kind());
        } else {
            self.next = Some(kind);
        }
        spawn
    }

    fn game_over(&mut self) -> Status {
        self.phase = Phase::Over;
        Status::GameOver.tap(|_| {
            log::info!(
                "game over: score {}, level {}, lines {}",
                self.score,
                self.level(),
                self.lines
            )
        })
    }
}
