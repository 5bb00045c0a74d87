use crate::{Color, Kind, Playfield, Position, Shape};

/// The piece under the player's control. It is not part of the playfield
/// until it locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: Kind,
    pub shape: Shape,
    pub color: Color,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    pub fn offset(self) -> Position {
        match self {
            Self::Left => Position::new(-1, 0),
            Self::Right => Position::new(1, 0),
            Self::Down => Position::new(0, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Nothing changed: the move was rejected, or there's no piece to move.
    Blocked,
    /// A downward move was rejected, so the piece was written into the
    /// playfield where it stood and full rows were cleared.
    Locked { rows_cleared: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawn {
    Spawned,
    /// The spawn placement overlaps locked cells.
    ToppedOut,
}

/// Owns at most one falling piece and moves it against a [Playfield].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controller {
    active: Option<ActivePiece>,
}

pub fn spawn_position<const WIDTH: usize>() -> Position {
    Position::new(WIDTH as i32 / 2 - 1, 0)
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn spawn<const WIDTH: usize, const HEIGHT: usize>(
        &mut self,
        kind: Kind,
        field: &Playfield<WIDTH, HEIGHT>,
    ) -> Spawn {
        debug_assert!(self.active.is_none(), "spawned over a falling piece");
        let definition = kind.definition();
        let position = spawn_position::<WIDTH>();
        if let Err(e) = field.check_placement(&definition.shape, position) {
            log::debug!("couldn't spawn {kind}: {e}");
            return Spawn::ToppedOut;
        }
        log::debug!("spawned {kind} at {position:?}");
        self.active = Some(ActivePiece {
            kind,
            shape: definition.shape,
            color: definition.color,
            position,
        });
        Spawn::Spawned
    }

    pub fn try_move<const WIDTH: usize, const HEIGHT: usize>(
        &mut self,
        direction: Direction,
        field: &mut Playfield<WIDTH, HEIGHT>,
    ) -> MoveOutcome {
        let Some(piece) = self.active.as_mut() else {
            return MoveOutcome::Blocked;
        };
        let candidate = piece.position + direction.offset();
        if field.is_valid_placement(&piece.shape, candidate) {
            piece.position = candidate;
            return MoveOutcome::Moved;
        }
        match direction {
            Direction::Left | Direction::Right => MoveOutcome::Blocked,
            Direction::Down => self.lock(field),
        }
    }

    fn lock<const WIDTH: usize, const HEIGHT: usize>(
        &mut self,
        field: &mut Playfield<WIDTH, HEIGHT>,
    ) -> MoveOutcome {
        let Some(piece) = self.active.take() else {
            return MoveOutcome::Blocked;
        };
        field.commit(&piece.shape, piece.position, piece.color);
        let rows_cleared = field.clear_full_rows();
        log::debug!(
            "locked {} at {:?}, cleared {rows_cleared} rows",
            piece.kind,
            piece.position
        );
        MoveOutcome::Locked { rows_cleared }
    }

    /// Rotates clockwise in place. No kicks: if the turned shape doesn't fit
    /// where the piece stands, nothing changes.
    pub fn try_rotate<const WIDTH: usize, const HEIGHT: usize>(
        &mut self,
        field: &Playfield<WIDTH, HEIGHT>,
    ) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let rotated = piece.shape.rotated_clockwise();
        if !field.is_valid_placement(&rotated, piece.position) {
            return false;
        }
        piece.shape = rotated;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid, Cell};

    fn spawned<const WIDTH: usize, const HEIGHT: usize>(
        kind: Kind,
        field: &Playfield<WIDTH, HEIGHT>,
    ) -> Controller {
        let mut controller = Controller::new();
        assert_eq!(controller.spawn(kind, field), Spawn::Spawned);
        controller
    }

    fn position(controller: &Controller) -> Option<Position> {
        controller.active().map(|piece| piece.position)
    }

    #[test]
    fn spawn_is_centered() {
        let field = Playfield::<10, 20>::new();
        let controller = spawned(Kind::O, &field);
        let piece = controller.active().cloned();
        assert_eq!(
            piece,
            Some(ActivePiece {
                kind: Kind::O,
                shape: Kind::O.definition().shape,
                color: Color::Yellow,
                position: Position::new(4, 0),
            })
        );
    }

    #[test]
    fn spawn_onto_full_top_rows() {
        let field: Playfield<4, 3> = grid![
            [Z Z Z Z],
            [Z Z Z Z],
            [. . . .],
        ];
        let mut controller = Controller::new();
        assert_eq!(controller.spawn(Kind::T, &field), Spawn::ToppedOut);
        assert_eq!(controller.active(), None);
    }

    #[test]
    fn sideways_moves_stop_at_walls() {
        let mut field = Playfield::<4, 4>::new();
        let mut controller = spawned(Kind::O, &field);
        assert_eq!(position(&controller), Some(Position::new(1, 0)));
        assert_eq!(controller.try_move(Direction::Left, &mut field), MoveOutcome::Moved);
        assert_eq!(controller.try_move(Direction::Left, &mut field), MoveOutcome::Blocked);
        assert_eq!(position(&controller), Some(Position::new(0, 0)));
        assert_eq!(controller.try_move(Direction::Right, &mut field), MoveOutcome::Moved);
        assert_eq!(controller.try_move(Direction::Right, &mut field), MoveOutcome::Moved);
        assert_eq!(controller.try_move(Direction::Right, &mut field), MoveOutcome::Blocked);
        assert_eq!(position(&controller), Some(Position::new(2, 0)));
        assert_eq!(field, Playfield::new());
    }

    #[test]
    fn lands_and_locks_at_last_valid_position() {
        let mut field: Playfield<4, 4> = grid![
            [. . . .],
            [. . . .],
            [. . . .],
            [. . . .],
        ];
        let mut controller = spawned(Kind::O, &field);
        assert_eq!(controller.try_move(Direction::Down, &mut field), MoveOutcome::Moved);
        assert_eq!(controller.try_move(Direction::Down, &mut field), MoveOutcome::Moved);
        assert_eq!(
            controller.try_move(Direction::Down, &mut field),
            MoveOutcome::Locked { rows_cleared: 0 }
        );
        assert_eq!(controller.active(), None);
        assert_eq!(
            field,
            grid![
                [. . . .],
                [. . . .],
                [. O O .],
                [. O O .],
            ]
        );
    }

    #[test]
    fn lock_clears_rows() {
        let mut field: Playfield<4, 3> = grid![
            [. . . .],
            [T . . T],
            [T . . T],
        ];
        let mut controller = spawned(Kind::O, &field);
        assert_eq!(controller.try_move(Direction::Down, &mut field), MoveOutcome::Moved);
        assert_eq!(
            controller.try_move(Direction::Down, &mut field),
            MoveOutcome::Locked { rows_cleared: 2 }
        );
        assert_eq!(field, Playfield::new());
    }

    #[test]
    fn flat_i_completes_the_bottom_row() {
        let mut field: Playfield<10, 20> = Playfield::new();
        let rows = {
            let mut rows = *field.rows();
            rows[18][3] = Cell::Filled(Color::Red);
            rows[19] = [Cell::Filled(Color::Blue); 10];
            for cell in &mut rows[19][6..] {
                *cell = Cell::Empty;
            }
            rows
        };
        field = Playfield::from_rows(rows);
        let mut controller = spawned(Kind::I, &field);
        for _ in 0..2 {
            assert_eq!(controller.try_move(Direction::Right, &mut field), MoveOutcome::Moved);
        }
        assert_eq!(controller.try_move(Direction::Right, &mut field), MoveOutcome::Blocked);
        let outcome = loop {
            match controller.try_move(Direction::Down, &mut field) {
                MoveOutcome::Moved => continue,
                other => break other,
            }
        };
        assert_eq!(outcome, MoveOutcome::Locked { rows_cleared: 1 });
        assert_eq!(field.get(19, 3), Some(Cell::Filled(Color::Red)));
        assert!((0..10).filter(|&col| col != 3).all(|col| field.get(19, col) == Some(Cell::Empty)));
        assert!((0..19).all(|row| !field.is_row_full(row)));
        assert_eq!(field.rows()[..19], Playfield::<10, 20>::new().rows()[..19]);
    }

    #[test]
    fn rotation_keeps_position() {
        let field = Playfield::<10, 20>::new();
        let mut controller = spawned(Kind::T, &field);
        let before = controller.active().cloned();
        assert!(controller.try_rotate(&field));
        let once = controller.active().cloned();
        assert_ne!(once, before);
        assert_eq!(once.map(|piece| piece.position), Some(Position::new(4, 0)));
        for _ in 0..3 {
            assert!(controller.try_rotate(&field));
        }
        assert_eq!(controller.active().cloned(), before);
    }

    #[test]
    fn rotation_without_kicks() {
        // the I stands up against the floor: four tall doesn't fit in three rows
        let field = Playfield::<6, 3>::new();
        let mut controller = spawned(Kind::I, &field);
        let before = controller.active().cloned();
        assert!(!controller.try_rotate(&field));
        assert_eq!(controller.active().cloned(), before);
    }

    #[test]
    fn nothing_to_move() {
        let mut field = Playfield::<4, 4>::new();
        let mut controller = Controller::new();
        assert_eq!(controller.try_move(Direction::Down, &mut field), MoveOutcome::Blocked);
        assert!(!controller.try_rotate(&field));
    }
}
