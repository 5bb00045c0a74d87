//! A falling-block puzzle engine.
//!
//! A [Session] owns a [Playfield] of locked cells and a [Controller] for the
//! one falling piece. Hosts feed it commands and gravity ticks, one at a time,
//! and draw whatever [Session::display_grid] says afterwards.
//!
//! ```
//! use stacker::{Kind, Sequence, Session, Status};
//!
//! let mut session: Session<10, 20, _> = Session::new(Sequence::new([Kind::O]).unwrap());
//! assert_eq!(session.start(), Status::Applied);
//! assert_eq!(session.move_left(), Status::Applied);
//! assert_eq!(session.hard_drop(), Status::Locked { rows_cleared: 0 });
//! assert_eq!(session.score(), 0);
//! ```

mod controller;
mod playfield;
mod rotate;
mod session;
mod shape;

pub use controller::{spawn_position, ActivePiece, Controller, Direction, MoveOutcome, Spawn};
pub use playfield::{
    cells_at, Cell, PlacementError, Playfield, Position, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use rotate::rotate_clockwise;
pub use session::{
    level_for, tick_interval_for, Phase, Session, Status, BASE_TICK_MS, LINES_PER_LEVEL,
    MIN_TICK_MS, POINTS_PER_LINE, TICK_STEP_MS,
};
pub use shape::{
    definition_for, from_fn, random_kind, Color, Definition, EmptySequence, FromFn, Kind,
    KindSource, RandomKinds, Sequence, Shape,
};

/// Build a [Playfield] from a picture: `.` is empty, a kind letter is a cell
/// locked in that kind's colour.
///
/// ```
/// use stacker::{grid, Cell, Color, Playfield};
///
/// let field: Playfield<3, 2> = grid![
///     [. . .],
///     [I . O],
/// ];
/// assert_eq!(field.get(1, 2), Some(Cell::Filled(Color::Yellow)));
/// ```
#[macro_export]
macro_rules! grid {
    ($([$($cell:tt)* $(,)?]),* $(,)?) => {
        $crate::Playfield::from_rows(
            [ // begin grid
                $([ // begin row
                    $(
                        $crate::grid!(@cell $cell),
                    )*
                ]),* // end row
            ] // end grid
        )
    };
    (@cell .) => {
        $crate::Cell::Empty
    };
    (@cell $kind:ident) => {
        $crate::Cell::Filled($crate::Kind::$kind.color())
    };
}
