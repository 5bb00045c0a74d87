use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use static_assertions::const_assert_eq;
use strum::{Display, EnumCount, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, EnumString, Deserialize,
)]
pub enum Kind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

const_assert_eq!(Kind::ALL.len(), Kind::COUNT);

/// Display tag carried by a piece and copied into every cell it locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
}

// choice: templates as 0/1 literals so they read like the pictures they are
const I: &[&[u8]] = &[&[1, 1, 1, 1]];
const O: &[&[u8]] = &[&[1, 1], &[1, 1]];
const T: &[&[u8]] = &[&[0, 1, 0], &[1, 1, 1]];
const S: &[&[u8]] = &[&[0, 1, 1], &[1, 1, 0]];
const Z: &[&[u8]] = &[&[1, 1, 0], &[0, 1, 1]];
const J: &[&[u8]] = &[&[1, 0, 0], &[1, 1, 1]];
const L: &[&[u8]] = &[&[0, 0, 1], &[1, 1, 1]];

impl Kind {
    pub const ALL: [Self; 7] = [
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
    ];

    /// The canonical spawn orientation, row-major, top row first.
    pub fn template(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => I,
            Self::O => O,
            Self::T => T,
            Self::S => S,
            Self::Z => Z,
            Self::J => J,
            Self::L => L,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::I => Color::Cyan,
            Self::O => Color::Yellow,
            Self::T => Color::Purple,
            Self::S => Color::Green,
            Self::Z => Color::Red,
            Self::J => Color::Blue,
            Self::L => Color::Orange,
        }
    }

    pub fn definition(self) -> Definition {
        Definition {
            shape: Shape::from_template(self.template()),
            color: self.color(),
        }
    }
}

/// A rectangular occupancy matrix.
///
/// Every `Shape` owns its cells, so transforming one never reaches back into
/// the canonical templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    /// # Panics
    /// - If the rows are ragged
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        if let Some(first) = rows.first() {
            assert!(
                rows.iter().all(|row| row.len() == first.len()),
                "shape rows must all be the same length"
            );
        }
        Self { rows }
    }

    pub fn from_template(template: &[&[u8]]) -> Self {
        Self::from_rows(
            template
                .iter()
                .map(|row| row.iter().map(|&cell| cell != 0).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// `(row, col)` of every occupied cell, relative to the top-left corner.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row_n, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, occupied)| **occupied)
                .map(move |(col_n, _)| (row_n, col_n))
        })
    }

    pub fn rotated_clockwise(&self) -> Self {
        crate::rotate::rotate_clockwise(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub shape: Shape,
    pub color: Color,
}

pub fn definition_for(kind: Kind) -> Definition {
    kind.definition()
}

/// Uniform draw over the seven kinds.
pub fn random_kind<R: Rng + ?Sized>(rng: &mut R) -> Kind {
    Kind::ALL[rng.gen_range(0..Kind::COUNT)]
}

/// Where a session gets its pieces from.
pub trait KindSource {
    fn next_kind(&mut self) -> Kind;
}

impl<S: KindSource + ?Sized> KindSource for Box<S> {
    fn next_kind(&mut self) -> Kind {
        (**self).next_kind()
    }
}

impl<S: KindSource + ?Sized> KindSource for &mut S {
    fn next_kind(&mut self) -> Kind {
        (**self).next_kind()
    }
}

#[derive(Debug, Clone)]
pub struct RandomKinds<R = StdRng> {
    rng: R,
}

impl<R: Rng> RandomKinds<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomKinds<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl Default for RandomKinds<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> KindSource for RandomKinds<R> {
    fn next_kind(&mut self) -> Kind {
        random_kind(&mut self.rng)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
#[error("a piece sequence needs at least one kind")]
pub struct EmptySequence;

/// Cycles through a fixed list of kinds, forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    kinds: Vec<Kind>,
    cursor: usize,
}

impl Sequence {
    pub fn new(kinds: impl IntoIterator<Item = Kind>) -> Result<Self, EmptySequence> {
        let kinds = kinds.into_iter().collect::<Vec<_>>();
        if kinds.is_empty() {
            return Err(EmptySequence);
        }
        Ok(Self { kinds, cursor: 0 })
    }
}

impl KindSource for Sequence {
    fn next_kind(&mut self) -> Kind {
        let kind = self.kinds[self.cursor];
        self.cursor = (self.cursor + 1) % self.kinds.len();
        kind
    }
}

/// Adapts a closure into a [KindSource].
pub fn from_fn<F: FnMut() -> Kind>(f: F) -> FromFn<F> {
    FromFn(f)
}

#[derive(Debug, Clone)]
pub struct FromFn<F>(F);

impl<F: FnMut() -> Kind> KindSource for FromFn<F> {
    fn next_kind(&mut self) -> Kind {
        (self.0)()
    }
}
