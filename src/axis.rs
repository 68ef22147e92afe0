//! Axis order normalization.
//!
//! A CRS declares the direction of each of its three components with a
//! three-letter code drawn from `e w n s u d` (PROJ's `+axis`). The pipeline
//! works in `enu`; [`AxisOrder::normalize`] maps a native point to `enu` and
//! [`AxisOrder::denormalize`] maps it back. For every valid code the two are
//! exact inverses of each other.

use std::fmt;

use crate::error::ProjError;
use crate::point::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    East,
    West,
    North,
    South,
    Up,
    Down,
}

impl Direction {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'e' => Self::East,
            'w' => Self::West,
            'n' => Self::North,
            's' => Self::South,
            'u' => Self::Up,
            'd' => Self::Down,
            _ => return None,
        })
    }

    fn as_char(self) -> char {
        match self {
            Self::East => 'e',
            Self::West => 'w',
            Self::North => 'n',
            Self::South => 's',
            Self::Up => 'u',
            Self::Down => 'd',
        }
    }

    /// Slot of this direction in an `enu` point: 0 east, 1 north, 2 up.
    fn slot(self) -> usize {
        match self {
            Self::East | Self::West => 0,
            Self::North | Self::South => 1,
            Self::Up | Self::Down => 2,
        }
    }

    fn sign(self) -> f64 {
        match self {
            Self::West | Self::South | Self::Down => -1.0,
            _ => 1.0,
        }
    }
}

/// A validated three-letter axis code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisOrder([Direction; 3]);

impl Default for AxisOrder {
    fn default() -> Self {
        Self::ENU
    }
}

impl AxisOrder {
    pub const ENU: AxisOrder = AxisOrder([Direction::East, Direction::North, Direction::Up]);

    /// Parse an axis code such as `"enu"`, `"neu"` or `"une"`.
    ///
    /// The code must name exactly one east/west, one north/south and one
    /// up/down direction, in any order.
    pub fn parse(code: &str) -> Result<Self, ProjError> {
        let invalid = || ProjError::InvalidAxis(code.to_string());
        let lower = code.to_ascii_lowercase();
        let mut chars = lower.chars().map(Direction::from_char);
        let (Some(Some(first)), Some(Some(second)), Some(Some(third)), None) =
            (chars.next(), chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };

        let mut seen = [false; 3];
        for d in [first, second, third] {
            if std::mem::replace(&mut seen[d.slot()], true) {
                return Err(invalid());
            }
        }
        Ok(Self([first, second, third]))
    }

    pub fn is_enu(&self) -> bool {
        *self == Self::ENU
    }

    /// Native component order to east, north, up.
    pub fn normalize(&self, p: Point) -> Point {
        let native = [p.x, p.y, p.z];
        let mut enu = [0.0; 3];
        for (d, v) in self.0.iter().zip(native) {
            enu[d.slot()] = d.sign() * v;
        }
        Point::new_3d(enu[0], enu[1], enu[2])
    }

    /// East, north, up back to the native component order.
    pub fn denormalize(&self, p: Point) -> Point {
        let enu = [p.x, p.y, p.z];
        let [x, y, z] = self.0.map(|d| d.sign() * enu[d.slot()]);
        Point::new_3d(x, y, z)
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|d| write!(f, "{}", d.as_char()))
    }
}
