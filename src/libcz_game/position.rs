// Copyright 2024 the connect-zero authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

use regex::Regex;

use crate::color::Color;
use crate::error::Error;

lazy_static! {
    /// The textual form of a move, e.g. `b(1,2)`, `w@( 1, 2)`.
    static ref MOVE_RE: Regex = Regex::new(r"^([bw])@?\(\s*(\d+),\s*(\d+)\)$").unwrap();
}

/// A cell on the board, where `x` is the row (counting from the top) and
/// `y` is the column.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Position {
    pub x: usize,
    pub y: usize
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A position together with the color of the stone dropped there.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Move {
    pub position: Position,
    pub color: Color
}

impl Move {
    pub fn new(position: Position, color: Color) -> Self {
        Self { position, color }
    }

    /// Parse the textual form of a move, the exact inverse of `Display`.
    /// An optional `@` is accepted after the color letter, and whitespace
    /// is allowed inside of the parenthesis.
    ///
    /// # Arguments
    ///
    /// * `s` -
    ///
    pub fn parse(s: &str) -> Result<Move, Error> {
        let caps = MOVE_RE.captures(s)
            .ok_or_else(|| Error::InvalidMoveString(s.to_string()))?;

        let color = match &caps[1] {
            "b" => Color::Black,
            "w" => Color::White,
            _ => unreachable!()
        };
        let x = caps[2].parse::<usize>()
            .map_err(|_| Error::InvalidMoveString(s.to_string()))?;
        let y = caps[3].parse::<usize>()
            .map_err(|_| Error::InvalidMoveString(s.to_string()))?;

        Ok(Move::new(Position::new(x, y), color))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.color, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain() {
        let mv = Move::parse("b(1,2)").unwrap();

        assert_eq!(mv, Move::new(Position::new(1, 2), Color::Black));
    }

    #[test]
    fn parse_with_at_and_whitespace() {
        assert_eq!(
            Move::parse("w@(  1, 2)").unwrap(),
            Move::new(Position::new(1, 2), Color::White)
        );
        assert_eq!(
            Move::parse("b(  5,3)").unwrap(),
            Move::new(Position::new(5, 3), Color::Black)
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for s in ["", "b", "n(1,2)", "b(1 2)", "b(1,2) ", " b(1,2)", "b(-1,2)"] {
            assert_eq!(Move::parse(s), Err(Error::InvalidMoveString(s.to_string())));
        }
    }

    #[test]
    fn round_trip() {
        for s in ["b(0,0)", "w(5,6)", "b(9,9)"] {
            let mv = Move::parse(s).unwrap();

            assert_eq!(format!("{}", mv), s);
            assert_eq!(Move::parse(&format!("{}", mv)).unwrap(), mv);
        }
    }
}
