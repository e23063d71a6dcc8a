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

/// The color of a player, and of the stones it drops.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Color {
    Black,
    White
}

impl Color {
    /// Returns the color of the opposing player.
    pub fn reverse(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Color::Black => write!(f, "b"),
            Color::White => write!(f, "w")
        }
    }
}

/// The outcome of a finished game. A full board with no four-in-a-row
/// is a tie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    Won(Color),
    Tie
}

impl Winner {
    /// Returns the winning color, or `None` for a tie.
    pub fn color(self) -> Option<Color> {
        match self {
            Winner::Won(color) => Some(color),
            Winner::Tie => None
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Winner::Won(color) => write!(f, "{}", color),
            Winner::Tie => write!(f, "tie")
        }
    }
}
