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

use std::error;
use std::fmt;

use crate::position::Move;

/// Errors raised by the game kernel.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The move violates gravity, targets an occupied cell, or falls
    /// outside of the board.
    IllegalMove(Move),

    /// The given string is not a valid textual move.
    InvalidMoveString(String),

    /// The given string is not a valid snapshot.
    InvalidStateString(String),

    /// The given string is not a valid training record.
    InvalidRecordString(String)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IllegalMove(mv) => write!(f, "illegal move: {}", mv),
            Error::InvalidMoveString(s) => write!(f, "invalid move string: {:?}", s),
            Error::InvalidStateString(s) => write!(f, "invalid state string: {:?}", s),
            Error::InvalidRecordString(s) => write!(f, "invalid record string: {:?}", s)
        }
    }
}

impl error::Error for Error {}
