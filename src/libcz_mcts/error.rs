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
use std::io;

use cz_nn::EvaluatorError;

/// Errors raised by the search engine and the self-play driver.
#[derive(Debug)]
pub enum Error {
    /// A search was started for a board with no legal positions left.
    /// The caller should have detected the terminal position first.
    BoardFull,

    /// An error bubbled up from the game kernel. An `IllegalMove` during
    /// simulation means the engine generated a bad candidate and the
    /// search is aborted.
    Game(cz_game::Error),

    /// The evaluator failed. The tree keeps the backups of all earlier
    /// simulations.
    Evaluator(EvaluatorError),

    /// The driver failed to write training data.
    Io(io::Error)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BoardFull => write!(f, "board is full already"),
            Error::Game(err) => write!(f, "{}", err),
            Error::Evaluator(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err)
        }
    }
}

impl error::Error for Error {}

impl From<cz_game::Error> for Error {
    fn from(err: cz_game::Error) -> Self {
        Error::Game(err)
    }
}

impl From<EvaluatorError> for Error {
    fn from(err: EvaluatorError) -> Self {
        Error::Evaluator(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
