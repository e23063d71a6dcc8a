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

use std::io::{self, BufRead, Write};

use cz_game::{Board, Color, Position};

use crate::error::Error;
use crate::policy::Policy;

/// Asks a human on stdin which column to drop into. Invalid input is
/// retried at the prompt and never reaches the engine.
pub struct HumanPolicy {
    name: String
}

impl HumanPolicy {
    pub fn new(color: Color) -> Self {
        Self { name: format!("human_{}", color) }
    }

    /// Reads one line from stdin, or `None` when stdin is gone.
    fn read_line(&self) -> Option<String> {
        print!("Column : ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line)
        }
    }
}

impl Policy for HumanPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_position(&mut self, board: &Board) -> Result<Position, Error> {
        loop {
            let line = match self.read_line() {
                Some(line) => line,
                None => {
                    // stdin is gone, there is nothing to retry
                    eprintln!("Aborted.");
                    ::std::process::exit(1);
                }
            };

            match line.trim().parse::<usize>() {
                Err(_) => println!("Unexpected error due to invalid input. Try again."),
                Ok(column) => {
                    match board.next_available_row(column) {
                        Some(row) => return Ok(Position::new(row, column)),
                        None => println!("This column is full. Try again.")
                    }
                }
            }
        }
    }
}
