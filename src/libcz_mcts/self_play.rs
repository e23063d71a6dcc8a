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

use std::io::Write;

use cz_game::{Color, GameConfig, Move, TrainingRecord, Winner};

use crate::dup_detector::DupDetector;
use crate::error::Error;
use crate::policy::Policy;

/// The tally of a batch of played games.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayHistory {
    pub num_black_wins: usize,
    pub num_white_wins: usize,
    pub num_ties: usize
}

/// Collects the moves of self-play games and turns every finished game
/// into training records, one per move, labeled with the final outcome
/// in the mover's frame.
///
/// Assumes black and white play in turns, which the game loop
/// guarantees.
pub struct ExperienceBuffer<'a> {
    config: GameConfig,
    writer: Option<&'a mut dyn Write>,
    current_epoch_moves: Vec<Move>,
    records: Vec<TrainingRecord>,

    num_epochs: usize,
    num_records_reported: usize,
    num_black_wins: usize,
    num_white_wins: usize,
    num_ties: usize
}

impl<'a> ExperienceBuffer<'a> {
    pub fn new(config: GameConfig, writer: Option<&'a mut dyn Write>) -> Self {
        Self {
            config,
            writer,
            current_epoch_moves: vec![],
            records: vec![],
            num_epochs: 0,
            num_records_reported: 0,
            num_black_wins: 0,
            num_white_wins: 0,
            num_ties: 0
        }
    }

    pub fn start_epoch(&mut self) {
        assert!(self.current_epoch_moves.is_empty(), "previous epoch was not ended");
    }

    pub fn add_move(&mut self, mv: Move) {
        self.current_epoch_moves.push(mv);
    }

    pub fn abort_epoch(&mut self) {
        assert!(!self.current_epoch_moves.is_empty(), "no epoch in progress");
        self.current_epoch_moves.clear();
    }

    /// Ends the current epoch: replays the game from an empty board and
    /// stores one record per move, each labeled with the final reward
    /// of the side that moved.
    ///
    /// # Arguments
    ///
    /// * `winner` -
    ///
    pub fn end_epoch(&mut self, winner: Winner) {
        let (black_reward, white_reward) = match winner {
            Winner::Won(Color::Black) => {
                self.num_black_wins += 1;
                (1.0, -1.0)
            },
            Winner::Won(Color::White) => {
                self.num_white_wins += 1;
                (-1.0, 1.0)
            },
            Winner::Tie => {
                self.num_ties += 1;
                (0.0, 0.0)
            }
        };

        let mut board = self.config.new_board();
        for (i, &mv) in self.current_epoch_moves.iter().enumerate() {
            let reward = if i % 2 == 0 { black_reward } else { white_reward };

            self.records.push(TrainingRecord {
                position: mv.position,
                color: mv.color,
                reward,
                snapshot: board.snapshot()
            });
            board.apply(mv).expect("replaying a recorded game");
        }

        self.num_epochs += 1;
        self.current_epoch_moves.clear();
    }

    /// Streams the records collected so far to the writer, one line
    /// each, and drops them from memory.
    pub fn report(&mut self) -> Result<(), Error> {
        if let Some(writer) = self.writer.as_mut() {
            for record in &self.records {
                writeln!(writer, "{}", record)?;
            }

            self.num_records_reported += self.records.len();
        }

        self.records.clear();
        Ok(())
    }

    /// Prints the tally to stderr, keeping the record stream clean when
    /// it goes to stdout.
    pub fn summary(&self) {
        if self.writer.is_none() || self.num_epochs == 0 {
            return;
        }

        eprintln!("Report {} epochs in total.", self.num_epochs);
        eprintln!(
            "Wins: B ({}) - W ({}) - Tie ({}).",
            self.num_black_wins, self.num_white_wins, self.num_ties
        );
        eprintln!("Report {} states in total.", self.num_records_reported);
        eprintln!(
            "On average {:.3} states/epoch.",
            self.num_records_reported as f64 / self.num_epochs as f64
        );
    }

    pub fn history(&self) -> PlayHistory {
        PlayHistory {
            num_black_wins: self.num_black_wins,
            num_white_wins: self.num_white_wins,
            num_ties: self.num_ties
        }
    }
}

/// Plays `num_epochs` complete games, alternating between the two
/// policies returned by `players`, and streams training records to
/// `writer`. Games whose opening repeats an earlier game are aborted
/// without counting when `avoid_dup` is set.
///
/// # Arguments
///
/// * `config` -
/// * `players` - invoked once per game, returns the black and the white
///   policy in that order
/// * `num_epochs` -
/// * `writer` -
/// * `avoid_dup` -
/// * `verbose` - draw the board and announce every move
///
pub fn play_games<F>(
    config: GameConfig,
    mut players: F,
    num_epochs: usize,
    writer: Option<&mut dyn Write>,
    avoid_dup: bool,
    verbose: bool
) -> Result<PlayHistory, Error>
    where F: FnMut() -> (Box<dyn Policy>, Box<dyn Policy>)
{
    let mut ebuf = ExperienceBuffer::new(config, writer);
    let mut dup_detector = DupDetector::default();
    let mut epoch = 0;

    while epoch < num_epochs {
        if verbose && num_epochs != 1 {
            println!("========================");
            println!("Epoch: {:3}/{}", epoch + 1, num_epochs);
        }

        let mut board = config.new_board();
        let (mut black_policy, mut white_policy) = players();
        let mut color = Color::Black;

        ebuf.start_epoch();
        dup_detector.new_game();

        let winner = loop {
            let policy = if color == Color::Black {
                black_policy.as_mut()
            } else {
                white_policy.as_mut()
            };
            if verbose {
                println!("\n==> Inquiry {}", policy.name());
            }

            let position = policy.next_position(&board)?;
            let mv = Move::new(position, color);

            ebuf.add_move(mv);
            board.apply(mv)?;
            if verbose {
                println!("Placed at ({:2},{:2})", position.x, position.y);
                println!("{}", board);
            }

            let found_dup = dup_detector.add_move(mv);
            if avoid_dup && found_dup {
                break None;
            }

            match board.winner_after_last_move() {
                Some(winner) => break Some(winner),
                None => color = color.reverse()
            }
        };

        dup_detector.end_game();

        match winner {
            Some(winner) => {
                if verbose {
                    match winner {
                        Winner::Tie => println!("Tie"),
                        Winner::Won(color) => println!("Found winner: {}", color)
                    }
                }

                ebuf.end_epoch(winner);
                ebuf.report()?;
                epoch += 1;
            },
            None => {
                if verbose {
                    println!("Abort the game as it is a dup.");
                }

                ebuf.abort_epoch();
            }
        }
    }

    ebuf.summary();
    Ok(ebuf.history())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RandomPolicy;
    use cz_game::{Board, TrainingRecord};

    fn scripted_tie_moves() -> Vec<Move> {
        ["b(1,0)", "w(1,1)", "b(0,0)", "w(0,1)"]
            .iter()
            .map(|s| Move::parse(s).unwrap())
            .collect()
    }

    #[test]
    fn end_epoch_replays_the_game() {
        let config = GameConfig::new(2, 2);
        let mut out = Vec::new();
        {
            let mut ebuf = ExperienceBuffer::new(config, Some(&mut out));

            ebuf.start_epoch();
            for mv in scripted_tie_moves() {
                ebuf.add_move(mv);
            }
            ebuf.end_epoch(Winner::Tie);
            ebuf.report().unwrap();
        }

        let lines = String::from_utf8(out).unwrap();
        let lines = lines.lines().collect::<Vec<_>>();

        assert_eq!(lines, vec![
            "b(1,0)_0",
            "w(1,1)_0_b(1,0)",
            "b(0,0)_0_b(1,0)^w(1,1)",
            "w(0,1)_0_b(1,0)^w(1,1)^b(0,0)"
        ]);

        // every line must parse back (round trip over the wire format)
        for line in lines {
            TrainingRecord::parse(config, line).unwrap();
        }
    }

    #[test]
    fn rewards_follow_the_winner() {
        let config = GameConfig::new(2, 2);
        let mut ebuf = ExperienceBuffer::new(config, None);

        ebuf.start_epoch();
        for mv in scripted_tie_moves() {
            ebuf.add_move(mv);
        }
        ebuf.end_epoch(Winner::Won(Color::Black));

        assert_eq!(ebuf.records[0].reward, 1.0);
        assert_eq!(ebuf.records[1].reward, -1.0);
        assert_eq!(ebuf.records[2].reward, 1.0);
        assert_eq!(ebuf.records[3].reward, -1.0);
        assert_eq!(ebuf.history().num_black_wins, 1);
    }

    #[test]
    fn random_games_produce_parsable_records() {
        let config = GameConfig::new(4, 4);
        let mut out = Vec::new();
        let mut seed = 0;

        let history = play_games(
            config,
            || {
                seed += 1;
                (
                    Box::new(RandomPolicy::new(Color::Black, seed)) as Box<dyn Policy>,
                    Box::new(RandomPolicy::new(Color::White, seed + 1000)) as Box<dyn Policy>
                )
            },
            3,
            Some(&mut out),
            false,
            false
        ).unwrap();

        assert_eq!(history.num_black_wins + history.num_white_wins + history.num_ties, 3);

        let text = String::from_utf8(out).unwrap();
        assert!(!text.is_empty());
        for line in text.lines() {
            let record = TrainingRecord::parse(config, line).unwrap();
            assert!(record.position.x < 4 && record.position.y < 4);
        }
    }

    #[test]
    fn records_replay_into_legal_games() {
        // every record's snapshot plus its move must be applicable to a
        // board reconstructed from the snapshot
        let config = GameConfig::new(4, 4);
        let mut out = Vec::new();

        play_games(
            config,
            || {
                (
                    Box::new(RandomPolicy::new(Color::Black, 7)) as Box<dyn Policy>,
                    Box::new(RandomPolicy::new(Color::White, 8)) as Box<dyn Policy>
                )
            },
            1,
            Some(&mut out),
            false,
            false
        ).unwrap();

        for line in String::from_utf8(out).unwrap().lines() {
            let record = TrainingRecord::parse(config, line).unwrap();
            let mut board = Board::new(config);

            for &mv in record.snapshot.moves() {
                board.apply(mv).unwrap();
            }
            board.apply(Move::new(record.position, record.color)).unwrap();
        }
    }
}
