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

use std::collections::HashSet;

use cz_game::Move;

/// Detects self-play games that repeat an opening already generated.
/// Two games count as duplicates when their first `max_moves` moves are
/// the same set.
pub struct DupDetector {
    max_moves: usize,
    move_set: Option<HashSet<Move>>,
    history: Vec<HashSet<Move>>
}

impl DupDetector {
    pub fn new(max_moves: usize) -> Self {
        Self {
            max_moves,
            move_set: None,
            history: vec![]
        }
    }

    pub fn new_game(&mut self) {
        assert!(self.move_set.is_none(), "previous game was not ended");
        self.move_set = Some(HashSet::with_capacity(self.max_moves));
    }

    pub fn end_game(&mut self) {
        let move_set = self.move_set.take().expect("no game in progress");
        self.history.push(move_set);
    }

    /// Records a move of the current game. Returns true once the game's
    /// opening fingerprint is complete and matches an earlier game.
    ///
    /// # Arguments
    ///
    /// * `mv` -
    ///
    pub fn add_move(&mut self, mv: Move) -> bool {
        let move_set = self.move_set.as_mut().expect("no game in progress");

        if move_set.len() >= self.max_moves {
            return false;
        }

        move_set.insert(mv);
        if move_set.len() != self.max_moves {
            return false;
        }

        self.history.iter().enumerate()
            .find(|(_, old_set)| *old_set == move_set)
            .map(|(old_id, _)| {
                eprintln!("Find duplicated game with old id: {}", old_id);
                true
            })
            .unwrap_or(false)
    }
}

impl Default for DupDetector {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(n: usize) -> Vec<Move> {
        (0..n).map(|i| Move::parse(&format!("{}(5,{})", if i % 2 == 0 { 'b' } else { 'w' }, i)).unwrap()).collect()
    }

    #[test]
    fn repeated_opening_is_flagged() {
        let mut detector = DupDetector::new(4);
        let opening = moves(4);

        detector.new_game();
        for &mv in &opening {
            assert!(!detector.add_move(mv));
        }
        detector.end_game();

        detector.new_game();
        let flags = opening.iter().map(|&mv| detector.add_move(mv)).collect::<Vec<_>>();
        detector.end_game();

        assert_eq!(flags, vec![false, false, false, true]);
    }

    #[test]
    fn short_games_never_match() {
        let mut detector = DupDetector::new(4);

        detector.new_game();
        for &mv in &moves(3) {
            assert!(!detector.add_move(mv));
        }
        detector.end_game();

        detector.new_game();
        for &mv in &moves(3) {
            assert!(!detector.add_move(mv));
        }
        detector.end_game();
    }

    #[test]
    fn moves_past_the_fingerprint_are_ignored() {
        let mut detector = DupDetector::new(2);

        detector.new_game();
        assert!(!detector.add_move(Move::parse("b(5,0)").unwrap()));
        assert!(!detector.add_move(Move::parse("w(5,1)").unwrap()));
        detector.end_game();

        detector.new_game();
        assert!(!detector.add_move(Move::parse("b(5,0)").unwrap()));
        assert!(detector.add_move(Move::parse("w(5,1)").unwrap()));
        // the fingerprint is full, later moves are no-ops
        assert!(!detector.add_move(Move::parse("b(4,0)").unwrap()));
        detector.end_game();
    }
}
