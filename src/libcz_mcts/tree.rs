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

use std::sync::{Mutex, OnceLock};

use ordered_float::OrderedFloat;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use cz_game::{Board, Color, Error as GameError, Move, Position, Winner};

use crate::noise;
use crate::options::SearchOptions;

/// The child slot of an edge. A terminal sentinel records that the edge
/// ends the game, distinguishing "present but terminal" from "never
/// visited" without null semantics.
pub enum Child {
    Terminal,
    Expanded(Box<Node>)
}

/// The per-edge statistics of a node. Guarded by the node's own lock so
/// that a backup is atomic with respect to any selection from the same
/// node.
struct Stats {
    /// The sum of completed backups over all edges.
    total_count: u32,

    /// The number of pending (virtually lost) descents over all edges.
    vtotal_count: u32,

    count: Box<[u32]>,
    vcount: Box<[u32]>,
    total_value: Box<[f32]>,

    /// Set while a worker holds the right to expand the edge.
    expanding: Box<[bool]>
}

impl Stats {
    fn new(num_edges: usize) -> Self {
        Self {
            total_count: 0,
            vtotal_count: 0,
            count: vec![0; num_edges].into_boxed_slice(),
            vcount: vec![0; num_edges].into_boxed_slice(),
            total_value: vec![0.0; num_edges].into_boxed_slice(),
            expanding: vec![false; num_edges].into_boxed_slice()
        }
    }
}

/// The result of trying to descend through an edge.
pub(crate) enum Claim<'a> {
    /// The caller now holds the right to expand the edge.
    Claimed,

    /// Another worker is expanding the edge right now.
    Busy,

    /// The edge has an expanded child to descend into.
    Child(&'a Node)
}

/// One node of the search tree, holding the statistics of every legal
/// continuation of its position. A parent exclusively owns its expanded
/// children.
pub struct Node {
    to_move: Color,

    /// The evaluator's scalar for this position, from the perspective
    /// of `to_move`.
    predicted_value: f32,

    legal: Box<[Position]>,
    prior: Box<[f32]>,
    children: Box<[OnceLock<Child>]>,
    stats: Mutex<Stats>
}

impl Node {
    /// Returns a new unvisited node.
    ///
    /// # Arguments
    ///
    /// * `to_move` - the side to move at this position
    /// * `predicted_value` - the evaluator's scalar, from the
    ///   perspective of `to_move`
    /// * `legal` - the candidate positions, must be non-empty
    /// * `prior` - the prior of each candidate, same order as `legal`
    ///
    pub fn new(to_move: Color, predicted_value: f32, legal: Vec<Position>, prior: Vec<f32>) -> Node {
        debug_assert!(!legal.is_empty());
        debug_assert_eq!(legal.len(), prior.len());

        let num_edges = legal.len();

        Node {
            to_move,
            predicted_value,
            legal: legal.into_boxed_slice(),
            prior: prior.into_boxed_slice(),
            children: (0..num_edges).map(|_| OnceLock::new()).collect::<Vec<_>>().into_boxed_slice(),
            stats: Mutex::new(Stats::new(num_edges))
        }
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn predicted_value(&self) -> f32 {
        self.predicted_value
    }

    pub fn legal(&self) -> &[Position] {
        &self.legal
    }

    pub fn num_edges(&self) -> usize {
        self.legal.len()
    }

    pub fn position_of(&self, edge: usize) -> Position {
        self.legal[edge]
    }

    pub fn prior(&self, edge: usize) -> f32 {
        self.prior[edge]
    }

    /// Mixes root noise into the priors. Called only when this node is
    /// created as the root of an exploration game, promoted roots keep
    /// their mixed priors.
    pub fn inject_noise<R: Rng>(&mut self, rng: &mut R, weight: f32, epsilon: f32) {
        noise::add(&mut self.prior, rng, weight, epsilon);
    }

    /// The sum of completed backups over all edges.
    pub fn total_count(&self) -> u32 {
        self.stats.lock().expect("could not acquire stats lock").total_count
    }

    /// The number of descents that still hold a virtual loss. Zero at
    /// every quiescent point.
    pub fn vtotal_count(&self) -> u32 {
        self.stats.lock().expect("could not acquire stats lock").vtotal_count
    }

    /// A snapshot of the per-edge visit counts.
    pub fn counts(&self) -> Vec<u32> {
        self.stats.lock().expect("could not acquire stats lock").count.to_vec()
    }

    /// A snapshot of `(position, count, prior, q)` per edge, for
    /// inspection and debug output.
    pub fn candidates(&self) -> Vec<(Position, u32, f32, f32)> {
        let stats = self.stats.lock().expect("could not acquire stats lock");

        (0..self.num_edges())
            .map(|i| {
                let n = stats.count[i];
                let q = stats.total_value[i] / (::std::cmp::max(n, 1) as f32);

                (self.legal[i], n, self.prior[i], q)
            })
            .collect()
    }

    /// Returns the edge maximizing `Q + U` and applies a virtual loss
    /// to it. Ties break towards the first edge in legal order.
    ///
    /// # Arguments
    ///
    /// * `c_puct` -
    /// * `virtual_loss` -
    ///
    pub(crate) fn select(&self, c_puct: f32, virtual_loss: u32) -> usize {
        let mut stats = self.stats.lock().expect("could not acquire stats lock");
        let vl = virtual_loss;
        let sqrt_total = ((stats.total_count + vl * stats.vtotal_count) as f32).sqrt();

        let mut best = 0;
        let mut best_score = OrderedFloat(::std::f32::NEG_INFINITY);

        for i in 0..self.num_edges() {
            let n = stats.count[i] + vl * stats.vcount[i];
            let w = stats.total_value[i] - ((vl * stats.vcount[i]) as f32);
            let q = w / (::std::cmp::max(n, 1) as f32);
            let u = c_puct * self.prior[i] * sqrt_total / ((1 + n) as f32);

            if OrderedFloat(q + u) > best_score {
                best_score = OrderedFloat(q + u);
                best = i;
            }
        }

        stats.vcount[best] += 1;
        stats.vtotal_count += 1;

        best
    }

    /// Converts the pending virtual loss on `edge` into a completed
    /// backup of `reward` (already in this node's frame).
    fn backup_edge(&self, edge: usize, reward: f32) {
        let mut stats = self.stats.lock().expect("could not acquire stats lock");

        debug_assert!(stats.vcount[edge] > 0);
        stats.vcount[edge] -= 1;
        stats.vtotal_count -= 1;
        stats.count[edge] += 1;
        stats.total_count += 1;
        stats.total_value[edge] += reward;
    }

    /// Removes the pending virtual loss on `edge` without recording a
    /// backup. Used when a simulation is abandoned.
    fn revert_edge(&self, edge: usize) {
        let mut stats = self.stats.lock().expect("could not acquire stats lock");

        debug_assert!(stats.vcount[edge] > 0);
        stats.vcount[edge] -= 1;
        stats.vtotal_count -= 1;
    }

    /// Tries to descend through `edge`: either yields the expanded
    /// child, or grants the caller the exclusive right to expand it, or
    /// reports that another worker holds that right.
    pub(crate) fn claim(&self, edge: usize) -> Claim<'_> {
        let mut stats = self.stats.lock().expect("could not acquire stats lock");

        match self.children[edge].get() {
            Some(Child::Expanded(node)) => Claim::Child(&**node),
            Some(Child::Terminal) => unreachable!("terminal edges are caught by winner detection"),
            None if stats.expanding[edge] => Claim::Busy,
            None => {
                stats.expanding[edge] = true;
                Claim::Claimed
            }
        }
    }

    /// Releases an expansion right without inserting a child. Used when
    /// the evaluation of the leaf failed.
    pub(crate) fn unclaim(&self, edge: usize) {
        let mut stats = self.stats.lock().expect("could not acquire stats lock");

        debug_assert!(stats.expanding[edge]);
        stats.expanding[edge] = false;
    }

    /// Records that `edge` ends the game. Idempotent, the same terminal
    /// edge is reached by many simulations.
    pub(crate) fn mark_terminal(&self, edge: usize) {
        if self.children[edge].set(Child::Terminal).is_err() {
            debug_assert!(matches!(self.children[edge].get(), Some(Child::Terminal)));
        }
    }

    /// Stores the freshly expanded child of `edge`. The caller must
    /// hold the expansion right of the edge.
    fn set_child(&self, edge: usize, child: Node) {
        let was_empty = self.children[edge].set(Child::Expanded(Box::new(child))).is_ok();

        assert!(was_empty, "child slot is already occupied");
    }

    /// Returns the expanded child that `position` leads to, if any.
    pub fn expanded_child(&self, position: Position) -> Option<&Node> {
        let edge = self.legal.iter().position(|&p| p == position)?;

        match self.children[edge].get() {
            Some(Child::Expanded(node)) => Some(&**node),
            _ => None
        }
    }

    /// The edge with the highest visit count, ties towards the first
    /// edge in legal order.
    pub fn best(&self) -> usize {
        let counts = self.counts();
        let mut best = 0;

        for (i, &n) in counts.iter().enumerate() {
            if n > counts[best] {
                best = i;
            }
        }

        best
    }

    /// Samples an edge with probability proportional to its visit
    /// count. Falls back to `best` when no edge has been visited.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let counts = self.counts();

        match WeightedIndex::new(&counts) {
            Ok(distribution) => distribution.sample(rng),
            Err(_) => self.best()
        }
    }

    /// Consumes this node and returns the subtree that `position` leads
    /// to, retaining its accumulated statistics. All siblings are
    /// dropped. Returns `None` if the slot holds the terminal sentinel
    /// or was never expanded.
    ///
    /// # Arguments
    ///
    /// * `position` -
    ///
    pub fn promote(mut self, position: Position) -> Option<Node> {
        let edge = self.legal.iter().position(|&p| p == position)?;
        let slot = ::std::mem::replace(&mut self.children[edge], OnceLock::new());

        match slot.into_inner() {
            Some(Child::Expanded(node)) => Some(*node),
            _ => None
        }
    }
}

/// The `(node, edge)` pairs a simulation selected, in root-to-leaf
/// order.
pub type NodeTrace<'a> = Vec<(&'a Node, usize)>;

/// The result of probing the tree for one simulation.
pub enum ProbeResult<'a> {
    /// The simulation reached a move that ends the game. The reward is
    /// in the black frame.
    Terminal(NodeTrace<'a>, f32),

    /// The simulation claimed an unexpanded edge; `board` is left at
    /// the leaf position, awaiting one evaluator call.
    Leaf(NodeTrace<'a>),

    /// Another worker is expanding the chosen edge, try again.
    Conflict
}

/// The outcome of a finished game expressed as the reward of the black
/// player.
pub fn black_reward(winner: Winner) -> f32 {
    match winner {
        Winner::Won(Color::Black) => 1.0,
        Winner::Won(Color::White) => -1.0,
        Winner::Tie => 0.0
    }
}

/// Descends from `root` selecting by `Q + U`, applying a virtual loss
/// along the way, until the simulation ends at a terminal move or at an
/// unexpanded edge. `board` is advanced along the selected path.
///
/// # Arguments
///
/// * `root` -
/// * `board` - the root position, mutated in place
/// * `options` -
///
pub fn probe<'a>(root: &'a Node, board: &mut Board, options: &SearchOptions) -> Result<ProbeResult<'a>, GameError> {
    let mut node = root;
    let mut trace: NodeTrace<'a> = vec![];

    loop {
        let edge = node.select(options.c_puct, options.virtual_loss);
        trace.push((node, edge));

        let mv = Move::new(node.position_of(edge), node.to_move());
        if let Err(err) = board.apply(mv) {
            // the engine generated an illegal candidate, abort
            revert(&trace);
            return Err(err);
        }

        if let Some(winner) = board.winner_after_last_move() {
            node.mark_terminal(edge);
            return Ok(ProbeResult::Terminal(trace, black_reward(winner)));
        }

        match node.claim(edge) {
            Claim::Claimed => return Ok(ProbeResult::Leaf(trace)),
            Claim::Busy => {
                revert(&trace);
                return Ok(ProbeResult::Conflict);
            },
            Claim::Child(child) => {
                node = child;
            }
        }
    }
}

/// Inserts the expanded leaf at the end of `trace` and backs the leaf's
/// predicted value up along the path.
///
/// # Arguments
///
/// * `trace` -
/// * `child` -
///
pub fn insert(trace: &NodeTrace, child: Node) {
    let &(parent, edge) = trace.last().expect("empty trace");
    let reward = match child.to_move() {
        Color::Black => child.predicted_value(),
        Color::White => -child.predicted_value()
    };

    parent.set_child(edge, child);
    backup(trace, reward);
}

/// Converts the virtual losses along `trace` into completed backups of
/// `black_reward`. Each node receives the reward matching its own side
/// to move, avoiding perspective flips at odd depths.
///
/// # Arguments
///
/// * `trace` -
/// * `black_reward` -
///
pub fn backup(trace: &NodeTrace, black_reward: f32) {
    for &(node, edge) in trace {
        let reward = match node.to_move() {
            Color::Black => black_reward,
            Color::White => -black_reward
        };

        node.backup_edge(edge, reward);
    }
}

/// Removes the virtual losses along `trace` without recording backups.
pub fn revert(trace: &NodeTrace) {
    for &(node, edge) in trace {
        node.revert_edge(edge);
    }
}
