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

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use crossbeam_utils::thread;
use crossbeam_utils::Backoff;

use cz_game::{Board, Color, Features};
use cz_nn::{Evaluation, Evaluator, EvaluatorError};

use crate::error::Error;
use crate::node_from_response;
use crate::options::SearchOptions;
use crate::tree::{self, Node, ProbeResult};

/// A leaf queued for batched evaluation. The worker that queued it
/// blocks on `reply` until the batcher has forwarded the features to
/// the evaluator.
struct EvalRequest {
    features: Vec<f32>,
    reply: Sender<Result<Evaluation, EvaluatorError>>
}

/// Claims one of the remaining simulations, returning false once all of
/// them have been handed out.
fn claim_simulation(remaining: &AtomicUsize) -> bool {
    remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok()
}

/// Drains queued leaves into batches of at most `max_batch_size` and
/// forwards them to the evaluator. Runs until every worker has dropped
/// its sender.
fn batcher_loop<E: Evaluator + ?Sized>(evaluator: &E, requests: Receiver<EvalRequest>, max_batch_size: usize) {
    while let Ok(first) = requests.recv() {
        let mut pending = vec![first];

        // opportunistic batching, take whatever has queued up since but
        // never wait for stragglers
        while pending.len() < max_batch_size {
            match requests.try_recv() {
                Ok(request) => pending.push(request),
                Err(_) => break
            }
        }

        let mut features = Vec::with_capacity(pending.len() * pending[0].features.len());
        for request in &pending {
            features.extend_from_slice(&request.features);
        }

        match evaluator.evaluate(&features, pending.len()) {
            Ok(responses) if responses.len() == pending.len() => {
                for (request, response) in pending.into_iter().zip(responses.into_iter()) {
                    // a worker that errored out early is gone, that is fine
                    let _ = request.reply.send(Ok(response));
                }
            },
            Ok(responses) => {
                let err = EvaluatorError::new(format!(
                    "got {} responses for a batch of {}", responses.len(), pending.len()
                ));

                for request in pending {
                    let _ = request.reply.send(Err(err.clone()));
                }
            },
            Err(err) => {
                for request in pending {
                    let _ = request.reply.send(Err(err.clone()));
                }
            }
        }
    }
}

/// Queues the leaf on `board` for batched evaluation, blocks until the
/// response arrives, and builds its node.
fn evaluate_remote(
    board: &Board,
    to_move: Color,
    requests: &Sender<EvalRequest>
) -> Result<Node, Error> {
    let features = board.get_features(to_move);
    let (reply, response) = bounded(1);

    requests.send(EvalRequest { features, reply })
        .map_err(|_| Error::Evaluator(EvaluatorError::new("evaluator has terminated")))?;

    let response = response.recv()
        .map_err(|_| Error::Evaluator(EvaluatorError::new("evaluator has terminated")))??;

    node_from_response(board, to_move, response)
}

/// Probes the tree until this worker's share of the simulations has
/// completed a backup.
fn worker_loop(
    root: &Node,
    board: &Board,
    options: &SearchOptions,
    requests: Sender<EvalRequest>,
    remaining: &AtomicUsize
) -> Result<(), Error> {
    while claim_simulation(remaining) {
        let backoff = Backoff::new();

        loop {
            let mut scratch = board.clone();

            match tree::probe(root, &mut scratch, options)? {
                ProbeResult::Terminal(trace, reward) => {
                    tree::backup(&trace, reward);
                    break;
                },
                ProbeResult::Leaf(trace) => {
                    let &(parent, edge) = trace.last().expect("empty trace");
                    let to_move = parent.to_move().reverse();

                    match evaluate_remote(&scratch, to_move, &requests) {
                        Ok(child) => {
                            tree::insert(&trace, child);
                            break;
                        },
                        Err(err) => {
                            parent.unclaim(edge);
                            tree::revert(&trace);
                            return Err(err);
                        }
                    }
                },
                ProbeResult::Conflict => {
                    backoff.snooze();
                }
            }
        }
    }

    Ok(())
}

/// Runs `options.iterations` simulations from `root` on a pool of
/// `options.num_workers` threads with virtual loss, batching leaf
/// evaluations up to `options.batch_size` per evaluator invocation.
/// Every virtual loss has been reconciled when this returns.
///
/// # Arguments
///
/// * `root` - the (already expanded) root of the tree
/// * `board` - the position `root` stands for
/// * `evaluator` -
/// * `options` -
///
pub fn run_simulations<E: Evaluator + ?Sized>(
    root: &Node,
    board: &Board,
    evaluator: &E,
    options: &SearchOptions
) -> Result<(), Error> {
    let num_workers = ::std::cmp::max(options.num_workers, 1);
    let max_batch_size = ::std::cmp::max(options.batch_size, 1);
    let remaining = AtomicUsize::new(options.iterations);
    let (requests, requests_recv) = unbounded::<EvalRequest>();

    thread::scope(|scope| {
        let remaining = &remaining;
        let batcher = {
            let requests_recv = requests_recv.clone();

            scope.builder()
                .name("batcher".into())
                .spawn(move |_| batcher_loop(evaluator, requests_recv, max_batch_size))
                .expect("could not spawn batcher thread")
        };

        let workers = (0..num_workers)
            .map(|_| {
                let requests = requests.clone();

                scope.builder()
                    .name("search_worker".into())
                    .spawn(move |_| worker_loop(root, board, options, requests, remaining))
                    .expect("could not spawn worker thread")
            })
            .collect::<Vec<_>>();

        // the batcher exits once every worker sender is gone
        drop(requests);

        let mut result = Ok(());
        for worker in workers {
            if let Err(err) = worker.join().expect("worker thread panicked") {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        batcher.join().expect("batcher thread panicked");
        result
    }).expect("scoped threads panicked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand;
    use cz_game::{GameConfig, Move, Position};
    use cz_nn::UniformEvaluator;

    fn options(iterations: usize, num_workers: usize) -> SearchOptions {
        SearchOptions {
            iterations,
            num_workers,
            batch_size: 8,
            ..SearchOptions::default()
        }
    }

    #[test]
    fn drained_counts_add_up_to_iterations() {
        let board = GameConfig::new(6, 7).new_board();
        let evaluator = UniformEvaluator::new();
        let root = expand(&board, Color::Black, &evaluator).unwrap();

        run_simulations(&root, &board, &evaluator, &options(256, 4)).unwrap();

        assert_eq!(root.counts().iter().sum::<u32>(), 256);
        assert_eq!(root.total_count(), 256);
        assert_eq!(root.vtotal_count(), 0);
    }

    #[test]
    fn parallel_search_finds_the_immediate_win() {
        let mut board = GameConfig::new(6, 7).new_board();
        for s in ["b(5,0)", "w(5,6)", "b(4,0)", "w(4,6)", "b(3,0)", "w(3,6)"] {
            board.apply(Move::parse(s).unwrap()).unwrap();
        }

        let evaluator = UniformEvaluator::new();
        let root = expand(&board, Color::Black, &evaluator).unwrap();
        run_simulations(&root, &board, &evaluator, &options(400, 4)).unwrap();

        assert_eq!(root.position_of(root.best()), Position::new(2, 0));
    }

    #[test]
    fn single_worker_pool_still_drains() {
        let board = GameConfig::new(4, 4).new_board();
        let evaluator = UniformEvaluator::new();
        let root = expand(&board, Color::Black, &evaluator).unwrap();

        run_simulations(&root, &board, &evaluator, &options(64, 1)).unwrap();

        assert_eq!(root.total_count(), 64);
        assert_eq!(root.vtotal_count(), 0);
    }
}
