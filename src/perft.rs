/*
  Fiddler, a UCI-compatible chess engine.
  Copyright (C) 2022 The Fiddler Authors (see AUTHORS.md file)

  Fiddler is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  Fiddler is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! Performance testing, or "perft." Perft counts the leaf positions reachable
//! in exactly `depth` plies from a position, and is used both to verify the
//! correctness of move generation (by comparison against known node counts)
//! and to benchmark the speed of generation and the apply/undo cycle.
//!
//! Three variants are offered: a plain recursive counter, a cached counter
//! that memoizes on exact position state, and a parallel counter that fans
//! root moves out across threads.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    thread,
    time::Instant,
};

use super::{
    movegen::{get_moves, ALL},
    Position,
};

/// Count the leaf positions reachable from `pos` in exactly `depth` plies.
/// Depth 0 always counts as a single leaf (the position itself).
#[must_use]
pub fn perft(pos: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = get_moves::<ALL>(pos);
    let mut pcopy = pos.clone();
    let mut total = 0;
    for m in moves {
        pcopy.apply(m);
        total += perft(&pcopy, depth - 1);
        pcopy.undo();
    }
    total
}

/// Run `perft` on `pos`, printing timing and node-rate information to stdout,
/// the way a developer would while hunting for a move generation bug.
pub fn perft_verbose(pos: &Position, depth: u8) -> u64 {
    let tic = Instant::now();
    let num_nodes = perft(pos, depth);
    let toc = Instant::now();
    let time = toc - tic;
    let speed = (num_nodes as f64) / time.as_secs_f64();
    println!(
        "depth {depth}: {num_nodes} nodes in {:.2}s ({speed:.0} nodes/sec)",
        time.as_secs_f64()
    );
    num_nodes
}

/// A memoization table for `perft_cache`, keyed on the exact `(Position,
/// depth)` pair rather than a lossy hash. `Position`'s `Hash` impl delegates
/// to its Zobrist key for bucketing, but its `Eq` impl compares full board
/// state, so two distinct positions that happen to collide in hash value are
/// never confused for one another: the cache degrades to a linear probe on
/// collision rather than returning a wrong answer.
pub type PerftCache = HashMap<(Position, u8), u64>;

/// Count leaf positions as `perft` does, consulting and populating `cache`
/// along the way. Safe to call repeatedly with the same cache to amortize
/// shared subtrees across calls (e.g. successive depths from the same root).
pub fn perft_cached(pos: &Position, depth: u8, cache: &mut PerftCache) -> u64 {
    if depth == 0 {
        return 1;
    }
    let key = (pos.clone(), depth);
    if let Some(&count) = cache.get(&key) {
        return count;
    }
    let moves = get_moves::<ALL>(pos);
    let mut pcopy = pos.clone();
    let mut total = 0;
    for m in moves {
        pcopy.apply(m);
        total += perft_cached(&pcopy, depth - 1, cache);
        pcopy.undo();
    }
    cache.insert(key, total);
    total
}

/// Count leaf positions as `perft` does, but fan the root's legal moves out
/// across one OS thread per move. Each worker owns a structural copy of the
/// position (not a shared reference) and recurses sequentially from there, so
/// no synchronization is needed beyond joining the workers; leaf counts are
/// summed once every thread has finished. Results are order-independent and
/// identical to `perft`.
#[must_use]
pub fn perft_parallel(pos: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = get_moves::<ALL>(pos);
    let handles: Vec<_> = moves
        .into_iter()
        .map(|m| {
            let mut child = pos.clone();
            child.apply(m);
            thread::spawn(move || perft(&child, depth - 1))
        })
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().expect("perft worker thread panicked"))
        .sum()
}

/// Like `perft_parallel`, but workers additionally share a sharded perft
/// cache: 16 independently-locked shards, selected by the low bits of the
/// position's Zobrist hash, so that concurrent workers rarely contend for the
/// same lock.
#[must_use]
pub fn perft_parallel_cached(pos: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    const SHARDS: usize = 16;
    let shards: Arc<Vec<Mutex<PerftCache>>> =
        Arc::new((0..SHARDS).map(|_| Mutex::new(HashMap::new())).collect());

    let moves = get_moves::<ALL>(pos);
    let handles: Vec<_> = moves
        .into_iter()
        .map(|m| {
            let mut child = pos.clone();
            child.apply(m);
            let shards = Arc::clone(&shards);
            thread::spawn(move || perft_sharded(&child, depth - 1, &shards))
        })
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().expect("perft worker thread panicked"))
        .sum()
}

fn perft_sharded(pos: &Position, depth: u8, shards: &[Mutex<PerftCache>]) -> u64 {
    if depth == 0 {
        return 1;
    }
    let shard_idx = (pos.hash as usize) % shards.len();
    let key = (pos.clone(), depth);
    if let Some(&count) = shards[shard_idx].lock().unwrap().get(&key) {
        return count;
    }

    let moves = get_moves::<ALL>(pos);
    let mut pcopy = pos.clone();
    let mut total = 0;
    for m in moves {
        pcopy.apply(m);
        total += perft_sharded(&pcopy, depth - 1, shards);
        pcopy.undo();
    }
    shards[shard_idx].lock().unwrap().insert(key, total);
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Test the perft values for the board starting position.
    fn perft_start_position() {
        perft_assistant(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &[1, 20, 400, 8_902, 197_281, 4_865_609],
        );
    }

    #[test]
    /// Test the perft values for the
    /// [Kiwipete](https://www.chessprogramming.org/Perft_Results#Position_2)
    /// position.
    fn perft_kiwipete() {
        perft_assistant(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            &[1, 48, 2_039, 97_862, 4_085_603, 193_690_690],
        );
    }

    #[test]
    fn perft_endgame() {
        // https://www.chessprogramming.org/Perft_Results#Position_3
        perft_assistant(
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            &[1, 14, 191, 2_812, 43_238, 674_624],
        );
    }

    #[test]
    /// Test the perft values for an unbalanced position. Uses results from
    /// [the CPW wiki](https://www.chessprogramming.org/Perft_Results#Position_4).
    fn perft_unbalanced() {
        perft_assistant(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            &[1, 6, 264, 9_467, 422_333, 15_833_292],
        )
    }

    #[test]
    fn perft_edwards() {
        // https://www.chessprogramming.org/Perft_Results#Position_5
        perft_assistant(
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            &[1, 44, 1_486, 62_379, 2_103_487, 89_941_194],
        );
    }

    #[test]
    fn perft_edwards2() {
        // https://www.chessprogramming.org/Perft_Results#Position_6
        perft_assistant(
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
            &[1, 46, 2_079, 89_890, 3_894_594, 164_075_551],
        );
    }

    fn perft_assistant(fen: &str, node_counts: &[u64]) {
        let pos = Position::from_fen(fen).unwrap();
        for (i, num) in node_counts.iter().enumerate() {
            assert_eq!(*num, perft(&pos, i as u8), "plain perft mismatch at depth {i}");
        }
    }

    #[test]
    fn perft_cached_matches_plain_perft() {
        let pos = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let mut cache = PerftCache::new();
        for depth in 0..4 {
            assert_eq!(perft(&pos, depth), perft_cached(&pos, depth, &mut cache));
        }
    }

    #[test]
    fn perft_parallel_matches_plain_perft() {
        let pos = Position::new();
        for depth in 0..4 {
            assert_eq!(perft(&pos, depth), perft_parallel(&pos, depth));
        }
    }

    #[test]
    fn perft_parallel_cached_matches_plain_perft() {
        let pos =
            Position::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
                .unwrap();
        for depth in 0..4 {
            assert_eq!(perft(&pos, depth), perft_parallel_cached(&pos, depth));
        }
    }
}
