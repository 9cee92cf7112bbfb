/*
 * sim_results.rs
 * Part of the simmer project
 * Created Date: Tuesday, June 17th 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Fri Jul 25 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Shared simulation state: one [`SimmedPlay`] per candidate arm, plus the
//! mutex-guarded table every worker reads and updates. Mirrors the engine's
//! `Arc<Mutex<T>>` shared-state idiom, swapping the transposition table for
//! a per-arm statistics row.

use std::sync::Mutex;

use gaddag::moves::Move;

use crate::error::StopReason;
use crate::stats::RunningStat;

/// Running statistics for one candidate play across every iteration that
/// has sampled it. `ignore` is set once an arm is pruned (by
/// [`crate::bai`]'s epigon check or a stopping condition); ignored arms are
/// skipped by future sampling but keep their accumulated stats for the
/// final ranking.
#[derive(Debug, Clone)]
pub struct SimmedPlay {
    pub play: Move,
    pub equity_stat: RunningStat,
    pub win_pct_stat: RunningStat,
    /// Leftover running stats for the last two rollout plies (`plies-1` and
    /// `plies`), the window the static evaluator's leave value is folded
    /// into per the rollout's scoring step.
    pub leftover_stats: Vec<RunningStat>,
    /// Score distribution for the reply played at each rollout ply, one
    /// slot per ply (`score_stats[0]` is ply 1, and so on).
    pub score_stats: Vec<RunningStat>,
    /// Bingo rate (0.0/1.0 per sample) for the reply played at each rollout
    /// ply, same indexing as `score_stats`.
    pub bingo_stats: Vec<RunningStat>,
    pub ignore: bool,
    pub is_epigon: bool,
}

impl SimmedPlay {
    pub fn new(play: Move, plies: usize) -> Self {
        SimmedPlay {
            play,
            equity_stat: RunningStat::new(),
            win_pct_stat: RunningStat::new(),
            leftover_stats: vec![RunningStat::new(); 2],
            score_stats: vec![RunningStat::new(); plies],
            bingo_stats: vec![RunningStat::new(); plies],
            ignore: false,
            is_epigon: false,
        }
    }

    pub fn record_iteration(
        &mut self,
        equity: f64,
        win_pct: f64,
        leftover: &[f64],
        per_ply_score: &[f64],
        per_ply_bingo: &[f64],
    ) {
        self.equity_stat.push(equity);
        self.win_pct_stat.push(win_pct);
        for (stat, &value) in self.leftover_stats.iter_mut().zip(leftover.iter()) {
            stat.push(value);
        }
        for (stat, &value) in self.score_stats.iter_mut().zip(per_ply_score.iter()) {
            stat.push(value);
        }
        for (stat, &value) in self.bingo_stats.iter_mut().zip(per_ply_bingo.iter()) {
            stat.push(value);
        }
    }

    pub fn samples(&self) -> u64 {
        self.win_pct_stat.count()
    }
}

/// The mutable state shared by every simulation worker behind one
/// [`Mutex`]. Workers lock it only to record a finished iteration or to
/// re-rank arms; the lock is never held across the (expensive) game
/// rollout itself.
pub struct SimResults {
    pub plays: Vec<SimmedPlay>,
    pub stop_reason: StopReason,
}

impl SimResults {
    pub fn new(plays: Vec<Move>, plies: usize) -> Mutex<Self> {
        Mutex::new(SimResults {
            plays: plays
                .into_iter()
                .map(|play| SimmedPlay::new(play, plies))
                .collect(),
            stop_reason: StopReason::None,
        })
    }

    /// Arms still being sampled: not ignored and not the epigon-collapsed
    /// duplicate of a better-ranked arm.
    pub fn active_indices(&self) -> Vec<usize> {
        self.plays
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.ignore)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sorts `plays` by descending mean win percentage, breaking ties by
    /// descending mean equity, then by the move's own ordering for full
    /// determinism given equal stats (e.g. before any samples are in).
    pub fn sort_by_win_pct(&mut self) {
        self.plays.sort_by(|a, b| {
            b.win_pct_stat
                .mean()
                .partial_cmp(&a.win_pct_stat.mean())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.equity_stat
                        .mean()
                        .partial_cmp(&a.equity_stat.mean())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| lexical_move_order(&a.play, &b.play))
        });
    }
}

fn lexical_move_order(a: &Move, b: &Move) -> std::cmp::Ordering {
    (a.row(), a.col(), a.strip_len()).cmp(&(b.row(), b.col(), b.strip_len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaddag::board::Direction;

    #[test]
    fn sort_orders_by_win_pct_then_equity() {
        let moves = vec![
            Move::new_tile_placement(&[1], 1, 7, 7, Direction::Horizontal, 10),
            Move::new_tile_placement(&[2], 1, 7, 8, Direction::Horizontal, 20),
        ];
        let mutex = SimResults::new(moves, 2);
        {
            let mut results = mutex.lock().unwrap();
            results.plays[0].record_iteration(10.0, 0.4, &[0.0, 0.0], &[8.0, 10.0], &[0.0, 0.0]);
            results.plays[1].record_iteration(20.0, 0.9, &[0.0, 0.0], &[20.0, 20.0], &[0.0, 1.0]);
            results.sort_by_win_pct();
            assert!(results.plays[0].win_pct_stat.mean() > results.plays[1].win_pct_stat.mean());
        }
    }

    #[test]
    fn active_indices_excludes_ignored_arms() {
        let moves = vec![
            Move::new_pass(),
            Move::new_tile_placement(&[1], 1, 7, 7, Direction::Horizontal, 5),
        ];
        let mutex = SimResults::new(moves, 2);
        {
            let mut results = mutex.lock().unwrap();
            results.plays[0].ignore = true;
            assert_eq!(results.active_indices(), vec![1]);
        }
    }
}
