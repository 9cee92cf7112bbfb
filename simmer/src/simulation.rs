/*
 * simulation.rs
 * Part of the simmer project
 * Created Date: Wednesday, June 18th 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Fri Jul 25 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Runs many random rollouts of every candidate play in parallel,
//! feeding each iteration's outcome to [`crate::sim_results::SimResults`]
//! under [`crate::bai`]'s sampling and stopping rules.
//!
//! Workers follow the search thread's loop shape: acquire the next unit of
//! work, do it against a private copy of the shared state, publish results
//! under a lock, check for cancellation, repeat. Dispatch uses `rayon`'s
//! scope API rather than `par_iter` since the number of iterations isn't
//! known up front — each worker runs until the controller calls a stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gaddag::game::Game;
use gaddag::move_generation::{self, GenArgs, Sort};
use gaddag::move_list::MoveList;
use gaddag::moves::Move;
use gaddag::rack::Rack;
use gaddag::win_pct::WinPct;

use crate::bai::{self, SamplingRule, StoppingConfig};
use crate::error::{SimError, StopReason};
use crate::sim_results::SimResults;
use crate::thread_control::ThreadControl;

pub struct SimArgs<'a> {
    pub game: &'a Game,
    pub plays: Vec<Move>,
    pub plies: usize,
    pub known_opp_rack: Option<Rack>,
    pub win_pct: &'a WinPct,
    pub threads: usize,
    pub base_seed: u64,
    pub sampling_rule: SamplingRule,
    pub stopping: StoppingConfig,
    pub print_cadence: u64,
    pub epigon_min_samples: u64,
}

pub struct SimOutcome {
    pub results: Mutex<SimResults>,
    pub stop_reason: StopReason,
    pub node_count: u64,
}

/// Runs the full simulation for every arm in `args.plays` and returns the
/// settled [`SimResults`] plus the reason sampling stopped.
pub fn simulate(args: SimArgs) -> Result<SimOutcome, SimError> {
    if args.plays.is_empty() {
        return Err(SimError::SimNoMoves);
    }

    let results = SimResults::new(args.plays.clone(), args.plies);
    let thread_control = ThreadControl::new(args.base_seed, args.print_cadence.max(1));
    thread_control.start();
    let node_count = AtomicU64::new(0);
    let threads = args.threads.max(1);

    rayon::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|_| worker_loop(&args, &results, &thread_control, &node_count));
        }
    });

    let stop_reason = if thread_control.status() == StopReason::None {
        StopReason::SampleLimit
    } else {
        thread_control.status()
    };

    {
        let mut guard = results.lock().unwrap();
        guard.stop_reason = stop_reason;
        guard.sort_by_win_pct();
    }

    Ok(SimOutcome {
        results,
        stop_reason,
        node_count: node_count.load(Ordering::Relaxed),
    })
}

fn worker_loop(args: &SimArgs, results: &Mutex<SimResults>, tc: &ThreadControl, node_count: &AtomicU64) {
    let mut rng = ChaCha8Rng::seed_from_u64(tc.next_iter_output().seed);
    loop {
        if tc.is_stopped() {
            return;
        }

        let arm = {
            let guard = results.lock().unwrap();
            bai::choose_arm(&guard, args.sampling_rule, &mut rng)
        };
        let Some(arm_index) = arm else {
            tc.set_status(StopReason::OneArmRemaining);
            return;
        };

        let iter = tc.next_iter_output();
        let outcome = run_one_iteration(args, arm_index, iter.seed, node_count);

        {
            let mut guard = results.lock().unwrap();
            let play = &mut guard.plays[arm_index];
            play.record_iteration(
                outcome.equity,
                outcome.win_pct,
                &outcome.per_ply_leftover,
                &outcome.per_ply_score,
                &outcome.per_ply_bingo,
            );
            if arm_index % 8 == 0 {
                bai::collapse_epigons(&mut guard, args.epigon_min_samples);
            }
            if let Some(reason) = bai::check_stopping_condition(
                &guard,
                guard.plays.iter().map(|p| p.samples()).sum(),
                tc.seconds_elapsed(),
                &args.stopping,
            ) {
                tc.set_status(reason);
            }
        }

        tc.complete_iter(iter.iter_count);
    }
}

struct IterationOutcome {
    equity: f64,
    win_pct: f64,
    per_ply_leftover: Vec<f64>,
    per_ply_score: Vec<f64>,
    per_ply_bingo: Vec<f64>,
}

/// Implements the seven-step per-iteration algorithm: duplicate, seed,
/// seat the opponent, play the arm, roll out, score, unplay.
fn run_one_iteration(args: &SimArgs, arm_index: usize, seed: u64, node_count: &AtomicU64) -> IterationOutcome {
    let mut game = args.game.clone();
    let initial_player = game.player_on_turn;
    let opponent = 1 - initial_player;

    game.bag = gaddag::game::Bag::new(&game.ld, seed);

    if let Some(known) = &args.known_opp_rack {
        game.set_player_rack(opponent, known.clone());
    } else {
        let mut rack = Rack::new(game.ld.alphabet_size());
        let drawn = game.bag.draw(gaddag::rack::RACK_SIZE.min(game.bag.len()));
        for ml in drawn {
            rack.add_letter(ml);
        }
        game.set_player_rack(opponent, rack);
    }

    let initial_spread = game.players[initial_player].score - game.players[opponent].score;

    let arm_move = args.plays[arm_index];
    game.play_move(&arm_move);
    let kwg_after_arm = game.players[game.player_on_turn].word_graph.clone();
    game.sync_cross_sets(&kwg_after_arm);
    game.draw_to_full_rack(initial_player);
    node_count.fetch_add(1, Ordering::Relaxed);

    let mut per_ply_leftover = Vec::with_capacity(2);
    let mut per_ply_score = Vec::with_capacity(args.plies);
    let mut per_ply_bingo = Vec::with_capacity(args.plies);

    for ply in 1..=args.plies {
        if game.is_over() {
            break;
        }
        let mover = game.player_on_turn;
        let kwg = game.players[mover].word_graph.clone();
        let klv = game.players[mover].klv.clone();
        let best = best_reply(&game, mover, &kwg, &klv);
        per_ply_score.push(best.score() as f64);
        per_ply_bingo.push(if best.tiles_played() >= gaddag::rack::RACK_SIZE { 1.0 } else { 0.0 });
        game.play_move(&best);
        game.sync_cross_sets(&kwg);
        game.draw_to_full_rack(mover);
        node_count.fetch_add(1, Ordering::Relaxed);

        if ply + 1 >= args.plies {
            let leave_value = klv.leave_value(&game.players[mover].rack);
            let signed = if mover == initial_player { leave_value } else { -leave_value };
            per_ply_leftover.push(signed as f64);
        }
    }

    let final_spread = game.players[initial_player].score - game.players[opponent].score;
    let leftover: f64 = per_ply_leftover.iter().sum();
    let equity = (final_spread - initial_spread) as f64 + leftover;

    let unseen = game.bag.len() as u32 + game.players[opponent].rack.total() as u32;
    let perspective_spread = (final_spread as f64 + leftover).round() as i32;
    let on_move_is_initial = game.player_on_turn == initial_player;
    let lookup_spread = if on_move_is_initial { perspective_spread } else { -perspective_spread };
    let table_lookup = args.win_pct.get(lookup_spread, unseen) as f64;
    let win_pct = if on_move_is_initial { table_lookup } else { 1.0 - table_lookup };

    IterationOutcome {
        equity,
        win_pct,
        per_ply_leftover,
        per_ply_score,
        per_ply_bingo,
    }
}

/// Runs the move generator in record-best-only, equity-sorted mode and
/// returns its single top play (falling back to a pass when nothing
/// scores, which the generator always supplies as a last resort).
fn best_reply(game: &Game, mover: usize, kwg: &gaddag::kwg::Kwg, klv: &gaddag::klv::Klv) -> Move {
    let mut out = MoveList::new(1, true);
    let opp = 1 - mover;
    let args = GenArgs {
        board: &game.board,
        rack: &game.players[mover].rack,
        ld: &game.ld,
        kwg,
        klv,
        opp_rack_size: game.players[opp].rack.total() as usize,
        bag_tiles: game.bag.len() as u32,
        sort: Sort::Equity,
        record_best_only: true,
    };
    move_generation::generate(&args, &mut out);
    out.best().copied().unwrap_or_else(Move::new_pass)
}
