/*
 * bai.rs
 * Part of the simmer project
 * Created Date: Monday, June 16th 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Fri Jul 25 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Best-arm-identification: which candidate play to sample next, when an
//! arm can be pruned as equivalent to a better one, and when sampling
//! should stop.

use rand::Rng;

use gaddag::moves::{Move, MoveType};

use crate::error::StopReason;
use crate::sim_results::SimResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingRule {
    RoundRobin,
    TopTwo,
}

/// Two plays are epigons if they'd be indistinguishable as rollout
/// starting points: same move type, same anchor and direction, and the
/// same multiset of played tiles with blanks treated as interchangeable
/// with any letter (a blank standing in for an S is the "same" play as a
/// drawn S for simulation purposes).
pub fn plays_are_similar(a: &Move, b: &Move) -> bool {
    if a.move_type() != b.move_type() {
        return false;
    }
    if a.move_type() != MoveType::TilePlacement {
        return a == b;
    }
    if a.direction() != b.direction() || a.row() != b.row() || a.col() != b.col() {
        return false;
    }
    let mut ta: Vec<u8> = a.strip().iter().map(|&ml| gaddag::alphabet::unblank(ml)).collect();
    let mut tb: Vec<u8> = b.strip().iter().map(|&ml| gaddag::alphabet::unblank(ml)).collect();
    ta.sort_unstable();
    tb.sort_unstable();
    ta == tb
}

/// Marks every arm that is an epigon of a strictly better-ranked, already
/// well-sampled arm as ignored. `min_samples` guards against declaring an
/// epigon before the leader's own estimate has stabilized.
pub fn collapse_epigons(results: &mut SimResults, min_samples: u64) {
    let n = results.plays.len();
    for i in 0..n {
        if results.plays[i].ignore || results.plays[i].samples() < min_samples {
            continue;
        }
        for j in (i + 1)..n {
            if results.plays[j].ignore {
                continue;
            }
            if plays_are_similar(&results.plays[i].play, &results.plays[j].play) {
                results.plays[j].ignore = true;
                results.plays[j].is_epigon = true;
            }
        }
    }
}

/// Chooses the next arm index to sample, among arms not flagged ignored.
/// Returns `None` if every arm is ignored.
pub fn choose_arm<R: Rng>(results: &SimResults, rule: SamplingRule, rng: &mut R) -> Option<usize> {
    let active = results.active_indices();
    if active.is_empty() {
        return None;
    }
    match rule {
        SamplingRule::RoundRobin => {
            // Least-sampled active arm, so every active arm stays within
            // one sample of every other regardless of arrival order.
            active
                .into_iter()
                .min_by_key(|&i| results.plays[i].samples())
        }
        SamplingRule::TopTwo => {
            let mut ranked = active;
            ranked.sort_by(|&a, &b| {
                results.plays[b]
                    .win_pct_stat
                    .mean()
                    .partial_cmp(&results.plays[a].win_pct_stat.mean())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let leader = ranked[0];
            if ranked.len() == 1 {
                return Some(leader);
            }
            let challenger = ranked[1];
            let leader_se = results.plays[leader].win_pct_stat.stderr();
            let challenger_se = results.plays[challenger].win_pct_stat.stderr();
            let gap = (results.plays[leader].win_pct_stat.mean() - results.plays[challenger].win_pct_stat.mean()).abs();
            let combined_se = (leader_se * leader_se + challenger_se * challenger_se).sqrt();
            // Explore the challenger with probability shrinking as the
            // confidence gap between the two widens; always some chance so
            // a temporarily-unlucky true-best arm keeps getting sampled.
            let p_challenger = if combined_se <= f64::EPSILON {
                0.5
            } else {
                (0.5 - (gap / (combined_se + gap)) * 0.4).clamp(0.1, 0.5)
            };
            if rng.gen_bool(p_challenger) {
                Some(challenger)
            } else {
                Some(leader)
            }
        }
    }
}

/// Two-tailed z-value for common confidence percentiles, approximated with
/// a short lookup since a full inverse-normal isn't worth a new
/// dependency for a handful of stopping-condition thresholds.
fn z_value_for_percentile(pct: f64) -> f64 {
    let clamped = pct.clamp(50.0, 99.99);
    let table: &[(f64, f64)] = &[
        (50.0, 0.674),
        (80.0, 1.282),
        (90.0, 1.645),
        (95.0, 1.960),
        (99.0, 2.576),
        (99.9, 3.291),
    ];
    for window in table.windows(2) {
        let (p0, z0) = window[0];
        let (p1, z1) = window[1];
        if clamped <= p1 {
            let t = (clamped - p0) / (p1 - p0);
            return z0 + t * (z1 - z0);
        }
    }
    table.last().unwrap().1
}

pub struct StoppingConfig {
    pub max_iterations: u64,
    pub time_limit_seconds: Option<f64>,
    pub stopping_condition_pct: Option<f64>,
}

/// Evaluates every stopping condition against the current (locked) state,
/// in the priority order the controller checks them.
pub fn check_stopping_condition(
    results: &SimResults,
    total_samples: u64,
    elapsed_seconds: f64,
    config: &StoppingConfig,
) -> Option<StopReason> {
    if total_samples >= config.max_iterations {
        return Some(StopReason::SampleLimit);
    }
    if let Some(limit) = config.time_limit_seconds {
        if elapsed_seconds >= limit {
            return Some(StopReason::Timeout);
        }
    }
    let active = results.active_indices();
    if active.len() <= 1 && !results.plays.is_empty() {
        return Some(StopReason::OneArmRemaining);
    }
    if let Some(pct) = config.stopping_condition_pct {
        if pct > 0.0 && pct < 100.0 && active.len() > 1 {
            let z = z_value_for_percentile(pct);
            let mut ranked = active.clone();
            ranked.sort_by(|&a, &b| {
                results.plays[b]
                    .win_pct_stat
                    .mean()
                    .partial_cmp(&results.plays[a].win_pct_stat.mean())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let leader = &results.plays[ranked[0]];
            if leader.samples() > 1 {
                let leader_lower = leader.win_pct_stat.mean() - z * leader.win_pct_stat.stderr();
                let all_separated = ranked[1..].iter().all(|&i| {
                    let other = &results.plays[i];
                    leader_lower > other.win_pct_stat.mean() + z * other.win_pct_stat.stderr()
                });
                if all_separated {
                    return Some(StopReason::Threshold);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaddag::board::Direction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn identical_tile_multisets_are_similar_regardless_of_blanks() {
        let a = Move::new_tile_placement(&[1, 2, 3], 3, 7, 7, Direction::Horizontal, 10);
        let b = Move::new_tile_placement(
            &[1, 2 | gaddag::alphabet::BLANK_MASK, 3],
            3,
            7,
            7,
            Direction::Horizontal,
            8,
        );
        assert!(plays_are_similar(&a, &b));
    }

    #[test]
    fn different_anchor_is_never_similar() {
        let a = Move::new_tile_placement(&[1], 1, 7, 7, Direction::Horizontal, 1);
        let b = Move::new_tile_placement(&[1], 1, 7, 8, Direction::Horizontal, 1);
        assert!(!plays_are_similar(&a, &b));
    }

    #[test]
    fn round_robin_picks_least_sampled_active_arm() {
        let moves = vec![
            Move::new_tile_placement(&[1], 1, 7, 7, Direction::Horizontal, 5),
            Move::new_tile_placement(&[2], 1, 7, 8, Direction::Horizontal, 5),
        ];
        let mutex = SimResults::new(moves, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        {
            let mut results = mutex.lock().unwrap();
            results.plays[0].record_iteration(0.0, 0.5, &[0.0], &[5.0], &[0.0]);
            let chosen = choose_arm(&results, SamplingRule::RoundRobin, &mut rng);
            assert_eq!(chosen, Some(1));
            results.plays[1].record_iteration(0.0, 0.5, &[0.0], &[5.0], &[0.0]);
        }
    }

    #[test]
    fn sample_limit_fires_before_other_conditions() {
        let moves = vec![Move::new_pass(), Move::new_pass()];
        let mutex = SimResults::new(moves, 1);
        let results = mutex.lock().unwrap();
        let config = StoppingConfig {
            max_iterations: 10,
            time_limit_seconds: None,
            stopping_condition_pct: None,
        };
        assert_eq!(check_stopping_condition(&results, 10, 0.0, &config), Some(StopReason::SampleLimit));
    }

    #[test]
    fn one_arm_remaining_stops_when_others_ignored() {
        let moves = vec![Move::new_pass(), Move::new_pass()];
        let mutex = SimResults::new(moves, 1);
        let mut results = mutex.lock().unwrap();
        results.plays[1].ignore = true;
        let config = StoppingConfig {
            max_iterations: 1000,
            time_limit_seconds: None,
            stopping_condition_pct: None,
        };
        assert_eq!(
            check_stopping_condition(&results, 2, 0.0, &config),
            Some(StopReason::OneArmRemaining)
        );
    }
}
