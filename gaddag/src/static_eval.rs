/*
 * static_eval.rs
 * Part of the gaddag project
 * Created Date: Monday, March 31st 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Fri Jun 13 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Turns a scored play into an equity: score plus the value of what's left
//! on the rack, adjusted for the endgame as the bag runs dry.

use crate::alphabet::LetterDistribution;
use crate::klv::Klv;
use crate::moves::Move;
use crate::rack::Rack;

/// `equity(move, leave, opp_rack, bag_tiles)` from the contract: score plus
/// leave value plus a pre-endgame adjustment. A pure function of its
/// inputs, so repeated calls with the same arguments always agree.
pub fn equity(
    mv: &Move,
    leave: &Rack,
    klv: &Klv,
    opp_rack_size: usize,
    bag_tiles: u32,
) -> f32 {
    let leave_value = if bag_tiles == 0 && leave.is_empty() {
        0.0
    } else {
        klv.leave_value(leave)
    };
    mv.score() as f32 + leave_value + pre_endgame_penalty(opp_rack_size, leave, bag_tiles)
}

/// Penalizes leaves that strand low-playability tiles (duplicated
/// consonants, an unplayable Q, etc.) once the bag is close to empty and
/// there won't be future draws to dilute them. Returns 0.0 while the bag
/// still has enough tiles that any leave is eventually replenished.
fn pre_endgame_penalty(opp_rack_size: usize, leave: &Rack, bag_tiles: u32) -> f32 {
    const PRE_ENDGAME_BAG_THRESHOLD: u32 = 7;
    if bag_tiles == 0 || bag_tiles > PRE_ENDGAME_BAG_THRESHOLD {
        return 0.0;
    }
    // Crude but monotonic: more tiles stranded on a nearly-empty bag is
    // worse, scaled down as the opponent's rack shrinks (fewer turns left
    // in which the stranding matters).
    let stranded = leave.total() as f32;
    let urgency = (PRE_ENDGAME_BAG_THRESHOLD - bag_tiles) as f32 / PRE_ENDGAME_BAG_THRESHOLD as f32;
    let opp_factor = 1.0 - (opp_rack_size as f32 / 7.0).min(1.0);
    -0.3 * stranded * urgency * (0.5 + 0.5 * opp_factor)
}

/// An upper bound on the leave + pre-endgame contribution achievable by any
/// play that consumes exactly `tiles_played` tiles from the current rack,
/// given `best_leaves[i]` (the best known KLV value achievable while
/// keeping `i` letters, populated by exchange generation).
pub fn shadow_equity_upper_bound(
    rack_size: usize,
    tiles_played: usize,
    best_leaves: &[f32],
    opp_rack_size: usize,
    bag_tiles: u32,
) -> f32 {
    let kept = rack_size.saturating_sub(tiles_played);
    let best_leave_value = best_leaves.get(kept).copied().unwrap_or(0.0);
    // The penalty only ever reduces equity, so its most favorable
    // (upper-bound) value for an unknown play is zero.
    let _ = (opp_rack_size, bag_tiles);
    best_leave_value
}

/// Face-value rack-score sum, used by the shadow pass as the starting point
/// for a best-case tile-to-multiplier assignment.
pub fn rack_face_value(rack: &Rack, ld: &LetterDistribution) -> i32 {
    rack.iter_counts()
        .map(|(ml, count)| ld.score(ml) as i32 * count as i32)
        .sum()
}

/// Matches descending-sorted rack scores against descending-sorted
/// per-tile effective multipliers to get the best-case tile-score total
/// for a play, per the shadow pass's contract.
pub fn best_case_tile_score(rack_scores: &[i16], effective_multipliers: &[u8]) -> i32 {
    let mut scores: Vec<i16> = rack_scores.to_vec();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    let mut mults: Vec<u8> = effective_multipliers.to_vec();
    mults.sort_unstable_by(|a, b| b.cmp(a));
    scores
        .iter()
        .zip(mults.iter())
        .map(|(&s, &m)| s as i32 * m as i32)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;

    #[test]
    fn equity_is_pure_function_of_inputs() {
        let ld = LetterDistribution::english();
        let klv = Klv::build(&[(vec![ld.machine_letter('Q').unwrap()], -5.0)]);
        let mv = Move::new_tile_placement(&[1, 2], 2, 0, 0, Direction::Horizontal, 20);
        let mut leave = Rack::new(ld.alphabet_size());
        leave.add_letter(ld.machine_letter('Q').unwrap());

        let e1 = equity(&mv, &leave, &klv, 7, 50);
        let e2 = equity(&mv, &leave, &klv, 7, 50);
        assert_eq!(e1, e2);
        assert_eq!(e1, 20.0 - 5.0);
    }

    #[test]
    fn zero_bag_and_empty_leave_has_no_leave_value() {
        let ld = LetterDistribution::english();
        let klv = Klv::build(&[]);
        let mv = Move::new_tile_placement(&[1, 2], 2, 0, 0, Direction::Horizontal, 10);
        let leave = Rack::new(ld.alphabet_size());
        assert_eq!(equity(&mv, &leave, &klv, 0, 0), 10.0);
    }

    #[test]
    fn best_case_tile_score_pairs_high_with_high() {
        let scores = [1, 10, 1];
        let mults = [1, 3, 1];
        // best pairing: 10*3 + 1*1 + 1*1 = 32
        assert_eq!(best_case_tile_score(&scores, &mults), 32);
    }

    #[test]
    fn shadow_bound_uses_best_leaves_table() {
        let best_leaves = vec![0.0, 1.0, 5.0, 9.0];
        let bound = shadow_equity_upper_bound(7, 4, &best_leaves, 7, 50);
        assert_eq!(bound, 9.0);
    }
}
