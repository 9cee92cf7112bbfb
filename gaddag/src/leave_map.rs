/*
 * leave_map.rs
 * Part of the gaddag project
 * Created Date: Friday, March 21st 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Tue May 20 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Tracks the rack-minus-strip "leave" as the generator's recursive walk
//! takes and replaces tiles, so a KLV lookup is available at every
//! accepting node without re-deriving the leave from scratch.
//!
//! The source caches a KLV node pointer and a running word-index so each
//! `take_letter`/`add_letter` pair is O(1). This implementation instead
//! keeps the live [`Rack`] and recomputes the KLV lookup lazily when
//! `current_value` is actually queried (once per accepting node reached,
//! not once per recursion step) — asymptotically worse but behaviorally
//! identical, and it sidesteps duplicating the KLV trie's internal child
//! pointers in a second cache that would need to stay in lock-step with it.

use crate::alphabet::MachineLetter;
use crate::klv::Klv;
use crate::rack::Rack;

pub struct LeaveMap {
    rack: Rack,
    taken: Vec<MachineLetter>,
}

impl LeaveMap {
    pub fn new(rack: Rack) -> Self {
        LeaveMap {
            rack,
            taken: Vec::new(),
        }
    }

    /// Removes `ml` from the working rack, recording it so a later
    /// `add_letter` can restore it in O(1).
    pub fn take_letter(&mut self, ml: MachineLetter) {
        self.rack.take_letter(ml);
        self.taken.push(ml);
    }

    /// Restores the most recently taken letter. Panics if called without a
    /// matching prior `take_letter`, or if `ml` doesn't match it (the
    /// generator's recursion is expected to undo in strict LIFO order).
    pub fn add_letter(&mut self, ml: MachineLetter) {
        let restored = self.taken.pop().expect("add_letter with empty undo stack");
        assert_eq!(restored, ml, "leave map add_letter/take_letter mismatch");
        self.rack.add_letter(ml);
    }

    pub fn rack(&self) -> &Rack {
        &self.rack
    }

    pub fn current_value(&self, klv: &Klv) -> f32 {
        klv.leave_value(&self.rack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::LetterDistribution;

    #[test]
    fn take_then_add_restores_prior_state() {
        let ld = LetterDistribution::english();
        let mut rack = Rack::new(ld.alphabet_size());
        let a = ld.machine_letter('A').unwrap();
        let e = ld.machine_letter('E').unwrap();
        rack.add_letter(a);
        rack.add_letter(e);
        let mut map = LeaveMap::new(rack.clone());

        map.take_letter(a);
        map.add_letter(a);

        assert_eq!(map.rack().count(a), rack.count(a));
        assert_eq!(map.rack().count(e), rack.count(e));
        assert_eq!(map.rack().total(), rack.total());
    }

    #[test]
    fn current_value_reflects_remaining_rack() {
        let ld = LetterDistribution::english();
        let q = ld.machine_letter('Q').unwrap();
        let leaves = vec![(vec![q], -5.0f32)];
        let klv = Klv::build(&leaves);

        let mut rack = Rack::new(ld.alphabet_size());
        rack.add_letter(q);
        let map = LeaveMap::new(rack);
        assert_eq!(map.current_value(&klv), -5.0);
    }
}
