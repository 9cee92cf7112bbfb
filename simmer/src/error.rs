/*
 * error.rs
 * Part of the simmer project
 * Created Date: Monday, June 16th 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Mon Jun 30 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Errors and stop reasons surfaced by the simulation engine.
//!
//! Stop reasons are data, not `Result::Err` — a simulation that stops
//! because it hit a sample limit did not fail. `SimError` is reserved for
//! conditions that prevent a simulation from running at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation requested on an empty move list")]
    SimNoMoves,

    #[error("simulation worker failed: {0}")]
    Fatal(String),
}

/// Why a simulation stopped. Reported on [`crate::sim_results::SimResults`]
/// rather than returned as an error, matching the spec's "not errors per
/// se" framing for normal termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Still running; no stop condition has fired.
    None,
    SampleLimit,
    Timeout,
    OneArmRemaining,
    Threshold,
    NoMoves,
    ExternalCancel,
    Error,
}
