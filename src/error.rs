// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `audiodev` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! argument validation, power ordinal validation, engine lifecycle, and
//! hardware power transitions.

use thiserror::Error;

use crate::engine::EngineId;
use crate::types::PowerState;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when driving an
/// audio device through its power and engine lifecycle.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument was missing or malformed.
    ///
    /// Rejected before any state is mutated; fully recoverable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A power-state ordinal outside the range the device registered.
    ///
    /// Rejected before any state is mutated; fully recoverable.
    #[error("power state ordinal {ordinal} is out of range [0, {max}]")]
    InvalidState {
        /// The ordinal that was requested.
        ordinal: u32,
        /// Highest ordinal the device accepts.
        max: u32,
    },

    /// Error occurred during engine lifecycle operations.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Error occurred during a hardware power transition.
    #[error("power transition error: {0}")]
    Transition(#[from] TransitionError),
}

/// Errors related to audio engine lifecycle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine's start hook failed during activation.
    ///
    /// The engine was not recorded; activation is rolled back.
    #[error("engine failed to start: {0}")]
    StartFailed(String),

    /// The engine id is not registered with this device.
    #[error("{0} is not registered with this device")]
    NotFound(EngineId),

    /// A start notification arrived for an engine already counted as running.
    #[error("{0} is already running")]
    AlreadyRunning(EngineId),

    /// A stop notification arrived for an engine that is not running.
    #[error("{0} is not running")]
    NotRunning(EngineId),
}

/// Errors related to hardware power transitions.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The driver's power hook refused or failed the transition.
    ///
    /// The transition is aborted and no longer in progress; the pending
    /// state is left as requested so a subsequent request can retry.
    #[error("hardware rejected power transition from {from} to {to}: {reason}")]
    Hardware {
        /// State the device was in when the transition was attempted.
        from: PowerState,
        /// State the device was transitioning toward.
        to: PowerState,
        /// Driver-supplied failure description.
        reason: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
