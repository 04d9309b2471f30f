// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for placement operations.

/// Result type alias for placement operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the placement state machine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Alignment or placement needs a loaded model.
    #[error("no model loaded")]
    NoModel,

    /// The runtime could not provide a reference space or hit-test source.
    /// Placement stays inert until the next session.
    #[error("hit-test negotiation failed: {0}")]
    NegotiationFailed(String),
}
