use thiserror::Error;

use crate::HandleId;

/// Errors that can occur when operating on a [`HandlePool`][crate::HandlePool].
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The handle or identifier does not refer to a live entry of the pool.
    ///
    /// This covers identifiers that were never issued, identifiers whose entry has already been
    /// destroyed, the [`HandleId::NULL`] sentinel and handles issued by a different pool. The
    /// pool keeps no record of destroyed identifiers, so these cases are indistinguishable.
    #[error("invalid handle: {id} does not refer to a live entry of the pool")]
    InvalidHandle {
        /// The identifier that failed to resolve.
        id: HandleId,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug, std::error::Error);

    #[test]
    fn invalid_handle_message_names_id() {
        let error = Error::InvalidHandle {
            id: HandleId::new(42),
        };

        assert_eq!(
            error.to_string(),
            "invalid handle: #42 does not refer to a live entry of the pool"
        );
    }
}
