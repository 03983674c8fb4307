// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Mapping of remote failures onto filesystem outcomes
//!
//! Reads absorb "not found" into an absent result. Everything else, and
//! any failure during a mutation, becomes a terminating [`Error::Remote`].
//! Wrapped failures are reduced to their root cause first.

use crate::error::{Error, Result};
use crate::remote::{RemoteError, RemoteResult};

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err.root_cause() {
            RemoteError::Failure { kind, message } => Error::Remote { kind, message },
            // root_cause never yields an aggregate
            aggregate => Error::Remote {
                kind: aggregate.kind(),
                message: aggregate.to_string(),
            },
        }
    }
}

/// Outcome of a read: not-found is absence, not an error
pub fn read_outcome<T>(result: RemoteResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            let root = err.root_cause();
            if root.is_not_found() {
                Ok(None)
            } else {
                Err(root.into())
            }
        }
    }
}

/// Outcome of a mutation: every failure terminates the verb
pub fn mutation_outcome<T>(result: RemoteResult<T>) -> Result<T> {
    result.map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorId;
    use crate::remote::RemoteErrorKind;

    #[test]
    fn test_read_absorbs_not_found() {
        let r: RemoteResult<u32> = Err(RemoteError::not_found("/gone"));
        assert!(matches!(read_outcome(r), Ok(None)));
    }

    #[test]
    fn test_read_absorbs_wrapped_not_found() {
        let r: RemoteResult<u32> = Err(RemoteError::Aggregate(vec![RemoteError::not_found(
            "/gone",
        )]));
        assert!(matches!(read_outcome(r), Ok(None)));
    }

    #[test]
    fn test_read_surfaces_other_failures() {
        let r: RemoteResult<u32> = Err(RemoteError::new(
            RemoteErrorKind::Unauthorized,
            "invalid_access_token",
        ));
        let err = read_outcome(r).unwrap_err();
        assert_eq!(err.error_id(), ErrorId::Remote(RemoteErrorKind::Unauthorized));
    }

    #[test]
    fn test_mutation_not_found_terminates() {
        let r: RemoteResult<u32> = Err(RemoteError::Aggregate(vec![RemoteError::not_found(
            "/gone",
        )]));
        match mutation_outcome(r) {
            Err(Error::Remote { kind, message }) => {
                assert_eq!(kind, RemoteErrorKind::NotFound);
                assert!(message.contains("/gone"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_success_passes_through() {
        assert_eq!(mutation_outcome::<u32>(Ok(7)).unwrap(), 7);
        assert_eq!(read_outcome::<u32>(Ok(7)).unwrap(), Some(7));
    }
}
