use thiserror::Error;

/// Errors that can occur when constructing metrics scopes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for a scope with an empty name. Scope names identify the
    /// emitting scope on every recorded event, so an empty name is never valid.
    #[error("scope name must not be empty")]
    EmptyScopeName,
}

/// A specialized `Result` type for scope construction, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn empty_scope_name_is_error() {
        let error = Error::EmptyScopeName;

        // Verify it is a valid Error that can be used in Result context.
        let result: Result<()> = Err(error);
        assert!(result.is_err());
    }
}
