/// Derives a scope name from a Rust type.
///
/// The name is the final path segment of [`std::any::type_name`] with any
/// generic arguments stripped, so `my_app::net::Connection` becomes
/// `"Connection"` and `Vec<String>` becomes `"Vec"`.
///
/// The derivation is deterministic (the same type always yields the same
/// name) and never produces an empty string, which is exactly the contract
/// [`extend_for`][crate::Metrics::extend_for] and
/// [`EventFilter::source_type`][crate::EventFilter::source_type] rely on.
///
/// # Example
///
/// ```
/// use scoped_metrics::type_scope_name;
///
/// struct ConnectionPool;
///
/// assert_eq!(type_scope_name::<ConnectionPool>(), "ConnectionPool");
/// assert_eq!(type_scope_name::<Vec<String>>(), "Vec");
/// ```
#[must_use]
pub fn type_scope_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();

    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
