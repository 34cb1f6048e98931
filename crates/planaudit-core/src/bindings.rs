//! Placeholder binder
//!
//! Logged statements still contain their positional `?` markers. SQLite
//! refuses to prepare them without a value per marker, so each one gets a
//! neutral `0`. The real runtime values are not in the log, which means a
//! plan that depends on bound values may not match production.

/// Returns the number of `?` markers in the query text.
///
/// Every `?` counts, including ones inside string literals.
pub fn placeholder_count(query: &str) -> usize {
    query.matches('?').count()
}

/// Returns one dummy bind value per placeholder
pub fn dummy_bindings(query: &str) -> Vec<i64> {
    vec![0; placeholder_count(query)]
}
