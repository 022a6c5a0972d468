/// Determines entry dropping behavior when the pool is dropped.
///
/// By default, the pool will drop its remaining entries when it is dropped.
///
/// # Examples
///
/// ```
/// use handle_pool::{DropPolicy, HandlePool};
///
/// // The drop policy is set at pool creation time.
/// let pool = HandlePool::<u32>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool will drop its entries when the pool is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The pool will panic if it still contains entries when it is dropped.
    ///
    /// Use this when every entry is expected to be released through
    /// [`HandlePool::destroy()`][crate::HandlePool::destroy] before the pool goes away, so that
    /// forgotten handles surface as a failure instead of a silent drop.
    MustNotDropItems,
}
