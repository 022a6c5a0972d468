/// Determines how [`HandlePool::destroy()`][crate::HandlePool::destroy] closes the gap that a
/// removed entry leaves in the dense storage.
///
/// Both strategies keep every other handle valid. They differ in cost and in whether the
/// storage order (as seen through [`HandlePool::values()`][crate::HandlePool::values] and
/// [`HandlePool::iter()`][crate::HandlePool::iter]) survives removals.
///
/// # Examples
///
/// ```
/// use handle_pool::{HandlePool, RemovalPolicy};
///
/// let mut pool = HandlePool::<u32>::builder()
///     .removal_policy(RemovalPolicy::Ordered)
///     .build();
///
/// let a = pool.insert(1);
/// let b = pool.insert(2);
/// let c = pool.insert(3);
///
/// pool.destroy(a).unwrap();
///
/// // Survivors stay in creation order.
/// assert_eq!(pool.values(), &[2, 3]);
/// # _ = (b, c);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum RemovalPolicy {
    /// The last entry is moved into the removed entry's slot and the storage shrinks by one.
    ///
    /// Removal is O(1). Storage order is not preserved. This is the default.
    #[default]
    SwapRemove,

    /// All entries after the removed one shift left by one slot.
    ///
    /// Removal is O(n) in the number of entries after the removed one. Storage order always
    /// equals the creation order of the surviving entries.
    Ordered,
}
