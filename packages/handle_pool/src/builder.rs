use std::marker::PhantomData;

use crate::{DropPolicy, HandlePool, RemovalPolicy};

/// Builder for creating an instance of [`HandlePool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`HandlePool::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use handle_pool::{DropPolicy, HandlePool, RemovalPolicy};
///
/// let pool = HandlePool::<u32>::builder()
///     .removal_policy(RemovalPolicy::Ordered)
///     .capacity(64)
///     .drop_policy(DropPolicy::MayDropItems)
///     .build();
///
/// assert!(pool.capacity() >= 64);
/// ```
///
/// [1]: HandlePool::new
#[must_use]
pub struct HandlePoolBuilder<T> {
    removal_policy: RemovalPolicy,
    drop_policy: DropPolicy,
    capacity: usize,

    _item: PhantomData<T>,
}

impl<T> std::fmt::Debug for HandlePoolBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlePoolBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("removal_policy", &self.removal_policy)
            .field("drop_policy", &self.drop_policy)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> HandlePoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            removal_policy: RemovalPolicy::default(),
            drop_policy: DropPolicy::default(),
            capacity: 0,
            _item: PhantomData,
        }
    }

    /// Sets the [removal policy][RemovalPolicy] for the pool. This governs how the dense
    /// storage is compacted when an entry is destroyed.
    ///
    /// # Examples
    ///
    /// ```
    /// use handle_pool::{HandlePool, RemovalPolicy};
    ///
    /// let pool = HandlePool::<u32>::builder()
    ///     .removal_policy(RemovalPolicy::Ordered)
    ///     .build();
    ///
    /// assert_eq!(pool.removal_policy(), RemovalPolicy::Ordered);
    /// ```
    pub fn removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs how
    /// to treat remaining entries in the pool when the pool is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use handle_pool::{DropPolicy, HandlePool};
    ///
    /// let pool = HandlePool::<u32>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    /// ```
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Preallocates room for at least `capacity` entries when the pool is built.
    ///
    /// The pool grows automatically regardless, this only avoids reallocation during the
    /// first `capacity` insertions.
    ///
    /// # Examples
    ///
    /// ```
    /// use handle_pool::HandlePool;
    ///
    /// let pool = HandlePool::<u32>::builder().capacity(100).build();
    ///
    /// assert!(pool.capacity() >= 100);
    /// assert!(pool.is_empty());
    /// ```
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use handle_pool::HandlePool;
    ///
    /// let pool = HandlePool::<u32>::builder().build();
    /// ```
    #[must_use]
    pub fn build(self) -> HandlePool<T> {
        HandlePool::new_inner(self.removal_policy, self.drop_policy, self.capacity)
    }
}
