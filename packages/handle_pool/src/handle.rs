use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{self, AtomicU64};

use crate::{HandlePool, Result};

/// The permanent identifier of an entry in a [`HandlePool`].
///
/// Identifiers are issued by each pool from a strictly increasing counter that starts at 1 and
/// is never reset, so an identifier is never reused for a different entry of the same pool.
/// [`HandleId::NULL`] is never issued and always denotes "no entry".
///
/// # Example
///
/// ```rust
/// use handle_pool::{HandleId, HandlePool};
///
/// let mut pool = HandlePool::<u32>::new();
/// let handle = pool.create();
///
/// assert_ne!(handle.id(), HandleId::NULL);
/// assert!(pool.get_by_id(HandleId::NULL).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HandleId(u64);

impl HandleId {
    /// The sentinel identifier. It never refers to a live entry.
    pub const NULL: Self = Self(0);

    /// The first identifier a pool issues.
    pub(crate) const FIRST: Self = Self(1);

    /// Wraps a raw identifier value, e.g. one previously obtained from [`get()`][Self::get].
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the [`NULL`][Self::NULL] sentinel.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    /// The identifier issued right after this one.
    ///
    /// # Panics
    ///
    /// Panics if the identifier space is exhausted.
    #[must_use]
    pub(crate) fn successor(self) -> Self {
        Self(
            self.0
                .checked_add(1)
                .expect("issuing 2^64 handles would take centuries, so overflow here is impossible"),
        )
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for HandleId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<HandleId> for u64 {
    fn from(value: HandleId) -> Self {
        value.0
    }
}

/// Identity of one [`HandlePool`] instance, stamped into every handle the pool issues.
///
/// This stands in for a back-reference from the handle to its pool. Handles never borrow the
/// pool, so the pool can be mutated while handles exist, yet a handle presented to a different
/// pool is recognized as foreign instead of aliasing that pool's entries.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct PoolId(u64);

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

impl PoolId {
    pub(crate) fn next() -> Self {
        // Only uniqueness matters, there is no ordering relationship with other memory.
        Self(NEXT_POOL_ID.fetch_add(1, atomic::Ordering::Relaxed))
    }
}

/// A handle to an entry in a [`HandlePool<T>`].
///
/// A handle is a small token made of the identity of the pool that issued it and the
/// [`HandleId`] of the entry. It does not own the entry and carries no pointer to it: to reach
/// the value you present the handle to the pool, either via [`HandlePool::get()`] and
/// [`HandlePool::get_mut()`] or via the handle-side [`get()`][Self::get] and
/// [`resolve()`][Self::resolve].
///
/// Handles are freely copyable. All copies refer to the same entry and observe the same value
/// for as long as the entry is alive. Once the entry is destroyed, every copy of the handle
/// permanently fails to resolve with [`Error::InvalidHandle`][crate::Error::InvalidHandle].
///
/// # Example
///
/// ```rust
/// use handle_pool::HandlePool;
///
/// let mut pool = HandlePool::<i32>::new();
///
/// let handle = pool.insert(1);
/// let copy = handle;
///
/// *copy.resolve(&mut pool).unwrap() += 1;
/// assert_eq!(*handle.get(&pool).unwrap(), 2);
///
/// pool.destroy(handle).unwrap();
/// assert!(copy.get(&pool).is_err());
/// ```
pub struct Handle<T> {
    pool: PoolId,
    id: HandleId,

    _item: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[must_use]
    pub(crate) fn new(pool: PoolId, id: HandleId) -> Self {
        Self {
            pool,
            id,
            _item: PhantomData,
        }
    }

    /// The identifier of the entry this handle refers to.
    #[must_use]
    pub fn id(self) -> HandleId {
        self.id
    }

    #[must_use]
    pub(crate) fn pool_id(self) -> PoolId {
        self.pool
    }

    /// Gets a shared reference to the entry this handle refers to.
    ///
    /// Equivalent to [`HandlePool::get()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`][crate::Error::InvalidHandle] if the entry has been
    /// destroyed or if `pool` is not the pool that issued this handle.
    pub fn get(self, pool: &HandlePool<T>) -> Result<&T> {
        pool.get(self)
    }

    /// Gets an exclusive reference to the entry this handle refers to.
    ///
    /// Equivalent to [`HandlePool::get_mut()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`][crate::Error::InvalidHandle] if the entry has been
    /// destroyed or if `pool` is not the pool that issued this handle.
    pub fn resolve(self, pool: &mut HandlePool<T>) -> Result<&mut T> {
        pool.get_mut(self)
    }
}

// Manual impls so that handles are Copy/Eq/Hash regardless of what `T` is.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.hash(state);
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("pool", &self.pool)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use static_assertions::assert_impl_all;

    use super::*;

    // Handles stay plain tokens even when the payload is neither Send nor Sync.
    assert_impl_all!(Handle<Rc<Cell<u8>>>: Copy, Send, Sync, Eq, Hash, fmt::Debug);
    assert_impl_all!(HandleId: Copy, Send, Sync, Ord, Hash, fmt::Display);

    #[test]
    fn null_id_is_null() {
        assert!(HandleId::NULL.is_null());
        assert!(!HandleId::FIRST.is_null());
        assert_eq!(HandleId::default(), HandleId::NULL);
    }

    #[test]
    fn successor_increments() {
        assert_eq!(HandleId::FIRST.successor(), HandleId::new(2));
        assert_eq!(HandleId::new(41).successor().get(), 42);
    }

    #[test]
    #[should_panic]
    fn successor_of_max_panics() {
        _ = HandleId::new(u64::MAX).successor();
    }

    #[test]
    fn id_conversions() {
        let id = HandleId::from(7_u64);
        assert_eq!(u64::from(id), 7);
        assert_eq!(id.to_string(), "#7");
    }

    #[test]
    fn pool_ids_are_unique() {
        let a = PoolId::next();
        let b = PoolId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn handle_equality_includes_pool() {
        let pool_a = PoolId::next();
        let pool_b = PoolId::next();

        let a = Handle::<u32>::new(pool_a, HandleId::FIRST);
        let a_again = Handle::<u32>::new(pool_a, HandleId::FIRST);
        let b = Handle::<u32>::new(pool_b, HandleId::FIRST);

        assert_eq!(a, a_again);
        assert_ne!(a, b);

        let set: HashSet<_> = [a, a_again, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn debug_output_names_item_type() {
        let handle = Handle::<String>::new(PoolId::next(), HandleId::FIRST);
        let output = format!("{handle:?}");

        assert!(output.contains("String"));
        assert!(output.contains("HandleId(1)"));
    }
}
