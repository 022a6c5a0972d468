use std::any::type_name;
use std::iter::FusedIterator;
use std::{fmt, slice, thread};

use crate::metrics::{
    DESTROY_RELOCATED_ENTRIES, ENTRIES_CREATED, ENTRIES_DESTROYED, INVALID_HANDLES,
};
use crate::{
    DropPolicy, Error, Handle, HandleId, HandlePoolBuilder, IndirectionMap, PoolDump, PoolId,
    RemovalPolicy, Result, SlotDump, SlotIndex,
};

/// An object pool that stores its entries densely and hands out stable handles to them.
///
/// Entries live in one contiguous [`Vec`], so iterating over them via [`values()`][1] or
/// [`iter()`][2] is as cache-friendly as iterating over a slice. Callers never see storage
/// positions, though. Each entry is addressed through a [`Handle<T>`] that wraps a permanent
/// [`HandleId`], and the pool keeps an indirection map from identifiers to the current storage
/// position. This gives handles three properties that plain indices lack:
///
/// * A handle stays valid while other entries are created and destroyed, even though that
///   moves entries around in the storage.
/// * A handle whose entry has been destroyed is detected: resolving it fails with
///   [`Error::InvalidHandle`] instead of returning some other entry.
/// * Identifiers are never reused, so a stale handle can never alias an entry created later.
///
/// # Removal
///
/// How the storage is compacted on [`destroy()`][3] is configured per pool through
/// [`RemovalPolicy`]. The default, [`RemovalPolicy::SwapRemove`], is O(1) but does not preserve
/// storage order. [`RemovalPolicy::Ordered`] preserves creation order at O(n) cost.
///
/// # Thread safety
///
/// The pool has no internal synchronization. Operations that change the pool take `&mut self`,
/// so concurrent use requires external synchronization such as a [`Mutex`][4]. The pool is
/// [`Send`] and [`Sync`] if `T` is.
///
/// # Example
///
/// ```rust
/// use handle_pool::HandlePool;
///
/// #[derive(Default)]
/// struct Model {
///     a: i32,
///     b: i32,
/// }
///
/// let mut scene = HandlePool::<Model>::new();
///
/// let first = scene.create();
/// let second = scene.create();
///
/// first.resolve(&mut scene).unwrap().a = 10;
/// second.resolve(&mut scene).unwrap().a = 5;
///
/// scene.destroy(first).unwrap();
///
/// assert_eq!(second.get(&scene).unwrap().a, 5);
/// assert!(first.get(&scene).is_err());
/// ```
///
/// [1]: Self::values
/// [2]: Self::iter
/// [3]: Self::destroy
/// [4]: std::sync::Mutex
#[derive(Debug)]
pub struct HandlePool<T> {
    /// Dense storage. The entry at 0-based position `n` has slot index `n + 1`.
    entries: Vec<T>,

    /// Identifier to slot mapping (and back) for every entry in `entries`.
    map: IndirectionMap,

    /// Stamped into every handle we issue so we can reject handles of other pools.
    pool_id: PoolId,

    removal_policy: RemovalPolicy,
    drop_policy: DropPolicy,
}

impl<T> HandlePool<T> {
    #[must_use]
    pub(crate) fn new_inner(
        removal_policy: RemovalPolicy,
        drop_policy: DropPolicy,
        capacity: usize,
    ) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            map: IndirectionMap::with_capacity(capacity),
            pool_id: PoolId::next(),
            removal_policy,
            drop_policy,
        }
    }

    /// Creates a new [`HandlePool`] with the default configuration.
    ///
    /// The pool starts empty and will automatically grow as needed when entries are created.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<String>::new();
    ///
    /// assert_eq!(pool.len(), 0);
    /// assert!(pool.is_empty());
    ///
    /// let handle = pool.insert("Hello".to_string());
    /// assert_eq!(pool.len(), 1);
    /// assert_eq!(pool.get(handle).unwrap(), "Hello");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`HandlePool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::{HandlePool, RemovalPolicy};
    ///
    /// let pool = HandlePool::<u32>::builder()
    ///     .removal_policy(RemovalPolicy::Ordered)
    ///     .build();
    ///
    /// assert!(pool.is_empty());
    /// ```
    pub fn builder() -> HandlePoolBuilder<T> {
        HandlePoolBuilder::new()
    }

    /// The number of live entries in the pool.
    ///
    /// This is always equal to the number of live identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.entries.len(), self.map.len());

        self.entries.len()
    }

    /// Whether the pool has no live entries.
    ///
    /// An empty pool may still be holding unused capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of entries the pool can hold without reallocating its storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Reserves capacity for at least `additional` more entries.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<u32>::new();
    /// pool.reserve(10);
    ///
    /// assert!(pool.capacity() >= 10);
    /// ```
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
        self.map.reserve(additional);
    }

    /// Releases unused capacity. All handles remain valid.
    #[cfg_attr(test, mutants::skip)] // Only affects memory usage, not behavior.
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
        self.map.shrink_to_fit();
    }

    /// The strategy [`destroy()`][Self::destroy] uses to compact the storage.
    #[must_use]
    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    /// Creates a new entry with the default value of `T` and returns a handle to it.
    ///
    /// The entry is appended at the end of the storage and receives an identifier that this pool
    /// has never issued before.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<u64>::new();
    ///
    /// let handle = pool.create();
    /// assert_eq!(*pool.get(handle).unwrap(), 0);
    ///
    /// *pool.get_mut(handle).unwrap() = 42;
    /// assert_eq!(*pool.get(handle).unwrap(), 42);
    /// ```
    #[must_use]
    pub fn create(&mut self) -> Handle<T>
    where
        T: Default,
    {
        self.insert(T::default())
    }

    /// Inserts `value` as a new entry and returns a handle to it.
    ///
    /// Like [`create()`][Self::create] but with a caller-provided value, which also allows
    /// pooling types that do not implement [`Default`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<String>::new();
    ///
    /// let handle = pool.insert("Alice".to_string());
    /// assert_eq!(pool.get(handle).unwrap(), "Alice");
    /// ```
    #[must_use]
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.entries.push(value);

        let (id, slot) = self.map.issue();
        debug_assert_eq!(slot.get(), self.entries.len());

        ENTRIES_CREATED.with(|e| e.observe_once());

        Handle::new(self.pool_id, id)
    }

    /// Gets a shared reference to the entry a handle refers to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the entry has been destroyed or if the handle was
    /// issued by a different pool.
    pub fn get(&self, handle: Handle<T>) -> Result<&T> {
        let slot = self.slot_of(handle)?;

        Ok(self
            .entries
            .get(slot.position())
            .expect("the indirection map only holds slots that exist in the storage"))
    }

    /// Gets an exclusive reference to the entry a handle refers to.
    ///
    /// Changes made through the reference are observed by every copy of the handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the entry has been destroyed or if the handle was
    /// issued by a different pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<String>::new();
    /// let handle = pool.insert("Hello".to_string());
    ///
    /// pool.get_mut(handle).unwrap().push_str(", World!");
    ///
    /// assert_eq!(pool.get(handle).unwrap(), "Hello, World!");
    /// ```
    pub fn get_mut(&mut self, handle: Handle<T>) -> Result<&mut T> {
        let slot = self.slot_of(handle)?;

        Ok(self
            .entries
            .get_mut(slot.position())
            .expect("the indirection map only holds slots that exist in the storage"))
    }

    /// The current slot index of the entry a handle refers to.
    ///
    /// Slot indexes change when other entries are destroyed, so this is mostly useful for
    /// diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the entry has been destroyed or if the handle was
    /// issued by a different pool.
    pub fn slot_of(&self, handle: Handle<T>) -> Result<SlotIndex> {
        if handle.pool_id() != self.pool_id {
            return Err(invalid_handle(handle.id()));
        }

        self.map
            .slot_of(handle.id())
            .ok_or_else(|| invalid_handle(handle.id()))
    }

    /// Whether the handle refers to a live entry of this pool.
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        handle.pool_id() == self.pool_id && self.contains_id(handle.id())
    }

    /// Whether the identifier refers to a live entry of this pool.
    #[must_use]
    pub fn contains_id(&self, id: HandleId) -> bool {
        self.map.slot_of(id).is_some()
    }

    /// Obtains a handle to the live entry with the given identifier.
    ///
    /// This does not create an entry, it only re-acquires a handle to an existing one. This is
    /// useful when only the identifier was stored, e.g. in a log or an external index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the identifier was never issued by this pool, if its
    /// entry has been destroyed or if it is [`HandleId::NULL`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<u32>::new();
    /// let handle = pool.insert(7);
    ///
    /// let id = handle.id();
    /// let again = pool.get_by_id(id).unwrap();
    ///
    /// assert_eq!(again, handle);
    /// ```
    pub fn get_by_id(&self, id: HandleId) -> Result<Handle<T>> {
        if self.contains_id(id) {
            Ok(Handle::new(self.pool_id, id))
        } else {
            Err(invalid_handle(id))
        }
    }

    /// Destroys the entry a handle refers to, returning its value.
    ///
    /// The identifier is retired: every copy of the handle fails to resolve from now on and the
    /// identifier is never issued again. All other handles remain valid, although the storage
    /// position of other entries may change as governed by the pool's [`RemovalPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the entry has already been destroyed or if the handle
    /// was issued by a different pool. The pool is not modified in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<String>::new();
    /// let handle = pool.insert("Bob".to_string());
    ///
    /// let value = pool.destroy(handle).unwrap();
    /// assert_eq!(value, "Bob");
    ///
    /// assert!(pool.is_empty());
    /// assert!(pool.destroy(handle).is_err());
    /// ```
    pub fn destroy(&mut self, handle: Handle<T>) -> Result<T> {
        if handle.pool_id() != self.pool_id {
            return Err(invalid_handle(handle.id()));
        }

        let id = handle.id();

        // The map and the storage must apply the same strategy so positions keep matching.
        let (removal, value) = match self.removal_policy {
            RemovalPolicy::SwapRemove => {
                let removal = self.map.swap_remove(id).ok_or_else(|| invalid_handle(id))?;
                let value = self.entries.swap_remove(removal.slot.position());
                (removal, value)
            }
            RemovalPolicy::Ordered => {
                let removal = self
                    .map
                    .ordered_remove(id)
                    .ok_or_else(|| invalid_handle(id))?;
                let value = self.entries.remove(removal.slot.position());
                (removal, value)
            }
        };

        ENTRIES_DESTROYED.with(|e| e.observe_once());
        DESTROY_RELOCATED_ENTRIES.with(|e| e.observe(removal.relocated));

        Ok(value)
    }

    /// Destroys every entry in the pool.
    ///
    /// All identifiers issued so far are retired. New entries keep receiving fresh identifiers,
    /// so handles obtained before the call never resolve again.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<u32>::new();
    /// let old = pool.insert(1);
    ///
    /// pool.clear();
    /// let new = pool.insert(2);
    ///
    /// assert!(pool.get(old).is_err());
    /// assert_ne!(old.id(), new.id());
    /// ```
    pub fn clear(&mut self) {
        let destroyed = self.entries.len();

        self.map.clear();
        self.entries.clear();

        ENTRIES_DESTROYED.with(|e| e.batch(destroyed).observe_once());
    }

    /// The entries as a dense slice, in storage order.
    ///
    /// Under [`RemovalPolicy::Ordered`], storage order is the creation order of the entries.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.entries
    }

    /// The entries as a dense mutable slice, in storage order.
    #[must_use]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.entries
    }

    /// Iterates over `(handle, entry)` pairs in storage order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_pool::HandlePool;
    ///
    /// let mut pool = HandlePool::<u32>::new();
    /// let a = pool.insert(1);
    /// let b = pool.insert(2);
    ///
    /// let pairs = pool.iter().collect::<Vec<_>>();
    /// assert_eq!(pairs, vec![(a, &1), (b, &2)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pool_id: self.pool_id,
            ids: self.map.ids().iter(),
            entries: self.entries.iter(),
        }
    }

    /// Iterates over `(handle, entry)` pairs in storage order, with exclusive access to entries.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            pool_id: self.pool_id,
            ids: self.map.ids().iter(),
            entries: self.entries.iter_mut(),
        }
    }

    /// Takes a diagnostic snapshot of the storage and the indirection map.
    ///
    /// See [`PoolDump`] for details.
    #[must_use]
    pub fn dump(&self) -> PoolDump
    where
        T: fmt::Debug,
    {
        let slots = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                let owner = self
                    .map
                    .id_at(position)
                    .expect("every storage position has an owner in the reverse lookup");

                SlotDump::new(
                    SlotIndex::from_position(position),
                    owner,
                    format!("{entry:?}"),
                )
            })
            .collect();

        PoolDump::new(slots, self.map.sorted_mappings())
    }

    #[cfg(test)]
    #[mutants::skip] // This is essentially test logic, mutation is meaningless.
    pub(crate) fn integrity_check(&self) {
        assert_eq!(self.entries.len(), self.map.len());
        self.map.integrity_check();
    }
}

/// Reports a failed resolution and builds the matching error.
fn invalid_handle(id: HandleId) -> Error {
    INVALID_HANDLES.with(|e| e.observe_once());

    Error::InvalidHandle { id }
}

impl<T> Default for HandlePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for HandlePool<T> {
    fn drop(&mut self) {
        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                self.entries.is_empty(),
                "dropped a non-empty HandlePool<{}> with a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }
    }
}

impl<'p, T> IntoIterator for &'p HandlePool<T> {
    type Item = (Handle<T>, &'p T);
    type IntoIter = Iter<'p, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'p, T> IntoIterator for &'p mut HandlePool<T> {
    type Item = (Handle<T>, &'p mut T);
    type IntoIter = IterMut<'p, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over the `(handle, entry)` pairs of a [`HandlePool`], in storage order.
///
/// Created by [`HandlePool::iter()`].
#[derive(Debug)]
pub struct Iter<'p, T> {
    pool_id: PoolId,
    ids: slice::Iter<'p, HandleId>,
    entries: slice::Iter<'p, T>,
}

impl<'p, T> Iterator for Iter<'p, T> {
    type Item = (Handle<T>, &'p T);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        let id = self
            .ids
            .next()
            .expect("the reverse lookup has exactly one identifier per storage entry");

        Some((Handle::new(self.pool_id, *id), entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over the `(handle, entry)` pairs of a [`HandlePool`] with exclusive access to the
/// entries, in storage order.
///
/// Created by [`HandlePool::iter_mut()`].
#[derive(Debug)]
pub struct IterMut<'p, T> {
    pool_id: PoolId,
    ids: slice::Iter<'p, HandleId>,
    entries: slice::IterMut<'p, T>,
}

impl<'p, T> Iterator for IterMut<'p, T> {
    type Item = (Handle<T>, &'p mut T);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        let id = self
            .ids
            .next()
            .expect("the reverse lookup has exactly one identifier per storage entry");

        Some((Handle::new(self.pool_id, *id), entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}
