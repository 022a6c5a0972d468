#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! An object pool with dense storage that hands out stable, reuse-safe handles.
//!
//! This crate provides [`HandlePool<T>`], a container that keeps its entries contiguously in
//! memory for cache-friendly iteration while external code refers to entries through
//! [`Handle<T>`] tokens instead of raw indices or pointers.
//!
//! Plain indices into a vector break as soon as the vector is compacted: indices shift, and a
//! slot freed and then reused silently makes a stale index point at unrelated data. Handles
//! solve both problems:
//!
//! * **Stability**: a handle keeps resolving to its entry while other entries are created and
//!   destroyed, even though entries move around inside the storage.
//! * **Dangling detection**: once an entry is destroyed, every copy of its handle fails to
//!   resolve with [`Error::InvalidHandle`].
//! * **No aliasing**: identifiers are never reused, so a stale handle never resolves to an entry
//!   created later. Handles presented to a pool other than the one that issued them are rejected
//!   as well.
//!
//! # Key Features
//!
//! - **Dense storage**: entries are available as one slice via [`HandlePool::values()`]
//! - **Copyable handles**: [`Handle<T>`] is `Copy` regardless of `T`, all copies share one entry
//! - **Two removal strategies**: O(1) swap-removal or order-preserving removal, see
//!   [`RemovalPolicy`]
//! - **Re-acquisition by identifier**: [`HandlePool::get_by_id()`] turns a stored [`HandleId`]
//!   back into a handle
//! - **Diagnostics**: [`HandlePool::dump()`] produces a printable snapshot of the storage and
//!   the indirection map
//! - **Flexible drop policies**: optionally panic if a pool is dropped while still holding entries
//!
//! # Example
//!
//! ```rust
//! use handle_pool::HandlePool;
//!
//! #[derive(Debug, Default)]
//! struct Model {
//!     a: i32,
//!     b: i32,
//! }
//!
//! let mut scene = HandlePool::<Model>::new();
//!
//! let go1 = scene.create();
//! let go2 = scene.create();
//! let go3 = scene.create();
//!
//! go1.resolve(&mut scene).unwrap().a = 10;
//! go2.resolve(&mut scene).unwrap().a = 5;
//! go3.resolve(&mut scene).unwrap().a = 6;
//!
//! scene.destroy(go2).unwrap();
//!
//! // Other handles are not affected by the removal.
//! assert_eq!(go1.get(&scene).unwrap().a, 10);
//! assert_eq!(go3.get(&scene).unwrap().a, 6);
//!
//! // The destroyed entry can no longer be reached.
//! assert!(go2.get(&scene).is_err());
//! assert!(scene.get_by_id(go2.id()).is_err());
//!
//! println!("{}", scene.dump());
//! ```
//!
//! # Metrics
//!
//! The pool reports entry creation, destruction, failed resolutions and the number of entries
//! relocated per removal as [`nm`] events. Collect them with `nm::Report::collect()`.

mod builder;
mod drop_policy;
mod dump;
mod error;
mod handle;
mod indirection;
mod metrics;
mod pool;
mod removal_policy;

pub use builder::*;
pub use drop_policy::*;
pub use dump::*;
pub use error::*;
pub use handle::{Handle, HandleId};
pub(crate) use handle::PoolId;
pub(crate) use indirection::IndirectionMap;
pub use indirection::SlotIndex;
pub use pool::*;
pub use removal_policy::*;
