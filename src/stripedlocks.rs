// -*- coding: utf-8 -*-
//
// Copyright 2025 Michael Büsch <m@bues.ch>
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT
//

use crate::{
    config::StripedLocksConfig,
    error::Result,
    guard::StripedLockGuard,
    stripetable::{StripeHasher, StripeTable},
};
use std::{
    hash::{BuildHasher, Hash},
    time::{Duration, Instant},
};

/// Striped multi-thread read-write lock for keyed resources.
///
/// Keys are hashed onto a fixed number of stripes.
/// Locking a key locks its stripe,
/// so keys on different stripes can be locked concurrently.
///
/// # Example
///
/// ```
/// use striped_lock::StripedLocks;
/// use std::{collections::HashMap, sync::{Arc, Mutex}, thread};
///
/// let locks = Arc::new(StripedLocks::new(16).expect("Invalid stripe count"));
/// let store = Arc::new(Mutex::new(HashMap::new()));
///
/// thread::scope(|s| {
///     for t in 0..4 {
///         let locks = Arc::clone(&locks);
///         let store = Arc::clone(&store);
///         s.spawn(move || {
///             let key = format!("workspace-{t}");
///             let _guard = locks.write_lock(&key);
///             store.lock().unwrap().insert(key, t);
///         });
///     }
/// });
///
/// {
///     let _guard = locks.read_lock("workspace-2");
///     assert_eq!(store.lock().unwrap()["workspace-2"], 2);
/// }
///
/// // Exclude every key at once.
/// let guard = locks.write_all_lock();
/// assert_eq!(store.lock().unwrap().len(), 4);
/// guard.release();
/// ```
#[derive(Debug)]
pub struct StripedLocks<S = StripeHasher> {
    table: StripeTable<S>,
}

impl StripedLocks<StripeHasher> {
    /// Construct a new [StripedLocks] with `stripe_count` stripes.
    ///
    /// Returns [crate::Error::InvalidConfiguration], if `stripe_count` is 0.
    pub fn new(stripe_count: usize) -> Result<StripedLocks<StripeHasher>> {
        StripedLocks::with_hasher(stripe_count, StripeHasher)
    }

    /// Construct a new [StripedLocks] from `config`.
    pub fn from_config(config: &StripedLocksConfig) -> StripedLocks<StripeHasher> {
        StripedLocks {
            table: StripeTable::with_count(config.stripe_count, StripeHasher),
        }
    }
}

impl Default for StripedLocks<StripeHasher> {
    fn default() -> Self {
        StripedLocks::from_config(&StripedLocksConfig::default())
    }
}

impl<S: BuildHasher> StripedLocks<S> {
    /// Construct a new [StripedLocks] that maps keys onto stripes with `hasher`.
    pub fn with_hasher(stripe_count: usize, hasher: S) -> Result<StripedLocks<S>> {
        Ok(StripedLocks {
            table: StripeTable::with_hasher(stripe_count, hasher)?,
        })
    }

    /// Get the stripe index of `key`.
    #[inline]
    pub fn stripe_for<K: Hash + ?Sized>(&self, key: &K) -> usize {
        self.table.stripe_for(key)
    }

    /// Lock the stripe of `key` for shared access.
    ///
    /// Blocks the current thread until no writer holds the stripe.
    pub fn read_lock<K: Hash + ?Sized>(&self, key: &K) -> StripedLockGuard<'_> {
        let (stripe, lock) = self.table.stripe_of(key);
        StripedLockGuard::read(stripe, lock.read())
    }

    /// Lock the stripe of `key` for exclusive access.
    ///
    /// Blocks the current thread until no reader or writer holds the stripe.
    pub fn write_lock<K: Hash + ?Sized>(&self, key: &K) -> StripedLockGuard<'_> {
        let (stripe, lock) = self.table.stripe_of(key);
        StripedLockGuard::write(stripe, lock.write())
    }

    /// Try to lock the stripe of `key` for shared access without blocking.
    ///
    /// Returns `None`, if a writer holds the stripe.
    pub fn try_read_lock<K: Hash + ?Sized>(&self, key: &K) -> Option<StripedLockGuard<'_>> {
        let (stripe, lock) = self.table.stripe_of(key);
        let guard = lock.try_read()?;
        Some(StripedLockGuard::read(stripe, guard))
    }

    /// Try to lock the stripe of `key` for exclusive access without blocking.
    ///
    /// Returns `None`, if the stripe is contended.
    pub fn try_write_lock<K: Hash + ?Sized>(&self, key: &K) -> Option<StripedLockGuard<'_>> {
        let (stripe, lock) = self.table.stripe_of(key);
        let guard = lock.try_write()?;
        Some(StripedLockGuard::write(stripe, guard))
    }

    /// Lock the stripe of `key` for shared access, waiting at most `timeout`.
    pub fn read_lock_for<K: Hash + ?Sized>(
        &self,
        key: &K,
        timeout: Duration,
    ) -> Option<StripedLockGuard<'_>> {
        let (stripe, lock) = self.table.stripe_of(key);
        match lock.try_read_for(timeout) {
            Some(guard) => Some(StripedLockGuard::read(stripe, guard)),
            None => {
                tracing::debug!(stripe, ?timeout, "read lock timed out");
                None
            }
        }
    }

    /// Lock the stripe of `key` for exclusive access, waiting at most `timeout`.
    pub fn write_lock_for<K: Hash + ?Sized>(
        &self,
        key: &K,
        timeout: Duration,
    ) -> Option<StripedLockGuard<'_>> {
        let (stripe, lock) = self.table.stripe_of(key);
        match lock.try_write_for(timeout) {
            Some(guard) => Some(StripedLockGuard::write(stripe, guard)),
            None => {
                tracing::debug!(stripe, ?timeout, "write lock timed out");
                None
            }
        }
    }
}

impl<S> StripedLocks<S> {
    /// Get the underlying [StripeTable].
    #[inline]
    pub fn stripes(&self) -> &StripeTable<S> {
        &self.table
    }

    /// Get the number of stripes.
    #[inline]
    pub fn size(&self) -> usize {
        self.table.size()
    }

    /// Lock all stripes for exclusive access.
    ///
    /// The stripes are locked in ascending index order.
    /// Concurrent callers therefore cannot deadlock against each other.
    /// Blocks the current thread until every stripe is held.
    pub fn write_all_lock(&self) -> StripedLockGuard<'_> {
        let guards = self.table.iter().map(|stripe| stripe.write()).collect();
        StripedLockGuard::write_all(guards)
    }

    /// Try to lock all stripes for exclusive access without blocking.
    ///
    /// Returns `None`, if any stripe is contended.
    /// Stripes taken before the contended one are released again.
    pub fn try_write_all_lock(&self) -> Option<StripedLockGuard<'_>> {
        let guards = self
            .table
            .iter()
            .map(|stripe| stripe.try_write())
            .collect::<Option<Vec<_>>>()?;
        Some(StripedLockGuard::write_all(guards))
    }

    /// Lock all stripes for exclusive access, waiting at most `timeout` in total.
    ///
    /// On timeout the stripes taken so far are released again and `None` is returned.
    pub fn write_all_lock_for(&self, timeout: Duration) -> Option<StripedLockGuard<'_>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut guards = Vec::with_capacity(self.size());
        for (index, stripe) in self.table.iter().enumerate() {
            let guard = match deadline {
                Some(deadline) => stripe.try_write_until(deadline),
                // Unrepresentable deadline. Wait forever.
                None => Some(stripe.write()),
            };
            match guard {
                Some(guard) => guards.push(guard),
                None => {
                    tracing::debug!(stripe = index, ?timeout, "write lock on all stripes timed out");
                    return None;
                }
            }
        }
        Some(StripedLockGuard::write_all(guards))
    }
}


// vim: ts=4 sw=4 expandtab
