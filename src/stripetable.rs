// -*- coding: utf-8 -*-
//
// Copyright 2025 Michael Büsch <m@bues.ch>
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT
//

use crate::{
    config::StripeCount,
    error::{Error, Result},
};
use parking_lot::RwLock;
use siphasher::sip::SipHasher13;
use std::hash::{BuildHasher, Hash};

/// Default key hasher of a [StripeTable].
///
/// SipHash-1-3 with fixed all-zero keys.
/// The stripe of a key therefore does not change between processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripeHasher;

impl BuildHasher for StripeHasher {
    type Hasher = SipHasher13;

    #[inline]
    fn build_hasher(&self) -> SipHasher13 {
        SipHasher13::new()
    }
}

/// Fixed size table of read-write lock stripes.
///
/// Every key is mapped onto exactly one stripe.
/// Distinct keys may share a stripe.
///
/// # Example
///
/// ```
/// use striped_lock::StripeTable;
///
/// let table = StripeTable::new(4).expect("4 is a valid stripe count");
/// assert_eq!(table.size(), 4);
///
/// let stripe = table.stripe_for("user:42");
/// assert!(stripe < 4);
/// assert_eq!(stripe, table.stripe_for("user:42"));
///
/// let _guard = table.stripe_at(stripe).unwrap().write();
/// ```
#[derive(Debug)]
pub struct StripeTable<S = StripeHasher> {
    /// The stripes. Allocated once, never resized.
    stripes: Box<[RwLock<()>]>,
    /// Hasher used to map keys onto stripes.
    hasher: S,
}

impl StripeTable<StripeHasher> {
    /// Construct a new [StripeTable] with `stripe_count` stripes.
    ///
    /// Returns [Error::InvalidConfiguration], if `stripe_count` is 0.
    pub fn new(stripe_count: usize) -> Result<StripeTable<StripeHasher>> {
        StripeTable::with_hasher(stripe_count, StripeHasher)
    }
}

impl<S: BuildHasher> StripeTable<S> {
    /// Construct a new [StripeTable] that hashes keys with `hasher`.
    ///
    /// * `stripe_count`: The number of stripes. Must be >0.
    /// * `hasher`: Builds the hasher used by [StripeTable::stripe_for].
    pub fn with_hasher(stripe_count: usize, hasher: S) -> Result<StripeTable<S>> {
        let count = StripeCount::new(stripe_count)?;
        Ok(StripeTable::with_count(count, hasher))
    }

    /// Construct a new [StripeTable] from an already validated [StripeCount].
    pub fn with_count(count: StripeCount, hasher: S) -> StripeTable<S> {
        let stripes: Box<[RwLock<()>]> = (0..count.get()).map(|_| RwLock::new(())).collect();
        tracing::debug!(stripe_count = stripes.len(), "created stripe table");
        StripeTable { stripes, hasher }
    }

    /// Get the stripe index of `key`.
    ///
    /// The result is always in `0..self.size()`
    /// and never changes for the lifetime of the table.
    #[inline]
    pub fn stripe_for<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let hash = self.hasher.hash_one(key);
        // The remainder is smaller than the stripe count, which is a usize.
        (hash % self.stripes.len() as u64) as usize
    }

    /// Get the stripe index of `key` together with the stripe lock.
    #[inline]
    pub fn stripe_of<K: Hash + ?Sized>(&self, key: &K) -> (usize, &RwLock<()>) {
        let index = self.stripe_for(key);
        (index, &self.stripes[index])
    }
}

impl<S> StripeTable<S> {
    /// Get the number of stripes.
    #[inline]
    pub fn size(&self) -> usize {
        self.stripes.len()
    }

    /// Get the stripe lock at `index`.
    ///
    /// Returns [Error::IndexOutOfRange], if `index` is not in `0..self.size()`.
    #[inline]
    pub fn stripe_at(&self, index: usize) -> Result<&RwLock<()>> {
        self.stripes.get(index).ok_or(Error::IndexOutOfRange {
            index,
            size: self.size(),
        })
    }

    /// Iterate over all stripes in ascending index order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, RwLock<()>> {
        self.stripes.iter()
    }

    /// Get the [BuildHasher] of this table.
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<'a, S> IntoIterator for &'a StripeTable<S> {
    type Item = &'a RwLock<()>;
    type IntoIter = std::slice::Iter<'a, RwLock<()>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


// vim: ts=4 sw=4 expandtab
