// -*- coding: utf-8 -*-
//
// Copyright 2025 Michael Büsch <m@bues.ch>
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT
//

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use std::{fmt, ops::Range};

/// Access mode held by a [StripedLockGuard].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Shared access. Other readers of the stripe may proceed.
    Read,
    /// Exclusive access.
    Write,
}

enum Held<'a> {
    Read {
        stripe: usize,
        _guard: RwLockReadGuard<'a, ()>,
    },
    Write {
        stripe: usize,
        _guard: RwLockWriteGuard<'a, ()>,
    },
    /// Write guards of all stripes. Element i belongs to stripe i.
    WriteAll(Vec<RwLockWriteGuard<'a, ()>>),
}

/// Lock guard variable type for [crate::StripedLocks].
///
/// The stripe(s) are released when the guard is dropped
/// or when [StripedLockGuard::release] is called.
/// See the documentation of [crate::StripedLocks] for usage examples.
#[must_use = "if unused the stripe(s) will immediately be released"]
pub struct StripedLockGuard<'a> {
    held: Held<'a>,
}

impl<'a> StripedLockGuard<'a> {
    #[inline]
    pub(crate) fn read(stripe: usize, guard: RwLockReadGuard<'a, ()>) -> StripedLockGuard<'a> {
        tracing::trace!(stripe, "acquired read lock");
        StripedLockGuard {
            held: Held::Read {
                stripe,
                _guard: guard,
            },
        }
    }

    #[inline]
    pub(crate) fn write(stripe: usize, guard: RwLockWriteGuard<'a, ()>) -> StripedLockGuard<'a> {
        tracing::trace!(stripe, "acquired write lock");
        StripedLockGuard {
            held: Held::Write {
                stripe,
                _guard: guard,
            },
        }
    }

    /// `guards` must hold the write guards of all stripes in ascending index order.
    #[inline]
    pub(crate) fn write_all(guards: Vec<RwLockWriteGuard<'a, ()>>) -> StripedLockGuard<'a> {
        tracing::trace!(stripes = guards.len(), "acquired write lock on all stripes");
        StripedLockGuard {
            held: Held::WriteAll(guards),
        }
    }

    /// Get the access mode of this guard.
    #[inline]
    pub fn mode(&self) -> LockMode {
        match self.held {
            Held::Read { .. } => LockMode::Read,
            Held::Write { .. } | Held::WriteAll(_) => LockMode::Write,
        }
    }

    /// Get the indices of the stripes held by this guard.
    #[inline]
    pub fn stripes(&self) -> Range<usize> {
        match &self.held {
            Held::Read { stripe, .. } | Held::Write { stripe, .. } => *stripe..*stripe + 1,
            Held::WriteAll(guards) => 0..guards.len(),
        }
    }

    /// Release all stripes held by this guard.
    ///
    /// This is the same as dropping the guard.
    #[inline]
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for StripedLockGuard<'_> {
    fn drop(&mut self) {
        match &mut self.held {
            Held::Read { stripe, .. } => tracing::trace!(stripe = *stripe, "releasing read lock"),
            Held::Write { stripe, .. } => {
                tracing::trace!(stripe = *stripe, "releasing write lock")
            }
            Held::WriteAll(guards) => {
                tracing::trace!(stripes = guards.len(), "releasing write lock on all stripes");
                // Reverse acquisition order.
                while let Some(guard) = guards.pop() {
                    drop(guard);
                }
            }
        }
    }
}

impl fmt::Debug for StripedLockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripedLockGuard")
            .field("mode", &self.mode())
            .field("stripes", &self.stripes())
            .finish()
    }
}


// vim: ts=4 sw=4 expandtab
