// -*- coding: utf-8 -*-
//
// Copyright 2025 Michael Büsch <m@bues.ch>
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT
//

use crate::error::{Error, Result};
use std::num::NonZeroUsize;

/// Number of stripes used by [StripedLocksConfig::default].
pub const DEFAULT_STRIPE_COUNT: usize = 16;

/// A validated, positive number of lock stripes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StripeCount(NonZeroUsize);

impl StripeCount {
    /// Construct a new [StripeCount].
    ///
    /// Returns [Error::InvalidConfiguration], if `count` is 0.
    pub fn new(count: usize) -> Result<StripeCount> {
        match NonZeroUsize::new(count) {
            Some(count) => Ok(StripeCount(count)),
            None => {
                tracing::warn!(stripe_count = count, "rejecting zero stripe count");
                Err(Error::InvalidConfiguration { stripe_count: 0 })
            }
        }
    }

    /// Get the number of stripes.
    #[inline]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for StripeCount {
    fn default() -> Self {
        StripeCount(NonZeroUsize::new(DEFAULT_STRIPE_COUNT).unwrap_or(NonZeroUsize::MIN))
    }
}

impl TryFrom<usize> for StripeCount {
    type Error = Error;

    fn try_from(count: usize) -> Result<StripeCount> {
        StripeCount::new(count)
    }
}

impl TryFrom<i64> for StripeCount {
    type Error = Error;

    fn try_from(count: i64) -> Result<StripeCount> {
        if count <= 0 {
            tracing::warn!(stripe_count = count, "rejecting non-positive stripe count");
            return Err(Error::InvalidConfiguration {
                stripe_count: count,
            });
        }
        let count = usize::try_from(count).map_err(|_| Error::InvalidConfiguration {
            stripe_count: count,
        })?;
        StripeCount::new(count)
    }
}

/// Construction parameters for [crate::StripedLocks].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripedLocksConfig {
    /// Number of lock stripes the key space is partitioned into.
    pub stripe_count: StripeCount,
}

impl StripedLocksConfig {
    /// Construct a config with `stripe_count` stripes.
    pub fn new(stripe_count: usize) -> Result<StripedLocksConfig> {
        Ok(StripedLocksConfig {
            stripe_count: StripeCount::new(stripe_count)?,
        })
    }
}


// vim: ts=4 sw=4 expandtab
