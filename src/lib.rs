// -*- coding: utf-8 -*-
//
// Copyright 2025 Michael Büsch <m@bues.ch>
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT
//

//! Striped read-write locks.
//!
//! [StripedLocks] partitions an unbounded key space onto a fixed number of
//! read-write lock stripes. Keys on different stripes can be locked concurrently.
//! Every lock operation returns a [StripedLockGuard], which releases the stripe(s)
//! when it goes out of scope.

mod config;
mod error;
mod guard;
mod stripedlocks;
mod stripetable;

pub use config::{StripeCount, StripedLocksConfig, DEFAULT_STRIPE_COUNT};
pub use error::{Error, Result};
pub use guard::{LockMode, StripedLockGuard};
pub use stripedlocks::StripedLocks;
pub use stripetable::{StripeHasher, StripeTable};

// vim: ts=4 sw=4 expandtab
