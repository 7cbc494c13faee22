// -*- coding: utf-8 -*-
//
// Copyright 2025 Michael Büsch <m@bues.ch>
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT
//

use thiserror::Error;

/// Errors reported by the striped lock types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested number of stripes is not positive.
    #[error("Invalid stripe count {stripe_count}. It must be > 0.")]
    InvalidConfiguration { stripe_count: i64 },

    /// A stripe index outside of `0..size` was requested.
    #[error("Stripe index {index} is out of range. It must be 0 <= index < {size}.")]
    IndexOutOfRange { index: usize, size: usize },
}

pub type Result<T> = std::result::Result<T, Error>;


// vim: ts=4 sw=4 expandtab
