// -*- coding: utf-8 -*-
//
// Copyright 2025 Michael Büsch <m@bues.ch>
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT
//

extern crate striped_lock;
use std::hash::{BuildHasherDefault, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;
use striped_lock::{Error, LockMode, StripeCount, StripedLocks};

/// Sums up the hashed bytes. Makes stripe assignment predictable.
#[derive(Default)]
struct ByteSumHasher(u64);

impl Hasher for ByteSumHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 += u64::from(*b);
        }
    }
}

type FixedLocks = StripedLocks<BuildHasherDefault<ByteSumHasher>>;

fn fixed_locks(stripe_count: usize) -> Arc<FixedLocks> {
    Arc::new(StripedLocks::with_hasher(stripe_count, Default::default()).unwrap())
}

/// Run `f` on another thread and report whether it finished within `wait`.
fn finishes_within<F>(wait: Duration, f: F) -> (bool, thread::JoinHandle<()>)
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let j = thread::spawn(move || {
        f();
        let _ = tx.send(());
    });
    (rx.recv_timeout(wait).is_ok(), j)
}

const SHORT: Duration = Duration::from_millis(100);
const LONG: Duration = Duration::from_secs(10);

#[test]
fn test_invalid_configuration() {
    assert_eq!(
        StripedLocks::new(0).unwrap_err(),
        Error::InvalidConfiguration { stripe_count: 0 }
    );
    assert_eq!(
        StripeCount::try_from(-4_i64).unwrap_err(),
        Error::InvalidConfiguration { stripe_count: -4 }
    );
}

#[test]
fn test_single_stripe_is_global() {
    let l = StripedLocks::new(1).unwrap();
    for key in ["", "a", "b", "c", "d"] {
        assert_eq!(l.stripe_for(key), 0);
    }
    let _g = l.write_lock("a");
    assert!(l.try_read_lock("b").is_none());
}

#[test]
fn test_fixed_hash_assignment() {
    // str hashing writes the bytes plus a 0xff terminator.
    let l = fixed_locks(4);
    assert_eq!(l.stripe_for("a"), (97 + 255) % 4);
    assert_eq!(l.stripe_for("a"), 0);
    assert_eq!(l.stripe_for("b"), 1);
    assert_eq!(l.stripe_for("c"), 2);
    assert_eq!(l.stripe_for("d"), 3);
    assert_eq!(l.stripe_for("e"), 0);
}

#[test]
fn test_write_distinct_stripes_concurrent() {
    let l = fixed_locks(4);
    let ba0 = Arc::new(Barrier::new(2));
    let ba1 = Arc::clone(&ba0);
    let l0 = Arc::clone(&l);
    let l1 = Arc::clone(&l);

    // Both writers hold their stripe while waiting for each other.
    let j0 = thread::spawn(move || {
        let g = l0.write_lock("a");
        assert_eq!(g.stripes(), 0..1);
        ba0.wait();
    });
    let j1 = thread::spawn(move || {
        let g = l1.write_lock("b");
        assert_eq!(g.stripes(), 1..2);
        ba1.wait();
    });
    j0.join().expect("Thread 0 panicked.");
    j1.join().expect("Thread 1 panicked.");
}

#[test]
fn test_write_same_stripe_serializes() {
    let l = fixed_locks(4);
    let g = l.write_lock("a");

    let l1 = Arc::clone(&l);
    let done = Arc::new(AtomicBool::new(false));
    let done1 = Arc::clone(&done);
    let (finished, j) = finishes_within(SHORT, move || {
        // "e" collides with "a".
        let _g = l1.write_lock("e");
        done1.store(true, Ordering::SeqCst);
    });
    assert!(!finished);
    assert!(!done.load(Ordering::SeqCst));

    g.release();
    j.join().expect("Writer thread panicked.");
    assert!(done.load(Ordering::SeqCst));
}

#[test]
fn test_concurrent_readers() {
    let l = Arc::new(StripedLocks::new(4).unwrap());
    let n = 4;
    let ba = Arc::new(Barrier::new(n));
    let js: Vec<_> = (0..n)
        .map(|_| {
            let l = Arc::clone(&l);
            let ba = Arc::clone(&ba);
            thread::spawn(move || {
                let g = l.read_lock("config");
                assert_eq!(g.mode(), LockMode::Read);
                ba.wait();
            })
        })
        .collect();
    for j in js {
        j.join().expect("Reader thread panicked.");
    }
}

#[test]
fn test_writer_waits_for_readers() {
    let l = Arc::new(StripedLocks::new(4).unwrap());
    let r0 = l.read_lock("doc");
    let r1 = l.read_lock("doc");

    let l1 = Arc::clone(&l);
    let (finished, j) = finishes_within(SHORT, move || {
        let _g = l1.write_lock("doc");
    });
    assert!(!finished);
    r0.release();
    assert!(l.write_lock_for("doc", Duration::from_millis(10)).is_none());
    r1.release();
    j.join().expect("Writer thread panicked.");
}

#[test]
fn test_write_all_excludes_everything() {
    let l = Arc::new(StripedLocks::new(8).unwrap());
    let g = l.write_all_lock();
    assert_eq!(g.stripes(), 0..8);

    let blocked = Arc::new(AtomicUsize::new(0));
    let mut js = Vec::new();
    for i in 0..4 {
        let l = Arc::clone(&l);
        let blocked = Arc::clone(&blocked);
        let (finished, j) = finishes_within(SHORT, move || {
            match i {
                0 => drop(l.read_lock("a")),
                1 => drop(l.write_lock("b")),
                2 => drop(l.read_lock(&format!("k{i}"))),
                _ => drop(l.write_all_lock()),
            }
            blocked.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!finished);
        js.push(j);
    }
    assert_eq!(blocked.load(Ordering::SeqCst), 0);

    g.release();
    for j in js {
        j.join().expect("Locker thread panicked.");
    }
    assert_eq!(blocked.load(Ordering::SeqCst), 4);
}

#[test]
fn test_write_all_mutual_exclusion() {
    let l = Arc::new(StripedLocks::new(16).unwrap());
    let holders = Arc::new(AtomicUsize::new(0));
    let js: Vec<_> = (0..4)
        .map(|_| {
            let l = Arc::clone(&l);
            let holders = Arc::clone(&holders);
            thread::spawn(move || {
                for _ in 0..100 {
                    let _g = l.write_all_lock();
                    assert_eq!(holders.fetch_add(1, Ordering::SeqCst), 0);
                    thread::yield_now();
                    holders.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for j in js {
        j.join().expect("Global locker thread panicked.");
    }
}

#[test]
fn test_mixed_no_leak() {
    let l = Arc::new(StripedLocks::new(4).unwrap());
    let js: Vec<_> = (0..8)
        .map(|t| {
            let l = Arc::clone(&l);
            thread::spawn(move || {
                for i in 0..200 {
                    let key = format!("item-{}", (t * 7 + i) % 13);
                    match i % 5 {
                        0 => l.write_all_lock().release(),
                        1 | 2 => l.write_lock(&key).release(),
                        _ => l.read_lock(&key).release(),
                    }
                }
            })
        })
        .collect();
    for j in js {
        j.join().expect("Worker thread panicked.");
    }
    assert!(l.stripes().iter().all(|s| !s.is_locked()));

    // A fresh thread acquires promptly after all releases.
    let l1 = Arc::clone(&l);
    let (finished, j) = finishes_within(LONG, move || {
        l1.write_all_lock().release();
    });
    assert!(finished);
    j.join().expect("Final locker panicked.");
}

// vim: ts=4 sw=4 expandtab
