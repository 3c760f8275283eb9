// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ids_are_unique_and_ascending() {
    let gen = FireInstanceIdGenerator::with_seed(1_700_000_000_000_000_000);
    let a = gen.next();
    let b = gen.next();
    let c = gen.next();
    assert_ne!(a, b);
    assert!(a < b);
    assert!(b < c);
}

#[test]
fn ids_are_fixed_width() {
    let gen = FireInstanceIdGenerator::with_seed(1);
    assert_eq!(gen.next().len(), 19);
}

#[test]
fn concurrent_increments_never_collide() {
    use std::sync::Arc;
    let gen = Arc::new(FireInstanceIdGenerator::with_seed(0));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let gen = gen.clone();
        handles.push(std::thread::spawn(move || {
            (0..100).map(|_| gen.next()).collect::<Vec<_>>()
        }));
    }
    let mut all = Vec::new();
    for h in handles {
        all.extend(h.join().unwrap());
    }
    let unique: std::collections::HashSet<_> = all.iter().cloned().collect();
    assert_eq!(unique.len(), all.len());
}
