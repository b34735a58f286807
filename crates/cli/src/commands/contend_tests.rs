// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn occupancy_flags_overlap_only_when_nested() {
    let occupancy = Occupancy::default();

    occupancy.enter(0);
    occupancy.leave();
    occupancy.enter(1);
    assert!(!occupancy.overlap.load(Ordering::SeqCst));

    occupancy.enter(2);
    assert!(occupancy.overlap.load(Ordering::SeqCst));
    assert_eq!(*occupancy.order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn text_report_shows_order_and_overlap() {
    let report = ContendReport {
        name: "build".to_string(),
        workers: 3,
        order: vec![2, 0, 1],
        missed: 0,
        overlap: false,
    };

    assert_eq!(
        report.to_string(),
        "lock: build\nacquired: 3/3\norder: 2 0 1\noverlap: none"
    );
}
