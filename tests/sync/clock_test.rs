/*!
 * Cycle Clock Tests
 */

use shm_transport::core::clock;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_cycles_track_wall_clock() {
    let wall = Instant::now();
    let start = clock::now();
    thread::sleep(Duration::from_millis(20));
    let cycles = clock::elapsed_since(start);
    let measured = clock::to_duration(cycles);
    let actual = wall.elapsed();

    // Calibration error stays well inside a factor of two
    assert!(measured >= actual / 2, "{:?} vs {:?}", measured, actual);
    assert!(measured <= actual * 2, "{:?} vs {:?}", measured, actual);
}

#[test]
fn test_calibration_is_cached() {
    let first = clock::cycles_per_micro();
    let second = clock::cycles_per_micro();
    assert_eq!(first.to_bits(), second.to_bits());
    assert!(first >= 1.0);
}
