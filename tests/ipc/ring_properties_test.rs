/*!
 * Ring Buffer Property Tests
 * Random operation sequences checked against a queue model
 */

use proptest::prelude::*;
use shm_transport::{HeapRegion, RingBuffer, TimeoutPolicy};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
    Peek(usize),
    Skip(usize),
}

fn op_strategy(capacity: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 1..=capacity).prop_map(Op::Write),
        3 => (1..=capacity).prop_map(Op::Read),
        1 => (1..=capacity).prop_map(Op::Peek),
        1 => (0..=capacity).prop_map(Op::Skip),
    ]
}

fn scenario() -> impl Strategy<Value = (usize, Vec<Op>)> {
    (1usize..=32).prop_flat_map(|capacity| (Just(capacity), prop::collection::vec(op_strategy(capacity), 1..64)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matches_queue_model((capacity, ops) in scenario()) {
        let mut region = HeapRegion::for_capacity(capacity);
        let mut ring = RingBuffer::create(region.as_mut_slice(), capacity, TimeoutPolicy::blocking()).unwrap();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                // Only issue calls the model says complete without blocking
                Op::Write(data) if capacity - model.len() >= data.len() => {
                    prop_assert_eq!(ring.write(&data).unwrap(), data.len());
                    model.extend(data);
                }
                Op::Read(n) if model.len() >= n => {
                    let mut out = vec![0u8; n];
                    ring.read(&mut out).unwrap();
                    let expected: Vec<u8> = model.drain(..n).collect();
                    prop_assert_eq!(out, expected);
                }
                Op::Peek(n) if model.len() >= n => {
                    let before = ring.snapshot();
                    let mut out = vec![0u8; n];
                    ring.peek(&mut out).unwrap();
                    let expected: Vec<u8> = model.iter().take(n).copied().collect();
                    prop_assert_eq!(out, expected);
                    prop_assert_eq!(ring.snapshot(), before);
                }
                Op::Skip(n) if model.len() >= n => {
                    prop_assert_eq!(ring.skip(n).unwrap(), n);
                    model.drain(..n);
                }
                Op::Skip(n) => {
                    prop_assert!(ring.skip(n).is_err());
                }
                _ => {}
            }

            let snapshot = ring.snapshot();
            prop_assert!(snapshot.is_consistent());
            prop_assert_eq!(snapshot.size as usize, model.len());
            prop_assert_eq!(ring.len() + ring.free_space(), capacity);
        }
    }

    #[test]
    fn prop_oversized_requests_rejected(capacity in 1usize..=64, extra in 1usize..=16) {
        let mut region = HeapRegion::for_capacity(capacity);
        let mut ring = RingBuffer::create(region.as_mut_slice(), capacity, TimeoutPolicy::blocking()).unwrap();
        let data = vec![0u8; capacity + extra];
        prop_assert!(ring.write(&data).is_err());
        let mut out = vec![0u8; capacity + extra];
        prop_assert!(ring.read(&mut out).is_err());
        prop_assert!(ring.skip(capacity + extra).is_err());
        prop_assert!(ring.is_empty());
    }

    #[test]
    fn prop_policy_validation(timeout in 0u64..1_000_000, a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let result = TimeoutPolicy::new(timeout, [a, b]);
        let ordered = a <= b;
        let bounded = timeout == 0 || (a < timeout && b < timeout);
        prop_assert_eq!(result.is_ok(), ordered && bounded);
    }
}
