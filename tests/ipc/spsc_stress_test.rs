/*!
 * SPSC Stress Tests
 * One writer thread and one reader thread over a small ring
 */

use pretty_assertions::assert_eq;
use shm_transport::{HeapRegion, RingBuffer, TimeoutPolicy};
use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

const CAPACITY: usize = 64;
const TOTAL: usize = 256 * 1024;

fn pattern(i: usize) -> u8 {
    (i % 251) as u8
}

fn stress_policy() -> TimeoutPolicy {
    TimeoutPolicy::from_durations(Duration::from_secs(30), Duration::from_micros(20), Duration::from_micros(200)).unwrap()
}

#[test]
fn test_ordered_delivery_with_mixed_chunks() {
    let mut region = HeapRegion::for_capacity(CAPACITY);
    let mut ring = RingBuffer::create(region.as_mut_slice(), CAPACITY, stress_policy()).unwrap();
    let (mut producer, mut consumer) = ring.split();

    let received = thread::scope(|s| {
        s.spawn(move || {
            let mut sent = 0;
            let mut step = 0;
            while sent < TOTAL {
                // At most half the capacity so an all-or-nothing reader and
                // writer can always make progress
                let len = (1 + step % (CAPACITY / 2)).min(TOTAL - sent);
                let chunk: Vec<u8> = (sent..sent + len).map(pattern).collect();
                producer.write(&chunk).unwrap();
                sent += len;
                step += 7;
            }
        });

        let reader = s.spawn(move || {
            let mut received = Vec::with_capacity(TOTAL);
            let mut step = 0;
            while received.len() < TOTAL {
                let len = (1 + step % (CAPACITY / 2)).min(TOTAL - received.len());
                let mut chunk = vec![0u8; len];
                if step % 5 == 0 {
                    consumer.peek(&mut chunk).unwrap();
                    let mut again = vec![0u8; len];
                    consumer.read(&mut again).unwrap();
                    assert_eq!(chunk, again);
                } else {
                    consumer.read(&mut chunk).unwrap();
                }
                received.extend_from_slice(&chunk);
                step += 3;
            }
            received
        });

        reader.join().unwrap()
    });

    let expected: Vec<u8> = (0..TOTAL).map(pattern).collect();
    assert!(received == expected, "stream corrupted");
    assert!(ring.is_empty());
    assert!(ring.snapshot().is_consistent());
}

#[test]
fn test_reader_skips_while_writer_runs() {
    let mut region = HeapRegion::for_capacity(CAPACITY);
    let mut ring = RingBuffer::create(region.as_mut_slice(), CAPACITY, stress_policy()).unwrap();
    let (mut producer, mut consumer) = ring.split();
    const FRAMES: usize = 10_000;

    let sum = thread::scope(|s| {
        s.spawn(move || {
            for i in 0..FRAMES {
                // 4 byte header to discard, then a 4 byte value
                producer.write(&[0xAA; 4]).unwrap();
                producer.write(&(i as u32).to_le_bytes()).unwrap();
            }
        });

        let reader = s.spawn(move || {
            let mut sum = 0u64;
            for _ in 0..FRAMES {
                let mut header = [0u8; 4];
                consumer.peek(&mut header).unwrap();
                assert_eq!(header, [0xAA; 4]);
                consumer.skip(4).unwrap();
                let mut value = [0u8; 4];
                consumer.read(&mut value).unwrap();
                sum += u32::from_le_bytes(value) as u64;
            }
            sum
        });

        reader.join().unwrap()
    });

    assert_eq!(sum, (FRAMES as u64 - 1) * FRAMES as u64 / 2);
}

#[test]
fn test_io_adapters_stream_bytes() {
    let mut region = HeapRegion::for_capacity(CAPACITY);
    let mut ring = RingBuffer::create(region.as_mut_slice(), CAPACITY, stress_policy()).unwrap();
    let (mut producer, mut consumer) = ring.split();
    let payload: Vec<u8> = (0..10_000).map(pattern).collect();

    let received = thread::scope(|s| {
        let source = &payload;
        s.spawn(move || {
            producer.write_all(source).unwrap();
            producer.flush().unwrap();
        });

        let mut received = vec![0u8; source.len()];
        consumer.read_exact(&mut received).unwrap();
        received
    });

    assert_eq!(received, payload);
}
