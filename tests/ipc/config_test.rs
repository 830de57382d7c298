/*!
 * Configuration Tests
 * JSON and environment loading of transport settings
 */

use pretty_assertions::assert_eq;
use serial_test::serial;
use shm_transport::ipc::config::{
    ENV_CAPACITY, ENV_LEVEL0_CYCLES, ENV_LEVEL1_CYCLES, ENV_SLEEP_QUANTUM_US, ENV_SPIN_HINT, ENV_TIMEOUT_CYCLES,
};
use shm_transport::{BlockingConfig, HeapRegion, TimeoutPolicy, TransportConfig, TransportError};
use std::env;

const ALL_VARS: [&str; 6] = [
    ENV_CAPACITY,
    ENV_TIMEOUT_CYCLES,
    ENV_LEVEL0_CYCLES,
    ENV_LEVEL1_CYCLES,
    ENV_SPIN_HINT,
    ENV_SLEEP_QUANTUM_US,
];

fn clear_env() {
    for key in ALL_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_env_defaults_when_unset() {
    clear_env();
    assert_eq!(TransportConfig::from_env().unwrap(), TransportConfig::default());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    env::set_var(ENV_CAPACITY, "4096");
    env::set_var(ENV_TIMEOUT_CYCLES, "5000000");
    env::set_var(ENV_LEVEL0_CYCLES, "1000");
    env::set_var(ENV_LEVEL1_CYCLES, " 20000 ");
    env::set_var(ENV_SPIN_HINT, "on");
    env::set_var(ENV_SLEEP_QUANTUM_US, "50");

    let config = TransportConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.capacity, 4096);
    assert_eq!(config.timeouts, TimeoutPolicy::new(5_000_000, [1_000, 20_000]).unwrap());
    assert!(config.blocking.spin_hint);
    assert_eq!(config.blocking.sleep_quantum_us, 50);
}

#[test]
#[serial]
fn test_env_rejects_garbage() {
    clear_env();
    env::set_var(ENV_CAPACITY, "lots");
    let err = TransportConfig::from_env().unwrap_err();
    clear_env();
    assert!(matches!(err, TransportError::InvalidArgument(_)));

    env::set_var(ENV_SPIN_HINT, "maybe");
    let err = TransportConfig::from_env().unwrap_err();
    clear_env();
    assert!(matches!(err, TransportError::InvalidArgument(_)));
}

#[test]
#[serial]
fn test_env_rejects_levels_above_timeout() {
    clear_env();
    env::set_var(ENV_TIMEOUT_CYCLES, "100");
    let err = TransportConfig::from_env().unwrap_err();
    clear_env();
    assert!(matches!(err, TransportError::InvalidArgument(_)));
}

#[test]
fn test_json_round_trip_creates_ring() {
    let config = TransportConfig::default()
        .with_capacity(256)
        .with_timeouts(TimeoutPolicy::low_latency())
        .with_blocking(BlockingConfig::default().sleep_quantum(std::time::Duration::from_micros(10)));
    let json = serde_json::to_string(&config).unwrap();
    let parsed = TransportConfig::from_json(&json).unwrap();
    assert_eq!(parsed, config);

    let mut region = HeapRegion::with_len(parsed.required_size());
    let ring = parsed.create(region.as_mut_slice()).unwrap();
    assert_eq!(ring.capacity(), 256);
    assert_eq!(ring.timeouts(), TimeoutPolicy::low_latency());
    assert_eq!(ring.blocking().sleep_quantum_us, 10);
}

#[test]
fn test_json_rejects_zero_capacity() {
    assert!(matches!(
        TransportConfig::from_json(r#"{"capacity": 0}"#),
        Err(TransportError::InvalidArgument(_))
    ));
    assert!(TransportConfig::from_json("not json").is_err());
}
