/*!
 * Monitoring
 * Tracing subscriber setup
 */

mod tracer;

pub use tracer::{init_test_tracing, init_tracing, TRACE_JSON_ENV};
