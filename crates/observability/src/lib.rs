//! Process-wide tracing setup shared by binaries, tests and benches.

pub mod subscriber;

/// Initialize structured JSON logging for the process.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    subscriber::init(subscriber::DEFAULT_FILTER);
}

/// Human-readable output captured by the test harness.
pub fn init_for_tests() {
    subscriber::init_test();
}
