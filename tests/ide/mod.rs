//! IDE layer tests: the build queue, snapshots and client payloads.

pub mod tests_analysis;
