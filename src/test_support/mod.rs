//! Test utilities for pupil-build unit tests.
//!
//! Fixtures build throwaway source trees and library prefixes in temporary
//! directories so resolution and scanning run against real filesystems.

pub mod fixtures;

pub use fixtures::*;
