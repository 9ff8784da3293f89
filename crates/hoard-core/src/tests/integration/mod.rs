#![cfg(test)]

pub mod common;
pub mod lifecycle_tests;
pub mod scenario_tests;
