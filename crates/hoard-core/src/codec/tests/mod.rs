#[cfg(test)]
mod roundtrip_tests;
