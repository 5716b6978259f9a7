//! AccountHandler integration tests

mod failure_tests;
