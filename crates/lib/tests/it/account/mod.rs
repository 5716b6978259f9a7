//! Account module integration tests
