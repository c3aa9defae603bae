//! Scenario tests for the trade pipeline
