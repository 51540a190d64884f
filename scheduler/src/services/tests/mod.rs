//! Tests for the scheduler's collaborator implementations
