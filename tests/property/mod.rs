//! Property-based tests for path normalization, progress, and tree encoding

mod normalization;
