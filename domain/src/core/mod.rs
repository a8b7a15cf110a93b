//! Core domain primitives shared across the discussion modules

pub mod error;
pub mod model;
pub mod topic;
