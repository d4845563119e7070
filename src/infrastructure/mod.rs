//! Infrastructure layer
//!
//! Concrete implementations of the domain ports: inference backends,
//! ephemeral file storage and payload formatters. All network and
//! filesystem side effects beyond decoding live here.

pub mod engines;
pub mod ephemeral;
pub mod formatters;
