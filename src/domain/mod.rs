//! Domain layer - Core business logic
//!
//! This module contains the domain entities, repository traits (ports)
//! and domain services. It knows nothing about HTTP or temp directories.

pub mod entities;
pub mod repositories;
pub mod services;
