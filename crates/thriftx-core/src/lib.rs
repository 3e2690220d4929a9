//! # ThriftX Core
//!
//! The domain layer of the ThriftX site backend: accounts and sessions, blog
//! posts, newsletter subscriptions and the contact form.
//! This crate contains business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
