//! Tfbridge Core - Lock coordination over a storage backend
//!
//! This crate implements the state-coordination core: optimistic
//! read-check-write lock arbitration and conditional state writes on top of
//! the `StateStore` contract. It is the only place that decides whether a
//! caller may mutate state.

pub mod coordinator;

pub use coordinator::StateCoordinator;
