//! Tfbridge Server - Terraform remote-state HTTP proxy
//!
//! Serves the Terraform HTTP backend protocol (GET/POST/LOCK/UNLOCK on a
//! state path) and bridges it to an object-storage backend through the
//! lock coordinator in `tfbridge-core`.

pub mod api;
pub mod model;
pub mod startup;
