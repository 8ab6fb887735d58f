//! Terraform HTTP backend protocol surface

pub mod model;
pub mod route;
pub mod state;
