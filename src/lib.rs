#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Tasks, groups and users behind an actix-web JSON API, with ownership-scoped access"]
#![doc = "control: callers see and change what they own, superusers see and change everything."]
#![doc = "The binary (`main.rs`) wires these modules to PostgreSQL and starts the server."]

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
