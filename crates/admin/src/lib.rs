//! Kubra Market admin API library.
//!
//! JSON API behind the Kubra Market admin dashboard: accounts with
//! server-side sessions, shop categories, shops, orders, transactions and
//! sales analytics. Storage is either in-memory or `PostgreSQL`, chosen at
//! startup.
//!
//! The binary in `main.rs` wires configuration, logging and the HTTP server
//! around [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
