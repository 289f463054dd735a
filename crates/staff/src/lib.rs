//! Orderflow Staff library.
//!
//! This crate provides the staff panel as a library, allowing it to be
//! tested and reused by the CLI.
//!
//! # Security
//!
//! The staff panel holds no backend credentials of its own. Every backend
//! call is made with the JWT pair issued to the signed-in staff member, and
//! the pair never leaves the server-side session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod backend;
pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod guard;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod shell;
pub mod state;
