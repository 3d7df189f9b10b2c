//! Library exports for the URL shortener application
//!
//! This module exposes internal components for testing and potential library usage.

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod keygen;
pub mod manager;
pub mod model;
pub mod route;
