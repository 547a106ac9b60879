// handlers/mod.rs - Route handlers
//
// Perfume and client routes share the generic collection handlers in
// `resource`; `auth` owns the GitHub login flow.

pub mod auth;
pub mod clients;
pub mod perfumes;
pub mod resource;
pub mod service;
