//! API layer - native and REST surfaces over the domain service

pub mod native;
pub mod rest;
