pub mod canvas;
pub mod config;
pub mod crs;
pub mod geo;
