pub mod app;
pub mod boundary;
pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod input;
pub mod life;
pub mod metrics;
pub mod pattern;
pub mod render;
pub mod rle;
pub mod storage;
pub mod term;
pub mod viewport;
