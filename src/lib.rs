pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod map;
pub mod objects;
pub mod render;
pub mod scene;
pub mod shape_scene;
pub mod utils;
