pub mod compute;
pub mod config;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod graph;
pub mod level;
pub mod player;
pub mod projectile;
pub mod scores;
