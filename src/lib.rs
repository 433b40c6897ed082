pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod movement;
pub mod nav_graph;
pub mod pathfinding;
pub mod phase;
pub mod player;
pub mod rng;
pub mod targeting;
pub mod tile_map;
pub mod types;
