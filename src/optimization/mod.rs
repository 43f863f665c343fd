pub mod config;
pub mod engine;
pub mod epoch;
pub mod interpreter;
pub mod lexicographic;
pub mod model;
pub mod simplex;
