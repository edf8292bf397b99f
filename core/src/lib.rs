//! Quantum Drift core: the game model behind every front end.
//!
//! The crate is a pure model layer. Front ends feed it UI events
//! (console lines, region clicks, target clicks, quiz answers) and
//! advance virtual time; they render from `Game::snapshot()` and the
//! transcript.

pub mod clock;
pub mod config;
pub mod deployment_round;
pub mod error;
pub mod event;
pub mod game;
pub mod interpreter;
pub mod player;
pub mod quiz;
pub mod region_map;
pub mod registry;
pub mod rng;
pub mod scheduler;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod transcript;
pub mod types;
