pub mod announce;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod graph;
pub mod navigation;
pub mod output;
pub mod sensors;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::NavConfig;
pub use error::{NavError, PathError, Result};
pub use graph::{Building, Graph, Route, find_path};
pub use navigation::{NavEvent, NavigationState, Navigator, TurnDirection, TurnGuidance};
