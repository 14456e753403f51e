mod walk;

pub use walk::{SimulatedWalk, WalkConfig, simulate_walk};
