pub mod guidance;
pub mod navigator;
pub mod progress;
pub mod state;

pub use guidance::{TurnDirection, TurnGuidance, classify_turn};
pub use navigator::Navigator;
pub use progress::WaypointSchedule;
pub use state::{NavEvent, NavigationSession, NavigationState, NodeRef};
