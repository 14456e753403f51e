use std::time::Duration;

use super::guidance::{TurnGuidance, classify_turn};
use super::progress::WaypointSchedule;
use super::state::{NavEvent, NavigationSession, NavigationState, NodeRef};
use crate::announce::{self, Announcer};
use crate::config::NavConfig;
use crate::error::PathError;
use crate::events::{Observers, Subscription};
use crate::graph::{Graph, Node, Pathfinder, Route, route::estimate_walking_time};
use crate::sensors::{
    AccelSample, HeadingTracker, MagSample, SensorEvent, SensorKind, StepDetector, StepEvent,
};

/// Walks a user along a route, one sensor sample at a time
///
/// The navigator owns the step detector, heading tracker and the current
/// session. Every handler takes `&mut self`, so each sample is processed to
/// completion and guidance always sees the latest committed waypoint.
pub struct Navigator {
    config: NavConfig,
    pathfinder: Pathfinder,
    state: NavigationState,
    session: Option<NavigationSession>,
    step_detector: StepDetector,
    heading: HeadingTracker,
    guidance: Option<TurnGuidance>,
    last_step_at: Option<Duration>,
    accel_fault: bool,
    mag_fault: bool,
    announcer: Announcer,
    listeners: Observers<NavEvent>,
}

impl Navigator {
    pub fn new(config: NavConfig) -> Self {
        let announcer = Announcer::from_config(&config.announcements);
        Self::with_announcer(config, announcer)
    }

    pub fn with_announcer(config: NavConfig, announcer: Announcer) -> Self {
        Self {
            pathfinder: Pathfinder::new(&config.route),
            step_detector: StepDetector::new(&config.steps),
            heading: HeadingTracker::new(&config.heading),
            state: NavigationState::Idle,
            session: None,
            guidance: None,
            last_step_at: None,
            accel_fault: false,
            mag_fault: false,
            announcer,
            listeners: Observers::new(),
            config,
        }
    }

    /// Plan a route and start walking it
    ///
    /// An active session is cancelled first. On failure the navigator is
    /// left `Idle` and listeners get [`NavEvent::RouteNotFound`].
    pub fn request_route(
        &mut self,
        graph: &Graph,
        start: &str,
        end: &str,
    ) -> Result<Route, PathError> {
        if self.state.is_active() {
            self.cancel();
        }
        self.session = None;
        self.guidance = None;
        self.accel_fault = false;
        self.mag_fault = false;
        self.state = NavigationState::Routing;

        log::info!("Routing {} -> {}", start, end);
        match self.pathfinder.find_path(graph, start, end) {
            Ok(route) => {
                self.begin(route.clone());
                Ok(route)
            }
            Err(e) => {
                log::warn!("No route from {} to {}: {}", start, end, e);
                self.state = NavigationState::Idle;
                self.emit(NavEvent::RouteNotFound {
                    start: start.to_string(),
                    end: end.to_string(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn begin(&mut self, route: Route) {
        let schedule = WaypointSchedule::for_route(&route, &self.config.progress);
        let distance = route.total_distance();
        let eta = route.estimated_time(self.config.route.walking_speed_mps);
        let started = NavEvent::RouteStarted {
            start: NodeRef::from(route.start()),
            destination: NodeRef::from(route.destination()),
            waypoints: route.len(),
            distance,
            estimated_secs: eta.as_secs(),
        };
        let destination_name = route.destination().name.clone();
        let single_node = route.len() == 1;

        log::info!(
            "Route: {} ({:.1} m, ~{} s)",
            route.summary(),
            distance,
            eta.as_secs()
        );

        self.session = Some(NavigationSession::new(route, schedule));
        self.last_step_at = None;
        self.step_detector.stop();
        self.step_detector.start();
        self.state = NavigationState::Navigating;

        self.emit(started);
        self.announcer
            .announce(&announce::starting_message(&destination_name));

        if single_node {
            self.arrive();
        }
    }

    fn arrive(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let node = session.current_node();
        let event = NavEvent::Arrived {
            node: NodeRef::from(node),
            total_steps: session.total_steps(),
        };
        let message = announce::arrived_message(&node.name);

        self.state = NavigationState::Arrived;
        self.step_detector.stop();
        self.guidance = None;

        log::info!("{}", message);
        self.emit(event);
        self.announcer.announce(&message);
    }

    fn cancel(&mut self) {
        let at_index = self
            .session
            .take()
            .map_or(0, |s| s.current_index());
        self.step_detector.stop();
        self.guidance = None;
        self.state = NavigationState::Cancelled;
        log::info!("Navigation cancelled at waypoint {}", at_index);
        self.emit(NavEvent::Cancelled { at_index });
    }

    /// Stop navigating
    ///
    /// Cancels an active session, or clears a finished one back to `Idle`.
    pub fn stop(&mut self) {
        match self.state {
            NavigationState::Routing | NavigationState::Navigating => self.cancel(),
            NavigationState::Arrived => {
                self.session = None;
                self.state = NavigationState::Idle;
            }
            NavigationState::Idle | NavigationState::Cancelled => {}
        }
    }

    /// Feed an accelerometer sample; returns the step it completed, if any
    pub fn on_accelerometer(&mut self, sample: &AccelSample) -> Option<StepEvent> {
        if self.accel_fault || self.state != NavigationState::Navigating {
            return None;
        }
        let step = self.step_detector.process_sample(sample)?;
        self.on_step(&step);
        Some(step)
    }

    /// Apply a counted step to the active session
    pub fn on_step(&mut self, step: &StepEvent) {
        if self.state != NavigationState::Navigating {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.last_step_at = Some(step.timestamp);
        let advanced = session.record_step(step.count);
        let total_steps = session.total_steps();
        let reached = advanced.map(|index| {
            (
                index,
                session.is_complete(),
                NodeRef::from(session.current_node()),
                session.remaining_distance(),
            )
        });

        self.emit(NavEvent::StepCounted { total_steps });

        let Some((index, complete, node, remaining_distance)) = reached else {
            return;
        };
        if complete {
            self.arrive();
            return;
        }

        log::info!("Waypoint {}: {} ({:.1} m left)", index, node.name, remaining_distance);
        let message = announce::approaching_message(&node.name);
        self.emit(NavEvent::WaypointReached {
            index,
            node,
            total_steps,
            remaining_distance,
        });
        self.announcer.announce(&message);
        self.refresh_guidance();
    }

    /// Feed a magnetometer sample; returns fresh guidance while navigating
    pub fn on_magnetometer(&mut self, sample: &MagSample) -> Option<TurnGuidance> {
        if self.mag_fault {
            return None;
        }
        self.heading.process_sample(sample);
        self.refresh_guidance()
    }

    fn refresh_guidance(&mut self) -> Option<TurnGuidance> {
        self.guidance = match (self.state, self.session.as_ref(), self.heading.heading()) {
            (NavigationState::Navigating, Some(session), Some(heading)) => {
                session.next_node().map(|next| {
                    classify_turn(
                        session.current_node(),
                        next,
                        heading,
                        session.is_final_segment(),
                        &self.config.guidance,
                    )
                })
            }
            _ => None,
        };
        self.guidance
    }

    /// A sensor stream failed; ignore it until the next route request
    pub fn on_sensor_error(&mut self, kind: SensorKind, message: &str) {
        log::error!("{:?} stream failed: {}", kind, message);
        match kind {
            SensorKind::Accelerometer => {
                self.accel_fault = true;
                self.step_detector.stop();
            }
            SensorKind::Magnetometer => self.mag_fault = true,
        }
        self.emit(NavEvent::SensorFault {
            kind,
            message: message.to_string(),
        });
    }

    /// Dispatch one event from a sensor stream
    ///
    /// Returns guidance when a magnetometer sample produced some.
    pub fn handle_sensor_event(&mut self, event: &SensorEvent) -> Option<TurnGuidance> {
        match event {
            SensorEvent::Accelerometer(sample) => {
                self.on_accelerometer(sample);
                None
            }
            SensorEvent::Magnetometer(sample) => self.on_magnetometer(sample),
            SensorEvent::StreamError { kind, message } => {
                self.on_sensor_error(*kind, message);
                None
            }
        }
    }

    fn emit(&mut self, event: NavEvent) {
        log::debug!("{:?}", event);
        self.listeners.notify(&event);
    }

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&NavEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, token: Subscription) -> bool {
        self.listeners.unsubscribe(token)
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn session(&self) -> Option<&NavigationSession> {
        self.session.as_ref()
    }

    pub fn guidance(&self) -> Option<TurnGuidance> {
        self.guidance
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading.heading()
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.session.as_ref().map(|s| s.current_node())
    }

    pub fn next_node(&self) -> Option<&Node> {
        self.session.as_ref().and_then(|s| s.next_node())
    }

    pub fn steps_walked(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.total_steps())
    }

    pub fn remaining_distance(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.remaining_distance())
    }

    pub fn estimated_time_remaining(&self) -> Option<Duration> {
        self.remaining_distance()
            .map(|d| estimate_walking_time(d, self.config.route.walking_speed_mps))
    }

    /// True if a step was counted within the movement timeout before `now`
    pub fn is_moving(&self, now: Duration) -> bool {
        self.last_step_at
            .is_some_and(|t| now.saturating_sub(t) < self.config.guidance.movement_timeout())
    }

    pub fn step_detector(&self) -> &StepDetector {
        &self.step_detector
    }

    pub fn step_detector_mut(&mut self) -> &mut StepDetector {
        &mut self.step_detector
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer {
        &mut self.announcer
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("guidance", &self.guidance)
            .finish_non_exhaustive()
    }
}
