use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, never, select};

use crate::graph::Graph;
use crate::navigation::{NavEvent, Navigator, TurnGuidance};
use crate::sensors::SensorEvent;

/// Control messages for a running engine
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Route {
        graph: Arc<Graph>,
        start: String,
        end: String,
    },
    Stop,
    Shutdown,
}

/// What the engine reports back
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Event(NavEvent),
    Guidance(TurnGuidance),
}

enum Input {
    Accelerometer,
    Magnetometer,
    Control,
}

/// Drive a navigator from sensor and control channels until shut down
///
/// Samples from the two sensor streams interleave in arrival order and each
/// is handled to completion before the next. The loop ends on
/// [`EngineCommand::Shutdown`] or once every input channel is disconnected,
/// and hands the navigator back for inspection.
pub fn run(
    mut navigator: Navigator,
    accel_rx: Receiver<SensorEvent>,
    mag_rx: Receiver<SensorEvent>,
    control_rx: Receiver<EngineCommand>,
    output_tx: Sender<EngineOutput>,
) -> Navigator {
    let event_tx = output_tx.clone();
    let forward = navigator.subscribe(move |event| {
        if event_tx.send(EngineOutput::Event(event.clone())).is_err() {
            log::debug!("Output receiver gone, dropping {} event", event.name());
        }
    });

    let mut accel_rx = accel_rx;
    let mut mag_rx = mag_rx;
    let mut control_rx = control_rx;
    let mut open_inputs = 3;

    log::debug!("Engine loop started");

    loop {
        let mut closed = None;

        select! {
            recv(accel_rx) -> msg => match msg {
                Ok(event) => {
                    navigator.handle_sensor_event(&event);
                }
                Err(_) => closed = Some(Input::Accelerometer),
            },
            recv(mag_rx) -> msg => match msg {
                Ok(event) => {
                    if let Some(guidance) = navigator.handle_sensor_event(&event)
                        && output_tx.send(EngineOutput::Guidance(guidance)).is_err()
                    {
                        log::debug!("Output receiver gone, dropping guidance");
                    }
                }
                Err(_) => closed = Some(Input::Magnetometer),
            },
            recv(control_rx) -> msg => match msg {
                Ok(EngineCommand::Route { graph, start, end }) => {
                    if let Err(e) = navigator.request_route(&graph, &start, &end) {
                        log::debug!("Route request failed: {}", e);
                    }
                }
                Ok(EngineCommand::Stop) => navigator.stop(),
                Ok(EngineCommand::Shutdown) => {
                    log::debug!("Engine shutdown requested");
                    break;
                }
                Err(_) => closed = Some(Input::Control),
            },
        }

        match closed {
            Some(Input::Accelerometer) => {
                log::debug!("Accelerometer stream closed");
                accel_rx = never();
            }
            Some(Input::Magnetometer) => {
                log::debug!("Magnetometer stream closed");
                mag_rx = never();
            }
            Some(Input::Control) => {
                log::debug!("Control channel closed");
                control_rx = never();
            }
            None => continue,
        }

        open_inputs -= 1;
        if open_inputs == 0 {
            log::debug!("All inputs closed");
            break;
        }
    }

    navigator.unsubscribe(forward);
    navigator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NavConfig, StepConfig};
    use crate::graph::{Edge, Node};
    use crate::navigation::NavigationState;
    use crate::sensors::{AccelSample, MagSample};
    use crossbeam_channel::{RecvTimeoutError, unbounded};
    use std::thread;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn config() -> NavConfig {
        let mut config = NavConfig::default();
        config.steps = StepConfig {
            process_noise: 1e6,
            measurement_noise: 1e-6,
            ..StepConfig::default()
        };
        config.progress.steps_per_waypoint = 2;
        config.announcements.enabled = false;
        config
    }

    fn hallway() -> Arc<Graph> {
        Arc::new(Graph::new(
            vec![
                Node::new("a", "A", 0.0, 0.0, 0.0),
                Node::new("b", "B", 5.0, 0.0, 0.0),
                Node::new("c", "C", 10.0, 0.0, 0.0),
            ],
            vec![Edge::new("ab", "a", "b"), Edge::new("bc", "b", "c")],
        ))
    }

    fn wait_for<F>(rx: &Receiver<EngineOutput>, mut pred: F) -> Vec<EngineOutput>
    where
        F: FnMut(&EngineOutput) -> bool,
    {
        let mut seen = Vec::new();
        loop {
            match rx.recv_timeout(WAIT) {
                Ok(out) => {
                    let done = pred(&out);
                    seen.push(out);
                    if done {
                        return seen;
                    }
                }
                Err(RecvTimeoutError::Timeout) => panic!("timed out, saw {seen:?}"),
                Err(RecvTimeoutError::Disconnected) => panic!("engine gone, saw {seen:?}"),
            }
        }
    }

    #[test]
    fn test_engine_walks_route_to_arrival() {
        let (accel_tx, accel_rx) = unbounded();
        let (mag_tx, mag_rx) = unbounded();
        let (control_tx, control_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();

        let handle = thread::spawn(move || {
            run(Navigator::new(config()), accel_rx, mag_rx, control_rx, out_tx)
        });

        control_tx
            .send(EngineCommand::Route {
                graph: hallway(),
                start: "a".into(),
                end: "c".into(),
            })
            .unwrap();
        wait_for(&out_rx, |o| {
            matches!(o, EngineOutput::Event(NavEvent::RouteStarted { .. }))
        });

        mag_tx
            .send(SensorEvent::Magnetometer(MagSample::new(0.0, 1.0, Duration::ZERO)))
            .unwrap();
        let seen = wait_for(&out_rx, |o| matches!(o, EngineOutput::Guidance(_)));
        assert!(matches!(
            seen.last(),
            Some(EngineOutput::Guidance(g)) if g.path_bearing == 90.0
        ));

        for step in 0..4u64 {
            let t = step * 500;
            for (offset, magnitude) in [(0, 1.0), (30, 1.3), (60, 0.9)] {
                let sample = AccelSample::new(0.0, 0.0, magnitude, Duration::from_millis(t + offset));
                accel_tx.send(SensorEvent::Accelerometer(sample)).unwrap();
            }
        }
        let seen = wait_for(&out_rx, |o| {
            matches!(o, EngineOutput::Event(NavEvent::Arrived { .. }))
        });
        assert!(seen.iter().any(|o| matches!(
            o,
            EngineOutput::Event(NavEvent::WaypointReached { index: 1, .. })
        )));

        control_tx.send(EngineCommand::Shutdown).unwrap();
        let navigator = handle.join().unwrap();
        assert_eq!(navigator.state(), NavigationState::Arrived);
        assert_eq!(navigator.steps_walked(), 4);
    }

    #[test]
    fn test_engine_survives_dropped_output() {
        let (accel_tx, accel_rx) = unbounded();
        let (mag_tx, mag_rx) = unbounded();
        let (control_tx, control_rx) = unbounded::<EngineCommand>();
        let (out_tx, out_rx) = unbounded();
        drop(out_rx);

        let mut navigator = Navigator::new(config());
        navigator.request_route(&hallway(), "a", "c").unwrap();

        mag_tx
            .send(SensorEvent::Magnetometer(MagSample::new(0.0, 1.0, Duration::ZERO)))
            .unwrap();
        drop(mag_tx);
        drop(control_tx);
        for step in 0..4u64 {
            let t = step * 500;
            for (offset, magnitude) in [(0, 1.0), (30, 1.3), (60, 0.9)] {
                let sample = AccelSample::new(0.0, 0.0, magnitude, Duration::from_millis(t + offset));
                accel_tx.send(SensorEvent::Accelerometer(sample)).unwrap();
            }
        }
        drop(accel_tx);

        let navigator = run(navigator, accel_rx, mag_rx, control_rx, out_tx);
        assert_eq!(navigator.steps_walked(), 4);
        assert_eq!(navigator.state(), NavigationState::Arrived);
    }

    #[test]
    fn test_engine_exits_when_inputs_close() {
        let (accel_tx, accel_rx) = unbounded::<SensorEvent>();
        let (mag_tx, mag_rx) = unbounded::<SensorEvent>();
        let (control_tx, control_rx) = unbounded();
        let (out_tx, _out_rx) = unbounded();

        drop(accel_tx);
        drop(mag_tx);
        drop(control_tx);

        let navigator = run(Navigator::new(config()), accel_rx, mag_rx, control_rx, out_tx);
        assert_eq!(navigator.state(), NavigationState::Idle);
    }
}
