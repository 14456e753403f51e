use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use wayfinder::config::{AdvanceMode, NavConfig};
use wayfinder::engine::{self, EngineCommand, EngineOutput};
use wayfinder::graph::{Building, Graph, find_path};
use wayfinder::navigation::{NavEvent, NavigationState, Navigator, WaypointSchedule};
use wayfinder::sensors::SensorKind;
use wayfinder::simulation::{WalkConfig, simulate_walk};

fn quiet_config() -> NavConfig {
    let mut config = NavConfig::default();
    config.announcements.enabled = false;
    config
}

/// Feed a simulated walk straight into a navigator, in timestamp order
fn replay(config: NavConfig, from: &str, to: &str, walk_config: &WalkConfig) -> Navigator {
    let graph = Graph::bundled(Building::College).unwrap();
    let route = find_path(&graph, from, to).unwrap();
    let schedule = WaypointSchedule::for_route(&route, &config.progress);
    let walk = simulate_walk(&route, &schedule, walk_config).unwrap();

    let mut navigator = Navigator::new(config);
    navigator.request_route(&graph, from, to).unwrap();
    for event in walk.merged() {
        navigator.handle_sensor_event(&event);
    }
    navigator
}

#[test]
fn test_walk_reaches_destination() {
    for seed in [11, 12, 13] {
        let navigator = replay(
            quiet_config(),
            "101",
            "restroom",
            &WalkConfig::default().with_seed(seed),
        );
        assert_eq!(navigator.state(), NavigationState::Arrived, "seed {seed}");
        assert_eq!(navigator.current_node().unwrap().id, "restroom");
    }
}

#[test]
fn test_noiseless_demo_route() {
    let navigator = replay(
        quiet_config(),
        "101",
        "204",
        &WalkConfig::default().noiseless(),
    );
    assert_eq!(navigator.state(), NavigationState::Arrived);
    assert_eq!(navigator.steps_walked(), 48);
}

#[test]
fn test_stride_mode_walk() {
    let mut config = quiet_config();
    config.progress.mode = AdvanceMode::StrideLength;
    let navigator = replay(config, "lobby", "stairs", &WalkConfig::default().with_seed(5));
    assert_eq!(navigator.state(), NavigationState::Arrived);
    assert_eq!(navigator.current_node().unwrap().id, "stairs");
}

#[test]
fn test_heading_after_walk_matches_last_segment() {
    let navigator = replay(
        quiet_config(),
        "lobby",
        "103",
        &WalkConfig::default().noiseless(),
    );
    // lobby (0,0) -> 103 (8,4) bears 116.6°
    let heading = navigator.heading().unwrap();
    assert!((heading - 116.565).abs() < 0.01, "heading {heading}");
}

#[test]
fn test_engine_survives_magnetometer_dropout() {
    let graph = Arc::new(Graph::bundled(Building::College).unwrap());
    let route = find_path(&graph, "101", "restroom").unwrap();
    let config = quiet_config();
    let schedule = WaypointSchedule::for_route(&route, &config.progress);
    let walk = simulate_walk(
        &route,
        &schedule,
        &WalkConfig {
            magnetometer_failure_ms: Some(2000),
            ..WalkConfig::default().with_seed(21)
        },
    )
    .unwrap();

    let (accel_tx, accel_rx) = unbounded();
    let (mag_tx, mag_rx) = unbounded();
    let (control_tx, control_rx) = unbounded();
    let (out_tx, out_rx) = unbounded();

    let navigator = Navigator::new(config);
    let engine =
        thread::spawn(move || engine::run(navigator, accel_rx, mag_rx, control_rx, out_tx));

    control_tx
        .send(EngineCommand::Route {
            graph: Arc::clone(&graph),
            start: "101".into(),
            end: "restroom".into(),
        })
        .unwrap();
    let started = out_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(
        started,
        EngineOutput::Event(NavEvent::RouteStarted { .. })
    ));

    // Magnetometer first so the dropout lands mid-route
    for event in walk.magnetometer {
        mag_tx.send(event).unwrap();
    }
    let mut outputs = Vec::new();
    loop {
        let out = out_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let fault = matches!(
            out,
            EngineOutput::Event(NavEvent::SensorFault {
                kind: SensorKind::Magnetometer,
                ..
            })
        );
        outputs.push(out);
        if fault {
            break;
        }
    }

    for event in walk.accelerometer {
        accel_tx.send(event).unwrap();
    }
    drop(accel_tx);
    drop(mag_tx);
    drop(control_tx);

    outputs.extend(out_rx.iter());
    let navigator = engine.join().unwrap();

    assert!(outputs.iter().any(|o| matches!(
        o,
        EngineOutput::Event(NavEvent::SensorFault {
            kind: SensorKind::Magnetometer,
            ..
        })
    )));
    assert!(outputs.iter().any(|o| matches!(o, EngineOutput::Guidance(_))));
    assert!(matches!(
        outputs.last(),
        Some(EngineOutput::Event(NavEvent::Arrived { .. }))
    ));
    assert_eq!(navigator.state(), NavigationState::Arrived);
}
