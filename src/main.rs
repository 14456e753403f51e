use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use wayfinder::config::NavConfig;
use wayfinder::graph::{Building, Graph, Pathfinder, Route};
use wayfinder::output::OutputFormat;
use wayfinder::signal_processing::compass_bearing;

#[derive(Parser, Debug)]
#[command(name = "wayfinder")]
#[command(about = "Plan indoor walking routes over a building graph", long_about = None)]
struct Args {
    /// Start node id
    #[arg(required_unless_present = "list")]
    from: Option<String>,

    /// Destination node id
    #[arg(required_unless_present = "list")]
    to: Option<String>,

    /// Graph JSON file (overrides --building)
    #[arg(short = 'g', long)]
    graph: Option<PathBuf>,

    /// Bundled building map
    #[arg(short = 'b', long, value_enum, default_value = "college")]
    building: Building,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// List selectable destinations and exit
    #[arg(short = 'l', long)]
    list: bool,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct SegmentPlan<'a> {
    from: &'a str,
    to: &'a str,
    distance: f64,
    bearing: f64,
}

#[derive(Debug, Serialize)]
struct RoutePlan<'a> {
    route: Vec<&'a str>,
    distance: f64,
    estimated_secs: u64,
    nodes_expanded: usize,
    segments: Vec<SegmentPlan<'a>>,
}

impl<'a> RoutePlan<'a> {
    fn new(route: &'a Route, config: &NavConfig) -> Self {
        let segments = route
            .nodes()
            .windows(2)
            .map(|w| SegmentPlan {
                from: &w[0].id,
                to: &w[1].id,
                distance: w[0].distance_to(&w[1]),
                bearing: compass_bearing(w[1].x - w[0].x, w[1].y - w[0].y),
            })
            .collect();
        Self {
            route: route.ids(),
            distance: route.total_distance(),
            estimated_secs: route
                .estimated_time(config.route.walking_speed_mps)
                .as_secs(),
            nodes_expanded: route.nodes_expanded(),
            segments,
        }
    }
}

fn load_graph(args: &Args) -> anyhow::Result<Graph> {
    match &args.graph {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open graph {}", path.display()))?;
            Graph::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse graph {}", path.display()))
        }
        None => Ok(Graph::bundled(args.building)?),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &args.config {
        Some(path) => NavConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => NavConfig::default(),
    };

    let graph = load_graph(&args)?;
    for bad in graph.malformed_edges() {
        log::warn!(
            "Edge {} references missing node {}",
            bad.edge_id,
            bad.missing_node
        );
    }

    if args.list {
        print_destinations(&graph, args.format)?;
        return Ok(());
    }

    let (Some(from), Some(to)) = (args.from.as_deref(), args.to.as_deref()) else {
        anyhow::bail!("Both a start and a destination are required");
    };

    let pathfinder = Pathfinder::new(&config.route);
    let route = pathfinder
        .find_path(&graph, from, to)
        .with_context(|| format!("No route from {} to {}", from, to))?;

    let plan = RoutePlan::new(&route, &config);
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => print_plan(&route, &plan, args.verbose > 0),
    }

    Ok(())
}

fn print_destinations(graph: &Graph, format: OutputFormat) -> anyhow::Result<()> {
    let destinations = graph.destinations();
    match format {
        OutputFormat::Json => {
            let list: Vec<_> = destinations
                .iter()
                .map(|(id, name)| serde_json::json!({ "id": id, "name": name }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text => {
            for (id, name) in destinations {
                println!("{:<12} {}", id, name);
            }
        }
    }
    Ok(())
}

fn print_plan(route: &Route, plan: &RoutePlan, verbose: bool) {
    println!("Route: {}", route.summary());
    println!("Distance: {:.1} m", plan.distance);
    println!("Estimated time: {} s", plan.estimated_secs);
    if verbose {
        println!("Nodes expanded: {}", plan.nodes_expanded);
    }
    println!();
    for segment in &plan.segments {
        println!(
            "  {:<10} -> {:<10} {:>6.1} m  bearing {:>5.1}°",
            segment.from, segment.to, segment.distance, segment.bearing
        );
    }
}
