mod cli;
mod error;
mod replay;
mod trace;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wayfinder_core::prelude::TrackerConfig;
use wayfinder_core::{CsvStore, Meters, NodeId, Route, find_route};

use crate::cli::{Cli, Command, QueryArgs};
use crate::error::CliError;

/// Plain JSON rendering of a route
#[derive(Debug, Serialize)]
struct RouteOutput {
    from: NodeId,
    to: NodeId,
    nodes: Vec<NodeId>,
    dropped_nodes: Vec<NodeId>,
    distance: Meters,
    segment_lengths: Vec<Meters>,
    path: Vec<[f64; 2]>,
}

impl From<&Route> for RouteOutput {
    fn from(route: &Route) -> Self {
        Self {
            from: route.from,
            to: route.to,
            nodes: route.nodes.clone(),
            dropped_nodes: route.dropped_nodes.clone(),
            distance: route.total_distance(),
            segment_lengths: route.polyline.segment_lengths().to_vec(),
            path: route.path_coords(),
        }
    }
}

fn main() -> ExitCode {
    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    match run(cli.command, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run<W: Write>(command: Command, out: &mut W) -> Result<(), CliError> {
    match command {
        Command::Route { query, geojson } => route(&query, geojson, out),
        Command::Replay {
            query,
            trace,
            tracker,
        } => {
            let config = match tracker {
                Some(json) => serde_json::from_str(&json).map_err(CliError::TrackerConfig)?,
                None => TrackerConfig::default(),
            };
            let events = trace::read_trace(BufReader::new(File::open(&trace)?))?;
            let store = CsvStore::open(query.data.clone())?;
            replay::replay(&store, &query.route_query(), &events, config, out)?;
            Ok(())
        }
    }
}

fn route<W: Write>(query: &QueryArgs, geojson: bool, out: &mut W) -> Result<(), CliError> {
    let store = CsvStore::open(query.data.clone())?;
    let route = find_route(&store, &query.route_query())?;

    if geojson {
        out.write_all(route.to_geojson_string()?.as_bytes())?;
    } else {
        serde_json::to_writer(&mut *out, &RouteOutput::from(&route))?;
    }
    writeln!(out)?;
    Ok(())
}
