use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use wayfinder_core::{NodeId, NodeSelection, RouteQuery};

#[derive(Parser, Debug)]
#[command(name = "wayfinder", version, about = "Indoor wayfinding from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the shortest route between two locations
    Route {
        #[command(flatten)]
        query: QueryArgs,

        /// Print a GeoJSON FeatureCollection instead of the plain route
        #[arg(long)]
        geojson: bool,
    },
    /// Walk a route with a recorded sensor trace, printing every progress update
    Replay {
        #[command(flatten)]
        query: QueryArgs,

        /// CSV with columns timestamp_ms,kind,x,y,z,lat,lon,accuracy
        #[arg(long)]
        trace: PathBuf,

        /// Tracker settings as JSON, e.g. '{"step_length": 1}'
        #[arg(long)]
        tracker: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Directory holding edges.csv and locations.csv
    #[arg(long)]
    pub data: PathBuf,

    #[arg(long)]
    pub from: NodeId,

    #[arg(long)]
    pub to: NodeId,

    #[arg(long, value_enum, default_value_t = Strategy::Linear)]
    pub strategy: Strategy,
}

impl QueryArgs {
    pub fn route_query(&self) -> RouteQuery {
        RouteQuery::new(self.from, self.to).with_selection(self.strategy.into())
    }
}

/// Frontier strategy of the shortest path search
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Linear,
    Heap,
}

impl From<Strategy> for NodeSelection {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Linear => NodeSelection::LinearScan,
            Strategy::Heap => NodeSelection::BinaryHeap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_route() {
        let cli = Cli::parse_from([
            "wayfinder", "route", "--data", "facility", "--from", "1", "--to", "3", "--geojson",
        ]);
        let Command::Route { query, geojson } = cli.command else {
            panic!("expected route command");
        };
        assert!(geojson);
        assert_eq!(query.route_query(), RouteQuery::new(1, 3));
    }

    #[test]
    fn parses_replay_with_heap() {
        let cli = Cli::parse_from([
            "wayfinder",
            "replay",
            "--data",
            "facility",
            "--from",
            "4",
            "--to",
            "9",
            "--strategy",
            "heap",
            "--trace",
            "walk.csv",
        ]);
        let Command::Replay { query, trace, tracker } = cli.command else {
            panic!("expected replay command");
        };
        assert_eq!(trace, PathBuf::from("walk.csv"));
        assert!(tracker.is_none());
        assert_eq!(query.route_query().selection, NodeSelection::BinaryHeap);
    }

    #[test]
    fn requires_endpoints() {
        assert!(Cli::try_parse_from(["wayfinder", "route", "--data", "facility"]).is_err());
    }
}
