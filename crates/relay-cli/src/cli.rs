//! CLI argument parsing.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Publish to or subscribe from a relayer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read values from stdin, one per line, and publish each as post_data
    Publish {
        /// Publisher endpoint
        #[arg(
            long,
            env = "RELAYER_PUBLISHER_URL",
            default_value = "ws://localhost:3000/publisher"
        )]
        url: String,
    },

    /// Print every value received (history replay first), one JSON document per line
    Subscribe {
        /// Subscriber endpoint
        #[arg(
            long,
            env = "RELAYER_SUBSCRIBER_URL",
            default_value = "ws://localhost:3000/subscriber"
        )]
        url: String,

        /// Reconnect after the connection drops instead of exiting
        #[arg(long)]
        reconnect: bool,
    },
}
