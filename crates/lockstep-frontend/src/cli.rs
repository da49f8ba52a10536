//! Command line arguments

use clap::Parser;
use lockstep_netcode::SessionRole;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lockstep", version, about = "Run a deterministic engine in lockstep, alone or with a peer")]
pub struct Args {
    /// Built-in engine to load (paddles, counter)
    #[arg(short = 'L', long = "engine")]
    pub engine: Option<String>,

    /// Content file for the engine; without it the menu is shown
    pub content: Option<PathBuf>,

    /// Verbose logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Host a netplay session
    #[arg(long, conflicts_with = "join")]
    pub listen: bool,

    /// Join a netplay session
    #[arg(long)]
    pub join: bool,

    /// Address to listen on (host) or connect to (client)
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// RON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Save the input recording here when the session ends
    #[arg(long)]
    pub record: Option<PathBuf>,
}

impl Args {
    /// Role requested by `--listen` / `--join`
    pub fn role(&self) -> SessionRole {
        if self.listen {
            SessionRole::Host
        } else if self.join {
            SessionRole::Client
        } else {
            SessionRole::Solo
        }
    }
}
