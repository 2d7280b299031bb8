//! growthz
//!
//! Without arguments, growthz serves the leak demo (`/`), the growth report (`/growth`) and the census (`/typestats`).
//! With `--watch`, it polls the `/typestats` endpoint of another growthz process and prints the growth.
//!
use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Instant};
use clap::Parser;
use dotenv::dotenv;
use log::*;
use anyhow::{Context, Result};

use growthz::census::{print_census, CensusProvider, RemoteCensus};
use growthz::server::{self, ServerState};
use growthz::session::{FileSessionStore, MemorySessionStore, SessionStore};
use growthz::{utility, watch};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    /// address to listen on, like 0.0.0.0:5000 (env PORT replaces the port)
    #[arg(short, long, value_name = "hostname:port")]
    listen: Option<String>,
    /// store the peaks of every observer as json in this directory instead of in memory
    #[arg(long, value_name = "directory")]
    session_dir: Option<std::path::PathBuf>,
    /// watch the growth of the growthz process at hostname:port instead of serving
    #[arg(short, long, value_name = "hostname:port")]
    watch: Option<String>,
    /// seconds between polls in watch mode
    #[arg(short, long)]
    interval: Option<u64>,
    /// stop watching after this number of polls
    #[arg(short, long)]
    count: Option<u64>,
    /// regex to select the types to print in watch mode
    #[arg(short, long, value_name = "regex")]
    type_name_match: Option<String>,
    /// only print the types with the biggest growth in watch mode
    #[arg(long)]
    top: Option<usize>,
    /// print the census of the growthz process at hostname:port and exit
    #[arg(long, value_name = "hostname:port")]
    print_census: Option<String>,
    /// write the resolved settings to .env
    #[arg(long)]
    write_dotenv: bool,
}

#[tokio::main]
async fn main() -> Result<()>
{
    env_logger::init();
    let mut changed_options = HashMap::new();
    dotenv().ok();
    let options = Opts::parse();

    if let Some(hostname_port) = &options.print_census
    {
        info!("print census: {}", hostname_port);
        let remote = RemoteCensus::new(hostname_port);
        let census = tokio::task::spawn_blocking(move || remote.sample_census())
            .await
            .with_context(|| "Census task failed")??;
        print_census(&census);
        return Ok(());
    }

    if let Some(hostname_port) = &options.watch
    {
        let interval = utility::set_interval(&options.interval, &mut changed_options)?;
        let type_name_filter = utility::set_regex(&options.type_name_match)?;
        utility::dotenv_writer(options.write_dotenv, changed_options)?;
        watch::watch_growth(hostname_port, interval, options.count, &type_name_filter, options.top).await?;
        return Ok(());
    }

    let listen = utility::set_listen(&options.listen, &mut changed_options);
    let listen: SocketAddr = listen.parse()
        .with_context(|| format!("Invalid listen address: {}", listen))?;
    let store: Arc<dyn SessionStore> = match utility::set_session_dir(&options.session_dir, &mut changed_options) {
        Some(session_dir) => Arc::new(FileSessionStore::new(&session_dir)?),
        None => Arc::new(MemorySessionStore::new()),
    };
    utility::dotenv_writer(options.write_dotenv, changed_options)?;

    info!("begin serve");
    let timer = Instant::now();

    server::serve(Arc::new(ServerState::new(store)), listen).await?;

    info!("end serve: {:?}", timer.elapsed());
    Ok(())
}
