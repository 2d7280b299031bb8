//! The impls and functions
//!
use std::{sync::Arc, time::{Duration, Instant}};
use chrono::{DateTime, Local};
use colored::*;
use log::*;
use anyhow::{Context, Result};
use regex::Regex;
use crate::census::{CensusProvider, RemoteCensus};
use crate::growth::{compute_growth, GrowthReport, PeakTable};
use crate::watch::GrowthWatch;

impl GrowthWatch {
    pub fn new(
        census: Arc<dyn CensusProvider>,
    ) -> Self
    {
        GrowthWatch { census, peaks: PeakTable::new(), polls: 0 }
    }
    /// Take a census and return the growth since the previous poll.
    ///
    /// The census is read with blocking I/O.
    pub fn poll(
        &mut self,
    ) -> Result<GrowthReport>
    {
        let census = self.census.sample_census()?;
        let (growth, updated_peaks) = compute_growth(&census, &self.peaks);
        self.peaks = updated_peaks;
        self.polls += 1;
        Ok(growth)
    }
}

/// Poll the census of `hostname_port` every `interval` seconds, and print the growth.
///
/// `count` limits the number of polls, `None` keeps going until ctrl-c.
pub async fn watch_growth(
    hostname_port: &str,
    interval: u64,
    count: Option<u64>,
    type_name_filter: &Regex,
    top: Option<usize>,
) -> Result<()>
{
    let mut watch = GrowthWatch::new(Arc::new(RemoteCensus::new(hostname_port)));
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    loop
    {
        tokio::select! {
            _ = ticker.tick() => {},
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, stopping watch");
                break;
            },
        }

        info!("begin poll {}", watch.polls);
        let timer = Instant::now();
        let snapshot_time = Local::now();

        // reqwest blocking must not run on the runtime threads.
        let (returned_watch, growth) = tokio::task::spawn_blocking(move || {
            let growth = watch.poll();
            (watch, growth)
        })
            .await
            .with_context(|| "Poll task failed")?;
        watch = returned_watch;

        info!("end poll: {:?}", timer.elapsed());

        let mut growth = growth?.filtered(type_name_filter);
        if let Some(top) = top
        {
            growth = growth.top(top);
        }
        print_growth(hostname_port, &snapshot_time, watch.polls == 1, &growth);

        if count.map_or(false, |count| watch.polls >= count)
        {
            break;
        }
    }
    Ok(())
}

/// Print a growth report.
///
/// The first poll of a watch has no history, so it shows the full counts as the baseline.
pub fn print_growth(
    hostname_port: &str,
    snapshot_time: &DateTime<Local>,
    baseline: bool,
    growth: &GrowthReport,
)
{
    println!("--------------------------------------------------------------------------------");
    if baseline
    {
        println!("Host: {}, Snapshot time: {}, baseline", hostname_port, snapshot_time);
    }
    else
    {
        println!("Host: {}, Snapshot time: {}, total growth: {}", hostname_port, snapshot_time, growth.total_growth().to_string().yellow());
    }
    println!("--------------------------------------------------------------------------------");
    if growth.is_empty()
    {
        println!("No growth.");
        return;
    }
    println!("{:>12} {}", "growth", "type");
    for entry in &growth.entries
    {
        if baseline
        {
            println!("{:>12} {}", entry.delta, entry.type_name);
        }
        else
        {
            println!("{:>12} {}", format!("+{}", entry.delta).yellow(), entry.type_name);
        }
    }
}
