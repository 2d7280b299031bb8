//! The impls and functions
//!
use std::{any::{Any, type_name}, sync::{Arc, PoisonError}, time::Instant};
use log::*;
use anyhow::{Context, Result};
use crate::census::{CensusProvider, LiveRegistry, RemoteCensus};
use crate::growth::Census;
use crate::utility;

impl LiveRegistry {
    pub fn new() -> Self { Default::default() }
    /// Register a value under the name of its type.
    ///
    /// The registry only holds a weak reference, it doesn't keep the value alive.
    pub fn track<T: Any + Send + Sync>(
        &self,
        value: &Arc<T>,
    )
    {
        let value: Arc<dyn Any + Send + Sync> = value.clone();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_name::<T>())
            .or_default()
            .push(Arc::downgrade(&value));
    }
}

impl CensusProvider for LiveRegistry {
    fn collect(&self) {
        let timer = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut reclaimed = 0_usize;
        entries.retain(|_, weak_references| {
            let before = weak_references.len();
            weak_references.retain(|weak_reference| weak_reference.strong_count() > 0);
            reclaimed += before - weak_references.len();
            !weak_references.is_empty()
        });
        debug!("collect reclaimed {} entries: {:?}", reclaimed, timer.elapsed());
    }
    fn type_stats(&self) -> Result<Census> {
        Ok(self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, weak_references)| (name.to_string(), weak_references.len() as u64))
            .collect())
    }
}

impl RemoteCensus {
    pub fn new(hostname_port: &str) -> Self {
        RemoteCensus { hostname_port: hostname_port.to_string() }
    }
}

impl CensusProvider for RemoteCensus {
    // The remote process collects when serving /typestats.
    fn type_stats(&self) -> Result<Census> {
        info!("begin census read: {}", self.hostname_port);
        let timer = Instant::now();

        let data_from_http = utility::http_get(&self.hostname_port, "typestats")?;
        let census = parse_census(&data_from_http)
            .with_context(|| format!("Could not parse census from {}", self.hostname_port))?;

        info!("end census read: {:?}", timer.elapsed());
        Ok(census)
    }
}

/// Parse a census in the `/typestats` format: a json object with type name keys and count values.
pub fn parse_census(
    http_data: &str,
) -> Result<Census>
{
    serde_json::from_str(http_data)
        .with_context(|| "Json deserialization error")
}

/// Print a census, largest counts first.
pub fn print_census(
    census: &Census,
)
{
    let mut rows: Vec<(&String, &u64)> = census.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1));
    println!("{:>12} {}", "count", "type");
    for (name, count) in rows
    {
        println!("{:>12} {}", count, name);
    }
}
