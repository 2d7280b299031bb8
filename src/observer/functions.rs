//! The impls and functions
//!
use std::{sync::Arc, time::Instant};
use log::*;
use anyhow::{Context, Result};
use crate::census::CensusProvider;
use crate::growth::{compute_growth, Census, GrowthReport};
use crate::observer::GrowthObserver;
use crate::session::{ObserverLocks, SessionStore};

impl GrowthObserver {
    pub fn new(
        census: Arc<dyn CensusProvider>,
        store: Arc<dyn SessionStore>,
    ) -> Self
    {
        GrowthObserver { census, store, locks: ObserverLocks::new() }
    }
    /// Sample the census, and return the growth since the previous observation of `observer_id`.
    ///
    /// The lock of the observer is held from loading the peaks until the new peaks are saved,
    /// so concurrent requests of the same observer can't lose each other's peaks.
    pub async fn observe(
        &self,
        observer_id: &str,
    ) -> Result<GrowthReport>
    {
        info!("begin observe: {}", observer_id);
        let timer = Instant::now();

        let _observer_guard = self.locks.lock(observer_id).await;

        let census = self.sample_census().await?;
        let store = self.store.clone();
        let observer = observer_id.to_string();
        let growth = tokio::task::spawn_blocking(move || -> Result<GrowthReport> {
            let prior_peaks = store.load_peaks(&observer)?;
            let (growth, updated_peaks) = compute_growth(&census, &prior_peaks);
            store.save_peaks(&observer, updated_peaks)?;
            Ok(growth)
        })
            .await
            .with_context(|| "Session task failed")??;

        info!("end observe: {}, {} types grew: {:?}", observer_id, growth.len(), timer.elapsed());
        Ok(growth)
    }
    /// A fresh census, collected first.
    pub async fn sample_census(
        &self,
    ) -> Result<Census>
    {
        let census = self.census.clone();
        tokio::task::spawn_blocking(move || census.sample_census())
            .await
            .with_context(|| "Census task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use crate::census::LiveRegistry;
    use crate::growth::GrowthEntry;
    use crate::session::MemorySessionStore;

    /// A census that returns the next prepared value on every sample.
    struct ScriptedCensus {
        samples: Mutex<Vec<Census>>,
        collected: Mutex<usize>,
    }
    impl ScriptedCensus {
        fn new(mut samples: Vec<Census>) -> Self {
            samples.reverse();
            ScriptedCensus { samples: Mutex::new(samples), collected: Mutex::new(0) }
        }
    }
    impl CensusProvider for ScriptedCensus {
        fn collect(&self) {
            *self.collected.lock().unwrap() += 1;
        }
        fn type_stats(&self) -> Result<Census> {
            Ok(self.samples.lock().unwrap().pop().unwrap_or_default())
        }
    }
    fn census(entries: &[(&str, u64)]) -> Census {
        entries.iter().map(|(name, count)| (name.to_string(), *count)).collect()
    }
    fn entries(growth: &GrowthReport) -> Vec<(&str, u64)> {
        growth.entries.iter().map(|GrowthEntry { type_name, delta }| (type_name.as_str(), *delta)).collect()
    }

    #[tokio::test]
    async fn unit_observe_stores_peaks_per_observer() {
        let scripted = Arc::new(ScriptedCensus::new(vec![
            census(&[("Leaker", 5)]),
            census(&[("Leaker", 8)]),
            census(&[("Leaker", 8)]),
            census(&[("Leaker", 3), ("Other", 2)]),
        ]));
        let store = Arc::new(MemorySessionStore::new());
        let observer = GrowthObserver::new(scripted.clone(), store.clone());

        assert_eq!(entries(&observer.observe("alice").await.unwrap()), vec![("Leaker", 5)]);
        assert_eq!(entries(&observer.observe("alice").await.unwrap()), vec![("Leaker", 3)]);
        // bob has no history, so sees the full count.
        assert_eq!(entries(&observer.observe("bob").await.unwrap()), vec![("Leaker", 8)]);
        assert_eq!(entries(&observer.observe("alice").await.unwrap()), vec![("Other", 2)]);

        assert_eq!(store.load_peaks("alice").unwrap(), census(&[("Leaker", 8), ("Other", 2)]));
        assert_eq!(store.load_peaks("bob").unwrap(), census(&[("Leaker", 8)]));
        assert_eq!(*scripted.collected.lock().unwrap(), 4);
    }
    #[tokio::test]
    async fn unit_concurrent_observations_do_not_lose_peaks() {
        let samples = (1..=20).map(|count| census(&[("Leaker", count)])).collect();
        let observer = Arc::new(GrowthObserver::new(
            Arc::new(ScriptedCensus::new(samples)),
            Arc::new(MemorySessionStore::new()),
        ));

        let mut handles = vec![];
        for _ in 0..20
        {
            let clone_observer = observer.clone();
            handles.push(tokio::spawn(async move {
                clone_observer.observe("alice").await.unwrap().total_growth()
            }));
        }
        let mut total = 0;
        for handle in handles
        {
            total += handle.await.unwrap();
        }
        // serialized observations add up to the final peak.
        assert_eq!(total, 20);
        assert_eq!(observer.store.load_peaks("alice").unwrap(), census(&[("Leaker", 20)]));
        assert_eq!(observer.locks.observer_count(), 0);
    }
    #[tokio::test]
    async fn unit_observer_locks_released_after_observe() {
        let observer = GrowthObserver::new(
            Arc::new(ScriptedCensus::new(vec![])),
            Arc::new(MemorySessionStore::new()),
        );
        for number in 0..50
        {
            observer.observe(&format!("observer_{}", number)).await.unwrap();
        }
        assert_eq!(observer.locks.observer_count(), 0);
    }
    #[tokio::test]
    async fn unit_observe_with_live_registry() {
        let registry = Arc::new(LiveRegistry::new());
        let observer = GrowthObserver::new(registry.clone(), Arc::new(MemorySessionStore::new()));
        assert!(observer.observe("alice").await.unwrap().is_empty());

        let values: Vec<Arc<String>> = (0..3).map(|number| Arc::new(number.to_string())).collect();
        values.iter().for_each(|value| registry.track(value));

        let growth = observer.observe("alice").await.unwrap();
        assert_eq!(entries(&growth), vec![(std::any::type_name::<String>(), 3)]);
        assert!(observer.observe("alice").await.unwrap().is_empty());
    }
}
