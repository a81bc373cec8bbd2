//! Scripted service manager for supervisor tests.

use async_trait::async_trait;
use mini_core::supervisor::{ServiceError, ServiceManager};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Tracks which services are up. `start_service` brings a service up after
/// `start_delay`; services in `unstartable` never come up.
#[derive(Default)]
pub struct ScriptedServices {
    running: Mutex<HashSet<String>>,
    unstartable: HashSet<String>,
    broken_probe: HashSet<String>,
    start_delay: Duration,
    starts: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedServices {
    pub fn with_running(services: &[&str]) -> Self {
        Self {
            running: Mutex::new(services.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn unstartable(mut self, service: &str) -> Self {
        self.unstartable.insert(service.to_string());
        self
    }

    pub fn broken_probe(mut self, service: &str) -> Self {
        self.broken_probe.insert(service.to_string());
        self
    }

    pub fn start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn starts(&self, service: &str) -> usize {
        self.starts.lock().unwrap().get(service).copied().unwrap_or(0)
    }

    pub fn total_starts(&self) -> usize {
        self.starts.lock().unwrap().values().sum()
    }

    /// Highest number of overlapping restart sequences observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn kill(&self, service: &str) {
        self.running.lock().unwrap().remove(service);
    }

    fn running(&self, service: &str) -> bool {
        self.running.lock().unwrap().contains(service)
    }
}

#[async_trait]
impl ServiceManager for ScriptedServices {
    async fn start_service(&self, service: &str) -> Result<String, ServiceError> {
        *self
            .starts
            .lock()
            .unwrap()
            .entry(service.to_string())
            .or_default() += 1;

        tokio::time::sleep(self.start_delay).await;
        let result = if self.unstartable.contains(service) {
            Err(ServiceError::CommandFailed {
                program: "scripted".to_string(),
                verb: "start".to_string(),
                service: service.to_string(),
                exit: "exit status 1".to_string(),
                output: "refused".to_string(),
            })
        } else {
            self.running.lock().unwrap().insert(service.to_string());
            Ok(format!("started {service}"))
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn stop_service(&self, service: &str) -> Result<String, ServiceError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.start_delay).await;
        self.running.lock().unwrap().remove(service);
        Ok(String::new())
    }

    async fn is_running(&self, service: &str) -> Result<bool, ServiceError> {
        if self.broken_probe.contains(service) {
            return Err(ServiceError::Unavailable {
                program: "scripted".to_string(),
                reason: "probe unavailable".to_string(),
            });
        }
        Ok(self.running(service))
    }
}
