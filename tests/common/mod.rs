//! Shared fixtures for integration tests.

#![allow(dead_code)]

use cascade_resolver::{
    CodeUnit, LoaderHandle, Provider, ResolveError, ResourceHandle, ResourceStream, Result,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

/// How a scripted provider answers unit lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    NotFound,
    Fault,
}

/// Provider that answers every unit lookup with a fixed outcome and
/// serves a fixed set of resources. Queries are appended to a shared log.
#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    outcome: Mutex<Outcome>,
    resources: Mutex<HashSet<String>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(name: impl Into<String>, outcome: Outcome, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.into(),
            outcome: Mutex::new(outcome),
            resources: Mutex::new(HashSet::new()),
            log: Arc::clone(log),
        }
    }

    pub fn with_resource(self, name: &str) -> Self {
        self.resources.lock().insert(name.to_string());
        self
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock() = outcome;
    }
}

impl Provider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn resolve_unit(&self, name: &str) -> Result<CodeUnit> {
        self.log.lock().push(self.name.clone());
        match *self.outcome.lock() {
            Outcome::Found => Ok(CodeUnit::new(name, &self.name, self.name.as_bytes().to_vec())),
            Outcome::NotFound => Err(ResolveError::not_found(name)),
            Outcome::Fault => Err(ResolveError::provider(
                &self.name,
                format!("{} fault", self.name),
            )),
        }
    }

    fn resolve_resource_handle(&self, name: &str) -> Option<ResourceHandle> {
        self.log.lock().push(self.name.clone());
        self.resources
            .lock()
            .contains(name)
            .then(|| {
                let location = format!("scripted://{}/{}", self.name, name);
                ResourceHandle::new(name, &self.name, location)
            })
    }

    fn resolve_resource_stream(&self, name: &str) -> Option<ResourceStream> {
        self.log.lock().push(self.name.clone());
        self.resources
            .lock()
            .contains(name)
            .then(|| {
                let body = Cursor::new(self.name.as_bytes().to_vec());
                ResourceStream::new(name, &self.name, body)
            })
    }

    fn current_loader(&self) -> LoaderHandle {
        LoaderHandle::new(format!("scripted:{}", self.name))
    }
}

pub fn new_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn drain(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}
