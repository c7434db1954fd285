use std::io;
use std::path::Path;

use dutsim_core::Dut;
use dutsim_core::dut::{ScriptedDut, SignalSample};

/// One `set_signal` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    /// Rising edges the model had seen when the signal was driven.
    pub edge: u64,
    pub name: String,
    pub value: u64,
}

/// Scripted model that logs every driven signal.
#[derive(Debug, Default)]
pub struct RecordingDut {
    pub inner: ScriptedDut,
    pub drives: Vec<Drive>,
}

impl RecordingDut {
    pub fn new(inner: ScriptedDut) -> Self {
        Self {
            inner,
            drives: Vec::new(),
        }
    }

    /// Values driven onto `name`, in order.
    pub fn values(&self, name: &str) -> Vec<u64> {
        self.drives
            .iter()
            .filter(|d| d.name == name)
            .map(|d| d.value)
            .collect()
    }

    /// Drives onto `name`, in order.
    pub fn drives_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Drive> + 'a {
        self.drives.iter().filter(move |d| d.name == name)
    }
}

impl Dut for RecordingDut {
    fn set_signal(&mut self, name: &str, value: u64) {
        self.drives.push(Drive {
            edge: self.inner.rising_edges(),
            name: name.to_string(),
            value,
        });
        self.inner.set_signal(name, value);
    }

    fn get_signal(&self, name: &str) -> u64 {
        self.inner.get_signal(name)
    }

    fn evaluate(&mut self) {
        self.inner.evaluate();
    }

    fn preload_memory(&mut self, scope: &str, path: &Path) -> io::Result<()> {
        self.inner.preload_memory(scope, path)
    }

    fn host_requested_finish(&self) -> bool {
        self.inner.host_requested_finish()
    }

    fn for_each_signal(&self, visit: &mut dyn FnMut(SignalSample<'_>)) {
        self.inner.for_each_signal(visit);
    }
}
