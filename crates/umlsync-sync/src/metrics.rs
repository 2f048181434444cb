use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

use crate::model::SyncDirection;

/// Rolling sync timings plus lifetime counters.
#[derive(Debug, Clone)]
pub struct SyncMetrics {
    window: usize,
    code_to_gui: VecDeque<Duration>,
    gui_to_code: VecDeque<Duration>,
    pub syncs: u64,
    pub fallbacks: u64,
    pub timeouts: u64,
    pub rate_limited: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub syncs: u64,
    pub fallbacks: u64,
    pub timeouts: u64,
    pub rate_limited: u64,
    pub errors: u64,
    pub avg_code_to_gui_ms: Option<f64>,
    pub avg_gui_to_code_ms: Option<f64>,
    pub max_code_to_gui_ms: Option<f64>,
    pub max_gui_to_code_ms: Option<f64>,
}

impl SyncMetrics {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            code_to_gui: VecDeque::new(),
            gui_to_code: VecDeque::new(),
            syncs: 0,
            fallbacks: 0,
            timeouts: 0,
            rate_limited: 0,
            errors: 0,
        }
    }

    fn samples(&self, direction: SyncDirection) -> &VecDeque<Duration> {
        match direction {
            SyncDirection::CodeToGui => &self.code_to_gui,
            SyncDirection::GuiToCode => &self.gui_to_code,
        }
    }

    pub fn record(&mut self, direction: SyncDirection, duration: Duration) {
        self.syncs += 1;
        let window = self.window;
        let samples = match direction {
            SyncDirection::CodeToGui => &mut self.code_to_gui,
            SyncDirection::GuiToCode => &mut self.gui_to_code,
        };
        if samples.len() == window {
            samples.pop_front();
        }
        samples.push_back(duration);
    }

    pub fn sample_count(&self, direction: SyncDirection) -> usize {
        self.samples(direction).len()
    }

    pub fn average(&self, direction: SyncDirection) -> Option<Duration> {
        let samples = self.samples(direction);
        let count = u32::try_from(samples.len()).ok().filter(|&n| n > 0)?;
        Some(samples.iter().sum::<Duration>() / count)
    }

    pub fn max(&self, direction: SyncDirection) -> Option<Duration> {
        self.samples(direction).iter().max().copied()
    }

    pub fn report(&self) -> MetricsReport {
        let ms = |d: Option<Duration>| d.map(|d| d.as_nanos() as f64 / 1_000_000.0);
        MetricsReport {
            syncs: self.syncs,
            fallbacks: self.fallbacks,
            timeouts: self.timeouts,
            rate_limited: self.rate_limited,
            errors: self.errors,
            avg_code_to_gui_ms: ms(self.average(SyncDirection::CodeToGui)),
            avg_gui_to_code_ms: ms(self.average(SyncDirection::GuiToCode)),
            max_code_to_gui_ms: ms(self.max(SyncDirection::CodeToGui)),
            max_gui_to_code_ms: ms(self.max(SyncDirection::GuiToCode)),
        }
    }
}
