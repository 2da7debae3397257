//! Progress display for the untimed phases of a run.
//!
//! Wraps the logging observer and draws an indicatif bar while inputs are
//! sampled. Nothing is drawn while the workers run.

use collbench_runtime::{BenchEvent, BenchObserver, Phase};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Mutex;

pub struct RunProgress<'a> {
    inner: &'a dyn BenchObserver,
    bar: Mutex<Option<ProgressBar>>,
    enabled: bool,
}

impl<'a> RunProgress<'a> {
    pub fn new(inner: &'a dyn BenchObserver, quiet: bool) -> Self {
        Self {
            inner,
            bar: Mutex::new(None),
            enabled: std::io::stderr().is_terminal() && !quiet,
        }
    }

    fn replace_bar(&self, bar: Option<ProgressBar>) {
        let mut slot = match self.bar.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(old) = slot.take() {
            old.finish_and_clear();
        }
        *slot = bar;
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let slot = match self.bar.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(bar) = slot.as_ref() {
            f(bar);
        }
    }

    /// Pass the event on, keeping its log line clear of the bar.
    fn forward(&self, event: &BenchEvent) {
        let slot = match self.bar.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        match slot.as_ref() {
            Some(bar) => bar.suspend(|| self.inner.on_event(event)),
            None => self.inner.on_event(event),
        }
    }

    fn sampling_bar(count: usize) -> ProgressBar {
        let pb = ProgressBar::new(count as u64);
        let style = ProgressStyle::default_bar()
            .template("{prefix:>12.cyan.bold} [{bar:30.green/dim}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("━━╺"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_prefix("Sampling");
        pb
    }

    fn update(&self, event: &BenchEvent) {
        match event {
            BenchEvent::SamplingStarted { count } => {
                self.replace_bar(Some(Self::sampling_bar(*count)));
            }
            BenchEvent::SampleAccepted { attempts, .. } => {
                self.with_bar(|bar| {
                    bar.set_message(format!("last accepted after {} attempts", attempts));
                    bar.inc(1);
                });
            }
            BenchEvent::PhaseChanged { phase } => match phase {
                Phase::InputsGenerated | Phase::Failed => self.replace_bar(None),
                _ => {}
            },
            _ => {}
        }
    }
}

impl BenchObserver for RunProgress<'_> {
    fn on_event(&self, event: &BenchEvent) {
        if self.enabled {
            self.update(event);
            self.forward(event);
        } else {
            self.inner.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collbench_runtime::RecordingObserver;

    #[test]
    fn test_events_are_forwarded_when_quiet() {
        let recording = RecordingObserver::new();
        let progress = RunProgress::new(&recording, true);

        progress.on_event(&BenchEvent::SamplingStarted { count: 2 });
        progress.on_event(&BenchEvent::SampleAccepted {
            index: 0,
            attempts: 4,
        });

        assert_eq!(recording.events().len(), 2);
    }

    #[test]
    fn test_bar_lifecycle() {
        let recording = RecordingObserver::new();
        let progress = RunProgress::new(&recording, true);

        progress.update(&BenchEvent::SamplingStarted { count: 3 });
        progress.update(&BenchEvent::SampleAccepted {
            index: 0,
            attempts: 1,
        });
        let mut position = 0;
        progress.with_bar(|bar| position = bar.position());
        assert_eq!(position, 1);

        progress.update(&BenchEvent::PhaseChanged {
            phase: Phase::InputsGenerated,
        });
        assert!(progress.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_no_bar_while_workers_run() {
        let recording = RecordingObserver::new();
        let progress = RunProgress::new(&recording, true);

        progress.update(&BenchEvent::SamplingStarted { count: 1 });
        progress.update(&BenchEvent::PhaseChanged {
            phase: Phase::InputsGenerated,
        });
        progress.update(&BenchEvent::PhaseChanged {
            phase: Phase::Running,
        });
        assert!(progress.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_events_forwarded_while_bar_is_drawn() {
        let recording = RecordingObserver::new();
        let progress = RunProgress::new(&recording, true);

        progress.update(&BenchEvent::SamplingStarted { count: 2 });
        progress.forward(&BenchEvent::SampleAccepted {
            index: 0,
            attempts: 2,
        });

        assert_eq!(
            recording.events(),
            vec![BenchEvent::SampleAccepted {
                index: 0,
                attempts: 2
            }]
        );
    }
}
