use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use mdobs::engine::progress::{Progress, ProgressCallback};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Frames committed during a replay, split by whether they carried energies.
#[derive(Debug, Default)]
struct FrameTally {
    energy: AtomicU64,
    restraint_only: AtomicU64,
}

impl FrameTally {
    fn record(&self, energies: bool) {
        let counter = if energies {
            &self.energy
        } else {
            &self.restraint_only
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn summary(&self) -> String {
        let energy = self.energy.load(Ordering::Relaxed);
        let restraint_only = self.restraint_only.load(Ordering::Relaxed);
        if restraint_only == 0 {
            format!("{energy} energy frames")
        } else {
            format!("{energy} energy + {restraint_only} restraint frames")
        }
    }
}

/// Terminal progress for a trajectory replay.
///
/// The bar advances once per trajectory frame and its message keeps a running
/// tally of the frames committed to the energy file.
#[derive(Clone)]
pub struct ReplayProgress {
    bar: ProgressBar,
    tally: Arc<FrameTally>,
}

impl ReplayProgress {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target).with_style(Self::spinner_style());
        Self {
            bar,
            tally: Arc::new(FrameTally::default()),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        let tally = Arc::clone(&self.tally);

        Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => {
                bar.set_style(Self::spinner_style());
                bar.set_prefix(name);
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::TaskStart { total_steps } => {
                bar.disable_steady_tick();
                bar.set_length(total_steps);
                bar.set_position(0);
                bar.set_style(Self::bar_style());
            }
            Progress::TaskIncrement => bar.inc(1),
            Progress::FrameWritten { energies, .. } => {
                tally.record(energies);
                bar.set_message(tally.summary());
            }
            Progress::TaskFinish => {
                if let Some(length) = bar.length() {
                    bar.set_position(length);
                }
            }
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                bar.finish_with_message(format!("✓ {}", tally.summary()));
            }
            Progress::Message(msg) => bar.suspend(|| eprintln!("  {msg}")),
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {prefix} {msg}")
            .expect("Failed to create spinner style template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix:<8} [{bar:40.cyan/blue}] {pos}/{len} frames ({eta}) {msg}",
        )
        .expect("Failed to create bar style template")
        .with_key(
            "eta",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            },
        )
        .progress_chars("##-")
    }
}

impl Default for ReplayProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden() -> ReplayProgress {
        ReplayProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn bar_follows_replay_frames() {
        let progress = hidden();
        let callback = progress.get_callback();

        callback(Progress::PhaseStart { name: "Replay" });
        assert_eq!(progress.bar.prefix(), "Replay");

        callback(Progress::TaskStart { total_steps: 4 });
        assert_eq!(progress.bar.length(), Some(4));
        assert_eq!(progress.bar.position(), 0);

        callback(Progress::TaskIncrement);
        callback(Progress::FrameWritten {
            step: 0,
            energies: true,
        });
        assert_eq!(progress.bar.position(), 1);
        assert_eq!(progress.bar.message(), "1 energy frames");

        callback(Progress::FrameWritten {
            step: 5,
            energies: false,
        });
        assert_eq!(progress.bar.message(), "1 energy + 1 restraint frames");

        callback(Progress::TaskFinish);
        assert_eq!(progress.bar.position(), 4);

        callback(Progress::PhaseFinish);
        assert!(progress.bar.is_finished());
        assert_eq!(progress.bar.message(), "✓ 1 energy + 1 restraint frames");
    }

    #[test]
    fn messages_do_not_disturb_the_bar() {
        let progress = hidden();
        let callback = progress.get_callback();

        callback(Progress::TaskStart { total_steps: 2 });
        callback(Progress::Message("No topology given".to_string()));
        callback(Progress::TaskIncrement);

        assert_eq!(progress.bar.position(), 1);
        assert!(!progress.bar.is_finished());
    }

    #[test]
    fn callback_can_run_on_another_thread() {
        let progress = hidden();
        let callback = progress.get_callback();

        thread::spawn(move || {
            callback(Progress::TaskStart { total_steps: 1 });
            callback(Progress::FrameWritten {
                step: 0,
                energies: true,
            });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(progress.bar.is_finished());
        assert_eq!(progress.tally.energy.load(Ordering::Relaxed), 1);
    }
}
