use ggasplit::core::composition::Category;
use ggasplit::engine::config::CategoryLabels;
use ggasplit::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct PhaseState {
    bar: ProgressBar,
    started: Instant,
    /// Files classified so far in the current phase, indexed by category.
    classified: [u64; 2],
}

/// Draws the workflow on stderr: one line per phase, a file bar while files are processed,
/// and the running split between the two categories as files are classified.
#[derive(Clone)]
pub struct CliProgressHandler {
    labels: Arc<CategoryLabels>,
    state: Arc<Mutex<PhaseState>>,
}

impl CliProgressHandler {
    pub fn new(labels: &CategoryLabels) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.finish_and_clear();
        Self {
            labels: Arc::new(labels.clone()),
            state: Arc::new(Mutex::new(PhaseState {
                bar,
                started: Instant::now(),
                classified: [0; 2],
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let handler = self.clone();
        Box::new(move |progress: Progress| handler.handle(progress))
    }

    fn handle(&self, progress: Progress) {
        let Ok(mut state) = self.state.lock() else {
            warn!("Progress state mutex was poisoned; dropping progress event.");
            return;
        };

        match progress {
            Progress::PhaseStart { name } => {
                state.bar.reset();
                state.bar.set_length(0);
                state.bar.set_style(spinner_style());
                state.bar.set_prefix(name);
                state.bar.set_message("");
                state.bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                state.started = Instant::now();
                state.classified = [0; 2];
            }
            Progress::TaskStart { total_steps } => {
                state.bar.disable_steady_tick();
                state.bar.set_style(bar_style());
                state.bar.set_length(total_steps);
                state.bar.set_position(0);
            }
            Progress::TaskIncrement => state.bar.inc(1),
            Progress::FileClassified { category } => {
                state.classified[category as usize] += 1;
                let split = self.split(&state.classified);
                state.bar.set_message(split);
            }
            Progress::TaskFinish => {
                let total = state.bar.length().unwrap_or(0);
                state.bar.set_position(total);
            }
            Progress::PhaseFinish => {
                let elapsed = state.started.elapsed().as_secs_f64();
                let mut summary = format!("done in {elapsed:.1}s");
                if state.classified.iter().any(|&n| n > 0) {
                    summary.push_str(&format!(" ({})", self.split(&state.classified)));
                }
                state.bar.disable_steady_tick();
                state.bar.set_style(finished_style());
                state.bar.finish_with_message(summary);
            }
            Progress::Message(msg) => state.bar.println(format!("  {msg}")),
        }
    }

    fn split(&self, classified: &[u64; 2]) -> String {
        Category::ALL
            .iter()
            .map(|&c| format!("{} {}", self.labels.get(c), classified[c as usize]))
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("  {prefix:>10.bold} [{bar:32.cyan/blue}] {pos}/{len} files  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

fn finished_style() -> ProgressStyle {
    ProgressStyle::with_template("✓ {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn handler() -> CliProgressHandler {
        CliProgressHandler::new(&CategoryLabels::default())
    }

    #[test]
    fn classification_events_update_the_running_split() {
        let handler = handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Loading" });
        callback(Progress::TaskStart { total_steps: 3 });
        for category in [Category::B, Category::A, Category::B] {
            callback(Progress::FileClassified { category });
            callback(Progress::TaskIncrement);
        }
        {
            let state = handler.state.lock().unwrap();
            assert_eq!(state.classified, [1, 2]);
            assert_eq!(state.bar.position(), 3);
            assert_eq!(state.bar.prefix(), "Loading");
            assert_eq!(state.bar.message(), "ggapu 1 / gga 2");
        }

        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        let state = handler.state.lock().unwrap();
        assert!(state.bar.is_finished());
        assert!(state.bar.message().starts_with("done in "));
        assert!(state.bar.message().ends_with("(ggapu 1 / gga 2)"));
    }

    #[test]
    fn new_phase_resets_counts_and_labels_follow_configuration() {
        let labels = CategoryLabels {
            a: "plus-u".into(),
            b: "plain".into(),
        };
        let handler = CliProgressHandler::new(&labels);
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Classifying" });
        callback(Progress::FileClassified {
            category: Category::A,
        });
        assert_eq!(handler.state.lock().unwrap().bar.message(), "plus-u 1 / plain 0");

        callback(Progress::PhaseStart { name: "Copying" });
        callback(Progress::TaskStart { total_steps: 1 });
        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        let state = handler.state.lock().unwrap();
        assert_eq!(state.classified, [0, 0]);
        assert_eq!(state.bar.position(), 1);
        assert!(!state.bar.message().contains("plus-u"));
    }

    #[test]
    fn workers_can_report_concurrently() {
        let handler = handler();
        let callback = Arc::new(handler.get_callback());
        callback(Progress::PhaseStart { name: "Loading" });
        callback(Progress::TaskStart { total_steps: 8 });

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let callback = Arc::clone(&callback);
                thread::spawn(move || {
                    let category = if i % 4 == 0 { Category::A } else { Category::B };
                    callback(Progress::FileClassified { category });
                    callback(Progress::TaskIncrement);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let state = handler.state.lock().unwrap();
        assert_eq!(state.classified, [2, 6]);
        assert_eq!(state.bar.position(), 8);
    }
}
