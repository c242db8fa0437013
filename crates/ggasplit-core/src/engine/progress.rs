use crate::core::composition::Category;

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    /// One input file has been classified; emitted from worker threads in completion order.
    FileClassified { category: Category },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn phase_start(&self, name: &'static str) {
        self.report(Progress::PhaseStart { name });
    }

    pub fn phase_finish(&self) {
        self.report(Progress::PhaseFinish);
    }

    pub fn file_classified(&self, category: Category) {
        self.report(Progress::FileClassified { category });
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::TaskIncrement);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let events = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event| {
                events.lock().unwrap().push(event);
            }));
            reporter.phase_start("Loading");
            reporter.report(Progress::TaskStart { total_steps: 2 });
            reporter.file_classified(Category::B);
            reporter.message("hello");
            reporter.phase_finish();
        }
        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::PhaseStart { name: "Loading" },
                Progress::TaskStart { total_steps: 2 },
                Progress::FileClassified {
                    category: Category::B
                },
                Progress::Message("hello".into()),
                Progress::PhaseFinish,
            ]
        );
    }
}
