use nu_ansi_term::Color as AnsiColor;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

/// Severity of a notification. A message is emitted when the verbosity is at
/// least the level's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Problem = 1,
    Directory = 2,
    File = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

#[derive(Debug)]
enum Sink {
    /// Interactive echo to stdout, used for dry runs
    Echo { use_color: bool },
    /// `tracing` events, used for real runs (may be piped to a log file)
    Log,
    /// Collected in memory
    Capture(RefCell<Vec<Notice>>),
}

/// Carries verbosity and dry-run state into every operation.
///
/// Verbosity 0 mutes everything; 1 shows problems; 2 adds per-directory
/// messages; 3 adds per-file detail.
#[derive(Debug)]
pub struct Notifier {
    verbosity: u8,
    dry_run: bool,
    sink: Sink,
    problems: Cell<usize>,
}

impl Notifier {
    pub fn new(verbosity: u8, dry_run: bool) -> Self {
        let sink = if dry_run {
            Sink::Echo { use_color: false }
        } else {
            Sink::Log
        };
        Self {
            verbosity,
            dry_run,
            sink,
            problems: Cell::new(0),
        }
    }

    /// Colour problem lines when echoing
    #[must_use]
    pub fn with_color(mut self, use_color: bool) -> Self {
        if let Sink::Echo { .. } = self.sink {
            self.sink = Sink::Echo { use_color };
        }
        self
    }

    /// A notifier that always routes through `tracing`, leaving stdout to
    /// machine-readable output
    pub fn logging(verbosity: u8, dry_run: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            sink: Sink::Log,
            problems: Cell::new(0),
        }
    }

    /// A notifier that records messages instead of printing them
    pub fn capturing(verbosity: u8, dry_run: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            sink: Sink::Capture(RefCell::new(Vec::new())),
            problems: Cell::new(0),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Number of problems reported so far, whether or not they were shown
    pub fn problem_count(&self) -> usize {
        self.problems.get()
    }

    pub fn problem(&self, message: impl Into<String>) {
        self.problems.set(self.problems.get() + 1);
        self.notify(Level::Problem, message);
    }

    pub fn dir(&self, message: impl Into<String>) {
        self.notify(Level::Directory, message);
    }

    pub fn file(&self, message: impl Into<String>) {
        self.notify(Level::File, message);
    }

    pub fn notify(&self, level: Level, message: impl Into<String>) {
        if self.verbosity < level as u8 {
            return;
        }
        let message = message.into();

        match &self.sink {
            Sink::Echo { use_color } => {
                if *use_color && level == Level::Problem {
                    println!("{}", AnsiColor::Red.paint(&message));
                } else {
                    println!("{message}");
                }
            },
            Sink::Log => match level {
                Level::Problem => tracing::warn!("{message}"),
                Level::Directory => tracing::info!("{message}"),
                Level::File => tracing::debug!("{message}"),
            },
            Sink::Capture(notices) => notices.borrow_mut().push(Notice { level, message }),
        }
    }

    /// Messages recorded by a capturing notifier
    pub fn notices(&self) -> Vec<Notice> {
        match &self.sink {
            Sink::Capture(notices) => notices.borrow().clone(),
            _ => Vec::new(),
        }
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_gates_levels() {
        let notifier = Notifier::capturing(2, true);
        notifier.problem("bad");
        notifier.dir("dir");
        notifier.file("file");

        let levels: Vec<Level> = notifier.notices().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![Level::Problem, Level::Directory]);
    }

    #[test]
    fn test_muted_still_counts_problems() {
        let notifier = Notifier::capturing(0, false);
        notifier.problem("one");
        notifier.problem("two");
        assert!(notifier.notices().is_empty());
        assert_eq!(notifier.problem_count(), 2);
    }

    #[test]
    fn test_dry_run_flag_is_carried() {
        assert!(Notifier::new(1, true).is_dry_run());
        assert!(!Notifier::new(1, false).is_dry_run());
        assert!(Notifier::capturing(1, true).is_dry_run());
    }
}
