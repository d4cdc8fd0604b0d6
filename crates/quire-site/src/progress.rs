//! Build progress notifications.

use std::fmt;

/// Build phase a notification belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Create,
    Convert,
    Generate,
    Render,
    Copy,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Convert => "convert",
            Self::Generate => "generate",
            Self::Render => "render",
            Self::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// A synchronous progress notification.
///
/// `current` and `total` are set for per-item messages. `failed` marks an
/// item that was dropped from the build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub step: Step,
    pub message: String,
    pub current: Option<usize>,
    pub total: Option<usize>,
    pub failed: bool,
}

impl Progress {
    #[must_use]
    pub fn new(step: Step, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            current: None,
            total: None,
            failed: false,
        }
    }

    #[must_use]
    pub fn with_count(mut self, current: usize, total: usize) -> Self {
        self.current = Some(current);
        self.total = Some(total);
        self
    }

    #[must_use]
    pub fn failed(mut self) -> Self {
        self.failed = true;
        self
    }
}

/// Progress callback. Notifications never affect control flow.
pub type ProgressFn<'a> = dyn FnMut(&Progress) + 'a;
