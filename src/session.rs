use crate::compositor::{CompositionError, CompositionRequest};
use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAX_ACTIVITY: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter the QR code content!")]
    EmptyPayload,

    #[error("Please choose a background image first!")]
    NoBackground,

    #[error("A QR code is already being generated")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A message the shell shows in a modal window until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Running,
}

/// State behind the window: inputs, the running job and what to show next.
#[derive(Debug)]
pub struct Session {
    pub payload: String,
    background: Option<PathBuf>,
    output_dir: PathBuf,
    status: GenerationStatus,
    last_output: Option<PathBuf>,
    notice: Option<Notice>,
    activity: Vec<String>,
}

impl Session {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            payload: String::new(),
            background: None,
            output_dir,
            status: GenerationStatus::Idle,
            last_output: None,
            notice: None,
            activity: Vec::new(),
        }
    }

    pub fn background(&self) -> Option<&Path> {
        self.background.as_deref()
    }

    pub fn last_output(&self) -> Option<&Path> {
        self.last_output.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.status == GenerationStatus::Running
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn activity(&self) -> &[String] {
        &self.activity
    }

    /// Replaces the current background choice.
    pub fn select_background(&mut self, path: PathBuf) {
        log::info!("Background selected: {}", path.display());
        self.record(format!("Selected background: {}", path.display()));
        self.notice = Some(Notice::new(
            NoticeKind::Info,
            "Background Image",
            format!("Selected background image: {}", path.display()),
        ));
        self.background = Some(path);
    }

    /// Validates the inputs and, if they hold, marks the session busy and
    /// returns the job to run. On failure a warning notice is queued instead.
    pub fn begin_generation(&mut self) -> Result<CompositionRequest, ValidationError> {
        let request = match self.validate() {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Generation refused: {}", e);
                self.notice = Some(Notice::new(NoticeKind::Warning, "Error", e.to_string()));
                return Err(e);
            }
        };

        self.status = GenerationStatus::Running;
        self.record(format!("Generating QR code for \"{}\"", request.payload));
        Ok(request)
    }

    fn validate(&self) -> Result<CompositionRequest, ValidationError> {
        if self.is_busy() {
            return Err(ValidationError::Busy);
        }
        if self.payload.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }
        let background = self.background.clone().ok_or(ValidationError::NoBackground)?;

        Ok(CompositionRequest {
            payload: self.payload.clone(),
            background,
            output_dir: self.output_dir.clone(),
        })
    }

    /// Records the outcome of the job started by [`Session::begin_generation`].
    pub fn finish_generation(&mut self, result: Result<PathBuf, CompositionError>) {
        self.status = GenerationStatus::Idle;
        match result {
            Ok(path) => {
                self.record(format!("Saved {}", path.display()));
                self.notice = Some(Notice::new(
                    NoticeKind::Success,
                    "Success",
                    format!("QR code generated: {}", path.display()),
                ));
                self.last_output = Some(path);
            }
            Err(CompositionError::Cancelled) => {
                self.record("Generation cancelled".to_string());
            }
            Err(e) => self.report_error(e.to_string()),
        }
    }

    /// Surfaces a failure as an error notice; the session stays usable.
    pub fn report_error(&mut self, message: String) {
        log::error!("{}", message);
        self.record(format!("Error: {}", message));
        self.notice = Some(Notice::new(NoticeKind::Error, "Error", message));
    }

    fn record(&mut self, entry: String) {
        let stamp = Local::now().format("%H:%M:%S");
        self.activity.push(format!("[{}] {}", stamp, entry));
        if self.activity.len() > MAX_ACTIVITY {
            let remove_count = self.activity.len() - MAX_ACTIVITY;
            self.activity.drain(0..remove_count);
        }
    }
}
