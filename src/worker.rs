use crate::compositor::{self, CompositionError, CompositionRequest};
use crate::config::PipelineConfig;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub type GenerationResult = Result<PathBuf, CompositionError>;

/// Runs composition jobs on the tokio blocking pool so the window keeps
/// repainting while large images are processed.
pub struct GenerationWorker {
    runtime: tokio::runtime::Runtime,
    config: Arc<PipelineConfig>,
    sender: mpsc::Sender<GenerationResult>,
    receiver: mpsc::Receiver<GenerationResult>,
    cancel: Option<CancellationToken>,
}

impl GenerationWorker {
    pub fn new(config: PipelineConfig) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("qr-backdrop-worker")
            .enable_all()
            .build()?;
        let (sender, receiver) = mpsc::channel();

        Ok(Self {
            runtime,
            config: Arc::new(config),
            sender,
            receiver,
            cancel: None,
        })
    }

    /// Starts `request` in the background. `on_done` runs on the worker thread
    /// after the result has been queued, typically to wake the UI.
    pub fn submit<F>(&mut self, request: CompositionRequest, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());

        let config = self.config.clone();
        let sender = self.sender.clone();

        self.runtime.spawn_blocking(move || {
            let result = compositor::create_qrcode_with_background(&request, &config, &cancel);
            if let Err(ref e) = result {
                log::warn!("Generation job failed: {}", e);
            }
            if sender.send(result).is_err() {
                log::debug!("Generation result dropped: receiver is gone");
            }
            on_done();
        });
    }

    /// Asks the running job, if any, to stop at its next checkpoint.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }

    /// Returns a finished result without blocking.
    pub fn try_recv(&mut self) -> Option<GenerationResult> {
        let result = self.receiver.try_recv().ok()?;
        self.cancel = None;
        Some(result)
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        // Runtime shutdown waits for blocking tasks; let them bail out early.
        self.cancel();
    }
}
