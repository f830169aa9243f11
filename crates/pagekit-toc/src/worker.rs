//! Worker-task boundary for TOC generation
//!
//! Generation runs on a dedicated task behind a request/response channel:
//! submit a job, receive bytes or an error. The worker holds no state
//! between jobs and is shut down explicitly; the convenience wrapper
//! tears it down after a single job regardless of outcome.

use crate::{Result, TocError, TocOptions, generate_sync};
use tokio::sync::{mpsc, oneshot};

enum TocCommand {
    Generate {
        bytes: Vec<u8>,
        options: TocOptions,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
}

/// Handle to a running TOC worker task.
pub struct TocWorker {
    commands: mpsc::UnboundedSender<TocCommand>,
    task: tokio::task::JoinHandle<()>,
}

impl TocWorker {
    /// Start the worker task.
    pub fn spawn() -> Self {
        let (commands, mut receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                match command {
                    TocCommand::Generate {
                        bytes,
                        options,
                        reply,
                    } => {
                        let result = match tokio::task::spawn_blocking(move || {
                            generate_sync(&bytes, &options)
                        })
                        .await
                        {
                            Ok(result) => result,
                            Err(join_error) => Err(TocError::TaskJoin(join_error)),
                        };
                        // Receiver may have given up; nothing to do then
                        let _ = reply.send(result);
                    }
                }
            }
        });

        Self { commands, task }
    }

    /// Submit one generation job and await its result.
    pub async fn generate(&self, bytes: Vec<u8>, options: TocOptions) -> Result<Vec<u8>> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(TocCommand::Generate {
                bytes,
                options,
                reply,
            })
            .map_err(|_| TocError::WorkerClosed)?;
        response.await.map_err(|_| TocError::WorkerClosed)?
    }

    /// Stop the worker and wait for it to exit.
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.task.await;
    }
}

/// Generate a table of contents with a worker scoped to this one job.
///
/// Progress milestones mirror the processing pipeline: loading, engine
/// run, saving, complete.
pub async fn generate_table_of_contents(
    bytes: Vec<u8>,
    options: &TocOptions,
    mut progress: impl FnMut(f32, &str) + Send,
) -> Result<Vec<u8>> {
    progress(10.0, "Loading PDF...");
    let worker = TocWorker::spawn();

    progress(30.0, "Generating table of contents...");
    let result = worker.generate(bytes, options.clone()).await;

    // Worker goes away whether the job succeeded or not
    worker.shutdown().await;

    let output = result?;
    progress(90.0, "Saving PDF...");
    progress(100.0, "Complete!");
    Ok(output)
}
