use anyhow::{Context, Result};
use eframe::egui;
use poll_promise::Promise;
use std::future::Future;
use tracing::{debug, warn};

use crate::llmclient::error_text;

/// Finished call: the generated text, or display-ready error text.
pub type Reply = std::result::Result<String, String>;

/// One completion call running on its own thread.
pub struct Dispatch {
    promise: Promise<Reply>,
}

impl Dispatch {
    pub fn spawn<F>(name: &str, ctx: Option<egui::Context>, job: F) -> Self
    where
        F: Future<Output = Result<String>> + Send + 'static,
    {
        debug!(thread = name, "Dispatching request");
        let thread_name = name.to_string();
        let promise = Promise::spawn_thread(name.to_string(), move || {
            let reply = block_on(job).map_err(|e| {
                warn!(thread = %thread_name, error = %e, "Request failed");
                error_text(&e)
            });
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
            reply
        });
        Self { promise }
    }

    pub fn is_pending(&self) -> bool {
        self.promise.ready().is_none()
    }
}

/// Takes the reply out of `slot` once it has arrived. Never blocks.
pub fn poll(slot: &mut Option<Dispatch>) -> Option<Reply> {
    let dispatch = slot.take()?;
    match dispatch.promise.try_take() {
        Ok(reply) => Some(reply),
        Err(promise) => {
            *slot = Some(Dispatch { promise });
            None
        }
    }
}

fn block_on<F>(job: F) -> Result<String>
where
    F: Future<Output = Result<String>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    rt.block_on(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn successful_job_yields_text() {
        let dispatch = Dispatch::spawn("test_ok", None, async { Ok("notes".to_string()) });
        assert_eq!(dispatch.promise.block_until_ready(), &Ok("notes".to_string()));
    }

    #[test]
    fn failed_job_yields_error_text() {
        let dispatch = Dispatch::spawn("test_err", None, async {
            Err(anyhow::anyhow!("Request failed with status 401 Unauthorized: bad key"))
        });
        assert_eq!(
            dispatch.promise.block_until_ready(),
            &Err("❌ Error: Request failed with status 401 Unauthorized: bad key".to_string())
        );
    }

    #[test]
    fn job_runs_inside_a_tokio_runtime() {
        let dispatch = Dispatch::spawn("test_sleep", None, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok("slept".to_string())
        });
        assert_eq!(dispatch.promise.block_until_ready(), &Ok("slept".to_string()));
    }

    #[test]
    fn pending_until_the_job_finishes() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let dispatch = Dispatch::spawn("test_pending", None, async move {
            rx.recv().ok();
            Ok("quiz".to_string())
        });

        assert!(dispatch.is_pending());

        tx.send(()).unwrap();
        dispatch.promise.block_until_ready();
        assert!(!dispatch.is_pending());
    }

    #[test]
    fn poll_returns_reply_once() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let mut slot = Some(Dispatch::spawn("test_poll", None, async move {
            rx.recv().ok();
            Ok("done".to_string())
        }));

        assert_eq!(poll(&mut slot), None);
        assert!(slot.is_some());

        tx.send(()).unwrap();
        slot.as_ref().unwrap().promise.block_until_ready();

        assert_eq!(poll(&mut slot), Some(Ok("done".to_string())));
        assert!(slot.is_none());
        assert_eq!(poll(&mut slot), None);
    }
}
