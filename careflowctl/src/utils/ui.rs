use std::future::Future;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Failed,
    Success,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Running => write!(f, "{}", "Running:".yellow()),
            Status::Failed => write!(f, "{}", "Failed:".bright_red()),
            Status::Success => write!(f, "{}", "Success:".green()),
        }
    }
}

pub trait AsyncFn {
    type Future: Future<Output = anyhow::Result<String>>;
    fn call(self) -> Self::Future;
}

impl<F, Fut> AsyncFn for F
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    type Future = Fut;
    fn call(self) -> Self::Future {
        self()
    }
}

/// Terminal output of the cli.
///
/// Progress goes to stderr as status lines, results of a command go to
/// stdout so they can be piped.
#[derive(Debug, Default)]
pub struct Ui {
    running: Mutex<Option<String>>,
}

impl Ui {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_status(&self, message: impl AsRef<str>, status: Status) {
        let message = message.as_ref();
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        *running = match status {
            Status::Running => Some(message.to_string()),
            Status::Failed | Status::Success => None,
        };
        eprintln!("{} {}", status, message);
    }

    pub fn new_status_line(&self, message: impl AsRef<str>) {
        self.set_status(message, Status::Running)
    }

    pub fn failed(&self, message: impl AsRef<str>) {
        self.set_status(message, Status::Failed)
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.set_status(message, Status::Success)
    }

    /// Message of the status line that has not finished yet.
    pub fn running(&self) -> Option<String> {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn println(&self, message: impl AsRef<str>) {
        println!("{}", message.as_ref());
    }

    pub fn eprintln(&self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
    }

    /// Forgets an unfinished status line.
    pub fn clear(&self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Runs `f`, printing its output on success and marking the current
    /// status line as failed otherwise.
    pub async fn run<F>(&self, f: F) -> anyhow::Result<()>
    where
        F: AsyncFn,
    {
        match f.call().await {
            Ok(output) => {
                if !output.is_empty() {
                    self.println(output);
                }
                Ok(())
            }
            Err(e) => {
                self.failed(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_finishes_the_status_line() {
        let ui = Ui::new();
        ui.new_status_line("Loading roles ...");
        assert_eq!(ui.running().as_deref(), Some("Loading roles ..."));

        let result = ui
            .run(|| async { Err::<String, _>(anyhow::anyhow!("server is down")) })
            .await;
        assert!(result.is_err());
        assert_eq!(ui.running(), None);
    }

    #[test]
    fn test_clear() {
        let ui = Ui::new();
        ui.new_status_line("Logging in ...");
        ui.clear();
        assert_eq!(ui.running(), None);
    }
}
