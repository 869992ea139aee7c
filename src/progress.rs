use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Busy indicator shown while a blocking step runs
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run a future behind a spinner, clearing it when done
pub async fn with_spinner<F, T>(msg: &str, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let pb = spinner(msg);
    let out = fut.await;
    pb.finish_and_clear();
    out
}
