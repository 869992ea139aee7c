use std::time::Duration;

use log::debug;

use crate::youtube::USER_AGENT;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Thumbnail variants, best quality first
const VARIANTS: [&str; 4] = ["maxresdefault", "hqdefault", "mqdefault", "default"];

pub fn candidates(video_id: &str) -> Vec<String> {
    VARIANTS
        .iter()
        .map(|v| format!("https://i.ytimg.com/vi/{video_id}/{v}.jpg"))
        .collect()
}

/// First thumbnail URL that actually resolves, if any
pub async fn resolve(client: &reqwest::Client, video_id: &str) -> Option<String> {
    for url in candidates(video_id) {
        let resp = client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match resp {
            Ok(r) if r.status() == reqwest::StatusCode::OK => return Some(url),
            Ok(r) => debug!("Thumbnail {url} returned {}", r.status()),
            Err(e) => debug!("Thumbnail {url} failed: {e}"),
        }
    }
    None
}
