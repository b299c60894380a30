use std::time::Duration;

/// Best-effort reachability probe run once at startup.
///
/// Any HTTP response counts as "online"; only transport failures (DNS,
/// refused connection, timeout) count as offline.
pub async fn is_online(url: &str, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("failed to build probe client: {e}");
            return false;
        }
    };

    match client.get(url).send().await {
        Ok(resp) => {
            tracing::debug!(status = %resp.status(), "connectivity probe answered");
            true
        }
        Err(e) => {
            tracing::warn!("connectivity probe to {url} failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_offline() {
        // Port 9 on loopback: nothing listens there in test environments.
        assert!(!is_online("http://127.0.0.1:9/", Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn invalid_url_is_offline() {
        assert!(!is_online("not a url", Duration::from_millis(100)).await);
    }
}
