use serde::Serialize;
use tokio::task::JoinHandle;

/// 线索写入后转发给外部通知接口
///
/// 转发在独立任务中执行，失败只记录日志，不影响请求结果
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl Notifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn forward<T: Serialize>(&self, event: &'static str, payload: &T) -> Option<JoinHandle<()>> {
        let Some(url) = self.url.clone() else {
            tracing::debug!("no notification endpoint configured, {} not forwarded", event);
            return None;
        };
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("failed to encode {} for notification: {}", event, e);
                return None;
            }
        };
        let client = self.client.clone();
        Some(tokio::spawn(async move {
            let result = client
                .post(&url)
                .json(&serde_json::json!({ "event": event, "data": body }))
                .send()
                .await
                .and_then(|res| res.error_for_status());
            match result {
                Ok(res) => tracing::debug!("{} forwarded to {}: {}", event, url, res.status()),
                Err(e) => tracing::warn!("failed to forward {} to {}: {}", event, url, e),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn disabled_notifier_skips() {
        assert!(Notifier::disabled().forward("lead", &json!({})).is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_swallowed() {
        let notifier = Notifier::new(Some("http://127.0.0.1:9/lead".to_owned()));
        let handle = notifier
            .forward("lead", &json!({"phone": "5551234"}))
            .expect("forward task");
        assert!(handle.await.is_ok());
    }
}
