use anyhow::Context;
use async_trait::async_trait;

use super::NotificationProvider;

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

pub struct FcmPushProvider {
    server_key: String,
    client: reqwest::Client,
}

impl FcmPushProvider {
    pub fn new(server_key: String) -> Self {
        Self {
            server_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationProvider for FcmPushProvider {
    async fn notify(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "to": device_token,
            "notification": {
                "title": title,
                "body": body,
            },
            "data": data,
        });

        self.client
            .post(FCM_SEND_URL)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .context("failed to send FCM push")?
            .error_for_status()
            .context("FCM API returned error")?;

        Ok(())
    }
}
