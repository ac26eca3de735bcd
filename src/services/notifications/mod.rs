pub mod fcm;

use async_trait::async_trait;

#[async_trait]
pub trait NotificationProvider: Send + Sync {
    async fn notify(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> anyhow::Result<()>;
}
