use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::BookingEvent;
use crate::services::notifications::NotificationProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub notifier: Box<dyn NotificationProvider>,
    pub events_tx: broadcast::Sender<BookingEvent>,
}
