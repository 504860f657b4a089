mod core;
mod ingest_endpoint;
mod process_endpoint;
mod process_page;

pub use core::{
    Notification, NotificationId, create_notification, create_notification_table,
    get_all_notifications,
};
pub use ingest_endpoint::ingest_notification_endpoint;
pub use process_endpoint::process_notification_endpoint;
pub use process_page::get_process_notification_page;
