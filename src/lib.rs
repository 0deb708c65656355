pub mod aggregate;
pub mod calendar;
pub mod http_client;
pub mod record;
pub mod report;
pub mod snapshot_store;
