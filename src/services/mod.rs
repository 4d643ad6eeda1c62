pub mod api_client;
pub mod campaign_service;
pub mod campaign_watcher;
pub mod import_service;
pub mod launch_service;
pub mod session_service;
pub mod template_service;
