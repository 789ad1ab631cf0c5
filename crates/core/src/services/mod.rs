pub mod aggregation_service;
pub mod analytics_service;
pub mod backup_service;
pub mod categorization_service;
pub mod export_service;
pub mod ledger_service;
