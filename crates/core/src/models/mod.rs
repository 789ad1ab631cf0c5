pub mod backup;
pub mod budget;
pub mod calendar;
pub mod categorization;
pub mod category;
pub mod export;
pub mod history;
pub mod insight;
pub mod settings;
pub mod stats;
pub mod transaction;
pub mod wallet;
