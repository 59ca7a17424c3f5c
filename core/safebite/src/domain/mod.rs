//! safebite 固有のドメイン型（型と不変条件）

pub mod category;
pub mod command;
pub mod history_filter;
pub mod preferences;
pub mod record;
pub use category::Category;
pub use command::SafebiteCommand;
pub use history_filter::HistoryFilter;
pub use preferences::{PreferencesUpdate, UserPreferences};
pub use record::{AnalysisRecord, Finding, Verdict};
