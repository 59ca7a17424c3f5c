//! UseCase 層（アプリケーションの手順。I/O はすべて ports 経由）

pub mod analysis;
pub mod app;
pub mod prompt;

pub use analysis::AnalysisClient;
pub use app::{AnalysisOutcome, DeleteOutcome, SafebiteUseCase};
