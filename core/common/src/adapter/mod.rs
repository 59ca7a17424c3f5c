//! アダプター（外界の I/O を trait で抽象化した各ポートの標準実装）
//!
//! usecase は ports::outbound の trait 経由でのみファイル・時刻・環境変数・ストレージに触れる。
//! 実装は標準実装（Std*）やテスト用の実装（Memory* / Noop*）を注入する。

pub mod file_json_log;
pub mod file_kv_store;
pub mod memory_kv_store;
pub mod std_clock;
pub mod std_env_resolver;
pub mod std_fs;
pub mod std_id_generator;

pub use file_json_log::{FileJsonLog, MemoryLog, NoopLog, StderrLog, TeeLog};
pub use file_kv_store::FileKvStore;
pub use memory_kv_store::MemoryKvStore;
pub use std_clock::{FixedClock, StdClock};
pub use std_env_resolver::StdEnvResolver;
pub use std_fs::StdFileSystem;
pub use std_id_generator::StdIdGenerator;
