//! 配線: 標準アダプタで UseCase を組み立てる

use std::sync::Arc;

use common::adapter::{
    FileJsonLog, FileKvStore, StderrLog, StdClock, StdEnvResolver, StdFileSystem, StdIdGenerator,
    TeeLog,
};
use common::config::{load_config, Config as AppConfig};
use common::domain::HomeDir;
use common::error::Error;
use common::llm::{GeminiProvider, LlmDriver};
use common::ports::outbound::{Clock, EnvResolver, FileSystem, Log};

use crate::adapter::{KvResultStore, StdImageLoader};
use crate::usecase::{AnalysisClient, SafebiteUseCase};

/// main から使う組み立て済みのアプリ
pub struct App {
    pub use_case: SafebiteUseCase,
    pub logger: Arc<dyn Log>,
}

/// 標準の依存（実 FS・環境変数・Gemini）で App を組み立てる
///
/// API キーが無くても失敗しない（解析時に Error::NotConfigured）。
pub fn wire_safebite(verbose: bool) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env = StdEnvResolver;
    let home = env.resolve_home_dir()?;
    let config = load_config(fs.as_ref(), &home)?;

    let file_log: Arc<dyn Log> = Arc::new(FileJsonLog::new(Arc::clone(&fs), home.log_file()));
    let logger: Arc<dyn Log> = if verbose {
        Arc::new(TeeLog::new(vec![file_log, Arc::new(StderrLog)]))
    } else {
        file_log
    };

    let driver = GeminiProvider::from_config(&config, &env)
        .map(|p| LlmDriver::new(Arc::new(p)));

    Ok(wire_with(fs, &home, &config, driver, logger))
}

/// 依存を注入して App を組み立てる（テストでは StubProvider と一時ディレクトリを渡す）
pub fn wire_with(
    fs: Arc<dyn FileSystem>,
    home: &HomeDir,
    config: &AppConfig,
    driver: Result<LlmDriver, Error>,
    logger: Arc<dyn Log>,
) -> App {
    let clock: Arc<dyn Clock> = Arc::new(StdClock);
    let id_gen = Arc::new(StdIdGenerator::new(Arc::clone(&clock)));
    let analysis = AnalysisClient::new(driver, clock, id_gen, Arc::clone(&logger))
        .with_temperature(config.temperature);

    let kv = Arc::new(FileKvStore::new(
        Arc::clone(&fs),
        home.storage_dir(),
        config.storage_quota_bytes,
    ));
    let store = Arc::new(KvResultStore::new(kv, Arc::clone(&logger)));
    let images = Arc::new(StdImageLoader::new(fs));

    App {
        use_case: SafebiteUseCase::new(analysis, store, images, Arc::clone(&logger)),
        logger,
    }
}
