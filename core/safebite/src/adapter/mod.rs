//! safebite 固有のアダプター（ports::outbound の標準実装）

pub mod image_loader;
pub mod result_store;

pub use image_loader::StdImageLoader;
pub use result_store::KvResultStore;
