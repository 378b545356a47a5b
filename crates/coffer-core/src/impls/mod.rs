//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryArtifactStore**: 開発・テスト用のレコードストア
//! - **LocalContentStore**: ローカルディスクへの artifact 本体の保存
//! - **TracingErrorTracker / RecordingErrorTracker**: エラートラッキング
//! - **StaticSettings**: 設定ファイル由来の ApplicationSettings

pub mod inmem_artifact_store;
pub mod local_content_store;
pub mod static_settings;
pub mod tracker;

// 主要な型を再エクスポート
pub use self::inmem_artifact_store::InMemoryArtifactStore;
pub use self::local_content_store::LocalContentStore;
pub use self::static_settings::StaticSettings;
pub use self::tracker::{RecordingErrorTracker, TrackedError, TracingErrorTracker};
