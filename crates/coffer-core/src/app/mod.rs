//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ServiceBuilder**: サービスの構築とワイヤリング
//! - **CreateJobArtifactsService**: job artifact の取り込み

pub mod builder;
pub mod service;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ServiceBuilder};
pub use self::service::CreateJobArtifactsService;
