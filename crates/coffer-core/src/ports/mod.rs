//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（DB, オブジェクトストレージ, エラートラッキング, 設定）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ArtifactStore が job / artifact レコードの正本（source of truth）
//! - ContentStore は artifact 本体の保存先
//! - 障害は型付きエラーで返し、サービス境界で ServiceResponse に変換する

pub mod artifact_store;
pub mod clock;
pub mod content_store;
pub mod error_tracker;
pub mod id_generator;
pub mod settings;

// 主要な trait を再エクスポート
pub use self::artifact_store::{ArtifactStore, StoreError};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::content_store::{ContentStore, ContentStoreError};
pub use self::error_tracker::{ErrorTracker, TrackingContext};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::settings::ApplicationSettings;
