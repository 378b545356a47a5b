//! coffer-core
//!
//! CI job artifact の取り込み（ingestion）を行うコアライブラリ。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, job, artifact, params, expire_in, outcome, errors）
//! - **ports**: 抽象化レイヤー（ArtifactStore, ContentStore, ErrorTracker, ApplicationSettings, Clock）
//! - **app**: アプリケーションロジック（CreateJobArtifactsService, ServiceBuilder）
//! - **impls**: 実装（InMemoryArtifactStore, LocalContentStore など）
//! - **config**: 設定ファイルと環境変数

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{CreateJobArtifactsService, ServiceBuilder};
pub use config::Config;
