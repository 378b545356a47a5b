//! ErrorTracker port - 例外の記録（Sentry などへの送信）
//!
//! トラッキングは観測のためだけに行い、制御フローには影響させません。
//! そのため `track_exception` は Result を返さず、ブロックもしません。

use std::collections::BTreeMap;

/// Key/value context attached to a tracked error.
pub type TrackingContext = BTreeMap<&'static str, String>;

pub trait ErrorTracker: Send + Sync {
    fn track_exception(&self, error: &(dyn std::error::Error + 'static), context: TrackingContext);
}

impl<T: ErrorTracker + ?Sized> ErrorTracker for std::sync::Arc<T> {
    fn track_exception(&self, error: &(dyn std::error::Error + 'static), context: TrackingContext) {
        (**self).track_exception(error, context)
    }
}
