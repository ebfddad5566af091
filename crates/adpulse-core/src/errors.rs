use chrono::NaiveDate;
use std::fmt;

/// Failure kinds the pipeline distinguishes at the per-creative boundary.
///
/// `AssetUnreadable` and `DuplicateRecord` are isolated to the creative that
/// produced them; `ConfigInvalid` fails fast before any scoring starts.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizerError {
    AssetUnreadable {
        creative_id: String,
        reason: String,
    },
    DuplicateRecord {
        creative_id: String,
        date: NaiveDate,
    },
    ConfigInvalid(String),
}

impl fmt::Display for OptimizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerError::AssetUnreadable {
                creative_id,
                reason,
            } => write!(f, "asset unreadable for creative {creative_id}: {reason}"),
            OptimizerError::DuplicateRecord { creative_id, date } => write!(
                f,
                "duplicate performance record for creative {creative_id} on {date}"
            ),
            OptimizerError::ConfigInvalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for OptimizerError {}

impl OptimizerError {
    pub fn is_asset_unreadable(&self) -> bool {
        matches!(self, OptimizerError::AssetUnreadable { .. })
    }

    pub fn is_duplicate_record(&self) -> bool {
        matches!(self, OptimizerError::DuplicateRecord { .. })
    }
}
