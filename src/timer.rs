//! Timer trigger metadata.
//!
//! Field names follow the JSON a scheduler host sends, so the payload can be
//! deserialised directly:
//!
//! ```rust
//! use tandem::TimerInfo;
//!
//! let info: TimerInfo = serde_json::from_str(r#"{
//!     "schedule": { "adjustForDST": true },
//!     "scheduleStatus": {
//!         "last": "2022-07-12T21:00:00Z",
//!         "next": "2022-07-12T21:05:00Z",
//!         "lastUpdated": "2022-07-12T21:00:00Z"
//!     },
//!     "isPastDue": false
//! }"#).unwrap();
//!
//! assert!(info.schedule.adjust_for_dst);
//! assert!(!info.is_past_due);
//! ```

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerInfo {
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub schedule_status: Option<ScheduleStatus>,
    #[serde(default)]
    pub is_past_due: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schedule {
    #[serde(rename = "adjustForDST", default)]
    pub adjust_for_dst: bool,
}

/// Last and next fire times, as the host formats them.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    pub last: String,
    pub next: String,
    pub last_updated: String,
}
