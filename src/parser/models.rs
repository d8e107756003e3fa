//! Wire format for the `/log` request body.
//!
//! These structs mirror the JSON shape the tracing agent posts; they are
//! deliberately "stringly typed" (`op` and `type` as raw strings) because
//! validating them against the closed `SysOp`/`CallType` enumerations is the
//! parser's job, not serde's. A raw string lets us produce a `ParseError`
//! naming the offending value instead of an opaque deserialize failure.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct WireRequest {
    pub job_id: String,
    pub cluster_name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub call_type: String,

    /// Present for `Start`/`End`.
    pub ts: Option<i64>,

    /// Present for `Exec`.
    pub step_name: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub events: Option<Vec<WireEvent>>,
}

#[derive(Debug, Deserialize)]
pub struct WireEvent {
    pub pid: u64,
    pub ts: i64,
    pub op: String,

    pub ppid: Option<u64>,
    pub path_in: Option<String>,
    pub path_out: Option<String>,
    pub target: Option<String>,
}
