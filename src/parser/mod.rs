//! Parses a `/log` request body into a `ParsedRequest`.
//!
//! The parser owns every "malformed input" error kind: an unknown `type`, an
//! unknown `op`, or an operation whose required field is absent all produce
//! a `ParseError` here and never reach the processor.

pub mod models;

use crate::model::{
    CallType, Event, EventPayload, ExecBatch, OpFamily, ParsedRequest, RequestPayload, StartOrEnd,
    SysOp,
};
use models::{WireEvent, WireRequest};
use std::fmt;

#[derive(Debug)]
pub enum ParseError {
    /// The body isn't valid JSON, or doesn't match the wire schema shape.
    Json(serde_json::Error),
    /// `type` wasn't one of `Start` | `End` | `Exec`.
    UnknownCallType(String),
    /// A `Start`/`End` request was missing `ts`.
    MissingTimestamp,
    /// An `Exec` request was missing `step_name`, `start_time`, `end_time`,
    /// or `events`.
    MissingExecField(&'static str),
    /// An event's `op` wasn't one of the closed `SysOp` names.
    UnknownOp(String),
    /// An event named a valid `op` but omitted a field its family requires.
    MissingEventField { op: &'static str, field: &'static str },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Json(e) => write!(f, "invalid request body: {e}"),
            ParseError::UnknownCallType(t) => write!(f, "unknown call type {t:?}"),
            ParseError::MissingTimestamp => write!(f, "missing ts for Start/End request"),
            ParseError::MissingExecField(field) => {
                write!(f, "missing {field} for Exec request")
            }
            ParseError::UnknownOp(op) => write!(f, "unknown syscall op {op:?}"),
            ParseError::MissingEventField { op, field } => {
                write!(f, "{op} event missing required field {field}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses one `/log` request body into a `ParsedRequest`.
pub fn parse_request(body: &[u8]) -> Result<ParsedRequest, ParseError> {
    let wire: WireRequest = serde_json::from_slice(body).map_err(ParseError::Json)?;

    let call_type = match wire.call_type.as_str() {
        "Start" => CallType::Start,
        "End" => CallType::End,
        "Exec" => CallType::Exec,
        other => return Err(ParseError::UnknownCallType(other.to_string())),
    };

    let request_payload = match call_type {
        CallType::Start | CallType::End => {
            let ts = wire.ts.ok_or(ParseError::MissingTimestamp)?;
            RequestPayload::StartOrEnd(StartOrEnd { ts })
        }
        CallType::Exec => {
            let step_name = wire
                .step_name
                .ok_or(ParseError::MissingExecField("step_name"))?;
            let start_time = wire
                .start_time
                .ok_or(ParseError::MissingExecField("start_time"))?;
            let end_time = wire
                .end_time
                .ok_or(ParseError::MissingExecField("end_time"))?;
            let wire_events = wire.events.ok_or(ParseError::MissingExecField("events"))?;

            let events = wire_events
                .into_iter()
                .map(event_from_wire)
                .collect::<Result<Vec<_>, _>>()?;

            RequestPayload::Exec(ExecBatch {
                events,
                step_name,
                start_time,
                end_time,
            })
        }
    };

    Ok(ParsedRequest {
        job_id: wire.job_id,
        cluster_name: wire.cluster_name,
        path: wire.path,
        call_type,
        request_payload,
    })
}

/// Validates one wire event against the closed `SysOp` set and its payload
/// family, then builds the typed `Event`.
fn event_from_wire(w: WireEvent) -> Result<Event, ParseError> {
    let operation = SysOp::from_str(&w.op).ok_or_else(|| ParseError::UnknownOp(w.op.clone()))?;

    let payload = match operation.family() {
        OpFamily::ProcessStart => {
            let ppid = w.ppid.ok_or(ParseError::MissingEventField {
                op: operation.as_str(),
                field: "ppid",
            })?;
            EventPayload::ProcessStart { ppid }
        }
        OpFamily::NoPayload => EventPayload::None,
        OpFamily::AccessOut => {
            let path_out = w.path_out.ok_or(ParseError::MissingEventField {
                op: operation.as_str(),
                field: "path_out",
            })?;
            EventPayload::AccessOut { path_out }
        }
        OpFamily::AccessIn => {
            let path_in = w.path_in.ok_or(ParseError::MissingEventField {
                op: operation.as_str(),
                field: "path_in",
            })?;
            EventPayload::AccessIn { path_in }
        }
        OpFamily::AccessInOut => {
            let path_in = w.path_in.ok_or(ParseError::MissingEventField {
                op: operation.as_str(),
                field: "path_in",
            })?;
            let path_out = w.path_out.ok_or(ParseError::MissingEventField {
                op: operation.as_str(),
                field: "path_out",
            })?;
            EventPayload::AccessInOut { path_in, path_out }
        }
        OpFamily::ExecCall => {
            let target = w.target.ok_or(ParseError::MissingEventField {
                op: operation.as_str(),
                field: "target",
            })?;
            EventPayload::ExecCall { target }
        }
        OpFamily::SpawnCall => {
            let target = w.target.ok_or(ParseError::MissingEventField {
                op: operation.as_str(),
                field: "target",
            })?;
            EventPayload::SpawnCall { target }
        }
    };

    Ok(Event {
        pid: w.pid,
        ts: w.ts,
        operation,
        payload,
    })
}
