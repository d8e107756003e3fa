//! Core data model: syscall events, per-execution/per-process provenance
//! views, and the job summary assembled from them.
//!
//! These types are the algebra the processor (`crate::processor`) folds a
//! request stream into. The parser (`crate::parser`) is the only producer of
//! `ParsedRequest`/`Event` values; nothing else constructs them.

use std::collections::{HashMap, HashSet};

/// Monotonic timestamp in the agent's opaque units.
pub type Timestamp = i64;
pub type Pid = u64;

/// The closed set of syscalls the tracing agent can report. Adding an
/// operation here means adding it to a payload family below and to the
/// processor's dispatch in `crate::processor::fold_execution`. There is no
/// silent default for an unrecognized operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SysOp {
    ProcessStart,
    ProcessEnd,
    Fork,
    Write,
    Writev,
    Pwrite,
    Pwritev,
    Truncate,
    Fallocate,
    Unlink,
    Read,
    Readv,
    Pread,
    Preadv,
    Transfer,
    Rename,
    Link,
    SymLink,
    Exec,
    System,
    Spawn,
}

impl SysOp {
    /// All twenty-one variants, for the parser's name table.
    pub const ALL: &'static [SysOp] = &[
        SysOp::ProcessStart,
        SysOp::ProcessEnd,
        SysOp::Fork,
        SysOp::Write,
        SysOp::Writev,
        SysOp::Pwrite,
        SysOp::Pwritev,
        SysOp::Truncate,
        SysOp::Fallocate,
        SysOp::Unlink,
        SysOp::Read,
        SysOp::Readv,
        SysOp::Pread,
        SysOp::Preadv,
        SysOp::Transfer,
        SysOp::Rename,
        SysOp::Link,
        SysOp::SymLink,
        SysOp::Exec,
        SysOp::System,
        SysOp::Spawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SysOp::ProcessStart => "ProcessStart",
            SysOp::ProcessEnd => "ProcessEnd",
            SysOp::Fork => "Fork",
            SysOp::Write => "Write",
            SysOp::Writev => "Writev",
            SysOp::Pwrite => "Pwrite",
            SysOp::Pwritev => "Pwritev",
            SysOp::Truncate => "Truncate",
            SysOp::Fallocate => "Fallocate",
            SysOp::Unlink => "Unlink",
            SysOp::Read => "Read",
            SysOp::Readv => "Readv",
            SysOp::Pread => "Pread",
            SysOp::Preadv => "Preadv",
            SysOp::Transfer => "Transfer",
            SysOp::Rename => "Rename",
            SysOp::Link => "Link",
            SysOp::SymLink => "SymLink",
            SysOp::Exec => "Exec",
            SysOp::System => "System",
            SysOp::Spawn => "Spawn",
        }
    }

    pub fn from_str(s: &str) -> Option<SysOp> {
        SysOp::ALL.iter().copied().find(|op| op.as_str() == s)
    }

    /// Which `EventPayload` variant this operation's family consumes.
    pub fn family(self) -> OpFamily {
        match self {
            SysOp::ProcessStart => OpFamily::ProcessStart,
            SysOp::ProcessEnd | SysOp::Fork => OpFamily::NoPayload,
            SysOp::Write
            | SysOp::Writev
            | SysOp::Pwrite
            | SysOp::Pwritev
            | SysOp::Truncate
            | SysOp::Fallocate
            | SysOp::Unlink => OpFamily::AccessOut,
            SysOp::Read | SysOp::Readv | SysOp::Pread | SysOp::Preadv => OpFamily::AccessIn,
            SysOp::Transfer | SysOp::Rename | SysOp::Link | SysOp::SymLink => {
                OpFamily::AccessInOut
            }
            SysOp::Exec | SysOp::System => OpFamily::ExecCall,
            SysOp::Spawn => OpFamily::SpawnCall,
        }
    }
}

/// Which payload shape a `SysOp` family consumes. Used by the parser to
/// validate a wire event before constructing an `Event`, and by the
/// processor as a defensive second check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFamily {
    ProcessStart,
    NoPayload,
    AccessOut,
    AccessIn,
    AccessInOut,
    ExecCall,
    SpawnCall,
}

/// Tagged union of event payloads. The active variant is determined by the
/// `SysOp` family of the event carrying it (see `SysOp::family`); a mismatch
/// between operation and payload is a parser programming error, never
/// resolved via runtime polymorphism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    ProcessStart { ppid: Pid },
    AccessIn { path_in: String },
    AccessOut { path_out: String },
    AccessInOut { path_in: String, path_out: String },
    ExecCall { target: String },
    SpawnCall { target: String },
    None,
}

/// One observed syscall.
#[derive(Debug, Clone)]
pub struct Event {
    pub pid: Pid,
    pub ts: Timestamp,
    pub operation: SysOp,
    pub payload: EventPayload,
}

/// Three sets of resolved path strings. Set semantics: repeated accesses to
/// the same resolved path collapse into one entry.
#[derive(Debug, Clone, Default)]
pub struct ProvData {
    pub reads: HashSet<String>,
    pub writes: HashSet<String>,
    pub executes: HashSet<String>,
}

/// Provenance scoped to a single pid within one execution. `start_time` /
/// `end_time` are unset until the corresponding `ProcessStart` / `ProcessEnd`
/// event is observed. Fetch-or-create must not clobber a field that's
/// already been set by an earlier event for the same pid. `prov_data` is
/// recorded alongside the execution-wide set on every read/write/execute, so
/// a process's own slice of the execution's provenance can be inspected
/// independently of the others sharing the same `ExecProvData`.
#[derive(Debug, Clone, Default)]
pub struct ProcessProvData {
    pub ppid: Pid,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub prov_data: ProvData,
}

/// One completed execution step of a job: the event stream folded into
/// provenance, plus the rename/symlink maps accumulated while folding it.
/// The two maps are scoped to this execution only. They do not carry over
/// to the next `Exec` request for the same job.
#[derive(Debug, Clone)]
pub struct ExecProvData {
    pub step_name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub prov_data: ProvData,
    pub rename_map: HashMap<String, String>,
    pub symlink_map: HashMap<String, String>,
    pub process_map: HashMap<Pid, ProcessProvData>,
}

/// The summary assembled for one `(job_id, cluster_name)` pair, from `Start`
/// to `End`.
#[derive(Debug, Clone)]
pub struct ProcessedJobData {
    pub job_id: String,
    pub cluster_name: String,
    /// Not populated by anything in the current ingestion path. `Start`
    /// carries no job-name field on the wire (see DESIGN.md). Left as an
    /// empty string rather than removed, since downstream consumers of the
    /// summary expect the field to exist.
    pub job_name: String,
    pub path: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub exec_prov_data_queue: Vec<ExecProvData>,
}

impl ProcessedJobData {
    /// The string concatenation `job_id ∥ cluster_name` used to key the
    /// processor's in-flight job map.
    pub fn job_key(job_id: &str, cluster_name: &str) -> String {
        format!("{job_id}{cluster_name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    Start,
    End,
    Exec,
}

#[derive(Debug, Clone, Copy)]
pub struct StartOrEnd {
    pub ts: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ExecBatch {
    pub events: Vec<Event>,
    pub step_name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

#[derive(Debug, Clone)]
pub enum RequestPayload {
    StartOrEnd(StartOrEnd),
    Exec(ExecBatch),
}

/// The parser's output: one HTTP POST body resolved into a typed request.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub job_id: String,
    pub cluster_name: String,
    pub path: String,
    pub call_type: CallType,
    pub request_payload: RequestPayload,
}

impl ParsedRequest {
    pub fn job_key(&self) -> String {
        ProcessedJobData::job_key(&self.job_id, &self.cluster_name)
    }
}
