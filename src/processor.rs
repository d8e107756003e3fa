//! The provenance processor: a single-task, single-pass reducer that folds
//! the parsed-request stream into per-job summaries.
//!
//! The job map (`job_key -> ProcessedJobData`) is owned exclusively by
//! whichever task calls [`Processor::apply`] / [`run`]. There is
//! deliberately no lock around it.

use crate::model::{
    CallType, Event, EventPayload, ExecProvData, OpFamily, ParsedRequest, Pid, ProcessProvData,
    ProcessedJobData, RequestPayload,
};
use crate::queue::RequestQueue;
use crate::sink::JobSink;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Reduces a stream of `ParsedRequest`s into job summaries, emitting each one
/// through `sink` as its `End` is observed.
pub struct Processor {
    jobs: HashMap<String, ProcessedJobData>,
    sink: Box<dyn JobSink>,
}

impl Processor {
    pub fn new(sink: Box<dyn JobSink>) -> Self {
        Self {
            jobs: HashMap::new(),
            sink,
        }
    }

    /// Applies one drained batch in order. Requests for a given job key are
    /// applied in the order they appear in `requests`.
    pub fn apply(&mut self, requests: Vec<ParsedRequest>) {
        for request in requests {
            self.apply_one(request);
        }
    }

    fn apply_one(&mut self, request: ParsedRequest) {
        let key = request.job_key();

        match request.call_type {
            CallType::Start => {
                let ts = match request.request_payload {
                    RequestPayload::StartOrEnd(s) => s.ts,
                    RequestPayload::Exec(_) => unreachable!("parser pairs Start with StartOrEnd"),
                };
                if self.jobs.contains_key(&key) {
                    tracing::warn!(
                        job_id = %request.job_id,
                        cluster_name = %request.cluster_name,
                        "duplicate Start for in-flight job key, overwriting (accumulated executions lost)"
                    );
                }
                self.jobs.insert(
                    key,
                    ProcessedJobData {
                        job_id: request.job_id,
                        cluster_name: request.cluster_name,
                        job_name: String::new(),
                        path: request.path,
                        start_time: ts,
                        end_time: ts,
                        exec_prov_data_queue: Vec::new(),
                    },
                );
            }
            CallType::Exec => {
                let batch = match request.request_payload {
                    RequestPayload::Exec(batch) => batch,
                    RequestPayload::StartOrEnd(_) => unreachable!("parser pairs Exec with Exec"),
                };
                let Some(job) = self.jobs.get_mut(&key) else {
                    tracing::warn!(
                        job_id = %request.job_id,
                        cluster_name = %request.cluster_name,
                        "Exec for job key with no preceding Start, ignoring"
                    );
                    return;
                };
                job.exec_prov_data_queue.push(fold_execution(batch));
            }
            CallType::End => {
                let ts = match request.request_payload {
                    RequestPayload::StartOrEnd(s) => s.ts,
                    RequestPayload::Exec(_) => unreachable!("parser pairs End with StartOrEnd"),
                };
                let Some(mut job) = self.jobs.remove(&key) else {
                    tracing::warn!(
                        job_id = %request.job_id,
                        cluster_name = %request.cluster_name,
                        "End for job key with no preceding Start, ignoring"
                    );
                    return;
                };
                job.end_time = ts;
                self.sink.emit(&job);
            }
        }
    }
}

/// Folds one `Exec` request's event stream into a fresh `ExecProvData`.
fn fold_execution(batch: crate::model::ExecBatch) -> ExecProvData {
    let mut exec = ExecProvData {
        step_name: batch.step_name,
        start_time: batch.start_time,
        end_time: batch.end_time,
        prov_data: Default::default(),
        rename_map: HashMap::new(),
        symlink_map: HashMap::new(),
        process_map: HashMap::new(),
    };

    for event in batch.events {
        apply_event(&mut exec, event);
    }

    exec
}

fn process_mut(exec: &mut ExecProvData, pid: Pid) -> &mut ProcessProvData {
    exec.process_map.entry(pid).or_default()
}

/// Records a resolved read at both the execution and the owning process's
/// scope. The per-process view is a supplement beyond the base algebra: the
/// field exists on `ProcessProvData` precisely so a process's own slice of
/// the execution's provenance can be inspected independently.
fn record_read(exec: &mut ExecProvData, pid: Pid, resolved: String) {
    exec.prov_data.reads.insert(resolved.clone());
    process_mut(exec, pid).prov_data.reads.insert(resolved);
}

/// Records a resolved write at both the execution and the owning process's
/// scope.
fn record_write(exec: &mut ExecProvData, pid: Pid, resolved: String) {
    exec.prov_data.writes.insert(resolved.clone());
    process_mut(exec, pid).prov_data.writes.insert(resolved);
}

/// Records a resolved exec/spawn target at both the execution and the
/// owning process's scope.
fn record_execute(exec: &mut ExecProvData, pid: Pid, resolved: String) {
    exec.prov_data.executes.insert(resolved.clone());
    process_mut(exec, pid).prov_data.executes.insert(resolved);
}

fn apply_event(exec: &mut ExecProvData, event: Event) {
    let pid = event.pid;

    // Defensive second check: the parser is the sole producer of
    // `Event` values and cannot construct a mismatched pair, but a payload
    // inconsistent with its operation's family is a programming error we
    // refuse to silently record against the wrong field.
    if payload_family(&event.payload) != event.operation.family() {
        tracing::error!(
            op = event.operation.as_str(),
            "payload/operation family mismatch, dropping event without mutating state"
        );
        return;
    }

    // Every event fetches-or-creates its pid's entry, even ops that don't
    // otherwise touch process state (Fork, Rename, Unlink). A pid observed
    // only through one of those still belongs in process_map.
    process_mut(exec, pid);

    match event.operation {
        crate::model::SysOp::ProcessStart => {
            let EventPayload::ProcessStart { ppid } = event.payload else {
                unreachable!()
            };
            let p = process_mut(exec, pid);
            p.start_time = Some(event.ts);
            p.ppid = ppid;
        }
        crate::model::SysOp::ProcessEnd => {
            let p = process_mut(exec, pid);
            p.end_time = Some(event.ts);
            rename_fixup(exec);
        }
        crate::model::SysOp::Fork => {
            // No action: the child's own ProcessStart carries the linkage.
        }
        crate::model::SysOp::Write
        | crate::model::SysOp::Writev
        | crate::model::SysOp::Pwrite
        | crate::model::SysOp::Pwritev
        | crate::model::SysOp::Truncate
        | crate::model::SysOp::Fallocate => {
            let EventPayload::AccessOut { path_out } = event.payload else {
                unreachable!()
            };
            let resolved = resolve(&path_out, &exec.rename_map, &exec.symlink_map);
            record_write(exec, pid, resolved);
        }
        crate::model::SysOp::Unlink => {
            let EventPayload::AccessOut { path_out } = event.payload else {
                unreachable!()
            };
            exec.symlink_map.remove(&path_out);
        }
        crate::model::SysOp::Read
        | crate::model::SysOp::Readv
        | crate::model::SysOp::Pread
        | crate::model::SysOp::Preadv => {
            let EventPayload::AccessIn { path_in } = event.payload else {
                unreachable!()
            };
            let resolved = resolve(&path_in, &exec.rename_map, &exec.symlink_map);
            record_read(exec, pid, resolved);
        }
        crate::model::SysOp::Transfer => {
            let EventPayload::AccessInOut { path_in, path_out } = event.payload else {
                unreachable!()
            };
            let resolved_in = resolve(&path_in, &exec.rename_map, &exec.symlink_map);
            let resolved_out = resolve(&path_out, &exec.rename_map, &exec.symlink_map);
            record_read(exec, pid, resolved_in);
            record_write(exec, pid, resolved_out);
        }
        crate::model::SysOp::Rename => {
            let EventPayload::AccessInOut { path_in, path_out } = event.payload else {
                unreachable!()
            };
            apply_rename(exec, path_in, path_out);
        }
        crate::model::SysOp::Link | crate::model::SysOp::SymLink => {
            let EventPayload::AccessInOut { path_in, path_out } = event.payload else {
                unreachable!()
            };
            let resolved_in = resolve(&path_in, &exec.rename_map, &exec.symlink_map);
            exec.symlink_map.insert(path_out.clone(), resolved_in);
            record_write(exec, pid, path_out);
        }
        crate::model::SysOp::Exec | crate::model::SysOp::System => {
            let EventPayload::ExecCall { target } = event.payload else {
                unreachable!()
            };
            let resolved = resolve(&target, &exec.rename_map, &exec.symlink_map);
            record_execute(exec, pid, resolved);
        }
        crate::model::SysOp::Spawn => {
            let EventPayload::SpawnCall { target } = event.payload else {
                unreachable!()
            };
            let resolved = resolve(&target, &exec.rename_map, &exec.symlink_map);
            record_execute(exec, pid, resolved);
        }
    }
}

/// Tags a payload with the family it would be valid for, for the dispatch
/// defensive check above. Mirrors `SysOp::family` but over `EventPayload`.
fn payload_family(payload: &EventPayload) -> OpFamily {
    match payload {
        EventPayload::ProcessStart { .. } => OpFamily::ProcessStart,
        EventPayload::None => OpFamily::NoPayload,
        EventPayload::AccessOut { .. } => OpFamily::AccessOut,
        EventPayload::AccessIn { .. } => OpFamily::AccessIn,
        EventPayload::AccessInOut { .. } => OpFamily::AccessInOut,
        EventPayload::ExecCall { .. } => OpFamily::ExecCall,
        EventPayload::SpawnCall { .. } => OpFamily::SpawnCall,
    }
}

/// Updates `rename_map` per the chain-collapsing rule: the map always
/// resolves a *current* name to the earliest observed name.
fn apply_rename(exec: &mut ExecProvData, path_in: String, path_out: String) {
    if let Some(original) = exec.rename_map.remove(&path_in) {
        exec.rename_map.insert(path_out, original);
    } else {
        exec.rename_map.insert(path_out, path_in);
    }
}

/// Single-step path resolution: rename map first, then symlink map.
fn resolve(
    path: &str,
    rename_map: &HashMap<String, String>,
    symlink_map: &HashMap<String, String>,
) -> String {
    if let Some(original) = rename_map.get(path) {
        return original.clone();
    }
    if let Some(target) = symlink_map.get(path) {
        return target.clone();
    }
    path.to_string()
}

/// Rewrites writes recorded under a pre-rename name into the post-rename
/// name. Runs on every `ProcessEnd`, against both the execution-wide set and
/// every process's own write set. A rename is a fact about the execution,
/// not about whichever pid happened to trigger the fixup.
fn rename_fixup(exec: &mut ExecProvData) {
    for (new, original) in &exec.rename_map {
        if exec.prov_data.writes.remove(original) {
            exec.prov_data.writes.insert(new.clone());
        }
        for process in exec.process_map.values_mut() {
            if process.prov_data.writes.remove(original) {
                process.prov_data.writes.insert(new.clone());
            }
        }
    }
}

/// The processor's main loop. Drains `queue`, applies each batch, and
/// sleeps `drain_interval` when nothing was drained. Runs until `shutdown`
/// fires, at which point it drains once more and returns. In-flight jobs
/// are discarded.
pub async fn run(
    queue: Arc<RequestQueue>,
    sink: Box<dyn JobSink>,
    drain_interval: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut processor = Processor::new(sink);

    loop {
        let drained = queue.take_all();
        let got_work = !drained.is_empty();
        processor.apply(drained);

        if *shutdown.borrow() {
            // Final drain to pick up anything pushed just before shutdown.
            processor.apply(queue.take_all());
            tracing::info!("processor loop shutting down");
            return;
        }

        if !got_work {
            tokio::select! {
                _ = tokio::time::sleep(drain_interval) => {}
                _ = shutdown.changed() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CallType, ExecBatch, ParsedRequest, RequestPayload, StartOrEnd, SysOp,
    };
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Captures emitted jobs in memory for assertions.
    #[derive(Default)]
    struct CapturingSink {
        jobs: Mutex<Vec<ProcessedJobData>>,
    }

    impl JobSink for CapturingSink {
        fn emit(&self, job: &ProcessedJobData) {
            self.jobs.lock().unwrap().push(job.clone());
        }
    }

    fn start(job_id: &str, cluster: &str, ts: i64) -> ParsedRequest {
        ParsedRequest {
            job_id: job_id.to_string(),
            cluster_name: cluster.to_string(),
            path: format!("/jobs/{job_id}"),
            call_type: CallType::Start,
            request_payload: RequestPayload::StartOrEnd(StartOrEnd { ts }),
        }
    }

    fn end(job_id: &str, cluster: &str, ts: i64) -> ParsedRequest {
        ParsedRequest {
            job_id: job_id.to_string(),
            cluster_name: cluster.to_string(),
            path: format!("/jobs/{job_id}"),
            call_type: CallType::End,
            request_payload: RequestPayload::StartOrEnd(StartOrEnd { ts }),
        }
    }

    fn exec(job_id: &str, cluster: &str, step_name: &str, events: Vec<Event>) -> ParsedRequest {
        ParsedRequest {
            job_id: job_id.to_string(),
            cluster_name: cluster.to_string(),
            path: format!("/jobs/{job_id}"),
            call_type: CallType::Exec,
            request_payload: RequestPayload::Exec(ExecBatch {
                events,
                step_name: step_name.to_string(),
                start_time: 0,
                end_time: 0,
            }),
        }
    }

    fn ev(pid: Pid, ts: i64, operation: SysOp, payload: EventPayload) -> Event {
        Event {
            pid,
            ts,
            operation,
            payload,
        }
    }

    fn process_start(pid: Pid, ts: i64, ppid: Pid) -> Event {
        ev(
            pid,
            ts,
            SysOp::ProcessStart,
            EventPayload::ProcessStart { ppid },
        )
    }

    fn process_end(pid: Pid, ts: i64) -> Event {
        ev(pid, ts, SysOp::ProcessEnd, EventPayload::None)
    }

    fn read(pid: Pid, ts: i64, path: &str) -> Event {
        ev(
            pid,
            ts,
            SysOp::Read,
            EventPayload::AccessIn {
                path_in: path.to_string(),
            },
        )
    }

    fn write(pid: Pid, ts: i64, path: &str) -> Event {
        ev(
            pid,
            ts,
            SysOp::Write,
            EventPayload::AccessOut {
                path_out: path.to_string(),
            },
        )
    }

    fn rename(pid: Pid, ts: i64, from: &str, to: &str) -> Event {
        ev(
            pid,
            ts,
            SysOp::Rename,
            EventPayload::AccessInOut {
                path_in: from.to_string(),
                path_out: to.to_string(),
            },
        )
    }

    fn symlink(pid: Pid, ts: i64, target: &str, link: &str) -> Event {
        ev(
            pid,
            ts,
            SysOp::SymLink,
            EventPayload::AccessInOut {
                path_in: target.to_string(),
                path_out: link.to_string(),
            },
        )
    }

    fn unlink(pid: Pid, ts: i64, path: &str) -> Event {
        ev(
            pid,
            ts,
            SysOp::Unlink,
            EventPayload::AccessOut {
                path_out: path.to_string(),
            },
        )
    }

    fn exec_call(pid: Pid, ts: i64, target: &str) -> Event {
        ev(
            pid,
            ts,
            SysOp::Exec,
            EventPayload::ExecCall {
                target: target.to_string(),
            },
        )
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// A read followed by a write within one execution lands in the right sets.
    #[test]
    fn read_then_write_populates_both_sets() {
        let sink = Arc::new(CapturingSink::default());
        let mut p = Processor::new(Box::new(SharedSink(sink.clone())));

        p.apply(vec![
            start("J", "C", 1),
            exec(
                "J",
                "C",
                "s",
                vec![
                    process_start(7, 2, 1),
                    read(7, 3, "/a"),
                    write(7, 4, "/b"),
                    process_end(7, 5),
                ],
            ),
            end("J", "C", 6),
        ]);

        let jobs = sink.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.end_time, 6);
        let e = &job.exec_prov_data_queue[0];
        assert_eq!(e.prov_data.reads, set(&["/a"]));
        assert_eq!(e.prov_data.writes, set(&["/b"]));
        assert!(e.prov_data.executes.is_empty());
        assert_eq!(e.process_map[&7].start_time, Some(2));
        assert_eq!(e.process_map[&7].end_time, Some(5));
    }

    /// A rename before the execution ends rewrites the write recorded under
    /// the old name.
    #[test]
    fn rename_before_process_end_rewrites_write() {
        let mut exec_data = fold_execution(ExecBatch {
            events: vec![
                write(1, 1, "/tmp/x"),
                rename(1, 2, "/tmp/x", "/final/x"),
                process_end(1, 3),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.prov_data.writes, set(&["/final/x"]));
        assert_eq!(
            exec_data.rename_map.remove("/final/x"),
            Some("/tmp/x".to_string())
        );
    }

    /// A chain of renames collapses to a single original-name -> final-name hop.
    #[test]
    fn chained_renames_collapse_to_one_hop() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                write(1, 1, "/a"),
                rename(1, 2, "/a", "/b"),
                rename(1, 3, "/b", "/c"),
                process_end(1, 4),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.prov_data.writes, set(&["/c"]));
        assert_eq!(exec_data.rename_map.len(), 1);
        assert_eq!(exec_data.rename_map.get("/c"), Some(&"/a".to_string()));
    }

    /// A read through a symlink resolves to the link's target.
    #[test]
    fn read_through_symlink_resolves_to_target() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                symlink(1, 1, "/data", "/link"),
                read(1, 2, "/link"),
                process_end(1, 3),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.prov_data.reads, set(&["/data"]));
        assert_eq!(exec_data.prov_data.writes, set(&["/link"]));
        assert_eq!(
            exec_data.symlink_map.get("/link"),
            Some(&"/data".to_string())
        );
    }

    /// An exec target resolves through a prior rename of that target.
    #[test]
    fn exec_target_resolves_through_rename() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                rename(1, 1, "/bin/a", "/bin/b"),
                exec_call(1, 2, "/bin/b"),
                process_end(1, 3),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.prov_data.executes, set(&["/bin/a"]));
    }

    /// An Exec batch with no preceding Start creates no job entry, and the
    /// following End for that job key is then also ignored.
    #[test]
    fn orphan_exec_then_end_are_ignored() {
        let sink = Arc::new(CapturingSink::default());
        let mut p = Processor::new(Box::new(SharedSink(sink.clone())));

        p.apply(vec![
            exec("J", "C", "s", vec![read(1, 1, "/a")]),
            end("J", "C", 2),
        ]);

        assert!(sink.jobs.lock().unwrap().is_empty());
    }

    /// A rename after ProcessEnd leaves the original write name untouched
    /// (no fixup runs again).
    #[test]
    fn rename_after_process_end_does_not_rewrite_write() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                write(1, 1, "/p"),
                process_end(1, 2),
                rename(1, 3, "/p", "/q"),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.prov_data.writes, set(&["/p"]));
    }

    /// A read before a rename is never rewritten.
    #[test]
    fn read_before_rename_is_stable() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                read(1, 1, "/p"),
                rename(1, 2, "/p", "/q"),
                process_end(1, 3),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.prov_data.reads, set(&["/p"]));
    }

    /// Unlink removes only from the symlink map, and preserves a prior
    /// read/write of the same path.
    #[test]
    fn unlink_only_clears_symlink_map() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                symlink(1, 1, "/data", "/link"),
                read(1, 2, "/link"),
                unlink(1, 3, "/link"),
                process_end(1, 4),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert!(!exec_data.symlink_map.contains_key("/link"));
        assert_eq!(exec_data.prov_data.reads, set(&["/data"]));
        assert_eq!(exec_data.prov_data.writes, set(&["/link"]));
    }

    /// A pid seen only through a Rename, Unlink, or Fork still gets an entry
    /// in process_map: the fetch-or-create runs for every event, not just
    /// the ones that set start/end/ppid.
    #[test]
    fn rename_unlink_and_fork_still_create_a_process_map_entry() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                rename(1, 1, "/a", "/b"),
                unlink(2, 2, "/c"),
                ev(3, 3, SysOp::Fork, EventPayload::None),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert!(exec_data.process_map.contains_key(&1));
        assert!(exec_data.process_map.contains_key(&2));
        assert!(exec_data.process_map.contains_key(&3));
        assert_eq!(exec_data.process_map[&1].start_time, None);
    }

    /// Events for distinct job keys never influence each other.
    #[test]
    fn job_isolation() {
        let sink = Arc::new(CapturingSink::default());
        let mut p = Processor::new(Box::new(SharedSink(sink.clone())));

        p.apply(vec![
            start("J1", "C", 1),
            start("J2", "C", 1),
            exec("J1", "C", "s", vec![write(1, 2, "/only-j1")]),
            exec("J2", "C", "s", vec![write(1, 2, "/only-j2")]),
            end("J1", "C", 3),
            end("J2", "C", 3),
        ]);

        let jobs = sink.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 2);
        for job in jobs.iter() {
            let writes = &job.exec_prov_data_queue[0].prov_data.writes;
            if job.job_id == "J1" {
                assert_eq!(writes, &set(&["/only-j1"]));
            } else {
                assert_eq!(writes, &set(&["/only-j2"]));
            }
        }
    }

    /// A duplicate Start leaves a single fresh entry and drops whatever had
    /// accumulated under the old one.
    #[test]
    fn duplicate_start_overwrites_and_drops_accumulated_execs() {
        let sink = Arc::new(CapturingSink::default());
        let mut p = Processor::new(Box::new(SharedSink(sink.clone())));

        p.apply(vec![
            start("J", "C", 1),
            exec("J", "C", "lost", vec![write(1, 1, "/lost")]),
            start("J", "C", 10),
            end("J", "C", 11),
        ]);

        let jobs = sink.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].exec_prov_data_queue.is_empty());
        assert_eq!(jobs[0].start_time, 10);
    }

    /// Set semantics: repeated accesses to the same resolved path collapse
    /// into one entry.
    #[test]
    fn repeated_accesses_collapse_into_one_entry() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                read(1, 1, "/a"),
                read(1, 2, "/a"),
                write(1, 3, "/b"),
                write(1, 4, "/b"),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.prov_data.reads.len(), 1);
        assert_eq!(exec_data.prov_data.writes.len(), 1);
    }

    /// Reads/writes land in both the execution-wide set and the owning
    /// process's own provenance, and a rename fixup applied to the process
    /// set too.
    #[test]
    fn per_process_provenance_mirrors_exec_and_is_fixed_up() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                process_start(1, 1, 0),
                read(1, 2, "/a"),
                write(1, 3, "/tmp/x"),
                rename(1, 4, "/tmp/x", "/final/x"),
                process_end(1, 5),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        let proc = &exec_data.process_map[&1];
        assert_eq!(proc.prov_data.reads, set(&["/a"]));
        assert_eq!(proc.prov_data.writes, set(&["/final/x"]));
        assert_eq!(exec_data.prov_data.writes, set(&["/final/x"]));
    }

    /// Two processes in the same execution each keep their own provenance
    /// slice even though both feed the same execution-wide set.
    #[test]
    fn per_process_provenance_is_isolated_across_pids_in_one_exec() {
        let exec_data = fold_execution(ExecBatch {
            events: vec![
                write(1, 1, "/only-1"),
                write(2, 2, "/only-2"),
            ],
            step_name: "s".to_string(),
            start_time: 0,
            end_time: 0,
        });

        assert_eq!(exec_data.process_map[&1].prov_data.writes, set(&["/only-1"]));
        assert_eq!(exec_data.process_map[&2].prov_data.writes, set(&["/only-2"]));
        assert_eq!(exec_data.prov_data.writes, set(&["/only-1", "/only-2"]));
    }

    /// Adapter letting multiple `Processor` instances in one test share a
    /// `CapturingSink` via `Arc`, since `Processor` owns its sink by value.
    struct SharedSink(Arc<CapturingSink>);

    impl JobSink for SharedSink {
        fn emit(&self, job: &ProcessedJobData) {
            self.0.emit(job);
        }
    }
}
