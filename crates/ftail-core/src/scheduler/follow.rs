//! Follow many targets until every tailer has stopped.
//!
//! [`follow`] gives each tailer its own OS thread and timeline, so a target in
//! a long backoff never stalls its siblings. [`follow_round_robin`] keeps the
//! single-threaded pass-over-every-tailer loop, where one wait blocks all.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::control::{FollowControl, StopFlag};
use crate::error::ValidationError;
use crate::tail::{TailResult, Tailer, Targets};
use crate::transport::Transport;

use super::cycle::get_tail;
use super::pacer::Pacer;
use super::status::TailerStatus;

/// How several targets share time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleMode {
    /// One thread per target.
    #[default]
    Concurrent,
    /// One thread visiting every active target in turn.
    RoundRobin,
}

/// A tailer plus the per-target callback mode.
struct Driven {
    tailer: Tailer,
    always_callback: bool,
}

/// Validates every target before anything is polled.
fn build(targets: Targets, transport: Arc<dyn Transport>) -> Result<Vec<Driven>, ValidationError> {
    let specs = targets.into_specs()?;
    let mut driven = Vec::with_capacity(specs.len());
    for spec in &specs {
        driven.push(Driven {
            tailer: Tailer::new(spec, Arc::clone(&transport))?,
            always_callback: spec.always_callback,
        });
    }
    tracing::info!("following {} target(s)", driven.len());
    Ok(driven)
}

/// Keeps this call's tailers registered with the control until dropped, so
/// a control reused across calls only ever holds live tailers.
struct Registration<'a> {
    control: Option<&'a FollowControl>,
    flags: Vec<StopFlag>,
}

impl<'a> Registration<'a> {
    fn new(control: Option<&'a FollowControl>, driven: &[Driven]) -> Self {
        let mut flags = Vec::new();
        if let Some(control) = control {
            for d in driven {
                control.register(d.tailer.uri().as_str(), d.tailer.stop_flag());
                flags.push(d.tailer.stop_flag());
            }
        }
        Self { control, flags }
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if let Some(control) = self.control {
            for flag in &self.flags {
                control.unregister(flag);
            }
        }
    }
}

/// Runs outer cycles until this tailer stops.
fn drive<P, F>(d: &mut Driven, pacer: &P, on_result: &F)
where
    P: Pacer + ?Sized,
    F: Fn(&TailResult, &Tailer) + ?Sized,
{
    while d.tailer.still_following() {
        get_tail(&mut d.tailer, d.always_callback, pacer, on_result);
    }
    tracing::debug!(
        uri = %d.tailer.uri(),
        offset = d.tailer.offset(),
        "stopped following"
    );
}

/// Follows every target concurrently, one thread per tailer, and returns once
/// all of them have stopped.
///
/// Targets are validated up front; a bad one fails the call before any
/// request is made. `on_result` may be called from several threads at once,
/// but results for a given target arrive in order. Statuses are returned in
/// target order.
pub fn follow<P, F>(
    targets: impl Into<Targets>,
    transport: Arc<dyn Transport>,
    pacer: &P,
    control: Option<&FollowControl>,
    on_result: F,
) -> Result<Vec<TailerStatus>, ValidationError>
where
    P: Pacer + ?Sized,
    F: Fn(&TailResult, &Tailer) + Sync,
{
    let driven = build(targets.into(), transport)?;
    let _registration = Registration::new(control, &driven);
    let on_result = &on_result;

    let statuses: Vec<TailerStatus> = std::thread::scope(|s| {
        let handles: Vec<_> = driven
            .into_iter()
            .map(|mut d| {
                s.spawn(move || {
                    drive(&mut d, pacer, on_result);
                    TailerStatus::of(&d.tailer)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });
    Ok(statuses)
}

/// Follows every target from the calling thread, visiting each active tailer
/// in turn until none is left.
pub fn follow_round_robin<P, F>(
    targets: impl Into<Targets>,
    transport: Arc<dyn Transport>,
    pacer: &P,
    control: Option<&FollowControl>,
    on_result: F,
) -> Result<Vec<TailerStatus>, ValidationError>
where
    P: Pacer + ?Sized,
    F: Fn(&TailResult, &Tailer),
{
    let mut driven = build(targets.into(), transport)?;
    let _registration = Registration::new(control, &driven);

    while driven.iter().any(|d| d.tailer.still_following()) {
        for d in driven.iter_mut().filter(|d| d.tailer.still_following()) {
            get_tail(&mut d.tailer, d.always_callback, pacer, &on_result);
        }
    }

    Ok(driven.iter().map(|d| TailerStatus::of(&d.tailer)).collect())
}

/// Dispatches to [`follow`] or [`follow_round_robin`].
pub fn follow_with<P, F>(
    mode: ScheduleMode,
    targets: impl Into<Targets>,
    transport: Arc<dyn Transport>,
    pacer: &P,
    control: Option<&FollowControl>,
    on_result: F,
) -> Result<Vec<TailerStatus>, ValidationError>
where
    P: Pacer + ?Sized,
    F: Fn(&TailResult, &Tailer) + Sync,
{
    match mode {
        ScheduleMode::Concurrent => follow(targets, transport, pacer, control, on_result),
        ScheduleMode::RoundRobin => {
            follow_round_robin(targets, transport, pacer, control, on_result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::testing::RecordingPacer;
    use crate::scheduler::ControlledPacer;
    use crate::tail::{TailState, TargetSpec};
    use crate::transport::mock::{timeout, ScriptedTransport};
    use crate::transport::{ByteRange, Response, TransportError};
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn calls_back_with_result_and_tailer() {
        let transport = Arc::new(ScriptedTransport::new().probe_size(321).fetch_size(321));
        let pacer = RecordingPacer::default();
        let seen = Mutex::new(Vec::new());

        let statuses = follow(
            TargetSpec::new("http://example.com/"),
            transport,
            &pacer,
            None,
            |r: &TailResult, t: &Tailer| {
                seen.lock().unwrap().push((r.state(), t.offset()));
                t.set_still_following(false);
            },
        )
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(TailState::Success, 321)]);
        assert_eq!(pacer.waits(), vec![Duration::from_secs(60)]);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].offset, 321);
        assert!(!statuses[0].still_following);
    }

    #[test]
    fn accepts_a_list_of_targets() {
        let transport = Arc::new(ScriptedTransport::new().probe_size(321).fetch_size(321));
        let hits = Mutex::new(0);
        follow(
            vec![TargetSpec::new("http://example.com/")],
            transport,
            &RecordingPacer::default(),
            None,
            |r: &TailResult, t: &Tailer| {
                assert!(r.is_success());
                *hits.lock().unwrap() += 1;
                t.set_still_following(false);
            },
        )
        .unwrap();
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn rejects_bad_targets_before_polling() {
        let transport = Arc::new(ScriptedTransport::new());
        let err = follow(
            vec![TargetSpec::new("http://ok.example/"), TargetSpec::new("boom")],
            transport.clone(),
            &RecordingPacer::default(),
            None,
            |_: &TailResult, _: &Tailer| {},
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUri { .. }));
        assert_eq!(transport.probe_count(), 0);

        let err = follow_round_robin(
            Vec::<TargetSpec>::new(),
            transport.clone(),
            &RecordingPacer::default(),
            None,
            |_: &TailResult, _: &Tailer| {},
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::NoTargets));
    }

    #[test]
    fn stops_after_retry_ceiling_with_two_error_callbacks() {
        let errors = Mutex::new(0);
        let statuses = follow(
            TargetSpec::new("http://example.com/")
                .max_retries(2)
                .always_callback(true),
            Arc::new(ScriptedTransport::new().probe_err(timeout()).probe_err(timeout())),
            &RecordingPacer::default(),
            None,
            |r: &TailResult, _: &Tailer| {
                assert!(r.is_error());
                *errors.lock().unwrap() += 1;
            },
        )
        .unwrap();
        assert_eq!(*errors.lock().unwrap(), 2);
        assert_eq!(statuses[0].retries_so_far, 2);
        assert!(!statuses[0].still_following);
    }

    #[test]
    fn round_robin_visits_targets_in_turn() {
        // Both targets share one scripted transport: replies are consumed in
        // visiting order, a then b.
        let transport = Arc::new(
            ScriptedTransport::new()
                .probe_size(3)
                .fetch_body(b"abc".to_vec())
                .probe_size(2)
                .fetch_body(b"de".to_vec()),
        );
        let pacer = RecordingPacer::default();
        let order = Mutex::new(Vec::new());

        let statuses = follow_round_robin(
            vec![
                TargetSpec::new("http://a.example/log").wait(5),
                TargetSpec::new("http://b.example/log").wait(7),
            ],
            transport,
            &pacer,
            None,
            |r: &TailResult, t: &Tailer| {
                order
                    .lock()
                    .unwrap()
                    .push((t.uri().host_str().unwrap_or("").to_string(), r.body().to_vec()));
                t.set_still_following(false);
            },
        )
        .unwrap();

        assert_eq!(
            *order.lock().unwrap(),
            vec![
                ("a.example".to_string(), b"abc".to_vec()),
                ("b.example".to_string(), b"de".to_vec()),
            ]
        );
        assert_eq!(pacer.waits(), vec![Duration::from_secs(5), Duration::from_secs(7)]);
        assert_eq!(statuses.iter().map(|s| s.offset).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn round_robin_keeps_polling_survivors() {
        // a gives up after one failed attempt; b keeps going until stopped.
        let transport = Arc::new(
            ScriptedTransport::new()
                .probe_err(timeout())
                .probe_size(0)
                .probe_size(4)
                .fetch_size(4),
        );
        let statuses = follow_round_robin(
            vec![
                TargetSpec::new("http://a.example/").max_retries(1),
                TargetSpec::new("http://b.example/"),
            ],
            transport,
            &RecordingPacer::default(),
            None,
            |r: &TailResult, t: &Tailer| {
                if r.is_success() {
                    t.set_still_following(false);
                }
            },
        )
        .unwrap();
        assert!(!statuses[0].still_following);
        assert_eq!(statuses[0].offset, 0);
        assert_eq!(statuses[1].offset, 4);
    }

    #[test]
    fn concurrent_targets_each_deliver_in_order() {
        struct Growing;
        impl Transport for Growing {
            fn probe(&self, uri: &url::Url) -> Result<Response, TransportError> {
                // Each resource is ten times its path length.
                let len = uri.path().len() as u64 * 10;
                Ok(Response::sized(200, len))
            }
            fn fetch(&self, _uri: &url::Url, range: ByteRange) -> Result<Response, TransportError> {
                Ok(Response::with_body(206, vec![b'.'; range.len() as usize]))
            }
        }

        let seen = Mutex::new(Vec::new());
        let control = FollowControl::new();
        let statuses = follow(
            vec![
                TargetSpec::new("http://h.example/a"),
                TargetSpec::new("http://h.example/bb"),
                TargetSpec::new("http://h.example/ccc"),
            ],
            Arc::new(Growing),
            &RecordingPacer::default(),
            Some(&control),
            |r: &TailResult, t: &Tailer| {
                seen.lock().unwrap().push((t.uri().path().to_string(), r.body().len()));
                t.set_still_following(false);
            },
        )
        .unwrap();

        assert_eq!(control.active(), 0);
        assert_eq!(
            statuses.iter().map(|s| s.offset).collect::<Vec<_>>(),
            vec![20, 30, 40]
        );
        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(
            seen,
            vec![("/a".to_string(), 20), ("/bb".to_string(), 30), ("/ccc".to_string(), 40)]
        );
    }

    #[test]
    fn external_stop_ends_follow() {
        let control = FollowControl::new();
        let control_ref = &control;
        let pacer = move |_: Duration| control_ref.stop_all();
        let statuses = follow(
            TargetSpec::new("http://example.com/").offset(9),
            Arc::new(ScriptedTransport::new().probe_size(9)),
            &pacer,
            Some(&control),
            |_: &TailResult, _: &Tailer| {},
        )
        .unwrap();
        assert!(!statuses[0].still_following);
        assert_eq!(statuses[0].offset, 9);
    }

    #[test]
    fn control_is_emptied_when_follow_returns() {
        let control = FollowControl::new();
        let stop_on_first = |_: &TailResult, t: &Tailer| t.set_still_following(false);

        for _ in 0..3 {
            follow(
                vec![
                    TargetSpec::new("http://a.example/").always_callback(true),
                    TargetSpec::new("http://b.example/").always_callback(true),
                ],
                Arc::new(ScriptedTransport::new().probe_size(0).probe_size(0)),
                &RecordingPacer::default(),
                Some(&control),
                stop_on_first,
            )
            .unwrap();
            assert!(control.is_empty());
        }

        follow_round_robin(
            TargetSpec::new("http://a.example/").always_callback(true),
            Arc::new(ScriptedTransport::new().probe_size(0)),
            &RecordingPacer::default(),
            Some(&control),
            stop_on_first,
        )
        .unwrap();
        assert!(control.is_empty());

        let result = follow(
            vec![TargetSpec::new("http://ok.example/"), TargetSpec::new("nope")],
            Arc::new(ScriptedTransport::new()),
            &RecordingPacer::default(),
            Some(&control),
            stop_on_first,
        );
        assert!(result.is_err());
        assert!(control.is_empty());
    }

    #[test]
    fn longest_possible_wait_does_not_take_down_follow() {
        let control = Arc::new(FollowControl::new());
        let pacer = ControlledPacer::new(Arc::clone(&control)).with_slice(Duration::from_millis(5));

        let statuses = std::thread::scope(|s| {
            let run = s.spawn(|| {
                follow(
                    vec![
                        TargetSpec::new("http://a.example/").offset(3).wait(u64::MAX),
                        TargetSpec::new("http://b.example/").offset(3).wait(u64::MAX),
                    ],
                    Arc::new(ScriptedTransport::new().probe_size(3).probe_size(3)),
                    &pacer,
                    Some(control.as_ref()),
                    |_: &TailResult, _: &Tailer| {},
                )
            });
            // Both tailers are now in (or about to enter) their regular wait.
            while control.active() < 2 {
                std::thread::sleep(Duration::from_millis(1));
            }
            std::thread::sleep(Duration::from_millis(20));
            control.stop_all();
            run.join().unwrap()
        })
        .unwrap();

        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| !s.still_following && s.offset == 3));
    }

    #[test]
    fn schedule_mode_parses_from_kebab_case() {
        #[derive(Deserialize)]
        struct Doc {
            schedule: ScheduleMode,
        }
        let d: Doc = toml::from_str("schedule = \"round-robin\"").unwrap();
        assert_eq!(d.schedule, ScheduleMode::RoundRobin);
        let d: Doc = toml::from_str("schedule = \"concurrent\"").unwrap();
        assert_eq!(d.schedule, ScheduleMode::Concurrent);
    }
}
