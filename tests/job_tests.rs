//! Background job tests for imageops-expand
//!
//! These tests drive a real worker thread and observe it only through the
//! event channel, the way a UI shell would.

use image::Rgba;
use imageops_expand::{
    BlendConfig, ExpansionJob, ExpansionRequest, ExpansionSpec, Image, JobEvent, JobOptions,
    JobState,
};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const WAIT: Duration = Duration::from_secs(10);
const QUIET: Duration = Duration::from_millis(400);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn job(debounce_ms: u64) -> ExpansionJob {
    init_logger();
    ExpansionJob::with_options(JobOptions {
        debounce: Duration::from_millis(debounce_ms),
        blend: BlendConfig::default(),
    })
    .expect("worker should start")
}

fn red_image(width: u32, height: u32) -> Arc<Image<Rgba<u8>>> {
    Arc::new(Image::from_pixel(width, height, RED))
}

/// Collects events up to and including the next `Finished`.
fn collect_run(rx: &Receiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    loop {
        let event = rx.recv_timeout(WAIT).expect("job should finish");
        let done = matches!(event, JobEvent::Finished);
        events.push(event);
        if done {
            return events;
        }
    }
}

fn results(events: &[JobEvent]) -> Vec<Arc<Image<Rgba<u8>>>> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Result(image) => Some(Arc::clone(image)),
            _ => None,
        })
        .collect()
}

fn progress(events: &[JobEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect()
}

#[test]
fn request_produces_result_then_finishes() {
    let job = job(10);
    let rx = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(100, 100),
        ExpansionSpec::new(20, 0, 0, 0, WHITE),
    ));
    let events = collect_run(&rx);

    assert!(matches!(events.first(), Some(JobEvent::Started)));
    assert!(matches!(events[events.len() - 2], JobEvent::Result(_)));

    let images = results(&events);
    assert_eq!(images.len(), 1);
    let image = &images[0];
    assert_eq!(image.dimensions(), (100, 120));
    assert_eq!(*image.get_pixel(0, 0), WHITE);
    assert_eq!(*image.get_pixel(99, 119), RED);

    let seen = progress(&events);
    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(job.state(), JobState::Idle);
    assert!(!job.is_processing());
}

#[test]
fn gradient_checkpoints_are_reported() {
    let job = job(10);
    let rx = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(20, 20),
        ExpansionSpec::uniform(5, WHITE),
    ));
    let seen = progress(&collect_run(&rx));
    for checkpoint in [0, 10, 60, 70, 80, 90, 95, 100] {
        assert!(seen.contains(&checkpoint), "missing {checkpoint} in {seen:?}");
    }
}

#[test]
fn burst_of_requests_runs_once_with_latest() {
    let job = job(150);
    let rx = job.subscribe();
    let image = red_image(10, 10);

    for amount in 1..=5 {
        job.request(ExpansionRequest::new(
            Arc::clone(&image),
            ExpansionSpec::uniform(amount, WHITE),
        ));
    }
    assert_eq!(job.state(), JobState::Pending);

    let images = results(&collect_run(&rx));
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].dimensions(), (20, 20));
    assert!(rx.recv_timeout(QUIET).is_err());
}

#[test]
fn noop_spec_emits_nothing() {
    let job = job(10);
    let rx = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(10, 10),
        ExpansionSpec::uniform(0, WHITE),
    ));
    assert!(rx.recv_timeout(QUIET).is_err());
    assert_eq!(job.state(), JobState::Idle);
}

#[test]
fn disabled_job_ignores_requests() {
    let job = job(10);
    let rx = job.subscribe();
    job.set_processing_enabled(false);
    assert!(!job.is_processing_enabled());

    job.request(ExpansionRequest::new(
        red_image(10, 10),
        ExpansionSpec::uniform(3, WHITE),
    ));
    assert!(rx.recv_timeout(QUIET).is_err());

    job.set_processing_enabled(true);
    job.request(ExpansionRequest::new(
        red_image(10, 10),
        ExpansionSpec::uniform(3, WHITE),
    ));
    assert_eq!(results(&collect_run(&rx)).len(), 1);
}

#[test]
fn cancel_before_start_emits_nothing() {
    let job = job(200);
    let rx = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(10, 10),
        ExpansionSpec::uniform(3, WHITE),
    ));
    job.cancel();

    assert_eq!(job.state(), JobState::Idle);
    assert!(rx.recv_timeout(QUIET).is_err());
}

#[test]
fn cancel_mid_run_finishes_without_result() {
    let job = job(0);
    job.set_blend_distance(400);
    job.set_gradient_strength(1.0);
    let rx = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(2000, 2000),
        ExpansionSpec::uniform(400, WHITE),
    ));

    let mut events = Vec::new();
    let mut cancelled = false;
    loop {
        let event = rx.recv_timeout(WAIT).expect("job should finish");
        if !cancelled && matches!(event, JobEvent::Progress(p) if p >= 10) {
            job.cancel();
            cancelled = true;
            assert!(matches!(job.state(), JobState::Cancelling | JobState::Idle));
        }
        let done = matches!(event, JobEvent::Finished);
        events.push(event);
        if done {
            break;
        }
    }

    assert!(results(&events).is_empty());
    assert!(!events.iter().any(|e| matches!(e, JobEvent::Error(_))));
    assert_eq!(job.state(), JobState::Idle);
}

#[test]
fn job_recovers_after_cancel() {
    let job = job(10);
    let rx = job.subscribe();
    job.cancel();

    job.request(ExpansionRequest::new(
        red_image(10, 10),
        ExpansionSpec::uniform(2, WHITE),
    ));
    assert_eq!(results(&collect_run(&rx)).len(), 1);
}

#[test]
fn oversized_canvas_reports_error() {
    let job = job(10);
    let rx = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(1, 1),
        ExpansionSpec::new(u32::MAX, 0, 0, 0, WHITE),
    ));
    let events = collect_run(&rx);

    assert!(results(&events).is_empty());
    let errors: Vec<&String> = events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Error(message) => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("too large"));
    assert!(matches!(events.last(), Some(JobEvent::Finished)));
}

#[test]
fn unallocatable_canvas_reports_error_and_keeps_worker() {
    let job = job(10);
    let rx = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(4, 1),
        ExpansionSpec::new(u32::MAX - 1, 0, 0, 0, WHITE),
    ));
    let events = collect_run(&rx);
    assert!(results(&events).is_empty());
    assert!(matches!(events[events.len() - 2], JobEvent::Error(_)));
    assert!(matches!(events.last(), Some(JobEvent::Finished)));

    job.request(ExpansionRequest::new(
        red_image(4, 4),
        ExpansionSpec::uniform(1, WHITE),
    ));
    assert_eq!(results(&collect_run(&rx)).len(), 1);
}

#[test]
fn blend_config_changes_apply_to_next_run() {
    let job = job(10);
    let rx = job.subscribe();
    job.set_gradient_enabled(false);
    assert!(!job.blend_config().enable_gradient);

    job.request(ExpansionRequest::new(
        red_image(10, 10),
        ExpansionSpec::uniform(4, WHITE),
    ));
    let events = collect_run(&rx);
    assert!(!progress(&events).contains(&70));
    let image = &results(&events)[0];
    assert_eq!(*image.get_pixel(5, 3), WHITE);
}

#[test]
fn every_subscriber_sees_the_result() {
    let job = job(10);
    let first = job.subscribe();
    let second = job.subscribe();

    job.request(ExpansionRequest::new(
        red_image(8, 8),
        ExpansionSpec::uniform(1, WHITE),
    ));
    assert_eq!(results(&collect_run(&first)).len(), 1);
    assert_eq!(results(&collect_run(&second)).len(), 1);
}

#[test]
fn dropping_the_job_stops_the_worker() {
    let job = job(10);
    let rx = job.subscribe();
    job.request(ExpansionRequest::new(
        red_image(8, 8),
        ExpansionSpec::uniform(1, WHITE),
    ));
    drop(job);

    // The worker owned the only senders, so the channel closes.
    while rx.recv_timeout(WAIT).is_ok() {}
}
