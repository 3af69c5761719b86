// Playback highlighting tests
//
// Drives the coordinator with note events and a virtual clock and checks the
// `currently-playing` markers, deferred note ends and page/scroll following.

mod common;

use common::Fixture;
use score_viewer_wasm::engine::EngineRequest;
use score_viewer_wasm::notation::NotationSurface;
use score_viewer_wasm::playback::{Deferred, PlaybackCoordinator};
use score_viewer_wasm::{FollowSettings, TimemapEntry};

const PLAYING: &str = "currently-playing";

fn highlight_only() -> FollowSettings {
    FollowSettings { highlight: true, ..Default::default() }
}

/// n1 sounds 0..500, n2 sounds 500..1000
fn two_note_timemap() -> Vec<TimemapEntry> {
    vec![
        TimemapEntry::new(0.0).with_on(&["n1"]),
        TimemapEntry::new(500.0).with_on(&["n2"]).with_off(&["n1"]),
        TimemapEntry::new(1000.0).with_off(&["n2"]),
    ]
}

fn coordinator(follow: FollowSettings) -> PlaybackCoordinator {
    let mut playback = PlaybackCoordinator::new(400);
    playback.set_follow(follow);
    playback.set_timemap(two_note_timemap());
    playback
}

/// Fire every task due within `ms` through the coordinator
fn run_due(playback: &mut PlaybackCoordinator, fx: &mut Fixture, ms: f64) -> usize {
    let due = fx.scheduler.advance(ms);
    let count = due.len();
    for task in due {
        playback.run_note_task(&task, &mut fx.host());
    }
    count
}

#[test]
fn test_onsets_mark_and_release_notes() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    assert!(fx.surface.has_class("n1", PLAYING));
    assert!(!fx.surface.has_class("n2", PLAYING));
    // n1 ends where n2 starts; the next note event closes it
    assert_eq!(fx.scheduler.pending_count(), 0);

    playback.on_playback_tick(Some(0.5), &mut fx.host());
    assert!(!fx.surface.has_class("n1", PLAYING));
    assert!(fx.surface.has_class("n2", PLAYING));
    assert_eq!(playback.cursor().index, 1);
}

#[test]
fn test_last_onset_schedules_remaining_ends_and_stop() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());
    fx.player.playing = true;

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    playback.on_playback_tick(Some(0.5), &mut fx.host());

    let generation = playback.generation();
    assert_eq!(
        fx.scheduler.pending(),
        vec![
            (500.0, Deferred::Unhighlight { id: "n2".to_string(), generation }),
            (500.0, Deferred::StopPlayback { generation }),
        ]
    );

    assert_eq!(run_due(&mut playback, &mut fx, 499.0), 0);
    assert!(fx.surface.has_class("n2", PLAYING));

    assert_eq!(run_due(&mut playback, &mut fx, 1.0), 2);
    assert!(!fx.surface.has_class("n2", PLAYING));
    assert!(!fx.player.playing);
    assert_eq!(fx.player.stops, 1);
}

#[test]
fn test_deferred_note_end_without_reattack() {
    let mut fx = Fixture::new();
    let mut playback = PlaybackCoordinator::new(400);
    playback.set_follow(highlight_only());
    playback.set_timemap(vec![
        TimemapEntry::new(0.0).with_on(&["n1"]),
        TimemapEntry::new(250.0).with_off(&["n1"]),
        TimemapEntry::new(500.0).with_on(&["n2"]),
        TimemapEntry::new(750.0).with_off(&["n2"]),
    ]);

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    assert_eq!(fx.scheduler.pending().len(), 1);
    assert_eq!(fx.scheduler.pending()[0].0, 250.0);

    run_due(&mut playback, &mut fx, 250.0);
    assert!(!fx.surface.has_class("n1", PLAYING));
}

#[test]
fn test_cursor_only_moves_forward_between_ticks() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());

    playback.on_playback_tick(Some(0.5), &mut fx.host());
    assert_eq!(playback.cursor().index, 1);

    // re-evaluation at the last reported time keeps the position
    playback.on_playback_tick(None, &mut fx.host());
    assert_eq!(playback.cursor().index, 1);
    assert_eq!(playback.cursor().last_reported_ms, 500.0);

    playback.on_playback_tick(Some(2.0), &mut fx.host());
    assert_eq!(playback.cursor().index, 2);
}

#[test]
fn test_one_millisecond_jitter_is_ignored() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());

    playback.on_playback_tick(Some(0.501), &mut fx.host());
    assert_eq!(playback.cursor().index, 1);
    assert!(fx.surface.has_class("n2", PLAYING));
}

#[test]
fn test_backward_time_rewinds_cursor() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());

    playback.on_playback_tick(Some(0.5), &mut fx.host());
    playback.on_playback_tick(Some(0.0), &mut fx.host());
    assert_eq!(playback.cursor().index, 0);
    assert!(fx.surface.has_class("n1", PLAYING));
}

#[test]
fn test_seek_clears_markers_and_drops_scheduled_tasks() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());
    fx.player.playing = true;

    playback.on_playback_tick(Some(0.5), &mut fx.host());
    let before = playback.generation();

    playback.seek_to_time(200.0, &mut fx.host());
    assert!(playback.generation() > before);
    assert_eq!(fx.surface.index().count_with_class(PLAYING), 0);
    assert_eq!(fx.player.current_time, 0.2);
    // playing: stop, reposition, restart
    assert_eq!((fx.player.stops, fx.player.starts), (1, 1));
    assert_eq!(playback.cursor().index, 0);
    assert_eq!(playback.cursor().last_reported_ms, 200.0);

    // the stale stop must not halt the restarted player
    run_due(&mut playback, &mut fx, 1000.0);
    assert!(fx.player.playing);
    assert_eq!(fx.player.stops, 1);
}

#[test]
fn test_seek_while_stopped_only_moves_position() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());

    playback.seek_to_time(1500.0, &mut fx.host());
    assert_eq!(fx.player.current_time, 1.5);
    assert_eq!((fx.player.stops, fx.player.starts), (0, 0));
}

#[test]
fn test_playback_requested_on_load_starts_once() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());
    playback.request_playback_on_load();

    playback.seek_to_time(0.0, &mut fx.host());
    assert!(fx.player.playing);
    assert_eq!(fx.player.starts, 1);

    fx.player.playing = false;
    playback.seek_to_time(0.0, &mut fx.host());
    assert_eq!(fx.player.starts, 1);
}

#[test]
fn test_seek_to_selection_prefers_selected_element_on_page() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());

    let selected = vec!["elsewhere".to_string(), "n4".to_string()];
    playback.seek_to_selection_or_page(&selected, &mut fx.host());
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetTimeForElement { msg: "n4".to_string() }]
    );

    playback.seek_to_selection_or_page(&[], &mut fx.host());
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetTimeForElement { msg: "n1".to_string() }]
    );
}

#[test]
fn test_seek_without_notes_posts_nothing() {
    let mut fx = Fixture::blank();
    let mut playback = coordinator(highlight_only());
    playback.seek_to_selection_or_page(&[], &mut fx.host());
    assert!(fx.engine.posted.is_empty());
}

#[test]
fn test_disabled_follow_does_nothing() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(FollowSettings::default());

    playback.on_playback_tick(Some(0.5), &mut fx.host());
    assert_eq!(fx.surface.index().count_with_class(PLAYING), 0);
    assert_eq!(playback.cursor().index, 0);
    assert_eq!(fx.scheduler.pending_count(), 0);
}

#[test]
fn test_page_follow_requests_page_for_off_page_note() {
    let mut fx = Fixture::new();
    let mut playback = PlaybackCoordinator::new(400);
    playback.set_follow(FollowSettings { highlight: true, page_follow: true, ..Default::default() });
    playback.set_timemap(vec![
        TimemapEntry::new(0.0).with_on(&["x1", "x2", "n1"]),
        TimemapEntry::new(500.0).with_off(&["x1", "x2", "n1"]),
    ]);

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    // a single request per note event
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetPageWithElement { msg: "x1".to_string() }]
    );
}

#[test]
fn test_page_follow_without_highlight_asks_for_every_onset() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(FollowSettings { page_follow: true, ..Default::default() });

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    assert_eq!(fx.surface.index().count_with_class(PLAYING), 0);
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetPageWithElement { msg: "n1".to_string() }]
    );
}

#[test]
fn test_scroll_follow_scrolls_to_measure() {
    let mut fx = Fixture::new();
    let mut playback = PlaybackCoordinator::new(400);
    playback.set_follow(FollowSettings { scroll_follow: true, ..Default::default() });
    playback.set_timemap(vec![
        TimemapEntry::new(0.0).with_on(&["n1"]),
        TimemapEntry::new(500.0).with_on(&["n4"]).with_off(&["n1"]),
        TimemapEntry::new(1000.0).with_off(&["n4"]),
    ]);

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    playback.on_playback_tick(Some(0.5), &mut fx.host());
    assert_eq!(fx.surface.scrolled_to, vec!["m1", "m2"]);
}

#[test]
fn test_stop_clears_markers() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());
    fx.player.playing = true;

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    playback.stop(&mut fx.host());
    assert!(!fx.player.playing);
    assert_eq!(fx.surface.index().count_with_class(PLAYING), 0);
}

#[test]
fn test_debounce_keeps_only_last_request() {
    let mut fx = Fixture::new();
    let mut playback = PlaybackCoordinator::new(400);

    playback.start_debounced_rerender(true, &mut fx.scheduler);
    fx.scheduler.advance(300.0);
    playback.start_debounced_rerender(false, &mut fx.scheduler);
    assert_eq!(fx.scheduler.pending_count(), 1);
    assert!(playback.has_pending_debounce());

    assert!(fx.scheduler.advance(399.0).is_empty());
    assert_eq!(fx.scheduler.advance(1.0), vec![Deferred::Reseek]);
    playback.debounce_fired();
    assert!(!playback.has_pending_debounce());
}

#[test]
fn test_repeated_note_event_is_idempotent() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    let marked = fx.surface.index().count_with_class(PLAYING);
    playback.on_playback_tick(Some(0.0), &mut fx.host());
    assert_eq!(fx.surface.index().count_with_class(PLAYING), marked);
    // n1 and its notehead group
    assert_eq!(marked, 2);
}

#[test]
fn test_scrub_back_drops_pending_note_ends_and_stop() {
    let mut fx = Fixture::new();
    let mut playback = coordinator(highlight_only());
    fx.player.playing = true;

    playback.on_playback_tick(Some(0.0), &mut fx.host());
    playback.on_playback_tick(Some(0.5), &mut fx.host());
    assert_eq!(fx.scheduler.pending_count(), 2);
    let before = playback.generation();

    run_due(&mut playback, &mut fx, 100.0);
    playback.on_playback_tick(Some(0.0), &mut fx.host());
    assert!(playback.generation() > before);
    assert!(fx.surface.has_class("n1", PLAYING));
    assert!(!fx.surface.has_class("n2", PLAYING));

    // the end-of-score stop queued before the scrub must not fire
    run_due(&mut playback, &mut fx, 400.0);
    assert!(fx.player.playing);
    assert_eq!(fx.player.stops, 0);
    assert!(fx.surface.has_class("n1", PLAYING));
}
