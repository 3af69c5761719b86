// Session tests: engine answers, timers and page-follow wiring end to end.

mod common;

use common::{Fixture, PAGE_SVG};
use score_viewer_wasm::engine::{EngineRequest, EngineResponse};
use score_viewer_wasm::notation::NotationSurface;
use score_viewer_wasm::playback::Deferred;
use score_viewer_wasm::view::ClickEvent;
use score_viewer_wasm::{FollowSettings, PageTarget, Session, TimemapEntry, ViewerConfig};

fn timemap() -> Vec<TimemapEntry> {
    vec![
        TimemapEntry::new(0.0).with_on(&["n1"]),
        TimemapEntry::new(500.0).with_on(&["n4"]).with_off(&["n1"]),
        TimemapEntry::new(1000.0).with_off(&["n4"]),
    ]
}

fn page(page: u32) -> EngineResponse {
    EngineResponse::Page { page, svg: PAGE_SVG.to_string() }
}

/// Session with two pages loaded and a timemap in place
fn loaded_session(fx: &mut Fixture) -> Session {
    let mut session = Session::new(ViewerConfig::default());
    session.on_engine_response(EngineResponse::DataLoaded { page_count: 2 }, &mut fx.host());
    session.on_engine_response(
        EngineResponse::Midi { midi: "TVRoZA==".to_string(), timemap: timemap() },
        &mut fx.host(),
    );
    fx.engine.drain();
    session
}

#[test]
fn test_load_document_renders_and_requests_midi() {
    let mut fx = Fixture::blank();
    let mut session = Session::new(ViewerConfig::default());

    session.load_document(None, &mut fx.host());
    let posted = fx.engine.drain();
    assert!(matches!(posted[0], EngineRequest::SetOptions { load_data: true, .. }));
    assert!(matches!(posted[1], EngineRequest::LoadData { .. }));
    assert_eq!(posted.last(), Some(&EngineRequest::RenderToMidi));

    session.on_engine_response(EngineResponse::DataLoaded { page_count: 2 }, &mut fx.host());
    assert_eq!(fx.engine.drain(), vec![EngineRequest::GetPage { msg: 1 }]);

    // first page arrives: cursor goes to its first note
    session.on_engine_response(page(1), &mut fx.host());
    assert!(fx.surface.contains("n1"));
    assert_eq!(session.view().selection().ids(), ["n1"]);
    assert!(fx.surface.has_class("n1", "highlighted"));
}

#[test]
fn test_midi_answer_loads_player_and_seeks() {
    let mut fx = Fixture::new();
    let mut session = Session::new(ViewerConfig::default());

    session.on_engine_response(
        EngineResponse::Midi { midi: "TVRoZA==".to_string(), timemap: timemap() },
        &mut fx.host(),
    );
    assert_eq!(fx.player.loaded.as_deref(), Some("TVRoZA=="));
    assert_eq!(session.playback().timemap().len(), 3);
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetTimeForElement { msg: "n1".to_string() }]
    );

    session.on_engine_response(
        EngineResponse::TimeForElement { id: "n1".to_string(), time: 0.0 },
        &mut fx.host(),
    );
    assert_eq!(fx.player.current_time, 0.0);
}

#[test]
fn test_seek_uses_selection() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    session.handle_click(&ClickEvent::plain("n4"), &mut fx.host());
    session.seek_to_selection_or_page(&mut fx.host());
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetTimeForElement { msg: "n4".to_string() }]
    );
}

#[test]
fn test_page_follow_flips_page_without_reseek() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    session.on_engine_response(
        EngineResponse::PageWithElement { id: "x9".to_string(), page: Some(2) },
        &mut fx.host(),
    );
    assert_eq!(session.view().pagination().current(), 2);
    assert_eq!(fx.engine.drain(), vec![EngineRequest::GetPage { msg: 2 }]);

    session.on_engine_response(page(2), &mut fx.host());
    assert!(fx.engine.drain().is_empty());

    // a later page load seeks again
    session.on_engine_response(page(2), &mut fx.host());
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetTimeForElement { msg: "n1".to_string() }]
    );
}

#[test]
fn test_page_follow_on_current_page_or_unknown_element() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    session.on_engine_response(
        EngineResponse::PageWithElement { id: "n1".to_string(), page: Some(1) },
        &mut fx.host(),
    );
    session.on_engine_response(
        EngineResponse::PageWithElement { id: "gone".to_string(), page: None },
        &mut fx.host(),
    );
    assert!(fx.engine.posted.is_empty());
    assert_eq!(session.view().pagination().current(), 1);
}

#[test]
fn test_change_page_renders_and_resets_cursor() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    assert_eq!(session.change_page(PageTarget::Forwards, &mut fx.host()), Some(2));
    assert_eq!(fx.engine.drain(), vec![EngineRequest::GetPage { msg: 2 }]);
    assert_eq!(fx.surface.page_label, "Page 2 of 2");
    assert_eq!(session.change_page(PageTarget::Forwards, &mut fx.host()), None);
    assert!(fx.engine.posted.is_empty());

    session.on_engine_response(page(2), &mut fx.host());
    assert_eq!(session.view().selection().first(), Some("n1"));
}

#[test]
fn test_edits_debounce_into_one_rerender() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    session.on_edit(&mut fx.host());
    session.on_edit(&mut fx.host());
    assert_eq!(fx.scheduler.pending_count(), 1);
    fx.engine.drain();

    let due = fx.scheduler.advance(400.0);
    assert_eq!(due, vec![Deferred::Rerender]);
    for task in due {
        session.on_timer(task, &mut fx.host());
    }
    assert_eq!(fx.engine.drain(), vec![EngineRequest::RenderToMidi]);
    assert!(!session.playback().has_pending_debounce());
}

#[test]
fn test_cursor_move_after_edit_only_reseeks() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    session.on_edit(&mut fx.host());
    session.on_cursor_moved(&mut fx.host());
    fx.engine.drain();

    for task in fx.scheduler.advance(400.0) {
        session.on_timer(task, &mut fx.host());
    }
    assert_eq!(
        fx.engine.drain(),
        vec![EngineRequest::GetTimeForElement { msg: "n1".to_string() }]
    );
}

#[test]
fn test_playback_notes_through_session() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);
    session.set_follow_settings(FollowSettings { highlight: true, ..Default::default() });
    fx.player.playing = true;

    session.on_playback_note(Some(0.0), &mut fx.host());
    assert!(fx.surface.has_class("n1", "currently-playing"));
    session.on_playback_note(Some(0.5), &mut fx.host());
    assert!(fx.surface.has_class("n4", "currently-playing"));

    for task in fx.scheduler.advance(500.0) {
        session.on_timer(task, &mut fx.host());
    }
    assert_eq!(fx.surface.index().count_with_class("currently-playing"), 0);
    assert!(!fx.player.playing);
}

#[test]
fn test_stop_invalidates_pending_note_tasks() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);
    session.set_follow_settings(FollowSettings { highlight: true, ..Default::default() });
    fx.player.playing = true;

    session.on_playback_note(Some(0.5), &mut fx.host());
    session.stop_playback(&mut fx.host());
    session.request_playback_on_load();
    session.seek_to_time(0.0, &mut fx.host());
    assert!(fx.player.playing);

    for task in fx.scheduler.advance(1000.0) {
        session.on_timer(task, &mut fx.host());
    }
    assert!(fx.player.playing);
}

#[test]
fn test_invalid_page_svg_keeps_old_page() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    session.on_engine_response(
        EngineResponse::Page { page: 1, svg: "<svg><g></svg>".to_string() },
        &mut fx.host(),
    );
    assert!(fx.surface.contains("n1"));
    assert!(fx.engine.posted.is_empty());
}

#[test]
fn test_colors_and_speed_mode_switch() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    assert!(session.swap_notation_colors(&mut fx.host()));
    session.change_highlight_color("blue", &mut fx.host()).unwrap();
    assert!(fx.surface.custom_style.contains("blue"));

    session.set_speed_mode(true, &mut fx.host());
    assert!(session.view().speed_mode());
    assert!(fx
        .engine
        .drain()
        .iter()
        .any(|r| matches!(r, EngineRequest::LoadData { .. })));

    // already on: nothing to redo
    session.set_speed_mode(true, &mut fx.host());
    assert!(fx.engine.posted.is_empty());
}

#[test]
fn test_configured_highlight_color_is_applied() {
    let mut fx = Fixture::new();
    let config = ViewerConfig { highlight_color: "teal".to_string(), ..Default::default() };
    let mut session = Session::new(config);

    session.apply_highlight_color(&mut fx.host()).unwrap();
    assert!(fx.surface.custom_style.contains("fill: teal;"));
}

#[test]
fn test_debounced_rerender_survives_seek() {
    let mut fx = Fixture::new();
    let mut session = loaded_session(&mut fx);

    session.on_edit(&mut fx.host());
    // a seek moves to a new playback generation; the edit debounce is not tied to it
    session.seek_to_time(0.0, &mut fx.host());
    fx.engine.drain();

    let due = fx.scheduler.advance(400.0);
    assert_eq!(due, vec![Deferred::Rerender]);
    for task in due {
        session.on_timer(task, &mut fx.host());
    }
    assert_eq!(fx.engine.drain(), vec![EngineRequest::RenderToMidi]);
}
