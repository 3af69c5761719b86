//! Playback/highlight coordinator
//!
//! Owns the timemap and the playback cursor, and keeps the
//! `currently-playing` markers in step with the player. The player only
//! reports note onsets, so note ends are predicted from the timemap and
//! scheduled as deferred tasks.

use serde::{Deserialize, Serialize};

use crate::config::{FollowSettings, DEFAULT_DEBOUNCE_MS};
use crate::engine::EngineRequest;
use crate::models::{Timemap, TimemapEntry};
use crate::notation::classes::{CURRENTLY_PLAYING, MEASURE, NOTE};
use crate::notation::NotationSurface;
use crate::session::Host;

use super::scheduler::{Deferred, Scheduler, TimerHandle};

/// Where playback is within the timemap
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackCursor {
    /// Last time reported by the player or set by a seek (ms)
    pub last_reported_ms: f64,
    /// Current timemap entry
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct PlaybackCoordinator {
    timemap: Timemap,
    cursor: PlaybackCursor,
    generation: u64,
    play_on_load: bool,
    debounce_ms: u32,
    pending_debounce: Option<TimerHandle>,
    follow: FollowSettings,
}

impl Default for PlaybackCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl PlaybackCoordinator {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            timemap: Timemap::default(),
            cursor: PlaybackCursor::default(),
            generation: 0,
            play_on_load: false,
            debounce_ms,
            pending_debounce: None,
            follow: FollowSettings::default(),
        }
    }

    pub fn timemap(&self) -> &Timemap {
        &self.timemap
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn follow(&self) -> FollowSettings {
        self.follow
    }

    pub fn set_follow(&mut self, follow: FollowSettings) {
        self.follow = follow;
    }

    pub fn has_pending_debounce(&self) -> bool {
        self.pending_debounce.is_some()
    }

    /// Invalidate every note task scheduled so far
    fn next_generation(&mut self) {
        self.generation += 1;
    }

    /// Replace the timemap and rewind the cursor
    pub fn set_timemap(&mut self, entries: Vec<TimemapEntry>) {
        self.timemap = Timemap::new(entries);
        self.cursor = PlaybackCursor::default();
        self.next_generation();
        log::info!(
            "Timemap set: {} entries, last onset at {:?}",
            self.timemap.len(),
            self.timemap.last_onset_index()
        );
    }

    /// Start the player on the next seek
    pub fn request_playback_on_load(&mut self) {
        self.play_on_load = true;
    }

    /// Ask the engine for the time of the first selected element on the page,
    /// or of the page's first note; the answer comes back as a seek.
    pub fn seek_to_selection_or_page(&mut self, selected: &[String], host: &mut Host<'_>) {
        let target = selected
            .iter()
            .find(|id| host.surface.contains(id))
            .cloned()
            .or_else(|| host.surface.first_with_class(NOTE));
        match target {
            Some(id) => host.engine.post(EngineRequest::GetTimeForElement { msg: id }),
            None => log::warn!("Can't find a note to seek MIDI playback to"),
        }
        self.cursor.index = 0;
    }

    /// Move playback to `time_ms`, restarting the player if it was playing
    pub fn seek_to_time(&mut self, time_ms: f64, host: &mut Host<'_>) {
        let seconds = time_ms / 1000.0;
        if host.player.is_playing() {
            host.player.stop();
            host.player.set_current_time(seconds);
            host.player.start();
        } else {
            host.player.set_current_time(seconds);
        }
        self.cursor = PlaybackCursor { last_reported_ms: time_ms, index: 0 };
        self.next_generation();
        host.surface.remove_class_everywhere(CURRENTLY_PLAYING);

        if self.play_on_load {
            self.play_on_load = false;
            host.player.start();
        }
    }

    /// Stop playback and clear the sounding markers
    pub fn stop(&mut self, host: &mut Host<'_>) {
        host.player.stop();
        self.next_generation();
        host.surface.remove_class_everywhere(CURRENTLY_PLAYING);
    }

    /// Update markers for a player note event (`note_start_secs`) or, without
    /// one, for the last reported time.
    pub fn on_playback_tick(&mut self, note_start_secs: Option<f64>, host: &mut Host<'_>) {
        if !self.follow.any() {
            return;
        }
        if self.timemap.is_empty() {
            log::debug!("Playback tick without timemap");
            return;
        }

        let target = note_start_secs
            .map(|s| s * 1000.0)
            .unwrap_or(self.cursor.last_reported_ms);
        if target < self.cursor.last_reported_ms {
            // scrubbed backwards: note ends and the final stop scheduled so far no longer apply
            self.cursor.index = 0;
            self.next_generation();
            host.surface.remove_class_everywhere(CURRENTLY_PLAYING);
        }
        self.cursor.last_reported_ms = target;

        let last = self.timemap.len() - 1;
        let mut index = self.cursor.index.min(last);
        // ignore 1-ms differences
        while index < last && self.timemap.entries()[index].tstamp.round() + 1.0 < target.round() {
            index += 1;
        }
        self.cursor.index = index;

        self.close_finished_notes(index, host.surface);
        if self.timemap.last_onset_index() == Some(index) {
            self.schedule_remaining_offs(index, target, host.scheduler);
        }
        self.open_current_notes(index, target, host);
    }

    /// Walk back from `index` unmarking sounding notes whose `off` was reached
    fn close_finished_notes(&self, index: usize, surface: &mut dyn NotationSurface) {
        let mut sounding = surface.ids_with_classes(&[NOTE, CURRENTLY_PLAYING]);
        let first_on_page = surface.first_with_class(NOTE);

        for entry in self.timemap.entries()[..=index].iter().rev() {
            if entry.off.is_some() {
                sounding.retain(|id| {
                    if entry.turns_off(id) {
                        surface.remove_class_deep(id, CURRENTLY_PLAYING);
                        false
                    } else {
                        true
                    }
                });
                if sounding.is_empty() {
                    break;
                }
            }
            if first_on_page.as_deref().is_some_and(|first| entry.turns_on(first)) {
                break;
            }
        }
    }

    /// At the last onset the player fires no more events: schedule every
    /// remaining note end and the final stop.
    fn schedule_remaining_offs(&self, index: usize, target: f64, scheduler: &mut dyn Scheduler) {
        let generation = self.generation;
        let entries = self.timemap.entries();
        for (j, entry) in entries.iter().enumerate().skip(index + 1) {
            let delay = entry.tstamp - target;
            for id in entry.off_ids() {
                scheduler.schedule(delay, Deferred::Unhighlight { id: id.clone(), generation });
            }
            if j == entries.len() - 1 {
                scheduler.schedule(delay, Deferred::StopPlayback { generation });
            }
        }
    }

    fn open_current_notes(&self, index: usize, target: f64, host: &mut Host<'_>) {
        let entry = &self.timemap.entries()[index];
        if !entry.has_on() {
            return;
        }

        for id in entry.on_ids() {
            if self.follow.highlight && host.surface.contains(id) {
                host.surface.add_class_deep(id, CURRENTLY_PLAYING);
                // a re-attack at the off entry keeps the note marked
                if let Some(off) = self.timemap.matching_off_after(index, id) {
                    let off_entry = &self.timemap.entries()[off];
                    if !off_entry.has_on() {
                        host.scheduler.schedule(
                            off_entry.tstamp - target,
                            Deferred::Unhighlight { id: id.clone(), generation: self.generation },
                        );
                    }
                }
            } else if self.follow.page_follow {
                host.engine.post(EngineRequest::GetPageWithElement { msg: id.clone() });
                break;
            }
        }

        if self.follow.scroll_follow {
            let measure = entry
                .on_ids()
                .first()
                .and_then(|first| host.surface.closest_with_class(first, MEASURE));
            if let Some(measure) = measure {
                host.surface.scroll_to(&measure);
            }
        }
    }

    /// Run a fired note task; stale ones are dropped
    pub fn run_note_task(&mut self, task: &Deferred, host: &mut Host<'_>) {
        match task {
            Deferred::Unhighlight { id, generation } if *generation == self.generation => {
                host.surface.remove_class_deep(id, CURRENTLY_PLAYING);
            }
            Deferred::StopPlayback { generation } if *generation == self.generation => {
                log::info!("End of timemap reached, stopping playback");
                host.player.stop();
            }
            Deferred::Unhighlight { .. } | Deferred::StopPlayback { .. } => {
                log::debug!("Dropping stale playback task {:?}", task);
            }
            Deferred::Rerender | Deferred::Reseek => {}
        }
    }

    /// Restart the edit debounce: only the last call's action runs
    pub fn start_debounced_rerender(&mut self, full_rerender: bool, scheduler: &mut dyn Scheduler) {
        if let Some(handle) = self.pending_debounce.take() {
            scheduler.cancel(handle);
        }
        let task = if full_rerender { Deferred::Rerender } else { Deferred::Reseek };
        self.pending_debounce = Some(scheduler.schedule(self.debounce_ms as f64, task));
    }

    /// The debounce timer fired
    pub fn debounce_fired(&mut self) {
        self.pending_debounce = None;
    }
}
