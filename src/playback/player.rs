//! MIDI player seam

/// Operations used on the audio playback component
pub trait MidiPlayer {
    fn is_playing(&self) -> bool;

    fn start(&mut self);

    fn stop(&mut self);

    /// Playback position in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Replace the played MIDI (base64 standard MIDI file)
    fn load_midi(&mut self, base64: &str);
}

/// Player stand-in that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    pub playing: bool,
    pub current_time: f64,
    pub starts: usize,
    pub stops: usize,
    pub loaded: Option<String>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MidiPlayer for RecordingPlayer {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn start(&mut self) {
        self.playing = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.stops += 1;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn load_midi(&mut self, base64: &str) {
        self.loaded = Some(base64.to_string());
    }
}
