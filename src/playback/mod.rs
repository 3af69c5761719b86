//! MIDI playback tracking
//!
//! - `coordinator`: timemap-driven highlighting, seeking and the edit debounce
//! - `player`: the MIDI player seam
//! - `scheduler`: deferred tasks and the timer seam

pub mod coordinator;
pub mod player;
pub mod scheduler;

pub use coordinator::{PlaybackCoordinator, PlaybackCursor};
pub use player::{MidiPlayer, RecordingPlayer};
pub use scheduler::{Deferred, ManualScheduler, Scheduler, TimerHandle};
