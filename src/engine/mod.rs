//! Rendering engine seam
//!
//! The engine (a Web Worker in the browser) is fire-and-forget: requests
//! are posted, and answers arrive later as separate [`EngineResponse`]
//! events fed to the session.

pub mod messages;
pub mod speed;

pub use messages::{EngineRequest, EngineResponse};
pub use speed::{extract_page, SpeedPage};

pub trait RenderEngine {
    /// Post a request; the answer, if any, arrives asynchronously
    fn post(&mut self, request: EngineRequest);
}

/// Engine stand-in that only records what was posted
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    pub posted: Vec<EngineRequest>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything posted so far
    pub fn drain(&mut self) -> Vec<EngineRequest> {
        std::mem::take(&mut self.posted)
    }

    pub fn last(&self) -> Option<&EngineRequest> {
        self.posted.last()
    }
}

impl RenderEngine for RecordingEngine {
    fn post(&mut self, request: EngineRequest) {
        log::debug!("engine <- {:?}", request);
        self.posted.push(request);
    }
}
