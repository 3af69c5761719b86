// Shared fixture: a rendered two-measure page, its encoding and recording
// stand-ins for the engine, player and timers.

#![allow(dead_code)]

use score_viewer_wasm::engine::RecordingEngine;
use score_viewer_wasm::notation::MemorySurface;
use score_viewer_wasm::playback::{ManualScheduler, RecordingPlayer};
use score_viewer_wasm::text::EncodingBuffer;
use score_viewer_wasm::Host;

pub const PAGE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g id="m1" class="measure">
    <g id="st1" class="staff" data-n="1">
      <g id="ly1" class="layer" data-n="1">
        <g id="n1" class="note"><g class="notehead"/></g>
        <g id="c1" class="chord"><g id="n2" class="note"/><g id="n3" class="note"/></g>
      </g>
      <g id="ly2" class="layer" data-n="2">
        <g id="r1" class="rest"/>
      </g>
    </g>
  </g>
  <g id="m2" class="measure">
    <g id="st2" class="staff" data-n="1">
      <g id="ly3" class="layer" data-n="1">
        <g id="t1" class="tuplet"><g id="n4" class="note"/><g id="n5" class="note"/><g id="tn1" class="tupletNum"/></g>
      </g>
      <g id="ly4" class="layer" data-n="2">
        <g id="r2" class="rest"/>
      </g>
    </g>
  </g>
  <g id="sl1" class="slur"/>
</svg>"#;

pub const ENCODING: &str = r##"<mei>
<music><body><mdiv><score><section>
<measure xml:id="m1">
  <staff n="1" xml:id="st1">
    <layer n="1" xml:id="ly1">
      <note xml:id="n1" pname="c"/>
      <chord xml:id="c1">
        <note xml:id="n2" pname="e"/>
        <note xml:id="n3" pname="g"/>
      </chord>
    </layer>
    <layer n="2" xml:id="ly2">
      <rest xml:id="r1"/>
    </layer>
  </staff>
</measure>
<measure xml:id="m2">
  <staff n="1" xml:id="st2">
    <layer n="1" xml:id="ly3">
      <tuplet xml:id="t1">
        <note xml:id="n4" pname="d"/>
        <note xml:id="n5" pname="f"/>
      </tuplet>
    </layer>
    <layer n="2" xml:id="ly4">
      <rest xml:id="r2"/>
    </layer>
  </staff>
  <slur xml:id="sl1" startid="#n4" endid="#n5"/>
</measure>
</section></score></mdiv></body></music>
</mei>"##;

pub struct Fixture {
    pub surface: MemorySurface,
    pub editor: EncodingBuffer,
    pub engine: RecordingEngine,
    pub player: RecordingPlayer,
    pub scheduler: ManualScheduler,
}

impl Fixture {
    /// Page already rendered, encoding loaded in the editor
    pub fn new() -> Self {
        Self {
            surface: MemorySurface::with_page(PAGE_SVG).unwrap(),
            editor: EncodingBuffer::new(ENCODING),
            engine: RecordingEngine::new(),
            player: RecordingPlayer::new(),
            scheduler: ManualScheduler::new(),
        }
    }

    /// Nothing rendered yet
    pub fn blank() -> Self {
        Self { surface: MemorySurface::new(), ..Self::new() }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host {
            surface: &mut self.surface,
            editor: &mut self.editor,
            engine: &mut self.engine,
            player: &mut self.player,
            scheduler: &mut self.scheduler,
        }
    }
}
