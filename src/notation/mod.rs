//! Rendered notation: page element index and the surface seam

pub mod index;
pub mod surface;
pub mod memory;

pub use index::ElementIndex;
pub use memory::MemorySurface;
pub use surface::NotationSurface;

/// Class names used by the rendered SVG and by the viewer's markers
pub mod classes {
    pub const NOTE: &str = "note";
    pub const CHORD: &str = "chord";
    pub const TUPLET: &str = "tuplet";
    pub const TUPLET_NUM: &str = "tupletNum";
    pub const MEASURE: &str = "measure";
    pub const STAFF: &str = "staff";
    pub const LAYER: &str = "layer";

    /// Selection marker
    pub const HIGHLIGHTED: &str = "highlighted";
    /// Playback marker
    pub const CURRENTLY_PLAYING: &str = "currently-playing";
    /// Night mode marker
    pub const INVERTED: &str = "inverted";

    /// Elements the text cursor can be placed on at a page start
    pub const NAVIGABLE: [&str; 6] = ["note", "rest", "mRest", "beatRpt", "halfmRpt", "mRpt"];
}
