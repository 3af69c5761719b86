//! Speed mode: feed the engine only the current page
//!
//! Pages are delimited by break elements (`sb`, `pb`) among the children of
//! the first `<section>`. The extracted document keeps everything outside
//! that section (header, score definition) and only the section children
//! belonging to the requested page. Break elements themselves are dropped.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::SpeedModeError;

/// Elements that open a page's content (a break before any of them is ignored)
const CONTENT_ELEMENTS: [&[u8]; 2] = [b"measure", b"ending"];

/// Score definition changes stay in force on later pages
const SCORE_DEF: &[u8] = b"scoreDef";

/// One page cut out of a full encoding
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedPage {
    pub encoding: String,
    pub page_count: u32,
}

fn xml_err(e: impl std::fmt::Display) -> SpeedModeError {
    SpeedModeError::Xml(e.to_string())
}

fn write_all<'a>(out: &mut Writer<Vec<u8>>, events: Vec<Event<'a>>) -> Result<(), SpeedModeError> {
    for event in events {
        out.write_event(event).map_err(xml_err)?;
    }
    Ok(())
}

/// Section-level walk state
struct PageWalk<'a, 'b> {
    breaks: &'b [String],
    wanted: u32,
    page: u32,
    seen_content: bool,
    pending_break: bool,
    /// Children read after a break; they open the next page if content follows
    pending: Vec<(bool, Vec<Event<'a>>)>,
    /// Section-level score definitions from pages before the wanted one
    carried: Vec<Event<'a>>,
}

impl<'a> PageWalk<'a, '_> {
    fn is_break(&self, name: &[u8]) -> bool {
        self.breaks.iter().any(|b| b.as_bytes() == name)
    }

    /// Route a complete direct child of the section
    fn finish_child(
        &mut self,
        name: &[u8],
        events: Vec<Event<'a>>,
        out: &mut Writer<Vec<u8>>,
    ) -> Result<(), SpeedModeError> {
        if self.is_break(name) {
            if self.seen_content {
                self.pending_break = true;
            }
            return Ok(());
        }
        let score_def = name == SCORE_DEF;
        if !CONTENT_ELEMENTS.contains(&name) {
            if self.pending_break {
                self.pending.push((score_def, events));
                return Ok(());
            }
            return self.place(score_def, events, out);
        }
        if self.pending_break {
            self.page += 1;
            self.pending_break = false;
            for (score_def, pending) in std::mem::take(&mut self.pending) {
                self.place(score_def, pending, out)?;
            }
        }
        self.seen_content = true;
        self.place(false, events, out)
    }

    fn place(
        &mut self,
        score_def: bool,
        events: Vec<Event<'a>>,
        out: &mut Writer<Vec<u8>>,
    ) -> Result<(), SpeedModeError> {
        if self.page == self.wanted {
            write_all(out, std::mem::take(&mut self.carried))?;
            write_all(out, events)
        } else {
            if self.page < self.wanted && score_def {
                self.carried.extend(events);
            }
            Ok(())
        }
    }
}

/// Extract page `page` (1-based) of `encoding`
pub fn extract_page(encoding: &str, page: u32, breaks: &[String]) -> Result<SpeedPage, SpeedModeError> {
    let mut reader = Reader::from_str(encoding);
    let mut writer = Writer::new(Vec::new());
    let mut walk = PageWalk {
        breaks,
        wanted: page,
        page: 1,
        seen_content: false,
        pending_break: false,
        pending: Vec::new(),
        carried: Vec::new(),
    };

    let mut depth = 0usize;
    // Depth at which the section's children open
    let mut child_depth: Option<usize> = None;
    let mut section_seen = false;
    // Name and events of the section child being read
    let mut child: Option<(Vec<u8>, Vec<Event<'_>>)> = None;

    loop {
        let event = reader.read_event().map_err(xml_err)?;
        let at_child_level = child.is_none() && child_depth == Some(depth);
        let mut empty_child = None;
        match &event {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                if at_child_level {
                    child = Some((e.local_name().as_ref().to_vec(), Vec::new()));
                } else if !section_seen && child_depth.is_none() && e.local_name().as_ref() == b"section" {
                    section_seen = true;
                    child_depth = Some(depth);
                }
            }
            Event::Empty(e) if at_child_level => empty_child = Some(e.local_name().as_ref().to_vec()),
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }

        if let Some((_, events)) = child.as_mut() {
            events.push(event);
            if child_depth == Some(depth) {
                if let Some((name, events)) = child.take() {
                    walk.finish_child(&name, events, &mut writer)?;
                }
            }
            continue;
        }
        if at_child_level {
            if let Some(name) = empty_child {
                walk.finish_child(&name, vec![event], &mut writer)?;
            } else if matches!(event, Event::End(_)) {
                // closing the section itself
                child_depth = None;
                writer.write_event(event).map_err(xml_err)?;
            }
            // text between section children is dropped
            continue;
        }
        writer.write_event(event).map_err(xml_err)?;
    }

    if !section_seen {
        return Err(SpeedModeError::MissingSection);
    }
    let page_count = walk.page;
    if page == 0 || page > page_count {
        return Err(SpeedModeError::PageOutOfRange { page, page_count });
    }
    let encoding = String::from_utf8(writer.into_inner()).map_err(xml_err)?;
    Ok(SpeedPage { encoding, page_count })
}
