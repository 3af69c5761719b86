//! Page navigation state

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Requested page change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// Absolute page number (sign is dropped)
    Number(i64),
    First,
    Last,
    Forwards,
    Backwards,
}

impl FromStr for PageTarget {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(PageTarget::Number(n));
        }
        match trimmed.to_lowercase().as_str() {
            "first" => Ok(PageTarget::First),
            "last" => Ok(PageTarget::Last),
            "forwards" => Ok(PageTarget::Forwards),
            "backwards" => Ok(PageTarget::Backwards),
            _ => Err(ViewerError::PageTarget(s.to_string())),
        }
    }
}

/// Current page and page count
///
/// Keeps `1 <= current <= count` whenever `count > 0`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    current: u32,
    count: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { current: 1, count: 0 }
    }
}

impl Pagination {
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Nothing loaded yet
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_valid(&self, page: u32) -> bool {
        page > 0 && page <= self.count
    }

    /// Set the page count, pulling the current page back into range
    pub fn set_count(&mut self, count: u32) {
        self.count = count;
        if count > 0 && !self.is_valid(self.current) {
            self.current = if self.current > count { count } else { 1 };
        }
    }

    /// Resolve a target to a page number without applying it
    pub fn resolve(&self, target: PageTarget) -> Option<u32> {
        let page = match target {
            PageTarget::Number(n) => u32::try_from(n.unsigned_abs()).ok()?,
            PageTarget::First => 1,
            PageTarget::Last => self.count,
            PageTarget::Forwards if self.current < self.count => self.current + 1,
            PageTarget::Backwards if self.current > 1 => self.current - 1,
            PageTarget::Forwards | PageTarget::Backwards => return None,
        };
        self.is_valid(page).then_some(page)
    }

    /// Apply a page change; returns the new page when something changed
    pub fn change(&mut self, target: PageTarget) -> Option<u32> {
        let page = self.resolve(target)?;
        self.current = page;
        Some(page)
    }

    /// Use `page` if it is valid, page 1 otherwise
    pub fn clamp_or_first(&mut self, page: u32) -> u32 {
        self.current = if self.is_valid(page) { page } else { 1 };
        self.current
    }

    /// Label shown in the pagination control
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.count)
    }
}
