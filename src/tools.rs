//! Viewer tool palette
//!
//! Tools are mutually exclusive modes. Picking one switches every mode off
//! before switching the chosen one on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Highlight,
    Clip,
    Rectangle,
    Search,
    #[serde(rename = "sticky")]
    StickyNote,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Highlight,
        Tool::Clip,
        Tool::Rectangle,
        Tool::Search,
        Tool::StickyNote,
    ];
}

/// Currently active tool and the modes it switches on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPalette {
    selected: Option<Tool>,
    highlighting: bool,
    search_bar: bool,
}

impl ToolPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, tool: Tool) {
        self.highlighting = false;
        self.search_bar = false;

        match tool {
            Tool::Highlight => self.highlighting = true,
            Tool::Search => self.search_bar = true,
            Tool::Clip | Tool::Rectangle | Tool::StickyNote => {}
        }

        tracing::debug!(?tool, "tool selected");
        self.selected = Some(tool);
    }

    pub fn selected(&self) -> Option<Tool> {
        self.selected
    }

    pub fn highlighting_enabled(&self) -> bool {
        self.highlighting
    }

    pub fn search_bar_visible(&self) -> bool {
        self.search_bar
    }
}
