// src/figures/theme.rs

use serde::{Deserialize, Serialize};

/// Visual settings for the composite figure. Passed to `render` explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub title_size: u32,
    pub caption_size: u32,
    pub label_size: u32,
    pub background: [u8; 3],
    pub text: [u8; 3],
    /// Series colours, used in order and cycled.
    pub palette: Vec<[u8; 3]>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1200,
            font_family: "sans-serif".into(),
            title_size: 28,
            caption_size: 20,
            label_size: 13,
            background: [255, 255, 255],
            text: [34, 34, 34],
            palette: vec![
                [31, 119, 180],
                [255, 127, 14],
                [44, 160, 44],
                [214, 39, 40],
                [148, 103, 189],
                [140, 86, 75],
            ],
        }
    }
}

impl Theme {
    pub fn colour(&self, i: usize) -> [u8; 3] {
        if self.palette.is_empty() {
            return self.text;
        }
        self.palette[i % self.palette.len()]
    }
}
