use std::collections::HashMap;

use ratatui::style::Color;

use super::ThemeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,
    pub highlight_bg: Color,
}

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    palettes: HashMap<ThemeName, Palette>,
}

impl ThemeRegistry {
    pub fn contains(&self, theme: &ThemeName) -> bool {
        self.palettes.contains_key(theme)
    }

    pub fn palette(&self, theme: &ThemeName) -> Palette {
        self.palettes
            .get(theme)
            .or_else(|| self.palettes.get(&ThemeName::Dark))
            .copied()
            .unwrap_or(DARK)
    }
}

const DARK: Palette = Palette {
    text: Color::Rgb(0xF3, 0xF1, 0xEE),
    muted: Color::Gray,
    accent: Color::Rgb(0xB7, 0x92, 0x6F),
    error: Color::LightRed,
    highlight_bg: Color::Rgb(0x3A, 0x30, 0x28),
};

const LIGHT: Palette = Palette {
    text: Color::Black,
    muted: Color::DarkGray,
    accent: Color::Rgb(0x8A, 0x62, 0x3F),
    error: Color::Red,
    highlight_bg: Color::Rgb(0xEA, 0xE2, 0xD6),
};

impl Default for ThemeRegistry {
    fn default() -> Self {
        let palettes = [(ThemeName::Dark, DARK), (ThemeName::Light, LIGHT)]
            .into_iter()
            .collect();
        Self { palettes }
    }
}
