//! Color themes and snake skins

use serde::{Deserialize, Serialize};

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

const fn rgb(hex: u32) -> Color {
    rgba(hex, 1.0)
}

const fn rgba(hex: u32, alpha: f32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// World color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Neon,
    Retro,
    Ocean,
    Void,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Neon, Theme::Retro, Theme::Ocean, Theme::Void];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Neon => "neon",
            Theme::Retro => "retro",
            Theme::Ocean => "ocean",
            Theme::Void => "void",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s.to_lowercase())
    }
}

/// Snake color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Cyber,
    Fire,
    Ice,
    Toxic,
}

impl Skin {
    pub const ALL: [Skin; 4] = [Skin::Cyber, Skin::Fire, Skin::Ice, Skin::Toxic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skin::Cyber => "cyber",
            Skin::Fire => "fire",
            Skin::Ice => "ice",
            Skin::Toxic => "toxic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s.to_lowercase())
    }
}

/// Resolved colors for one theme + skin combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub echo: Color,
    pub food: Color,
    pub chrono_fruit: Color,
    pub portal: Color,
    pub laser: Color,
    /// Head, body and accent colors for player one
    pub snake: [Color; 3],
    pub snake2: [Color; 3],
}

impl Palette {
    pub fn new(theme: Theme, skin: Skin) -> Self {
        let (background, grid, echo, food, chrono_fruit, portal, laser) = match theme {
            Theme::Neon => (
                rgb(0x0a0e27),
                rgba(0x00ffff, 0.1),
                rgba(0x00ffff, 0.4),
                rgb(0xff6b6b),
                rgb(0x00aaff),
                rgb(0x9933ff),
                rgb(0xff0000),
            ),
            Theme::Retro => (
                rgb(0x1a0a00),
                rgba(0xff6b35, 0.1),
                rgba(0xffc896, 0.4),
                rgb(0xff6b35),
                rgb(0xf7c59f),
                rgb(0xff8c42),
                rgb(0xff4500),
            ),
            Theme::Ocean => (
                rgb(0x001220),
                rgba(0x00b4d8, 0.1),
                rgba(0x00b4d8, 0.4),
                rgb(0x48cae4),
                rgb(0x90e0ef),
                rgb(0x0096c7),
                rgb(0xff6b6b),
            ),
            Theme::Void => (
                rgb(0x0d0015),
                rgba(0x6b2d5b, 0.15),
                rgba(0x963278, 0.4),
                rgb(0x9b2335),
                rgb(0xc154c1),
                rgb(0x6b2d5b),
                rgb(0xff1493),
            ),
        };
        let (snake, snake2) = match skin {
            Skin::Cyber => (
                [rgb(0x00ffff), rgb(0xff00ff), rgb(0xffff00)],
                [rgb(0xff6666), rgb(0xff9944), rgb(0xffcc00)],
            ),
            Skin::Fire => (
                [rgb(0xff4500), rgb(0xff6600), rgb(0xffcc00)],
                [rgb(0x00bfff), rgb(0x0080ff), rgb(0x0040ff)],
            ),
            Skin::Ice => (
                [rgb(0x87ceeb), rgb(0x00bfff), rgb(0xffffff)],
                [rgb(0xff6b6b), rgb(0xff4444), rgb(0xcc0000)],
            ),
            Skin::Toxic => (
                [rgb(0x39ff14), rgb(0x00ff00), rgb(0x7fff00)],
                [rgb(0xff00ff), rgb(0xcc00cc), rgb(0x990099)],
            ),
        };
        Self {
            background,
            grid,
            echo,
            food,
            chrono_fruit,
            portal,
            laser,
            snake,
            snake2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba(0x00ff00, 0.5), [0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::parse(theme.as_str()), Some(theme));
        }
        assert_eq!(Skin::parse("TOXIC"), Some(Skin::Toxic));
        assert_eq!(Skin::parse("plaid"), None);
    }

    #[test]
    fn test_palettes_differ_by_theme() {
        let neon = Palette::new(Theme::Neon, Skin::Cyber);
        let void = Palette::new(Theme::Void, Skin::Cyber);
        assert_ne!(neon.background, void.background);
        assert_eq!(neon.snake, void.snake);
    }
}
