use rand::seq::SliceRandom;
use rand::Rng;
use ratatui::style::Color;
use std::time::Duration;

use crate::palette::Hsl;

pub const SPRITE_SIZE: usize = 8;
const SPRITE_SATURATION: u8 = 70;
const SPRITE_LIGHTNESS: u8 = 50;

// ============================================================================
// PIXEL SPRITE
// ============================================================================

/// Row-major 8x8 grid of colors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteGrid {
    cells: Vec<Hsl>,
}

impl SpriteGrid {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let cells = (0..SPRITE_SIZE * SPRITE_SIZE)
            .map(|_| Hsl::new(rng.gen_range(0..360), SPRITE_SATURATION, SPRITE_LIGHTNESS))
            .collect();
        Self { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Hsl] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Hsl]> {
        self.cells.chunks(SPRITE_SIZE)
    }
}

// ============================================================================
// ASCII FRAME
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsciiFrame {
    lines: Vec<String>,
}

impl AsciiFrame {
    /// Samples `lines` rows of `width` glyphs. An empty glyph set yields
    /// blank rows; config validation keeps that from happening at runtime.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        lines: usize,
        width: usize,
        glyphs: &[char],
    ) -> Self {
        let lines = (0..lines)
            .map(|_| {
                (0..width)
                    .map(|_| glyphs.choose(rng).copied().unwrap_or(' '))
                    .collect()
            })
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ============================================================================
// GLITCH
// ============================================================================

/// One step of the title glitch: a horizontal jitter and two shadow colors
/// alternated across the characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlitchKeyframe {
    pub offset: i16,
    pub shadows: [Color; 2],
}

const GLITCH_PERIOD_MS: u128 = 1000;

const GLITCH_KEYFRAMES: [GlitchKeyframe; 5] = [
    GlitchKeyframe {
        offset: 0,
        shadows: [Color::Rgb(255, 0, 0), Color::Rgb(0, 0, 255)],
    },
    GlitchKeyframe {
        offset: -2,
        shadows: [Color::Rgb(0, 128, 0), Color::Rgb(128, 0, 128)],
    },
    GlitchKeyframe {
        offset: 2,
        shadows: [Color::Rgb(255, 255, 0), Color::Rgb(0, 255, 255)],
    },
    GlitchKeyframe {
        offset: -1,
        shadows: [Color::Rgb(255, 165, 0), Color::Rgb(255, 192, 203)],
    },
    GlitchKeyframe {
        offset: 1,
        shadows: [Color::Rgb(0, 255, 0), Color::Rgb(255, 0, 255)],
    },
];

pub fn glitch_keyframe(elapsed: Duration) -> GlitchKeyframe {
    let phase = elapsed.as_millis() % GLITCH_PERIOD_MS;
    let step = GLITCH_PERIOD_MS / GLITCH_KEYFRAMES.len() as u128;
    GLITCH_KEYFRAMES[(phase / step) as usize]
}

// ============================================================================
// NEON GRADIENT
// ============================================================================

const NEON_PERIOD_MS: u128 = 3000;
const NEON_CYAN: (u8, u8, u8) = (0x00, 0xff, 0xea);
const NEON_MAGENTA: (u8, u8, u8) = (0xff, 0x00, 0xe0);

/// Color of `column` in a row `width` cells wide. The cyan-magenta-cyan
/// band slides across the row and back once per period.
pub fn neon_color(column: usize, width: usize, elapsed: Duration) -> Color {
    let width = width.max(1) as f32;
    let phase = (elapsed.as_millis() % NEON_PERIOD_MS) as f32 / NEON_PERIOD_MS as f32;
    // triangle wave 0 -> 1 -> 0 over the period
    let sweep = 1.0 - (2.0 * phase - 1.0).abs();
    let position = column as f32 / width * 0.5 + sweep * 0.5;
    let mix = 0.5 - 0.5 * (position * std::f32::consts::TAU).cos();

    let lerp = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * mix).round() as u8;
    Color::Rgb(
        lerp(NEON_CYAN.0, NEON_MAGENTA.0),
        lerp(NEON_CYAN.1, NEON_MAGENTA.1),
        lerp(NEON_CYAN.2, NEON_MAGENTA.2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sprite_has_64_fixed_tone_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = SpriteGrid::random(&mut rng);
        assert_eq!(grid.cells().len(), 64);
        assert_eq!(grid.rows().count(), 8);
        for cell in grid.cells() {
            assert!(cell.hue < 360);
            assert_eq!(cell.saturation, 70);
            assert_eq!(cell.lightness, 50);
        }
    }

    #[test]
    fn default_sprite_is_empty() {
        assert!(SpriteGrid::default().is_empty());
    }

    #[test]
    fn ascii_frame_has_fixed_shape_and_glyphs() {
        let glyphs: Vec<char> = "#@$%&*+=?.".chars().collect();
        let mut rng = StdRng::seed_from_u64(2);
        let frame = AsciiFrame::random(&mut rng, 10, 32, &glyphs);

        assert_eq!(frame.lines().len(), 10);
        for line in frame.lines() {
            assert_eq!(line.chars().count(), 32);
            assert!(line.chars().all(|c| glyphs.contains(&c)));
        }
    }

    #[test]
    fn ascii_frames_differ_between_samples() {
        let glyphs: Vec<char> = "#@$%&*+=?.".chars().collect();
        let mut rng = StdRng::seed_from_u64(3);
        let a = AsciiFrame::random(&mut rng, 10, 32, &glyphs);
        let b = AsciiFrame::random(&mut rng, 10, 32, &glyphs);
        assert_ne!(a, b);
    }

    #[test]
    fn glitch_cycles_every_second() {
        let first = glitch_keyframe(Duration::from_millis(0));
        assert_eq!(first, GLITCH_KEYFRAMES[0]);
        assert_eq!(glitch_keyframe(Duration::from_millis(250)), GLITCH_KEYFRAMES[1]);
        assert_eq!(glitch_keyframe(Duration::from_millis(999)), GLITCH_KEYFRAMES[4]);
        assert_eq!(glitch_keyframe(Duration::from_millis(1000)), first);
    }

    #[test]
    fn neon_starts_cyan_and_reaches_magenta() {
        assert_eq!(neon_color(0, 32, Duration::ZERO), Color::Rgb(0x00, 0xff, 0xea));
        // half a period in, the sweep puts column 0 at the middle of the band
        assert_eq!(
            neon_color(0, 32, Duration::from_millis(1500)),
            Color::Rgb(0xff, 0x00, 0xe0)
        );
    }
}
