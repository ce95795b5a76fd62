use rand::Rng;
use ratatui::style::Color;

/// A color on the HSL wheel. Saturation and lightness are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue: hue % 360,
            saturation: saturation.min(100),
            lightness: lightness.min(100),
        }
    }

    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = f32::from(self.saturation) / 100.0;
        let l = f32::from(self.lightness) / 100.0;
        let h = f32::from(self.hue) / 60.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match self.hue / 60 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }

    pub fn to_color(self) -> Color {
        let (r, g, b) = self.to_rgb();
        Color::Rgb(r, g, b)
    }
}

/// Circular distance between two hues, in `[0, 180]`.
pub fn hue_distance(a: u16, b: u16) -> u16 {
    let diff = (i32::from(a % 360) - i32::from(b % 360)).unsigned_abs() as u16;
    diff.min(360 - diff)
}

/// `base + offset + jitter` on the wheel, jitter uniform in `[-30, 30)`.
fn rotate_jittered<R: Rng + ?Sized>(rng: &mut R, base: u16, offset: i32) -> u16 {
    let jitter = rng.gen_range(-30..30);
    (i32::from(base) + offset + jitter).rem_euclid(360) as u16
}

/// The three colors one randomize produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Hsl,
    pub foreground: Hsl,
    pub card: Hsl,
}

impl Palette {
    pub fn to_theme(self) -> ThemeColors {
        ThemeColors {
            background: self.background.to_color(),
            foreground: self.foreground.to_color(),
            card: self.card.to_color(),
        }
    }
}

/// Dark muted background, a near-complementary bright foreground and a card
/// tint roughly a quarter turn away from the background.
pub fn random_palette<R: Rng + ?Sized>(rng: &mut R) -> Palette {
    let bg_hue = rng.gen_range(0..360);
    let fg_hue = rotate_jittered(rng, bg_hue, 180);
    let card_hue = rotate_jittered(rng, bg_hue, 90);

    Palette {
        background: Hsl::new(bg_hue, 20, rng.gen_range(30..50)),
        foreground: Hsl::new(fg_hue, 80, rng.gen_range(70..90)),
        card: Hsl::new(card_hue, 25, rng.gen_range(45..55)),
    }
}

/// Root presentation colors the rest of the screen is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub background: Color,
    pub foreground: Color,
    pub card: Color,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn converts_primaries() {
        assert_eq!(Hsl::new(0, 100, 50).to_rgb(), (255, 0, 0));
        assert_eq!(Hsl::new(120, 100, 50).to_rgb(), (0, 255, 0));
        assert_eq!(Hsl::new(240, 100, 50).to_rgb(), (0, 0, 255));
        assert_eq!(Hsl::new(0, 0, 100).to_rgb(), (255, 255, 255));
        assert_eq!(Hsl::new(200, 50, 0).to_rgb(), (0, 0, 0));
    }

    #[test]
    fn new_wraps_hue() {
        assert_eq!(Hsl::new(370, 10, 10).hue, 10);
    }

    #[test]
    fn hue_distance_wraps() {
        assert_eq!(hue_distance(10, 350), 20);
        assert_eq!(hue_distance(0, 180), 180);
        assert_eq!(hue_distance(90, 90), 0);
    }

    #[test]
    fn foreground_stays_opposite_background() {
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let palette = random_palette(&mut rng);
            assert!(
                hue_distance(palette.background.hue, palette.foreground.hue) >= 150,
                "seed {seed}: {palette:?}"
            );
        }
    }

    #[test]
    fn palette_stays_in_bands() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_palette(&mut rng);
            assert!(p.background.hue < 360 && p.foreground.hue < 360 && p.card.hue < 360);
            assert_eq!(p.background.saturation, 20);
            assert!((30..50).contains(&p.background.lightness));
            assert_eq!(p.foreground.saturation, 80);
            assert!((70..90).contains(&p.foreground.lightness));
            assert_eq!(p.card.saturation, 25);
            assert!((45..55).contains(&p.card.lightness));

            let card_offset = (i32::from(p.card.hue) - i32::from(p.background.hue)).rem_euclid(360);
            assert!((60..120).contains(&card_offset), "{p:?}");
        }
    }
}
