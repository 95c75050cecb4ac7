use image::RgbaImage;
use palette::Srgb;

/// Why one palette entry was left out. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteParseWarning {
    pub entry: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PaletteParse {
    pub palette: Palette,
    pub warnings: Vec<PaletteParseWarning>,
}

/// Ordered set of target colors. Order matters: ties resolve to the earlier entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: Vec<Srgb<u8>>,
}

impl Palette {
    /// Parse a comma separated list of `#RRGGBB` codes. Blank entries are
    /// skipped quietly, malformed ones are skipped with a warning.
    pub fn parse(input: &str) -> PaletteParse {
        let mut colors = Vec::new();
        let mut warnings = Vec::new();

        for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match parse_hex(entry) {
                Ok(color) => colors.push(color),
                Err(reason) => {
                    log::warn!("skipping palette entry {:?}: {}", entry, reason);
                    warnings.push(PaletteParseWarning {
                        entry: entry.to_string(),
                        reason,
                    });
                }
            }
        }

        PaletteParse {
            palette: Palette { colors },
            warnings,
        }
    }

    pub fn colors(&self) -> &[Srgb<u8>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Closest entry by Euclidean RGB distance, or `None` for an empty palette.
    pub fn nearest(&self, rgb: [u8; 3]) -> Option<Srgb<u8>> {
        let mut best = None;
        let mut best_dist = u32::MAX;
        for &color in &self.colors {
            let d = distance_sq(color, rgb);
            // strict: first entry wins a tie
            if d < best_dist {
                best_dist = d;
                best = Some(color);
            }
        }
        best
    }

    /// Snap every pixel's RGB to the palette; alpha is untouched.
    pub fn quantize(&self, buffer: &mut RgbaImage) {
        if self.is_empty() {
            return;
        }
        for pixel in buffer.pixels_mut() {
            let [r, g, b, _] = pixel.0;
            if let Some(color) = self.nearest([r, g, b]) {
                pixel.0[0] = color.red;
                pixel.0[1] = color.green;
                pixel.0[2] = color.blue;
            }
        }
    }
}

fn distance_sq(color: Srgb<u8>, rgb: [u8; 3]) -> u32 {
    let dr = color.red as i32 - rgb[0] as i32;
    let dg = color.green as i32 - rgb[1] as i32;
    let db = color.blue as i32 - rgb[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

fn parse_hex(entry: &str) -> Result<Srgb<u8>, String> {
    let digits = entry.strip_prefix('#').unwrap_or(entry);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("expected six hex digits (#RRGGBB)".to_string());
    }
    digits.parse::<Srgb<u8>>().map_err(|e| e.to_string())
}

/// Palettes offered next to the free-form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Gameboy,
    Cga,
    Pastel,
    Retro,
    Neon,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Gameboy,
        Preset::Cga,
        Preset::Pastel,
        Preset::Retro,
        Preset::Neon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Gameboy => "Gameboy",
            Preset::Cga => "CGA",
            Preset::Pastel => "Pastel",
            Preset::Retro => "Retro",
            Preset::Neon => "Neon",
        }
    }

    pub fn colors(self) -> &'static str {
        match self {
            Preset::Gameboy => "#0f380f,#306230,#8bac0f,#9bbc0f",
            Preset::Cga => "#000000,#0000aa,#00aa00,#00aaaa,#aa0000,#aa00aa,#aa5500,#aaaaaa,#555555,#5555ff,#55ff55,#55ffff,#ff5555,#ff55ff,#ffff55,#ffffff",
            Preset::Pastel => "#f1c0e8,#ffcfd2,#cfbaf0,#a3c4f3,#90dbf4,#8eecf5,#98f5e1,#b9fbc0",
            Preset::Retro => "#d00000,#ffba08,#3f88c5,#032b43,#136f63",
            Preset::Neon => "#ff00ff,#00ffff,#ff0000,#00ff00,#0000ff,#ffff00",
        }
    }

    pub fn palette(self) -> Palette {
        Palette::parse(self.colors()).palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn parse_accepts_case_and_missing_hash() {
        let parsed = Palette::parse("#FF0000, 00ff00 ,#0000Ff");
        assert!(parsed.warnings.is_empty());
        assert_eq!(
            parsed.palette.colors(),
            &[
                Srgb::new(255, 0, 0),
                Srgb::new(0, 255, 0),
                Srgb::new(0, 0, 255)
            ]
        );
    }

    #[test]
    fn parse_skips_malformed_entries() {
        let parsed = Palette::parse("nonsense,,#zz0000");
        assert!(parsed.palette.is_empty());
        let rejected: Vec<&str> = parsed.warnings.iter().map(|w| w.entry.as_str()).collect();
        assert_eq!(rejected, vec!["nonsense", "#zz0000"]);
    }

    #[test]
    fn parse_rejects_short_and_signed_codes() {
        let parsed = Palette::parse("#fff,+fffff,#1234567,#123456");
        assert_eq!(parsed.palette.colors(), &[Srgb::new(0x12, 0x34, 0x56)]);
        assert_eq!(parsed.warnings.len(), 3);
    }

    #[test]
    fn nearest_picks_minimum_distance() {
        let palette = Palette::parse("#ff0000,#00ff00,#0000ff").palette;
        assert_eq!(palette.nearest([200, 10, 10]), Some(Srgb::new(255, 0, 0)));
    }

    #[test]
    fn nearest_tie_goes_to_first_entry() {
        let palette = Palette::parse("#000000,#020202").palette;
        assert_eq!(palette.nearest([1, 1, 1]), Some(Srgb::new(0, 0, 0)));
        let reversed = Palette::parse("#020202,#000000").palette;
        assert_eq!(reversed.nearest([1, 1, 1]), Some(Srgb::new(2, 2, 2)));
    }

    #[test]
    fn nearest_on_empty_palette_is_none() {
        assert_eq!(Palette::default().nearest([12, 34, 56]), None);
    }

    #[test]
    fn quantize_keeps_alpha() {
        let palette = Palette::parse("#ffffff,#000000").palette;
        let mut buffer = RgbaImage::from_pixel(2, 1, Rgba([240, 230, 250, 17]));
        buffer.put_pixel(1, 0, Rgba([10, 20, 5, 200]));
        palette.quantize(&mut buffer);
        assert_eq!(buffer.get_pixel(0, 0), &Rgba([255, 255, 255, 17]));
        assert_eq!(buffer.get_pixel(1, 0), &Rgba([0, 0, 0, 200]));
    }

    #[test]
    fn empty_palette_is_a_no_op() {
        let palette = Palette::default();
        let mut buffer = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 4]));
        let before = buffer.clone();
        palette.quantize(&mut buffer);
        assert_eq!(buffer, before);
    }

    #[test]
    fn presets_parse_cleanly() {
        for preset in Preset::ALL {
            let parsed = Palette::parse(preset.colors());
            assert!(parsed.warnings.is_empty(), "{} has bad entries", preset.name());
        }
        assert_eq!(Preset::Gameboy.palette().len(), 4);
        assert_eq!(Preset::Cga.palette().len(), 16);
    }
}
