//! Energy/age → RGBA color mapping
//!
//! Energy picks a palette (hot, mid, tip) by interpolating between ordered
//! palette stops: low energy leans red/orange/yellow, high energy leans
//! blue/cyan/white. Age then walks a particle from the palette's hot color
//! through mid to tip, darkening and fading out toward the end of its life.

use crate::curves::{bracket, clamp01, lerp_rgb, sample_rgb};
use pyre_core::{Color, Energy};
use serde::{Deserialize, Serialize};

/// Colors a particle passes through over its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub hot: [f32; 3],
    pub mid: [f32; 3],
    pub tip: [f32; 3],
}

impl Palette {
    fn lerp(a: &Palette, b: &Palette, t: f32) -> Palette {
        Palette {
            hot: lerp_rgb(a.hot, b.hot, t),
            mid: lerp_rgb(a.mid, b.mid, t),
            tip: lerp_rgb(a.tip, b.tip, t),
        }
    }
}

/// A palette pinned to an energy level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteStop {
    pub energy: f32,
    #[serde(flatten)]
    pub palette: Palette,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Alpha of a freshly spawned particle
    pub alpha_max: f32,
    /// Alpha of an expiring particle
    pub alpha_min: f32,
    /// Age at which the mid color is reached
    pub mid_age: f32,
    /// Fraction of brightness lost by the end of life
    pub darken: f32,
    /// Shape of the darkening curve (`age01^exponent`)
    pub darken_exponent: f32,
    /// Palette stops, sorted by energy
    pub palettes: Vec<PaletteStop>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            alpha_max: 0.20,
            alpha_min: 0.02,
            mid_age: 0.5,
            darken: 0.75,
            darken_exponent: 1.6,
            palettes: vec![
                PaletteStop {
                    energy: 0.0,
                    palette: Palette {
                        hot: [1.00, 0.15, 0.05],
                        mid: [1.00, 0.55, 0.10],
                        tip: [1.00, 0.95, 0.25],
                    },
                },
                PaletteStop {
                    energy: 1.0,
                    palette: Palette {
                        hot: [0.10, 0.25, 1.00],
                        mid: [0.10, 0.95, 1.00],
                        tip: [0.90, 0.95, 1.00],
                    },
                },
            ],
        }
    }
}

impl ColorConfig {
    pub fn sanitized(mut self) -> Self {
        let defaults = ColorConfig::default();
        let fix = |v: f32, fallback: f32| if v.is_finite() { clamp01(v) } else { fallback };
        self.alpha_max = fix(self.alpha_max, defaults.alpha_max);
        self.alpha_min = fix(self.alpha_min, defaults.alpha_min).min(self.alpha_max);
        self.mid_age = fix(self.mid_age, defaults.mid_age);
        self.darken = fix(self.darken, defaults.darken);
        self.darken_exponent = if self.darken_exponent.is_finite() && self.darken_exponent > 0.0 {
            self.darken_exponent
        } else {
            defaults.darken_exponent
        };

        self.palettes.retain(|stop| stop.energy.is_finite());
        if self.palettes.is_empty() {
            self.palettes = defaults.palettes;
        }
        for stop in &mut self.palettes {
            stop.energy = clamp01(stop.energy);
            for rgb in [&mut stop.palette.hot, &mut stop.palette.mid, &mut stop.palette.tip] {
                for c in rgb.iter_mut() {
                    *c = clamp01(*c);
                }
            }
        }
        self.palettes.sort_by(|a, b| a.energy.total_cmp(&b.energy));
        self
    }
}

/// Pure energy/age color function
#[derive(Debug, Clone)]
pub struct ColorMapper {
    config: ColorConfig,
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(ColorConfig::default())
    }
}

impl ColorMapper {
    pub fn new(config: ColorConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &ColorConfig {
        &self.config
    }

    /// Palette for an energy level
    pub fn palette(&self, energy: Energy) -> Palette {
        match bracket(&self.config.palettes, |s| s.energy, energy.value()) {
            Some((a, b, t)) => Palette::lerp(&a.palette, &b.palette, t),
            None => ColorConfig::default().palettes[0].palette,
        }
    }

    /// Alpha for a normalized age; non-increasing in age
    pub fn alpha(&self, age01: f32) -> f32 {
        let age01 = clamp01(age01);
        self.config.alpha_min + (self.config.alpha_max - self.config.alpha_min) * (1.0 - age01)
    }

    pub fn color(&self, energy: Energy, age01: f32) -> Color {
        let age01 = clamp01(age01);
        let palette = self.palette(energy);

        let stops = [
            (0.0, palette.hot),
            (self.config.mid_age, palette.mid),
            (1.0, palette.tip),
        ];
        let rgb = sample_rgb(&stops, age01);

        let fade = 1.0 - age01.powf(self.config.darken_exponent) * self.config.darken;
        Color::new(rgb[0] * fade, rgb[1] * fade, rgb[2] * fade, self.alpha(age01)).clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(n: usize) -> impl Iterator<Item = f32> {
        (0..=n).map(move |i| i as f32 / n as f32)
    }

    #[test]
    fn channels_stay_in_range() {
        let mapper = ColorMapper::default();
        for e in steps(20) {
            for age in steps(20) {
                let c = mapper.color(Energy::new(e), age);
                assert!(c.is_valid(), "e={e} age={age} -> {c:?}");
            }
        }
    }

    #[test]
    fn alpha_fades_with_age() {
        let mapper = ColorMapper::default();
        for e in steps(10) {
            let energy = Energy::new(e);
            assert!(mapper.color(energy, 0.0).a >= mapper.color(energy, 1.0).a);
            let mut prev = f32::INFINITY;
            for age in steps(50) {
                let a = mapper.color(energy, age).a;
                assert!(a <= prev + 1e-6);
                prev = a;
            }
        }
        assert!((mapper.alpha(0.0) - 0.20).abs() < 1e-6);
        assert!((mapper.alpha(1.0) - 0.02).abs() < 1e-6);
    }

    #[test]
    fn low_energy_is_red_high_energy_is_blue() {
        let mapper = ColorMapper::default();
        let cold = mapper.color(Energy::MIN, 0.0);
        let hot = mapper.color(Energy::MAX, 0.0);
        assert!(cold.r > cold.b);
        assert!(hot.b > hot.r);
    }

    #[test]
    fn old_particles_darken_toward_tip() {
        let mapper = ColorMapper::default();
        let young = mapper.color(Energy::MIN, 0.0);
        let old = mapper.color(Energy::MIN, 1.0);
        // Tip is yellow (green rises), but overall brightness is scaled down
        let tip = mapper.palette(Energy::MIN).tip;
        assert!((old.g - tip[1] * 0.25).abs() < 1e-5);
        assert!(old.r < young.r);
    }

    #[test]
    fn out_of_range_age_is_clamped() {
        let mapper = ColorMapper::default();
        assert_eq!(
            mapper.color(Energy::new(0.3), -4.0),
            mapper.color(Energy::new(0.3), 0.0)
        );
        assert_eq!(
            mapper.color(Energy::new(0.3), 9.0),
            mapper.color(Energy::new(0.3), 1.0)
        );
    }

    #[test]
    fn three_stop_palette_from_toml() {
        let toml_str = r#"
[[palettes]]
energy = 0.0
hot = [1.0, 0.0, 0.0]
mid = [1.0, 0.0, 0.0]
tip = [1.0, 0.0, 0.0]

[[palettes]]
energy = 1.0
hot = [0.0, 0.0, 1.0]
mid = [0.0, 0.0, 1.0]
tip = [0.0, 0.0, 1.0]

[[palettes]]
energy = 0.5
hot = [0.0, 1.0, 0.0]
mid = [0.0, 1.0, 0.0]
tip = [0.0, 1.0, 0.0]
"#;
        let config: ColorConfig = toml::from_str(toml_str).unwrap();
        let mapper = ColorMapper::new(config);
        // Unsorted stops are sorted on load
        assert_eq!(mapper.palette(Energy::new(0.5)).hot, [0.0, 1.0, 0.0]);
        let quarter = mapper.palette(Energy::new(0.25)).hot;
        assert!((quarter[0] - 0.5).abs() < 1e-6 && (quarter[1] - 0.5).abs() < 1e-6);
        assert!((mapper.config().alpha_max - 0.20).abs() < 1e-6);
    }

    #[test]
    fn empty_palette_list_falls_back_to_defaults() {
        let config = ColorConfig {
            palettes: Vec::new(),
            ..ColorConfig::default()
        };
        let mapper = ColorMapper::new(config);
        assert_eq!(mapper.config().palettes, ColorConfig::default().palettes);
    }
}
