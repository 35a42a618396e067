//! Control bar overlay: energy slider, readout and usage hint

use pyre_core::Energy;

pub const HINT: &str = "Low=Red  High=Blue   (drag mouse to rotate)";

/// Numeric energy readout shown next to the slider
pub fn readout(energy: Energy) -> String {
    format!("{:.2}", energy.value())
}

/// Slider state kept across frames
#[derive(Debug, Clone, Default)]
pub struct ControlBar {
    percent: u32,
}

impl ControlBar {
    pub fn new(energy: Energy) -> Self {
        Self {
            percent: energy.percent(),
        }
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Draw the bar. Returns the new energy when the slider moved.
    ///
    /// `energy` is the current value, which may have changed from the
    /// keyboard since the last frame.
    pub fn show(&mut self, ctx: &egui::Context, energy: Energy) -> Option<Energy> {
        if !ctx.is_using_pointer() {
            self.percent = energy.percent();
        }
        let before = self.percent;

        egui::TopBottomPanel::top("control_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Energy:");
                ui.add(egui::Slider::new(&mut self.percent, 0..=100).show_value(false));
                ui.label(readout(Energy::from_percent(self.percent)));
                ui.separator();
                ui.label(
                    egui::RichText::new(HINT).color(egui::Color32::from_rgb(180, 180, 200)),
                );
            });
        });

        (self.percent != before).then(|| Energy::from_percent(self.percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_has_two_decimals() {
        assert_eq!(readout(Energy::new(0.5)), "0.50");
        assert_eq!(readout(Energy::from_percent(7)), "0.07");
        assert_eq!(readout(Energy::MAX), "1.00");
    }

    #[test]
    fn bar_starts_at_energy_percent() {
        assert_eq!(ControlBar::new(Energy::new(0.5)).percent(), 50);
        assert_eq!(ControlBar::new(Energy::MIN).percent(), 0);
    }

    #[test]
    fn untouched_bar_reports_no_change() {
        let ctx = egui::Context::default();
        let mut bar = ControlBar::new(Energy::new(0.5));
        let mut changed = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changed = bar.show(ctx, Energy::new(0.75));
        });
        assert_eq!(changed, None);
        // Keyboard changes are picked up by the slider
        assert_eq!(bar.percent(), 75);
    }
}
