// Synthetic reading generator for demo data
use crate::domain::telemetry::TelemetrySample;
use crate::infrastructure::config::GeneratorSettings;
use rand::Rng;

/// Produces the next reading for a battery: a linear capacity fade clamped
/// at a floor, with uniform noise on voltage, current and temperature.
/// Demo data only; it is not a physical model.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    settings: GeneratorSettings,
}

impl SampleGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Capacity at a cycle. Deterministic and non-increasing in `cycle_number`.
    pub fn capacity_at(&self, cycle_number: u32) -> f64 {
        let s = &self.settings;
        (s.base_capacity - s.degradation_rate * f64::from(cycle_number)).max(s.capacity_floor)
    }

    pub fn next_sample<R: Rng + ?Sized>(
        &self,
        battery_id: &str,
        latest: Option<&TelemetrySample>,
        rng: &mut R,
    ) -> TelemetrySample {
        let s = &self.settings;
        let cycle_number = latest.map_or(1, |l| l.cycle_number.saturating_add(1));

        TelemetrySample::new(
            battery_id.to_string(),
            cycle_number,
            s.voltage_base + noise(rng, s.voltage_jitter),
            s.current_base + noise(rng, s.current_jitter),
            s.temperature_base + noise(rng, s.temperature_jitter),
            self.capacity_at(cycle_number),
        )
    }
}

fn noise<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    rng.gen_range(0.0..=spread.max(0.0))
}
