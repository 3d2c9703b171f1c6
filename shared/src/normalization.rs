//! AQI and pollen normalization
//!
//! Pure conversions from raw concentrations to the indices carried by
//! [`EnvironmentalReading`](crate::models::EnvironmentalReading).

/// One linear segment of a breakpoint table
struct Breakpoint {
    conc_lo: f64,
    conc_hi: f64,
    index_lo: f64,
    index_hi: f64,
}

impl Breakpoint {
    const fn new(conc_lo: f64, conc_hi: f64, index_lo: f64, index_hi: f64) -> Self {
        Self {
            conc_lo,
            conc_hi,
            index_lo,
            index_hi,
        }
    }

    fn interpolate(&self, concentration: f64) -> f64 {
        self.index_lo
            + (concentration - self.conc_lo) * (self.index_hi - self.index_lo)
                / (self.conc_hi - self.conc_lo)
    }
}

/// PM2.5 (μg/m³) breakpoints. The last segment is open-ended.
const PM25_BREAKPOINTS: [Breakpoint; 4] = [
    Breakpoint::new(0.0, 12.0, 0.0, 50.0),
    Breakpoint::new(12.0, 35.4, 50.0, 100.0),
    Breakpoint::new(35.4, 55.4, 100.0, 150.0),
    Breakpoint::new(55.4, 150.4, 150.0, 200.0),
];

/// PM10 (μg/m³) breakpoints. The last segment is open-ended.
const PM10_BREAKPOINTS: [Breakpoint; 4] = [
    Breakpoint::new(0.0, 54.0, 0.0, 50.0),
    Breakpoint::new(54.0, 154.0, 50.0, 100.0),
    Breakpoint::new(154.0, 254.0, 100.0, 150.0),
    Breakpoint::new(254.0, 354.0, 150.0, 200.0),
];

/// Pollen concentration (grains/m³) upper bounds for levels 0 through 4
const POLLEN_THRESHOLDS: [f64; 5] = [1.0, 5.0, 10.0, 50.0, 100.0];

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn sub_index(concentration: f64, table: &[Breakpoint]) -> f64 {
    let concentration = sanitize(concentration);
    let segment = table
        .iter()
        .find(|bp| concentration < bp.conc_hi)
        .or_else(|| table.last());

    segment.map(|bp| bp.interpolate(concentration)).unwrap_or(0.0)
}

/// Compute the air quality index from particulate concentrations.
///
/// The result is the larger of the PM2.5 and PM10 sub-indices, rounded to the
/// nearest integer. Without a PM2.5 value the index is 0.
pub fn compute_aqi(pm25: Option<f64>, pm10: Option<f64>) -> u32 {
    let Some(pm25) = pm25 else {
        return 0;
    };

    let pm25_index = sub_index(pm25, &PM25_BREAKPOINTS);
    let pm10_index = pm10.map(|v| sub_index(v, &PM10_BREAKPOINTS)).unwrap_or(0.0);

    pm25_index.max(pm10_index).round() as u32
}

/// Convert a pollen concentration (grains/m³) to the 0-5 ordinal scale
pub fn pollen_to_scale(concentration: f64) -> u8 {
    let concentration = sanitize(concentration);
    POLLEN_THRESHOLDS
        .iter()
        .position(|threshold| concentration < *threshold)
        .unwrap_or(POLLEN_THRESHOLDS.len()) as u8
}
