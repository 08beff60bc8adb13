use serde::Serialize;

#[derive(Serialize)]
pub struct SampleRecord {
    pub timestamp: String, // UTC ISO timestamp
    pub elapsed_s: u64,
    pub temperature: String, // raw vcgencmd text or fallback
    pub voltage: String,
    #[serde(rename = "temperature_C")]
    pub temperature_c: Option<f64>,
    #[serde(rename = "core_V")]
    pub core_volts: Option<f64>,
}
