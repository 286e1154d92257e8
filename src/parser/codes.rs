//! Product and service code tables
//!
//! Structured documents carry a one-letter product type and a three-letter
//! service code. Unmapped codes decode to `Unknown (<code>)`.

/// Description of a one-letter product type code
pub fn product_type_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "A" => "Advice",
        "B" => "Bundle",
        "C" => "Climate",
        "D" => "Metadata",
        "E" => "Analysis",
        "F" => "Forecast",
        "M" => "Numerical Weather Prediction",
        "O" => "Observation",
        "Q" => "Reference",
        "R" => "Radar",
        "S" => "Special",
        "T" => "Satellite",
        "W" => "Warning",
        "X" => "Mixed",
        _ => return None,
    };
    Some(name)
}

/// Description of a three-letter service code
pub fn service_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "COM" => "Commercial Services",
        "HFW" => "Flood Warning Service",
        "TWS" => "Tsunami Warning Services",
        "WAP" => "Analysis and Prediction",
        "WSA" => "Aviation Weather Services",
        "WSD" => "Defence Weather Services",
        "WSF" => "Fire Weather Services",
        "WSM" => "Marine Weather Services",
        "WSP" => "Public Weather Services",
        "WSS" => "Cost Recovery Services",
        "WSW" => "Disaster Mitigation",
        _ => return None,
    };
    Some(name)
}

/// Decoded product type, falling back to `Unknown (<code>)`
pub fn decode_product_type(code: &str) -> String {
    product_type_name(code)
        .map(str::to_string)
        .unwrap_or_else(|| unknown(code))
}

/// Decoded service, falling back to `Unknown (<code>)`
pub fn decode_service(code: &str) -> String {
    service_name(code)
        .map(str::to_string)
        .unwrap_or_else(|| unknown(code))
}

fn unknown(code: &str) -> String {
    format!("Unknown ({code})")
}
