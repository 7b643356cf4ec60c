//! Distance and coordinate formatting.

/// Metres below 1 km, kilometres with two decimals above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// `10.000000°N, 10.000000°E` style.
pub fn format_coordinates(lat: f64, lon: f64) -> String {
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    let ew = if lon < 0.0 { 'W' } else { 'E' };
    format!("{:.6}°{}, {:.6}°{}", lat.abs(), ns, lon.abs(), ew)
}
