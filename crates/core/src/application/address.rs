// Address Normalizer - geocoder-ready address strings

/// City tokens that mark an address as already carrying its locality
const LOCALITY_TOKENS: [&str; 3] = ["zürich", "zurich", "switzerland"];

/// Appended when neither the address nor a hint names a locality
pub const DEFAULT_LOCALITY: &str = "Zürich, Switzerland";

/// Build a complete address from a street address and an optional locality hint
///
/// Pure and deterministic:
/// 1. Address already names a known city or holds a 4-digit postal code -> unchanged
/// 2. Locality hint given -> `"{street_address}, {locality}"`
/// 3. Otherwise -> `"{street_address}, Zürich, Switzerland"`
pub fn build_complete_address(street_address: &str, locality: Option<&str>) -> String {
    if has_locality_marker(street_address) {
        return street_address.to_string();
    }

    match locality.map(str::trim).filter(|l| !l.is_empty()) {
        Some(locality) => format!("{}, {}", street_address, locality),
        None => format!("{}, {}", street_address, DEFAULT_LOCALITY),
    }
}

fn has_locality_marker(address: &str) -> bool {
    let lowered = address.to_lowercase();
    LOCALITY_TOKENS.iter().any(|t| lowered.contains(t)) || has_postal_code(address)
}

/// Four consecutive ASCII digits anywhere in the string
fn has_postal_code(address: &str) -> bool {
    address
        .as_bytes()
        .windows(4)
        .any(|w| w.iter().all(u8::is_ascii_digit))
}
