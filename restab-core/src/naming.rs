//! Identifier derivation for generated enums, enumerators and aliases.

/// `E` followed by each `_`-separated word of `name` in title case.
///
/// ```
/// use restab_core::naming::enum_name;
/// assert_eq!(enum_name("leds"), "ELeds");
/// assert_eq!(enum_name("adc_channel"), "EAdcChannel");
/// assert_eq!(enum_name("adc2x"), "EAdc2X");
/// ```
pub fn enum_name(name: &str) -> String {
    let mut result = String::from("E");
    for word in name.split('_') {
        result.push_str(&title_case(word));
    }
    result
}

/// Upper-cases every letter that follows a non-letter and lower-cases the
/// rest, so `2x` becomes `2X` and `rgbLED` becomes `Rgbled`.
pub fn title_case(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut after_letter = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if after_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            result.push(c);
            after_letter = false;
        }
    }
    result
}

pub fn enumerator(prefix: &str, key: &str) -> String {
    format!("{prefix}_{}", key.to_uppercase())
}

pub fn sentinel(prefix: &str) -> String {
    format!("{prefix}_LAST")
}

pub fn alias(table: &str, key: &str) -> String {
    format!("{table}_{}", key.to_lowercase())
}

/// Keys end up inside C identifiers, so only ASCII alphanumerics and `_`
/// are allowed.
pub fn is_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `UPPER(target)_UPPER(namespace)_H_`
pub fn header_guard(target: &str, namespace: &str) -> String {
    format!("{}_{}_H_", target.to_uppercase(), namespace.to_uppercase())
}
