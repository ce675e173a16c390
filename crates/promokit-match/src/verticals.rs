//! Vertical tag → indicator word table.
//!
//! A template's vertical tags earn a bonus when any indicator word for the
//! tag shows up in the post. The bonus saturates at one weight unit no
//! matter how many verticals hit.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Indicator words per vertical tag.
pub static VERTICAL_INDICATORS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        let entries: &[(&'static str, &'static [&'static str])] = &[
            ("automotive", &[
                "car", "auto", "vehicle", "truck", "mechanic", "engine", "tire",
                "brake", "transmission", "garage", "dealership",
            ]),
            ("real_estate", &[
                "house", "home", "apartment", "rent", "property", "realtor",
                "mortgage", "lease", "listing", "condo",
            ]),
            ("food", &[
                "restaurant", "food", "catering", "pizza", "menu", "delivery",
                "chef", "bakery", "lunch", "dinner",
            ]),
            ("fitness", &[
                "gym", "workout", "fitness", "trainer", "yoga", "exercise",
                "weight", "cardio", "coach",
            ]),
            ("beauty", &[
                "salon", "hair", "nails", "makeup", "spa", "barber", "lashes",
                "skincare", "stylist",
            ]),
            ("tech", &[
                "computer", "laptop", "phone", "repair", "software", "website",
                "wifi", "printer", "screen",
            ]),
            ("finance", &[
                "loan", "credit", "insurance", "tax", "accounting", "mortgage",
                "invest", "budget", "bank",
            ]),
            ("travel", &[
                "trip", "vacation", "flight", "hotel", "tour", "booking",
                "travel", "cruise", "airport",
            ]),
            ("education", &[
                "tutor", "class", "course", "lesson", "school", "exam",
                "teacher", "training", "certification",
            ]),
            ("home_services", &[
                "plumber", "plumbing", "electrician", "cleaning", "roofing",
                "painting", "landscaping", "hvac", "handyman", "renovation",
            ]),
            ("fashion", &[
                "clothes", "dress", "boutique", "outfit", "shoes", "jewelry",
                "tailor", "style", "wardrobe",
            ]),
            ("health", &[
                "doctor", "clinic", "dental", "dentist", "therapy", "massage",
                "chiro", "pharmacy", "wellness",
            ]),
        ];
        entries.iter().copied().collect()
    });

/// Indicator words for a vertical tag, if known. Lookup is
/// case-insensitive; tags may use spaces or hyphens in place of
/// underscores.
pub fn indicators_for(vertical: &str) -> Option<&'static [&'static str]> {
    let key = vertical.trim().to_lowercase().replace([' ', '-'], "_");
    VERTICAL_INDICATORS.get(key.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vertical() {
        let words = indicators_for("automotive").unwrap();
        assert!(words.contains(&"mechanic"));
    }

    #[test]
    fn test_lookup_normalization() {
        assert!(indicators_for("Real Estate").is_some());
        assert!(indicators_for("home-services").is_some());
    }

    #[test]
    fn test_unknown_vertical() {
        assert!(indicators_for("astrology").is_none());
    }
}
