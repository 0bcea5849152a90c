//! User-facing strings. The locale is always passed in by the caller.

use crate::calc;
use crate::models::{Locale, LocationError};

pub fn location_error(error: LocationError, locale: Locale) -> &'static str {
    match (error, locale) {
        (LocationError::CapabilityUnavailable, Locale::En) => {
            "Your device does not support location services."
        }
        (LocationError::CapabilityUnavailable, Locale::De) => {
            "Ihr Gerät unterstützt keine Standortdienste."
        }
        (LocationError::PermissionDenied, Locale::En) => {
            "Location access was denied. Please allow it in your browser settings."
        }
        (LocationError::PermissionDenied, Locale::De) => {
            "Der Standortzugriff wurde verweigert. Bitte erlauben Sie ihn in den Browsereinstellungen."
        }
        (LocationError::PositionUnavailable, Locale::En) => {
            "Your position is currently unavailable."
        }
        (LocationError::PositionUnavailable, Locale::De) => {
            "Ihre Position ist derzeit nicht verfügbar."
        }
        (LocationError::Timeout, Locale::En) => "Locating you is taking longer than expected.",
        (LocationError::Timeout, Locale::De) => "Die Standortbestimmung dauert länger als erwartet.",
        (LocationError::Unknown, Locale::En) => "An unknown location error occurred.",
        (LocationError::Unknown, Locale::De) => "Ein unbekannter Standortfehler ist aufgetreten.",
    }
}

pub fn app_title(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Village Tour",
        Locale::De => "Dorfrundgang",
    }
}

pub fn recenter_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Center on me",
        Locale::De => "Auf mich zentrieren",
    }
}

pub fn waiting_for_fix(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Waiting for your location…",
        Locale::De => "Warte auf Ihren Standort…",
    }
}

pub fn you_are_here(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "You are here",
        Locale::De => "Sie sind hier",
    }
}

/// Popup line for a POI the visitor is standing in.
pub fn popup_unlocked(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "You're here! Tap to start the quiz.",
        Locale::De => "Sie sind da! Tippen Sie, um das Quiz zu starten.",
    }
}

/// Popup line for a POI out of range. `distance` is absent before the first fix.
pub fn popup_locked(distance: Option<f64>, locale: Locale) -> String {
    match (distance, locale) {
        (Some(d), Locale::En) => format!(
            "{} away. Get closer to unlock the quiz.",
            calc::format_distance(d, locale)
        ),
        (Some(d), Locale::De) => format!(
            "Noch {} entfernt. Gehen Sie näher heran, um das Quiz freizuschalten.",
            calc::format_distance(d, locale)
        ),
        (None, Locale::En) => String::from("Get closer to unlock the quiz."),
        (None, Locale::De) => {
            String::from("Gehen Sie näher heran, um das Quiz freizuschalten.")
        }
    }
}

pub fn start_quiz(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Start quiz",
        Locale::De => "Quiz starten",
    }
}

pub fn quiz_title(poi_name: &str) -> String {
    format!("Quiz: {poi_name}")
}

pub fn quiz_correct(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Correct!",
        Locale::De => "Richtig!",
    }
}

pub fn quiz_wrong(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Not quite.",
        Locale::De => "Leider falsch.",
    }
}

pub fn quiz_next(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Next question",
        Locale::De => "Nächste Frage",
    }
}

pub fn quiz_score(score: usize, total: usize, locale: Locale) -> String {
    match locale {
        Locale::En => format!("You answered {score} of {total} questions correctly."),
        Locale::De => format!("Sie haben {score} von {total} Fragen richtig beantwortet."),
    }
}

pub fn quiz_unavailable(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "There is no quiz for this place yet.",
        Locale::De => "Für diesen Ort gibt es noch kein Quiz.",
    }
}

pub fn close(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Close",
        Locale::De => "Schließen",
    }
}
