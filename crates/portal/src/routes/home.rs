//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::middleware::AuthContext;
use crate::routes::NavView;

// =============================================================================
// Static content
// =============================================================================

/// A service card in the "Sacred Services" grid.
pub struct Service {
    pub title: &'static str,
    /// Class of the icon glyph.
    pub icon: &'static str,
    pub description: &'static str,
    pub highlights: [&'static str; 4],
}

/// A pricing card.
pub struct PriceTier {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub price: &'static str,
    pub includes: [&'static str; 4],
}

/// How to reach the practitioner.
pub struct Contact {
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub availability: &'static str,
}

pub static SERVICES: [Service; 6] = [
    Service {
        title: "Tarot Readings",
        icon: "star",
        description: "Ancient divination using sacred symbolic cards to reveal hidden truths, \
                      guide decision-making, and illuminate your spiritual path forward.",
        highlights: [
            "3-Card Past/Present/Future",
            "Celtic Cross Spread",
            "Love & Relationship Insights",
            "Career & Life Purpose",
        ],
    },
    Service {
        title: "Astrology",
        icon: "sun",
        description: "Celestial wisdom through planetary positions and cosmic alignments, \
                      revealing personality traits, life cycles, and divine timing.",
        highlights: [
            "Birth Chart Analysis",
            "Compatibility Readings",
            "Transit Interpretations",
            "Solar Return Forecasts",
        ],
    },
    Service {
        title: "Numerology",
        icon: "sparkles",
        description: "Life path insights through the mystical power of numbers, revealing your \
                      soul's purpose and karmic lessons through mathematical divination.",
        highlights: [
            "Life Path Number",
            "Expression & Soul Urge",
            "Personal Year Cycles",
            "Name Numerology",
        ],
    },
    Service {
        title: "Palmistry",
        icon: "hand",
        description: "Hand reading to unveil personality traits, life events, and destiny \
                      through the sacred lines, mounts, and shapes of your palms.",
        highlights: [
            "Major Line Analysis",
            "Mount Interpretations",
            "Finger & Thumb Reading",
            "Hand Shape Meanings",
        ],
    },
    Service {
        title: "Bone Readings",
        icon: "bolt",
        description: "Ancient divination practice using sacred bones to channel ancestral \
                      wisdom and receive guidance from the spiritual realm.",
        highlights: [
            "Ancestral Guidance",
            "Spirit Communication",
            "Protection Insights",
            "Ritual Recommendations",
        ],
    },
    Service {
        title: "Energetic Cleansings",
        icon: "moon",
        description: "Spiritual purification and healing to remove negative energies, clear \
                      blockages, and restore balance to your auric field.",
        highlights: [
            "Aura Cleansing",
            "Chakra Balancing",
            "Space Clearing",
            "Protection Rituals",
        ],
    },
];

pub static PRICING: [PriceTier; 3] = [
    PriceTier {
        title: "Tarot Reading",
        subtitle: "Ancient card divination",
        price: "$75",
        includes: [
            "60-minute session",
            "Multiple spread options",
            "Recorded session",
            "Follow-up questions",
        ],
    },
    PriceTier {
        title: "Astrology Chart",
        subtitle: "Complete birth chart analysis",
        price: "$125",
        includes: [
            "90-minute consultation",
            "Written report included",
            "Transit forecasting",
            "Compatibility analysis",
        ],
    },
    PriceTier {
        title: "Full Spiritual Reading",
        subtitle: "Complete divination package",
        price: "$200",
        includes: [
            "2-hour deep dive session",
            "Multiple divination methods",
            "Energetic cleansing included",
            "Spiritual guidance plan",
        ],
    },
];

pub static CONTACT: Contact = Contact {
    name: "Travis Perry",
    email: "Travisperry18@gmail.com",
    phone: "865-431-6270",
    availability: "By Appointment",
};

// =============================================================================
// Templates
// =============================================================================

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub services: &'static [Service],
    pub pricing: &'static [PriceTier],
    pub contact: &'static Contact,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the landing page.
#[instrument(skip(auth))]
pub async fn home(auth: AuthContext) -> impl IntoResponse {
    HomeTemplate {
        nav: NavView::from(&auth),
        services: &SERVICES,
        pricing: &PRICING,
        contact: &CONTACT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_service_has_four_highlights() {
        for service in &SERVICES {
            assert!(service.highlights.iter().all(|h| !h.is_empty()));
        }
    }

    #[test]
    fn test_signed_out_landing_renders_sign_in() {
        let html = HomeTemplate {
            nav: NavView::default(),
            services: &SERVICES,
            pricing: &PRICING,
            contact: &CONTACT,
        }
        .render()
        .unwrap_or_default();
        assert!(html.contains("Sign In"));
        assert!(html.contains("Sacred Services"));
        assert!(html.contains("Travisperry18@gmail.com"));
        assert!(!html.contains("My Readings"));
    }
}
