//! Seed sample readings for a client.
//!
//! Inserts one reading of every type so the dashboard and admin console have
//! something to show during development. Content documents mirror what the
//! practitioner typically records for each kind of session.
//!
//! # Environment Variables
//!
//! - `SUPABASE_DB_URL` - direct Postgres connection to the Supabase project

use eyeopener_core::{Email, ReadingType, UserId};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{SUPABASE_DB_URL, connect, database_url};

/// A reading to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReading {
    pub reading_type: ReadingType,
    pub title: &'static str,
    pub content: Value,
}

/// One sample per reading type, in form order.
#[must_use]
pub fn samples() -> Vec<SampleReading> {
    ReadingType::ALL
        .into_iter()
        .map(|reading_type| {
            let (title, content) = sample_for(reading_type);
            SampleReading {
                reading_type,
                title,
                content,
            }
        })
        .collect()
}

fn sample_for(reading_type: ReadingType) -> (&'static str, Value) {
    match reading_type {
        ReadingType::Tarot => (
            "Three Card Spread",
            json!({
                "past": "The Tower",
                "present": "Temperance",
                "future": "The Star",
                "guidance": "Let go of what has already fallen.",
            }),
        ),
        ReadingType::Astrology => (
            "Natal Chart Overview",
            json!({
                "sun_sign": "Scorpio",
                "moon_sign": "Pisces",
                "rising_sign": "Leo",
                "focus": "Career and public life this season",
            }),
        ),
        ReadingType::Numerology => (
            "Life Path Numbers",
            json!({
                "life_path": 7,
                "expression": 3,
                "soul_urge": 11,
            }),
        ),
        ReadingType::Palmistry => (
            "Palm Lines",
            json!({
                "heart_line": "Long and curved, generous with affection",
                "head_line": "Deep, a deliberate thinker",
                "life_line": "Strong with a late branch",
            }),
        ),
        ReadingType::BoneReading => (
            "Ancestral Guidance",
            json!({
                "ancestor_message": "Be patient with the harvest.",
                "bones_cast": 13,
                "pattern": "Circle with two outliers",
            }),
        ),
        ReadingType::Cleansing => (
            "Home Energy Cleansing",
            json!({
                "space": "Living room and entryway",
                "method": "Sage and salt",
                "follow_up": "Repeat at the new moon",
            }),
        ),
    }
}

/// Insert the sample readings for the profile owning `email`.
///
/// # Arguments
///
/// * `email` - Client email; they must already have signed up
/// * `clear_existing` - If true, delete the client's readings first
///
/// # Returns
///
/// The number of readings inserted.
///
/// # Errors
///
/// Returns an error if the environment is incomplete, no profile matches the
/// email, or a database operation fails.
pub async fn sample_readings(
    email: &str,
    clear_existing: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let email = Email::parse(email).map_err(|e| format!("Invalid email {email}: {e}"))?;

    let url = database_url(SUPABASE_DB_URL).ok_or("SUPABASE_DB_URL not set")?;
    let pool = connect(SUPABASE_DB_URL, &url).await?;

    let user_id: UserId =
        sqlx::query_scalar("SELECT user_id FROM public.profiles WHERE lower(email) = lower($1)")
            .bind(&email)
            .fetch_optional(&pool)
            .await?
            .ok_or_else(|| format!("No profile found for email: {email}"))?;

    info!(user_id = %user_id, email = %email, "Seeding sample readings");

    let mut tx = pool.begin().await?;

    if clear_existing {
        let removed = sqlx::query("DELETE FROM public.readings WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed > 0 {
            warn!(removed, "Cleared existing readings");
        }
    }

    let samples = samples();
    for sample in &samples {
        sqlx::query(
            r"
            INSERT INTO public.readings (user_id, reading_type, title, content)
            VALUES ($1, $2, $3, $4::jsonb)
            ",
        )
        .bind(user_id)
        .bind(sample.reading_type)
        .bind(sample.title)
        .bind(sample.content.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(samples.len())
}
