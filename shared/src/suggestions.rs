//! Rule-based recommendations
//!
//! Rules are independent and evaluated in a fixed order. The output always
//! ends with a forward-looking suggestion, preceded by a default one when no
//! other rule fired.

use chrono::{DateTime, Duration};

use crate::models::{
    EnvironmentalReading, StressAssessment, Suggestion, SuggestionFactor, SuggestionKind,
};
use crate::types::Priority;

/// Days ahead the forward-looking suggestion points at
const FORECAST_LEAD_DAYS: i64 = 2;

/// Generate suggestions for a reading and its assessment
pub fn generate_suggestions(
    reading: &EnvironmentalReading,
    assessment: Option<&StressAssessment>,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    let pm25 = reading.air_quality.pm25;
    if pm25 > 20.0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::AirPurifier,
            title: "Consider an air purifier".to_string(),
            description: "PM2.5 levels are elevated. Using an air purifier at home could help reduce your exposure to particles.".to_string(),
            priority: if pm25 > 35.0 { Priority::High } else { Priority::Medium },
            timeframe: "Next 24 hours".to_string(),
            factors: vec![SuggestionFactor::new("PM2.5", 8)],
        });
    }

    if reading.weather.uv_index > 7.0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::LimitSunExposure,
            title: "Limit sun exposure".to_string(),
            description: "UV index is very high. Limit outdoor activities between 10am and 4pm and use sunscreen SPF 30+.".to_string(),
            priority: Priority::High,
            timeframe: "Today".to_string(),
            factors: vec![SuggestionFactor::new("UV Index", 9)],
        });
    }

    if reading.weather.temperature > 30.0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::StayHydrated,
            title: "Stay hydrated".to_string(),
            description: "Temperature is high. Drink at least 2-3 liters of water and seek air-conditioned environments when possible.".to_string(),
            priority: Priority::Medium,
            timeframe: "Today".to_string(),
            factors: vec![SuggestionFactor::new("Temperature", 7)],
        });
    }

    if reading.pollen.average() > 3.0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::PollenAvoidance,
            title: "Pollen avoidance strategies".to_string(),
            description: "High pollen levels detected. Keep windows closed and consider wearing a mask if you have allergies.".to_string(),
            priority: Priority::Medium,
            timeframe: "Next few days".to_string(),
            factors: vec![SuggestionFactor::new("Pollen Level", 6)],
        });
    }

    if let Some(suggestion) = assessment.and_then(stress_suggestion) {
        suggestions.push(suggestion);
    }

    if suggestions.is_empty() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::MaintainRoutine,
            title: "Maintain your routine".to_string(),
            description: "Environmental conditions are favorable. Continue with your usual activities and wellness practices.".to_string(),
            priority: Priority::Low,
            timeframe: "Today".to_string(),
            factors: vec![SuggestionFactor::new("Overall Conditions", 2)],
        });
    }

    suggestions.push(forecast_suggestion(reading));
    suggestions
}

fn stress_suggestion(assessment: &StressAssessment) -> Option<Suggestion> {
    if assessment.score > 70.0 {
        Some(Suggestion {
            kind: SuggestionKind::RelaxationTechnique,
            title: "Try a relaxation technique".to_string(),
            description: "Your stress level is elevated. Try a 10-minute mindfulness meditation or deep breathing exercise.".to_string(),
            priority: Priority::High,
            timeframe: "Today".to_string(),
            factors: vec![SuggestionFactor::new("Stress Level", 8)],
        })
    } else if assessment.score > 50.0 {
        Some(Suggestion {
            kind: SuggestionKind::TakeBreaks,
            title: "Take short breaks".to_string(),
            description: "Moderate stress detected. Consider taking short breaks throughout the day to reset your mind.".to_string(),
            priority: Priority::Medium,
            timeframe: "Today".to_string(),
            factors: vec![SuggestionFactor::new("Stress Level", 5)],
        })
    } else {
        None
    }
}

fn forecast_suggestion(reading: &EnvironmentalReading) -> Suggestion {
    let day = DateTime::from_timestamp_millis(reading.timestamp)
        .map(|at| (at + Duration::days(FORECAST_LEAD_DAYS)).format("%A").to_string())
        .unwrap_or_else(|| "later this week".to_string());

    Suggestion {
        kind: SuggestionKind::Forecast,
        title: format!("Plan outdoor activities for {}", day),
        description: "Weather forecasts predict optimal conditions for outdoor exercise with low pollen count and moderate temperature.".to_string(),
        priority: Priority::Low,
        timeframe: "Next 3 days".to_string(),
        factors: vec![
            SuggestionFactor::new("Weather Forecast", 2),
            SuggestionFactor::new("Pollen Forecast", 1),
        ],
    }
}
