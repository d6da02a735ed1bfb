use crate::recommend::RecommendationSource;
use crate::scoring::join_reasons;
use crate::types::{Card, ScoreFactors};

pub fn generate_explanation(card: &Card, factors: &ScoreFactors) -> String {
    let mut reasons = Vec::new();
    let cmc = card.cmc_slot();

    if factors.color_fit >= 0.85 {
        reasons.push("matches your deck's colors perfectly".to_string());
    } else if factors.color_fit >= 0.7 {
        reasons.push("fits your color identity".to_string());
    } else if factors.color_fit < 0.3 {
        reasons.push("color requirements may be difficult".to_string());
    }

    if factors.mana_curve >= 0.7 {
        reasons.push(format!("fills a gap in your mana curve at {cmc} CMC"));
    } else if factors.mana_curve <= 0.3 {
        reasons.push(format!("your deck already has many {cmc}-drops"));
    }

    if factors.quality >= 0.8 {
        reasons.push("is a high-quality card".to_string());
    } else if factors.quality >= 0.7 {
        reasons.push("has strong ratings".to_string());
    }

    if factors.synergy >= 0.8 {
        reasons.push("has excellent synergy with your deck's strategy".to_string());
    } else if factors.synergy >= 0.7 {
        reasons.push("has strong synergy with your existing cards".to_string());
    } else if factors.synergy >= 0.6 {
        reasons.push("synergizes well with your deck".to_string());
    }

    join_reasons(&reasons)
}

/// Strictly highest factor wins; earlier factors keep ties.
pub fn primary_source(factors: &ScoreFactors) -> RecommendationSource {
    let ranked = [
        (RecommendationSource::ColorFit, factors.color_fit),
        (RecommendationSource::ManaCurve, factors.mana_curve),
        (RecommendationSource::Quality, factors.quality),
        (RecommendationSource::Synergy, factors.synergy),
        (RecommendationSource::Playability, factors.playable),
    ];
    let mut best = (RecommendationSource::Quality, 0.0);
    for (source, value) in ranked {
        if value > best.1 {
            best = (source, value);
        }
    }
    best.0
}

pub fn confidence(factors: &ScoreFactors) -> f64 {
    let values = factors.values();
    let positive = values.iter().filter(|v| **v > 0.6).count();
    let high = values.iter().filter(|v| **v > 0.8).count();

    let mut confidence = positive as f64 / values.len() as f64;
    if high >= 2 {
        confidence += 0.1;
    }
    if high >= 3 {
        confidence += 0.1;
    }
    confidence.min(1.0)
}
