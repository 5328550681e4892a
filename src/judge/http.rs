//! Blocking HTTP judge client
//!
//! Sends the image inline (base64) with the catalog context and maps the
//! provider's JSON reply into a [`Judgment`]. Status codes map to typed
//! errors; a missing or unparsable verdict is `Malformed`, not a guess.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::feedback::Verdict;
use super::{JudgeError, Judgment, PromptContext, VisionJudge};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpVisionJudge {
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpVisionJudge {
    pub fn new(base_url: String, model: String, api_key: String) -> Self {
        Self { base_url, model, api_key }
    }

    fn parse_judgment(body: serde_json::Value) -> Result<Judgment, JudgeError> {
        let verdict = body["verdict"]
            .as_str()
            .and_then(Verdict::parse)
            .ok_or_else(|| JudgeError::Malformed("missing or unknown verdict".to_string()))?;

        let confidence = body["confidence"]
            .as_f64()
            .ok_or_else(|| JudgeError::Malformed("missing confidence".to_string()))?
            .clamp(0.0, 1.0) as f32;

        Ok(Judgment {
            verdict,
            confidence,
            style_notes: parse_notes(&body["style_notes"]),
            technique_notes: parse_notes(&body["technique_notes"]),
            reasoning: body["reasoning"].as_str().unwrap_or_default().to_string(),
        })
    }
}

fn parse_notes(value: &serde_json::Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

impl VisionJudge for HttpVisionJudge {
    fn judge(&self, image: &[u8], ctx: &PromptContext) -> Result<Judgment, JudgeError> {
        let payload = serde_json::json!({
            "model": self.model,
            "context": ctx,
            "image_base64": BASE64.encode(image),
        });

        let response = ureq::post(&self.base_url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .timeout(REQUEST_TIMEOUT)
            .send_json(payload);

        match response {
            Ok(resp) => {
                let body: serde_json::Value = resp
                    .into_json()
                    .map_err(|e| JudgeError::Malformed(e.to_string()))?;
                Self::parse_judgment(body)
            }
            Err(ureq::Error::Status(401, _)) => Err(JudgeError::InvalidApiKey),
            Err(ureq::Error::Status(429, _)) => Err(JudgeError::RateLimited { retry_after: 60 }),
            Err(ureq::Error::Status(status, resp)) => Err(JudgeError::Http {
                status,
                message: resp.into_string().unwrap_or_default(),
            }),
            Err(e) => Err(JudgeError::Network(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_judgment() {
        let body = serde_json::json!({
            "verdict": "fake",
            "confidence": 0.82,
            "style_notes": {"brushwork": "mechanical strokes"},
            "technique_notes": {"pigment": "modern titanium white"},
            "reasoning": "materials postdate the attributed period",
        });
        let judgment = HttpVisionJudge::parse_judgment(body).unwrap();
        assert_eq!(judgment.verdict, Verdict::Fake);
        assert!((judgment.confidence - 0.82).abs() < 1e-6);
        assert_eq!(judgment.style_notes["brushwork"], "mechanical strokes");
    }

    #[test]
    fn test_parse_rejects_unknown_verdict() {
        let body = serde_json::json!({"verdict": "maybe", "confidence": 0.5});
        assert!(matches!(
            HttpVisionJudge::parse_judgment(body),
            Err(JudgeError::Malformed(_))
        ));
    }

    #[test]
    fn test_confidence_clamped() {
        let body = serde_json::json!({"verdict": "authentic", "confidence": 1.7});
        let judgment = HttpVisionJudge::parse_judgment(body).unwrap();
        assert_eq!(judgment.confidence, 1.0);
    }
}
