//! Wire shapes of the generate endpoint

use datagen_core::generation::{GenerationRequest, GenerationResult, ProviderId, MAX_GENERATIONS};
use serde::{Deserialize, Serialize};

/// JSON body of `POST /api/generate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateBody {
    pub ai_model: String,
    pub ai_sdk_key: String,
    pub ld_sdk_key: String,
    pub config_client_id: String,
    pub num_generations: Option<i64>,
    pub good_feedback_ratio: Option<f64>,
}

impl GenerateBody {
    /// Validate the body and turn it into a run request
    pub fn into_request(self) -> Result<GenerationRequest, String> {
        let provider: ProviderId = self.ai_model.parse().map_err(|e| format!("aiModel: {}", e))?;

        let required = [
            ("aiSdkKey", &self.ai_sdk_key),
            ("ldSdkKey", &self.ld_sdk_key),
            ("configClientId", &self.config_client_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required", field));
            }
        }

        let total_count = self
            .num_generations
            .filter(|n| (1..=MAX_GENERATIONS as i64).contains(n))
            .ok_or_else(|| format!("numGenerations must be between 1 and {}", MAX_GENERATIONS))?
            as u32;

        let good_feedback_percent = self
            .good_feedback_ratio
            .filter(|r| r.is_finite() && (0.0..=100.0).contains(r))
            .ok_or_else(|| "goodFeedbackRatio must be between 0 and 100".to_string())?;

        let request = GenerationRequest {
            provider,
            api_key: self.ai_sdk_key,
            config_service_key: self.ld_sdk_key,
            config_id: self.config_client_id,
            total_count,
            good_feedback_percent,
        };
        request.validate().map_err(|e| e.to_string())?;
        Ok(request)
    }
}

/// JSON body returned by the generate endpoint and the `run` command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerateResponse {
    #[serde(rename_all = "camelCase")]
    Completed {
        success: bool,
        completed_generations: u32,
        errors: Option<Vec<String>>,
        positive_feedback: u32,
        negative_feedback: u32,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl GenerateResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        GenerateResponse::Failed {
            success: false,
            error: if error.is_empty() {
                "An unexpected error occurred".to_string()
            } else {
                error
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerateResponse::Completed { .. })
    }
}

impl From<GenerationResult> for GenerateResponse {
    fn from(result: GenerationResult) -> Self {
        match result {
            GenerationResult::Completed {
                completed_count,
                errors,
                positive_feedback,
                negative_feedback,
            } => GenerateResponse::Completed {
                success: true,
                completed_generations: completed_count,
                errors,
                positive_feedback,
                negative_feedback,
            },
            GenerationResult::Failed { error } => GenerateResponse::failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> GenerateBody {
        serde_json::from_value(json!({
            "aiModel": "claude",
            "aiSdkKey": "sk-1",
            "ldSdkKey": "sdk-1",
            "configClientId": "support-bot",
            "numGenerations": 10,
            "goodFeedbackRatio": 80
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_body_becomes_request() {
        let request = body().into_request().unwrap();
        assert_eq!(request.provider, ProviderId::Claude);
        assert_eq!(request.total_count, 10);
        assert_eq!(request.good_feedback_percent, 80.0);
        assert_eq!(request.config_id, "support-bot");
    }

    #[test]
    fn test_invalid_bodies_are_rejected() {
        let mut unknown = body();
        unknown.ai_model = "gemini".to_string();
        assert!(unknown.into_request().unwrap_err().contains("aiModel"));

        let mut empty_key = body();
        empty_key.ld_sdk_key = String::new();
        assert_eq!(empty_key.into_request().unwrap_err(), "ldSdkKey is required");

        for count in [None, Some(0), Some(-3), Some(1001)] {
            let mut bad = body();
            bad.num_generations = count;
            assert!(bad.into_request().is_err(), "{:?}", count);
        }

        for ratio in [None, Some(-1.0), Some(100.1), Some(f64::INFINITY)] {
            let mut bad = body();
            bad.good_feedback_ratio = ratio;
            assert!(bad.into_request().is_err(), "{:?}", ratio);
        }
    }

    #[test]
    fn test_response_shapes() {
        let ok = GenerateResponse::from(GenerationResult::Completed {
            completed_count: 4,
            errors: None,
            positive_feedback: 3,
            negative_feedback: 1,
        });
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({
                "success": true,
                "completedGenerations": 4,
                "errors": null,
                "positiveFeedback": 3,
                "negativeFeedback": 1
            })
        );

        let failed = GenerateResponse::from(GenerationResult::Failed {
            error: String::new(),
        });
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "success": false, "error": "An unexpected error occurred" })
        );
    }
}
