pub mod emotion_analysis_tool;

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use tracing::{info, warn};

use emotion_analysis_tool::get_emotion_analysis_tool_definition;
use crate::config::EmotionFallback;
use crate::error::{ServiceError, ServiceResult};
use crate::utilities::{decode_image, extract_json, strip_data_url};
use super::common_structs::{Emotion, EmotionScores, MoodAnalysis};
use super::language_model::{ImageAttachment, LanguageModel, ModelRequest};

const DEFAULT_DESCRIPTION: &str = "AI analyzed facial expression";

const SYSTEM_PROMPT: &str = "
    You are an expert at analyzing human emotions from facial expressions.
    Your task is to analyze the provided image and determine the person's emotional state.

    CRITICAL: You must respond with ONLY a valid JSON object. No other text, no explanations, no markdown formatting.

    The JSON must have this exact structure:
    {
      \"emotions\": {
        \"happy\": 0.0,
        \"sad\": 0.0,
        \"angry\": 0.0,
        \"fearful\": 0.0,
        \"disgusted\": 0.0,
        \"surprised\": 0.0,
        \"neutral\": 0.0
      },
      \"dominant_emotion\": \"emotion_name\",
      \"confidence\": 0.0,
      \"description\": \"Brief description of what you observe\"
    }

    Rules:
    1. All emotion values should be between 0.0 and 1.0
    2. The dominant_emotion should be one of: happy, sad, angry, fearful, disgusted, surprised, neutral
    3. Confidence should be between 0.0 and 1.0
    4. Total emotion values should sum to approximately 1.0
    5. The dominant emotion should have the highest value

    Analyze facial features like eye expressions and gaze direction, mouth shape,
    overall facial tension, micro-expressions and facial muscle activity.
";

const USER_PROMPT: &str =
    "Analyze the emotional state of the person in this image. Return ONLY a JSON object with the specified structure.";


#[derive(Clone)]
pub struct EmotionService {
    model: Option<Arc<dyn LanguageModel>>,
    fallback: EmotionFallback,
}

impl EmotionService {
    pub fn new(model: Option<Arc<dyn LanguageModel>>, fallback: EmotionFallback) -> Self {
        Self { model, fallback }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Classify the face in a base64 image or data URL.
    ///
    /// Bad input is always an error. Model failures follow the fallback policy.
    pub async fn analyze_image(&self, image: &str, timestamp: Option<String>) -> ServiceResult<MoodAnalysis> {
        if image.trim().is_empty() {
            return Err(ServiceError::BadRequest("No image provided".to_owned()));
        }
        let (encoding, payload) = strip_data_url(image);
        let bytes = decode_image(payload).map_err(|e| ServiceError::BadRequest(e.to_string()))?;

        let result = match &self.model {
            None => Err(ServiceError::Unavailable("AI model not configured".to_owned())),
            Some(model) => {
                let request = ModelRequest::new(SYSTEM_PROMPT, USER_PROMPT)
                    .with_image(ImageAttachment { encoding, bytes })
                    .with_tool(get_emotion_analysis_tool_definition())
                    .with_limits(300, 0.1);
                match model.complete(request).await {
                    Ok(reply) => parse_emotion_analysis(&reply),
                    Err(error) => Err(ServiceError::Upstream(error)),
                }
            }
        };

        match result {
            Ok(mut analysis) => {
                info!(dominant = %analysis.dominant, confidence = analysis.confidence, "emotion analysis successful");
                analysis.timestamp = timestamp;
                Ok(analysis)
            }
            Err(error) => match self.fallback {
                EmotionFallback::Reject => {
                    warn!(error = %error, "emotion analysis failed");
                    Err(error)
                }
                EmotionFallback::Simulate => {
                    warn!(error = %error, "emotion analysis failed, using simulated analysis");
                    let mut analysis = simulated_analysis(&mut rand::thread_rng());
                    analysis.timestamp = timestamp;
                    Ok(analysis)
                }
            },
        }
    }
}


/// Validate the model reply and turn it into a [`MoodAnalysis`].
pub fn parse_emotion_analysis(reply: &str) -> ServiceResult<MoodAnalysis> {
    let value: Value = serde_json::from_str(extract_json(reply)).map_err(|e| {
        warn!(reply = %reply, error = %e, "failed to parse emotion analysis");
        ServiceError::MalformedResponse("invalid JSON response".to_owned())
    })?;

    let emotions = value.get("emotions").filter(|v| v.is_object());
    let dominant = value.get("dominant_emotion").and_then(Value::as_str).filter(|s| !s.is_empty());
    let confidence = value.get("confidence").and_then(Value::as_f64);

    let (Some(emotions), Some(dominant), Some(confidence)) = (emotions, dominant, confidence) else {
        warn!(reply = %reply, "invalid emotion analysis structure");
        return Err(ServiceError::MalformedResponse("invalid analysis structure".to_owned()));
    };

    let all_emotions: EmotionScores = serde_json::from_value(emotions.clone())
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    let dominant = Emotion::from_label(dominant).unwrap_or_else(|| {
        warn!(label = dominant, "unknown dominant emotion, using neutral");
        Emotion::Neutral
    });

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_DESCRIPTION);

    Ok(MoodAnalysis {
        dominant,
        confidence: confidence.clamp(0.0, 1.0),
        all_emotions,
        description: Some(description.to_owned()),
        timestamp: None,
        simulated: false,
    })
}


/// Reduce client-reported scores to the dominant mood over the five-label set.
pub fn analyze_mood(emotion_data: &EmotionScores) -> MoodAnalysis {
    let all_emotions: EmotionScores = Emotion::MOODS
        .iter()
        .map(|e| (*e, emotion_data.get(*e)))
        .collect();
    let (dominant, confidence) = all_emotions
        .dominant_of(&Emotion::MOODS)
        .unwrap_or((Emotion::Neutral, 0.0));

    MoodAnalysis {
        dominant,
        confidence,
        all_emotions,
        description: None,
        timestamp: None,
        simulated: false,
    }
}


pub fn simulated_analysis<R: Rng>(rng: &mut R) -> MoodAnalysis {
    let dominant = *Emotion::MOODS.choose(rng).unwrap_or(&Emotion::Neutral);
    let confidence = rng.gen_range(0.7..=1.0);

    let all_emotions: EmotionScores = Emotion::MOODS
        .iter()
        .map(|e| {
            let score = if *e == dominant { confidence } else { rng.gen_range(0.0..0.3) };
            (*e, score)
        })
        .collect();

    MoodAnalysis {
        dominant,
        confidence,
        all_emotions,
        description: Some("Simulated analysis".to_owned()),
        timestamp: None,
        simulated: true,
    }
}
