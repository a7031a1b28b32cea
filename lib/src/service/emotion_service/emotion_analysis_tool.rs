use serde_json::json;

use crate::service::language_model::ToolDefinition;


pub const EMOTION_ANALYSIS_TOOL: &str = "print_emotion_analysis";

pub fn get_emotion_analysis_tool_definition() -> ToolDefinition {
    let score = |label: &str| json!({
        "type": "number",
        "description": format!("Score for {}, ranging from 0.0 to 1.0.", label),
    });

    let json_schema = json!({
        "type": "object",
        "properties": {
            "emotions": {
                "type": "object",
                "properties": {
                    "happy": score("happy"),
                    "sad": score("sad"),
                    "angry": score("angry"),
                    "fearful": score("fearful"),
                    "disgusted": score("disgusted"),
                    "surprised": score("surprised"),
                    "neutral": score("neutral"),
                },
                "required": ["happy", "sad", "angry", "fearful", "disgusted", "surprised", "neutral"],
            },
            "dominant_emotion": {
                "type": "string",
                "enum": ["happy", "sad", "angry", "fearful", "disgusted", "surprised", "neutral"],
                "description": "The emotion with the highest score.",
            },
            "confidence": {
                "type": "number",
                "description": "Confidence in the dominant emotion, ranging from 0.0 to 1.0.",
            },
            "description": {
                "type": "string",
                "description": "Brief description of what you observe.",
            },
        },
        "required": ["emotions", "dominant_emotion", "confidence", "description"],
    });

    ToolDefinition::new(
        EMOTION_ANALYSIS_TOOL,
        "Print the emotion analysis of the face in the image.",
        json_schema,
    )
}
