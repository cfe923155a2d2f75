//! Ad creatives result shape
//!
//! The structured output requested from every provider for the creatives
//! service: a batch of recruitment ad variants plus the provider that
//! produced them

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clients::{OutputShape, StructuredOutput};

/// One generated ad variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCreative {
    pub target_demo: Vec<String>,
    pub headline: String,
    pub primary_text: String,
    pub description: String,
    pub call_to_action: String,
    pub prompt_for_ad_image: String,
}

/// A provider's batch of ad creatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCreatives {
    /// Provider key that produced this batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub creatives: Vec<AdCreative>,
}

impl StructuredOutput for AdCreatives {
    fn shape() -> OutputShape {
        OutputShape {
            name: "record_ad_creatives",
            description: "Record the generated ad creatives for a clinical \
                          trial recruitment campaign",
            schema: json!({
                "type": "object",
                "properties": {
                    "creatives": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "target_demo": {
                                    "type": "array",
                                    "items": {"type": "string"}
                                },
                                "headline": {"type": "string"},
                                "primary_text": {"type": "string"},
                                "description": {"type": "string"},
                                "call_to_action": {"type": "string"},
                                "prompt_for_ad_image": {"type": "string"}
                            },
                            "required": [
                                "target_demo",
                                "headline",
                                "primary_text",
                                "description",
                                "call_to_action",
                                "prompt_for_ad_image"
                            ],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["creatives"],
                "additionalProperties": false
            }),
        }
    }

    fn set_source(&mut self, provider: &str) {
        self.source = Some(provider.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_creative() -> AdCreative {
        AdCreative {
            target_demo: vec!["adults 18-65".to_string()],
            headline: "Join a local research study".to_string(),
            primary_text: "Help advance treatment options.".to_string(),
            description: "Compensation may be available.".to_string(),
            call_to_action: "Learn More".to_string(),
            prompt_for_ad_image: "A welcoming clinic waiting room".to_string(),
        }
    }

    #[test]
    fn test_payload_deserializes_without_source() {
        let payload = serde_json::json!({
            "creatives": [serde_json::to_value(sample_creative()).unwrap()]
        });

        let batch: AdCreatives = serde_json::from_value(payload).unwrap();
        assert_eq!(batch.source, None);
        assert_eq!(batch.creatives.len(), 1);
    }

    #[test]
    fn test_set_source() {
        let mut batch = AdCreatives {
            source: None,
            creatives: vec![sample_creative()],
        };
        batch.set_source("anthropic");
        assert_eq!(batch.source.as_deref(), Some("anthropic"));
    }

    #[test]
    fn test_source_omitted_from_json_when_unset() {
        let batch = AdCreatives {
            source: None,
            creatives: vec![],
        };
        let value = serde_json::to_value(&batch).unwrap();
        assert!(value.get("source").is_none());
    }

    #[test]
    fn test_shape_requires_every_creative_field() {
        let shape = AdCreatives::shape();
        assert_eq!(shape.name, "record_ad_creatives");

        let required = shape.schema["properties"]["creatives"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 6);
    }
}
