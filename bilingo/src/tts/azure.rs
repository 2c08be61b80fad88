//! Azure Cognitive Services text-to-speech over REST.

use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use super::{AudioEncoding, SpeechSynthesizer};
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("bilingo/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct AzureSynthesizer {
    client: reqwest::Client,
    key: String,
    endpoint: String,
}

impl AzureSynthesizer {
    pub fn new(key: impl Into<String>, region: &str) -> Result<Self> {
        Self::with_endpoint(key, endpoint_for_region(region))
    }

    /// Use an explicit synthesis endpoint instead of the regional one.
    pub fn with_endpoint(key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::Config("speech key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Synthesis {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            key,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn endpoint_for_region(region: &str) -> String {
    format!(
        "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
        region.trim()
    )
}

#[async_trait]
impl SpeechSynthesizer for AzureSynthesizer {
    async fn synthesize(&self, ssml: &str, encoding: AudioEncoding) -> Result<Vec<u8>> {
        debug!("POST {} ({} bytes of SSML)", self.endpoint, ssml.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", encoding.azure_format())
            .body(ssml.to_string())
            .send()
            .await
            .map_err(|e| Error::Synthesis {
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis {
                message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
            });
        }

        let audio = response.bytes().await.map_err(|e| Error::Synthesis {
            message: format!("failed to read audio: {}", e),
        })?;
        if audio.is_empty() {
            return Err(Error::Synthesis {
                message: "service returned no audio".into(),
            });
        }
        debug!("Received {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }

    fn name(&self) -> &str {
        "azure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint_for_region("westeurope"),
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1"
        );
        let synth = AzureSynthesizer::new("key", " eastus ").unwrap();
        assert_eq!(
            synth.endpoint(),
            "https://eastus.tts.speech.microsoft.com/cognitiveservices/v1"
        );
        assert_eq!(synth.name(), "azure");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            AzureSynthesizer::new("  ", "westeurope"),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_synthesis_error() {
        let synth = AzureSynthesizer::with_endpoint("key", "http://127.0.0.1:9/v1").unwrap();
        let result = synth
            .synthesize("<speak></speak>", AudioEncoding::Mp3)
            .await;
        assert!(matches!(result, Err(Error::Synthesis { .. })));
    }
}
