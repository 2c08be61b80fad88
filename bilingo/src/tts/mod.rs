//! Speech synthesis backend trait and chunked rendering.

pub mod azure;

pub use azure::AzureSynthesizer;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::ssml::{self, MarkupChunk};

const PCM_SAMPLE_RATE: u32 = 24_000;
const PCM_BITS_PER_SAMPLE: u16 = 16;

/// Container/codec of the rendered audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Ogg,
    /// 24 kHz 16-bit mono PCM in a single RIFF container
    Wav,
}

impl AudioEncoding {
    /// Output format requested from the synthesis service per chunk.
    ///
    /// WAV is fetched as headerless PCM so chunks can be joined and wrapped
    /// in one header.
    pub fn azure_format(self) -> &'static str {
        match self {
            Self::Mp3 => "audio-24khz-48kbitrate-mono-mp3",
            Self::Ogg => "ogg-24khz-16bit-mono-opus",
            Self::Wav => "raw-24khz-16bit-mono-pcm",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Wav => "wav",
        }
    }

    /// Join per-chunk audio into one stream.
    fn assemble(self, parts: Vec<Vec<u8>>) -> Vec<u8> {
        let audio = parts.concat();
        match self {
            Self::Wav => wav_from_pcm(&audio),
            Self::Mp3 | Self::Ogg => audio,
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "ogg" | "opus" => Ok(Self::Ogg),
            "wav" | "pcm" => Ok(Self::Wav),
            other => Err(Error::InvalidInput(format!("unknown audio encoding: {}", other))),
        }
    }
}

fn wav_from_pcm(pcm: &[u8]) -> Vec<u8> {
    let channels: u16 = 1;
    let block_align = channels * PCM_BITS_PER_SAMPLE / 8;
    let byte_rate = PCM_SAMPLE_RATE * u32::from(block_align);
    let data_len = pcm.len() as u32;

    let mut wav = Vec::with_capacity(44 + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&PCM_SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&PCM_BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}

/// Speech synthesis backend: one markup document in, audio bytes out.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, ssml: &str, encoding: AudioEncoding) -> Result<Vec<u8>>;

    /// Backend name for display.
    fn name(&self) -> &str;
}

/// Chunk `ssml` into documents of at most `max_turns` voice turns,
/// synthesize them in order and join the audio.
///
/// The first failing chunk aborts rendering with `Error::ChunkFailed`.
pub async fn render_audio(
    synthesizer: &dyn SpeechSynthesizer,
    ssml: &str,
    max_turns: usize,
    encoding: AudioEncoding,
) -> Result<Vec<u8>> {
    let chunks = ssml::chunk(ssml, max_turns)?;
    render_chunks(synthesizer, &chunks, encoding).await
}

pub async fn render_chunks(
    synthesizer: &dyn SpeechSynthesizer,
    chunks: &[MarkupChunk],
    encoding: AudioEncoding,
) -> Result<Vec<u8>> {
    let total = chunks.len();
    info!(
        "Synthesizing {} chunks with {} ({})",
        total,
        synthesizer.name(),
        encoding
    );

    let mut parts = Vec::with_capacity(total);
    for chunk in chunks {
        debug!("Chunk {}/{}: {} voice turns", chunk.index + 1, total, chunk.turns);
        let audio = synthesizer
            .synthesize(&chunk.document, encoding)
            .await
            .map_err(|source| Error::ChunkFailed {
                index: chunk.index,
                total,
                source: Box::new(source),
            })?;
        parts.push(audio);
    }

    Ok(encoding.assemble(parts))
}
