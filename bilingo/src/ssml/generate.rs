//! Render bilingual texts as SSML documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::escape;
use super::voices::{Gender, VoiceCatalog, VoiceChoice};
use crate::bilingual::BilingualText;
use crate::error::{Error, Result};

const SSML_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";

/// Which sides of each syntagma are spoken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioOutputFormat {
    /// Source, then translation
    #[default]
    Bilingual,
    /// Source, translation, then the source again slowly
    BilingualAndRepeatSourceSlowly,
    SourceLanguage,
    TargetLanguage,
}

impl AudioOutputFormat {
    pub const ALL: [AudioOutputFormat; 4] = [
        Self::Bilingual,
        Self::BilingualAndRepeatSourceSlowly,
        Self::SourceLanguage,
        Self::TargetLanguage,
    ];

    pub fn speaks_source(self) -> bool {
        self != Self::TargetLanguage
    }

    pub fn speaks_target(self) -> bool {
        self != Self::SourceLanguage
    }

    pub fn repeats_slowly(self) -> bool {
        self == Self::BilingualAndRepeatSourceSlowly
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bilingual => "bilingual",
            Self::BilingualAndRepeatSourceSlowly => "bilingual-and-repeat-source-slowly",
            Self::SourceLanguage => "source-language",
            Self::TargetLanguage => "target-language",
        }
    }
}

impl fmt::Display for AudioOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioOutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("unknown audio output format: {}", s)))
    }
}

/// How a bilingual text is turned into speech markup.
#[derive(Debug, Clone, PartialEq)]
pub struct SsmlOptions {
    pub format: AudioOutputFormat,
    /// Pause after every spoken syntagma, in milliseconds
    pub break_time_ms: u32,
    pub gender: Gender,
    /// Explicit voice names, overriding the catalog
    pub source_voice: Option<String>,
    pub target_voice: Option<String>,
}

impl Default for SsmlOptions {
    fn default() -> Self {
        Self {
            format: AudioOutputFormat::default(),
            break_time_ms: 750,
            gender: Gender::default(),
            source_voice: None,
            target_voice: None,
        }
    }
}

fn pick_voice(
    explicit: Option<&String>,
    language: &str,
    catalog: &VoiceCatalog,
    gender: Gender,
) -> VoiceChoice {
    match explicit {
        Some(name) => VoiceChoice {
            locale: name.splitn(3, '-').take(2).collect::<Vec<_>>().join("-"),
            name: name.clone(),
            fallback: false,
        },
        None => catalog.find_voice(language, gender),
    }
}

/// Render `text` as one SSML document with a `<voice>` turn per spoken
/// syntagma side. Syntagmas without a translation skip the target turn.
pub fn generate_ssml(
    text: &BilingualText,
    catalog: &VoiceCatalog,
    options: &SsmlOptions,
) -> Result<String> {
    text.validate()?;
    let format = options.format;

    let source_voice = format.speaks_source().then(|| {
        pick_voice(
            options.source_voice.as_ref(),
            &text.source_language,
            catalog,
            options.gender,
        )
    });
    let target_voice = format.speaks_target().then(|| {
        pick_voice(
            options.target_voice.as_ref(),
            &text.target_language,
            catalog,
            options.gender,
        )
    });

    let lang = source_voice
        .as_ref()
        .or(target_voice.as_ref())
        .map(|v| v.locale.as_str())
        .unwrap_or("en-US");
    let pause = format!("<break time=\"{}ms\"/>", options.break_time_ms);

    let mut ssml = format!(
        "<speak version=\"1.0\" xmlns=\"{}\" xml:lang=\"{}\">\n",
        SSML_NAMESPACE,
        escape(lang)
    );

    for syntagma in text.paragraphs.iter().flat_map(|p| &p.syntagmas) {
        let source = escape(syntagma.source_text.trim());

        if let Some(voice) = &source_voice {
            push_turn(&mut ssml, &voice.name, &source, &pause);
        }
        if let (Some(voice), Some(target)) = (&target_voice, &syntagma.target_text) {
            if !target.trim().is_empty() {
                push_turn(&mut ssml, &voice.name, &escape(target.trim()), &pause);
            }
        }
        if format.repeats_slowly() {
            if let Some(voice) = &source_voice {
                let slow = format!("<prosody rate=\"slow\">{}</prosody>", source);
                push_turn(&mut ssml, &voice.name, &slow, &pause);
            }
        }
    }

    ssml.push_str("</speak>\n");
    Ok(ssml)
}

fn push_turn(ssml: &mut String, voice: &str, content: &str, pause: &str) {
    ssml.push_str("  <voice name=\"");
    ssml.push_str(&escape(voice));
    ssml.push_str("\">");
    ssml.push_str(content);
    ssml.push_str(pause);
    ssml.push_str("</voice>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bilingual::{BilingualParagraph, Syntagma};
    use crate::ssml::{check_well_formed, chunk, voice_turns};

    fn text() -> BilingualText {
        BilingualText {
            paragraphs: vec![
                BilingualParagraph {
                    syntagmas: vec![
                        Syntagma::new("Merhaba.", "Hello."),
                        Syntagma::new("Ali & Ayşe <geldi>.", "Ali & Ayşe came."),
                    ],
                },
                BilingualParagraph {
                    syntagmas: vec![Syntagma {
                        source_text: "Tamam.".into(),
                        target_text: None,
                    }],
                },
            ],
            source_language: "tr".into(),
            target_language: "en-US".into(),
            comprehension_questions: vec![],
        }
    }

    fn render(format: AudioOutputFormat) -> String {
        let options = SsmlOptions {
            format,
            ..SsmlOptions::default()
        };
        generate_ssml(&text(), &VoiceCatalog::default(), &options).unwrap()
    }

    #[test]
    fn test_bilingual_document() {
        let ssml = render(AudioOutputFormat::Bilingual);
        assert!(check_well_formed(&ssml).is_ok());
        assert!(ssml.starts_with(
            "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"tr-TR\">"
        ));

        let turns = voice_turns(&ssml).unwrap();
        assert_eq!(turns.len(), 5);
        assert_eq!(
            turns[0],
            "<voice name=\"tr-TR-AhmetNeural\">Merhaba.<break time=\"750ms\"/></voice>"
        );
        assert_eq!(
            turns[1],
            "<voice name=\"en-US-AndrewNeural\">Hello.<break time=\"750ms\"/></voice>"
        );
        assert!(turns[2].contains("Ali &amp; Ayşe &lt;geldi&gt;."));
    }

    #[test]
    fn test_single_language_formats() {
        let source_only = render(AudioOutputFormat::SourceLanguage);
        assert_eq!(voice_turns(&source_only).unwrap().len(), 3);
        assert!(!source_only.contains("en-US-AndrewNeural"));

        let target_only = render(AudioOutputFormat::TargetLanguage);
        assert_eq!(voice_turns(&target_only).unwrap().len(), 2);
        assert!(target_only.contains("xml:lang=\"en-US\""));
        assert!(!target_only.contains("tr-TR-AhmetNeural"));
    }

    #[test]
    fn test_repeat_slowly() {
        let ssml = render(AudioOutputFormat::BilingualAndRepeatSourceSlowly);
        let turns = voice_turns(&ssml).unwrap();
        assert_eq!(turns.len(), 8);
        assert_eq!(
            turns[2],
            "<voice name=\"tr-TR-AhmetNeural\"><prosody rate=\"slow\">Merhaba.</prosody><break time=\"750ms\"/></voice>"
        );
    }

    #[test]
    fn test_explicit_voices_and_break() {
        let options = SsmlOptions {
            break_time_ms: 1200,
            source_voice: Some("tr-TR-EmelNeural".into()),
            gender: Gender::Female,
            ..SsmlOptions::default()
        };
        let ssml = generate_ssml(&text(), &VoiceCatalog::default(), &options).unwrap();
        assert!(ssml.contains("<voice name=\"tr-TR-EmelNeural\">Merhaba.<break time=\"1200ms\"/>"));
        assert!(ssml.contains("en-US-AvaNeural"));
    }

    #[test]
    fn test_generated_document_chunks() {
        let ssml = render(AudioOutputFormat::BilingualAndRepeatSourceSlowly);
        let chunks = chunk(&ssml, 3).unwrap();
        let counts: Vec<usize> = chunks.iter().map(|c| c.turns).collect();
        assert_eq!(counts, vec![3, 3, 2]);
    }

    #[test]
    fn test_invalid_text_is_rejected() {
        let mut empty = text();
        empty.paragraphs.clear();
        assert!(generate_ssml(&empty, &VoiceCatalog::default(), &SsmlOptions::default()).is_err());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(
            "bilingual_and_repeat_source_slowly".parse::<AudioOutputFormat>().unwrap(),
            AudioOutputFormat::BilingualAndRepeatSourceSlowly
        );
        assert_eq!(
            "Target-Language".parse::<AudioOutputFormat>().unwrap(),
            AudioOutputFormat::TargetLanguage
        );
        assert!("stereo".parse::<AudioOutputFormat>().is_err());
        for format in AudioOutputFormat::ALL {
            assert_eq!(format.to_string().parse::<AudioOutputFormat>().unwrap(), format);
        }
    }
}
