//! Voice catalog: which synthesis voice speaks which language.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::Error;

/// Multilingual voice used when a language has no configured voice.
pub const UNIVERSAL_VOICE: &str = "en-US-AvaMultilingualNeural";
const UNIVERSAL_LOCALE: &str = "en-US";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(Error::InvalidInput(format!("unknown voice gender: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub gender: Gender,
}

/// The voice picked for a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChoice {
    /// Locale the voice belongs to, used for `xml:lang`
    pub locale: String,
    pub name: String,
    /// True when no voice matched and the universal voice was used
    pub fallback: bool,
}

/// Voices per locale (`en-US`, `tr-TR`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceCatalog {
    locales: BTreeMap<String, Vec<Voice>>,
}

/// Azure neural voices shipped as defaults: (locale, male, female).
const BUILTIN_VOICES: &[(&str, &str, &str)] = &[
    ("de-DE", "ConradNeural", "KatjaNeural"),
    ("en-GB", "RyanNeural", "SoniaNeural"),
    ("en-US", "AndrewNeural", "AvaNeural"),
    ("es-ES", "AlvaroNeural", "ElviraNeural"),
    ("fr-FR", "HenriNeural", "DeniseNeural"),
    ("it-IT", "DiegoNeural", "ElsaNeural"),
    ("ja-JP", "KeitaNeural", "NanamiNeural"),
    ("nl-NL", "MaartenNeural", "ColetteNeural"),
    ("pl-PL", "MarekNeural", "ZofiaNeural"),
    ("pt-BR", "AntonioNeural", "FranciscaNeural"),
    ("ru-RU", "DmitryNeural", "SvetlanaNeural"),
    ("tr-TR", "AhmetNeural", "EmelNeural"),
    ("uk-UA", "OstapNeural", "PolinaNeural"),
    ("zh-CN", "YunxiNeural", "XiaoxiaoNeural"),
];

impl Default for VoiceCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        for (locale, male, female) in BUILTIN_VOICES {
            catalog.insert(
                locale,
                Voice {
                    name: format!("{}-{}", locale, male),
                    gender: Gender::Male,
                },
            );
            catalog.insert(
                locale,
                Voice {
                    name: format!("{}-{}", locale, female),
                    gender: Gender::Female,
                },
            );
        }
        catalog
    }
}

impl VoiceCatalog {
    pub fn empty() -> Self {
        Self {
            locales: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, locale: &str, voice: Voice) {
        self.locales.entry(locale.to_string()).or_default().push(voice);
    }

    /// Replace this catalog's voices for every locale `other` defines.
    pub fn merge(&mut self, other: &VoiceCatalog) {
        for (locale, voices) in &other.locales {
            self.locales.insert(locale.clone(), voices.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.locales.values().all(Vec::is_empty)
    }

    /// Pick a voice for a language tag such as `tr`, `tr-TR` or `pt_BR`.
    ///
    /// An exact locale wins; a bare language prefers its "home" region
    /// (`de` → `de-DE`) and then any region. Within a locale a voice of the
    /// requested gender is preferred. Without any match the universal
    /// multilingual voice is returned and a warning logged.
    pub fn find_voice(&self, language_tag: &str, gender: Gender) -> VoiceChoice {
        let tag = language_tag.trim().replace('_', "-");
        let primary = tag.split('-').next().unwrap_or_default().to_ascii_lowercase();
        let home = format!("{}-{}", primary, primary.to_ascii_uppercase());

        let candidates = self
            .locales
            .iter()
            .filter(|(_, voices)| !voices.is_empty())
            .filter(|(locale, _)| locale_primary(locale) == primary);
        let best = candidates.min_by_key(|(locale, _)| {
            if locale.eq_ignore_ascii_case(&tag) {
                0
            } else if locale.eq_ignore_ascii_case(&home) {
                1
            } else {
                2
            }
        });

        match best {
            Some((locale, voices)) => {
                let voice = voices
                    .iter()
                    .find(|v| v.gender == gender)
                    .unwrap_or(&voices[0]);
                VoiceChoice {
                    locale: locale.clone(),
                    name: voice.name.clone(),
                    fallback: false,
                }
            }
            None => {
                warn!(
                    "No voice configured for language {:?}, using {}",
                    language_tag, UNIVERSAL_VOICE
                );
                VoiceChoice {
                    locale: UNIVERSAL_LOCALE.to_string(),
                    name: UNIVERSAL_VOICE.to_string(),
                    fallback: true,
                }
            }
        }
    }
}

fn locale_primary(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
