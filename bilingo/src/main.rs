//! bilingo - Build bilingual texts and audio for language learners

use anyhow::{Context, Result, bail};
use bilingo::bilingual::BilingualText;
use bilingo::config::{BilingoConfig, SPEECH_KEY_ENV};
use bilingo::ssml::{self, AudioOutputFormat, Gender, SsmlOptions};
use bilingo::text::{SplitterKind, Segmenter, parse_language_tag};
use bilingo::translate::{PROGRAM_NAME, Translator};
use bilingo::tts::{self, AudioEncoding, AzureSynthesizer};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::fmt::Display;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "bilingo")]
#[command(about = "Build bilingual texts and audio for language learners", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split text into length-bounded chunks along sentence boundaries
    Segment {
        /// Input text file ("-" for stdin)
        input: PathBuf,

        /// Maximum chunk length in characters (0 = one chunk per paragraph)
        #[arg(short, long)]
        max_length: Option<usize>,

        /// Language of the text (e.g. "en", "tr"); detected when omitted
        #[arg(short, long)]
        language: Option<String>,

        /// Sentence splitter: punctuation or dialog
        #[arg(long, value_parser = parse_arg::<SplitterKind>)]
        splitter: Option<SplitterKind>,

        /// Print chunks as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Translate text into a bilingual JSON document
    Translate {
        /// Input text file ("-" for stdin)
        input: PathBuf,

        /// Target language (e.g. "English", "en")
        #[arg(short, long)]
        target: String,

        /// LLM preset from llm.toml
        #[arg(short, long)]
        preset: Option<String>,

        /// Maximum chunk length in characters
        #[arg(short, long)]
        max_length: Option<usize>,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a bilingual JSON document as SSML
    Ssml {
        /// Bilingual JSON file
        input: PathBuf,

        #[command(flatten)]
        voice: VoiceArgs,

        /// Output SSML file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split an SSML document into documents of at most N voice turns
    ChunkSsml {
        /// SSML file ("-" for stdin)
        input: PathBuf,

        /// Voice turns per chunk
        #[arg(short = 'n', long)]
        max_turns: Option<usize>,

        /// Directory to write chunk-NNN.xml files to (default: summary only)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Synthesize audio from a bilingual JSON document or an SSML file
    Audio {
        /// Bilingual JSON (.json) or SSML file
        input: PathBuf,

        #[command(flatten)]
        voice: VoiceArgs,

        /// Voice turns per synthesis request
        #[arg(short = 'n', long)]
        max_turns: Option<usize>,

        /// Audio encoding: mp3, ogg or wav
        #[arg(long, value_parser = parse_arg::<AudioEncoding>)]
        encoding: Option<AudioEncoding>,

        /// Output audio file (default: bilingo-<timestamp>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct VoiceArgs {
    /// What to speak: bilingual, bilingual-and-repeat-source-slowly,
    /// source-language or target-language [default: bilingual]
    #[arg(short, long, value_parser = parse_arg::<AudioOutputFormat>)]
    format: Option<AudioOutputFormat>,

    /// Pause after each syntagma in milliseconds
    #[arg(long)]
    break_ms: Option<u32>,

    /// Preferred voice gender: male or female [default: male]
    #[arg(long, value_parser = parse_arg::<Gender>)]
    gender: Option<Gender>,

    /// Voice for the source language (e.g. tr-TR-EmelNeural)
    #[arg(long)]
    source_voice: Option<String>,

    /// Voice for the target language
    #[arg(long)]
    target_voice: Option<String>,
}

impl VoiceArgs {
    /// Whether any voice option was given on the command line.
    fn is_set(&self) -> bool {
        self.format.is_some()
            || self.break_ms.is_some()
            || self.gender.is_some()
            || self.source_voice.is_some()
            || self.target_voice.is_some()
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the maximum paragraph length
    SetMaxLength { value: usize },
    /// Set the number of voice turns per synthesis request
    SetMaxTurns { value: usize },
    /// Set the pause after each syntagma, in milliseconds
    SetBreakTime { value: u32 },
    /// Set the Azure speech region
    SetRegion { region: String },
    /// Set the Azure speech key
    SetKey { key: String },
    /// Set the LLM preset used for translation
    SetPreset { preset: String },
    /// Set the sentence splitter (punctuation or dialog)
    SetSplitter {
        #[arg(value_parser = parse_arg::<SplitterKind>)]
        splitter: SplitterKind,
    },
    /// Set the audio encoding (mp3, ogg or wav)
    SetEncoding {
        #[arg(value_parser = parse_arg::<AudioEncoding>)]
        encoding: AudioEncoding,
    },
}

fn parse_arg<T>(value: &str) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e: T::Err| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let config = BilingoConfig::load().context("Failed to load configuration")?;
    debug!("Configuration: {:?}", BilingoConfig::config_path()?);

    match args.command {
        Commands::Segment {
            input,
            max_length,
            language,
            splitter,
            json,
        } => {
            let text = read_input(&input)?;
            let mut segmenter =
                Segmenter::new(max_length.unwrap_or(config.max_paragraph_length))
                    .with_splitter(splitter.unwrap_or(config.sentence_splitter).build());
            if let Some(tag) = language {
                segmenter = segmenter.with_language(parse_language_tag(&tag)?);
            }

            let chunks = segmenter.segment(&text).context("Failed to segment text")?;
            eprintln!("{} chunks", chunks.len());
            if json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
            } else {
                println!("{}", chunks.join("\n\n"));
            }
        }
        Commands::Translate {
            input,
            target,
            preset,
            max_length,
            output,
        } => {
            let text = read_input(&input)?;
            let llm_config =
                llm_client::Config::load().context("Failed to load LLM configuration")?;
            let preset = preset.or_else(|| config.llm_preset.clone());
            let translator = Translator::from_config(&llm_config, preset.as_deref())
                .context("Failed to initialize LLM provider")?;
            let segmenter = Segmenter::new(max_length.unwrap_or(config.max_paragraph_length))
                .with_splitter(config.sentence_splitter.build());

            eprintln!("Translating into {} with {}...", target, translator.provider_name());
            let bilingual = translator
                .translate_text(&segmenter, &text, &target)
                .await
                .context("Translation failed")?;
            eprintln!("{}", bilingual);

            write_text_output(output.as_deref(), &bilingual.to_json()?).await?;
        }
        Commands::Ssml {
            input,
            voice,
            output,
        } => {
            let bilingual = BilingualText::from_json_file(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let document = render_ssml(&bilingual, &config, &voice)?;
            write_text_output(output.as_deref(), &document).await?;
        }
        Commands::ChunkSsml {
            input,
            max_turns,
            out_dir,
        } => {
            let document = read_input(&input)?;
            let max_turns = max_turns.unwrap_or(config.max_voice_turns);
            let chunks = ssml::chunk(&document, max_turns).context("Failed to chunk SSML")?;

            for chunk in &chunks {
                eprintln!(
                    "chunk {}: {} voice turns, {} bytes",
                    chunk.index,
                    chunk.turns,
                    chunk.document.len()
                );
            }
            if let Some(dir) = out_dir {
                tokio::fs::create_dir_all(&dir)
                    .await
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                for chunk in &chunks {
                    let path = dir.join(format!("chunk-{:03}.xml", chunk.index));
                    tokio::fs::write(&path, &chunk.document)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
                eprintln!("Wrote {} chunks to {}", chunks.len(), dir.display());
            }
        }
        Commands::Audio {
            input,
            voice,
            max_turns,
            encoding,
            output,
        } => {
            let document = if is_json(&input) {
                let bilingual = BilingualText::from_json_file(&input)
                    .with_context(|| format!("Failed to read {}", input.display()))?;
                render_ssml(&bilingual, &config, &voice)?
            } else {
                // SSML input already names its voices and pauses.
                if voice.is_set() {
                    bail!(
                        "Voice options only apply to bilingual JSON input, not to SSML file {}",
                        input.display()
                    );
                }
                read_input(&input)?
            };

            let key = config.speech_key().with_context(|| {
                format!(
                    "No speech key configured. Set {} or run 'bilingo config set-key <key>'",
                    SPEECH_KEY_ENV
                )
            })?;
            let synthesizer = AzureSynthesizer::new(key, &config.speech_region)?;
            let encoding = encoding.unwrap_or(config.audio_encoding);
            let max_turns = max_turns.unwrap_or(config.max_voice_turns);

            eprintln!("Synthesizing audio ({}, {} turns per request)...", encoding, max_turns);
            let audio = tts::render_audio(&synthesizer, &document, max_turns, encoding)
                .await
                .context("Audio synthesis failed")?;

            let output = output.unwrap_or_else(|| default_audio_path(encoding));
            tokio::fs::write(&output, &audio)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            let size_mb = audio.len() as f64 / (1024.0 * 1024.0);
            eprintln!("Output: {} ({:.1} MB)", output.display(), size_mb);
        }
        Commands::Config { action } => handle_config_command(&action, config)?,
    }

    Ok(())
}

fn render_ssml(bilingual: &BilingualText, config: &BilingoConfig, voice: &VoiceArgs) -> Result<String> {
    let options = SsmlOptions {
        format: voice.format.unwrap_or_default(),
        break_time_ms: voice.break_ms.unwrap_or(config.break_time_ms),
        gender: voice.gender.unwrap_or_default(),
        source_voice: voice.source_voice.clone(),
        target_voice: voice.target_voice.clone(),
    };
    info!("Rendering {} as {}", bilingual, options.format);
    ssml::generate_ssml(bilingual, &config.voice_catalog(), &options)
        .context("Failed to generate SSML")
}

/// Read a file, or stdin for "-".
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

async fn write_text_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Output: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn default_audio_path(encoding: AudioEncoding) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("{}-{}.{}", PROGRAM_NAME, stamp, encoding.extension()))
}

fn handle_config_command(action: &ConfigAction, mut config: BilingoConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Configuration file: {:?}", BilingoConfig::config_path()?);
            println!("LLM configuration file: {:?}", llm_client::Config::config_path()?);
            println!();
            println!("max_paragraph_length = {}", config.max_paragraph_length);
            println!("max_voice_turns = {}", config.max_voice_turns);
            println!("break_time_ms = {}", config.break_time_ms);
            println!("audio_encoding = {}", config.audio_encoding);
            println!("speech_region = \"{}\"", config.speech_region);
            match config.speech_key() {
                Some(_) => println!("speech_key = (set)"),
                None => println!("speech_key = (none)"),
            }
            match &config.llm_preset {
                Some(preset) => println!("llm_preset = \"{}\"", preset),
                None => println!("llm_preset = (llm.toml default)"),
            }
            println!("sentence_splitter = {:?}", config.sentence_splitter);
            return Ok(());
        }
        ConfigAction::SetMaxLength { value } => {
            config.max_paragraph_length = *value;
            println!("Maximum paragraph length set to: {}", value);
        }
        ConfigAction::SetMaxTurns { value } => {
            config.max_voice_turns = *value;
            println!("Voice turns per request set to: {}", value);
        }
        ConfigAction::SetBreakTime { value } => {
            config.break_time_ms = *value;
            println!("Break time set to: {} ms", value);
        }
        ConfigAction::SetRegion { region } => {
            config.speech_region = region.trim().to_string();
            println!("Speech region set to: {}", config.speech_region);
        }
        ConfigAction::SetKey { key } => {
            config.speech_key = Some(key.trim().to_string());
            println!("Speech key saved");
        }
        ConfigAction::SetPreset { preset } => {
            let llm_config = llm_client::Config::load()?;
            llm_config.get_preset(preset)?;
            config.llm_preset = Some(preset.clone());
            println!("LLM preset set to: {}", preset);
        }
        ConfigAction::SetSplitter { splitter } => {
            config.sentence_splitter = *splitter;
            println!("Sentence splitter set to: {:?}", splitter);
        }
        ConfigAction::SetEncoding { encoding } => {
            config.audio_encoding = *encoding;
            println!("Audio encoding set to: {}", encoding);
        }
    }
    config.save().context("Failed to save configuration")?;
    Ok(())
}
