//! Splitting SSML documents into provider-sized pieces along voice turns.
//!
//! Speech services cap the number of `<voice>` elements per request. A long
//! bilingual document is cut between voice turns, and every piece is wrapped
//! in the original `<speak>` tag so it can be sent on its own.

use super::{Tag, TagKind, check_well_formed, malformed, scan};
use crate::error::{Error, Result};

const ROOT: &str = "speak";
const TURN: &str = "voice";

/// One self-contained SSML document holding consecutive voice turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupChunk {
    /// Position of this chunk in the sequence, from zero
    pub index: usize,
    /// The complete `<speak>` document
    pub document: String,
    /// Number of voice turns in the document
    pub turns: usize,
}

/// Root element and voice turns of a document, as slices of it.
struct Parsed<'a> {
    open: &'a str,
    close: &'a str,
    turns: Vec<&'a str>,
}

/// Split `document` into chunks of at most `max_turns` voice turns.
///
/// Turns are copied verbatim and keep their order. A document without any
/// voice turn is rejected with [`Error::NoVoiceTurns`].
pub fn chunk(document: &str, max_turns: usize) -> Result<Vec<MarkupChunk>> {
    if max_turns == 0 {
        return Err(Error::InvalidTurnLimit);
    }

    let parsed = parse(document)?;
    if parsed.turns.is_empty() {
        return Err(Error::NoVoiceTurns);
    }

    Ok(parsed
        .turns
        .chunks(max_turns)
        .enumerate()
        .map(|(index, turns)| {
            let document = wrap(parsed.open, turns, parsed.close);
            debug_assert!(check_well_formed(&document).is_ok());
            MarkupChunk {
                index,
                document,
                turns: turns.len(),
            }
        })
        .collect())
}

/// The voice turns of `document`, in order and byte-for-byte.
pub fn voice_turns(document: &str) -> Result<Vec<&str>> {
    Ok(parse(document)?.turns)
}

fn wrap(open: &str, turns: &[&str], close: &str) -> String {
    let body_len: usize = turns.iter().map(|t| t.len() + 1).sum();
    let mut document = String::with_capacity(open.len() + body_len + close.len() + 1);
    document.push_str(open);
    document.push('\n');
    for turn in turns {
        document.push_str(turn);
        document.push('\n');
    }
    document.push_str(close);
    document
}

fn parse(document: &str) -> Result<Parsed<'_>> {
    check_well_formed(document)?;
    let tags = scan(document)?;

    let root_index = tags
        .iter()
        .position(|t| t.kind != TagKind::Other)
        .ok_or_else(|| malformed("missing <speak> root element"))?;
    let root = &tags[root_index];
    if root.name == ROOT && root.kind == TagKind::Empty {
        return Ok(Parsed {
            open: &document[root.span.clone()],
            close: "",
            turns: Vec::new(),
        });
    }
    if root.kind != TagKind::Open || root.name != ROOT {
        return Err(malformed(format!(
            "root element is <{}>, expected <{}>",
            root.name, ROOT
        )));
    }

    let body = &tags[root_index + 1..];
    let mut turns = Vec::new();
    let mut depth = 0usize;
    let mut turn_start = None;
    let mut last_end = root.span.end;

    for tag in body {
        if depth == 0 {
            check_gap(document, last_end, tag)?;
        }

        match tag.kind {
            TagKind::Other => {}
            TagKind::Open => {
                if depth == 0 {
                    expect_turn(tag)?;
                    turn_start = Some(tag.span.start);
                }
                depth += 1;
            }
            TagKind::Empty => {
                if depth == 0 {
                    expect_turn(tag)?;
                    turns.push(&document[tag.span.clone()]);
                }
            }
            TagKind::Close if depth == 0 => {
                // Closing tag of the root; well-formedness guarantees the name.
                return Ok(Parsed {
                    open: &document[root.span.clone()],
                    close: &document[tag.span.clone()],
                    turns,
                });
            }
            TagKind::Close => {
                depth -= 1;
                if depth == 0 {
                    if let Some(start) = turn_start.take() {
                        turns.push(&document[start..tag.span.end]);
                    }
                }
            }
        }

        if depth == 0 {
            last_end = tag.span.end;
        }
    }

    Err(malformed(format!("missing </{}> closing tag", ROOT)))
}

fn expect_turn(tag: &Tag<'_>) -> Result<()> {
    if tag.name == TURN {
        Ok(())
    } else {
        Err(malformed(format!(
            "<{}> outside a <{}> turn",
            tag.name, TURN
        )))
    }
}

/// Text between voice turns would be lost by chunking, so only whitespace is
/// allowed there.
fn check_gap(document: &str, from: usize, tag: &Tag<'_>) -> Result<()> {
    let gap = document[from..tag.span.start].trim();
    if gap.is_empty() {
        Ok(())
    } else {
        Err(malformed(format!(
            "text outside a <{}> turn: {:?}",
            TURN,
            gap.chars().take(40).collect::<String>()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OPEN: &str = r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="tr-TR">"#;

    fn turn(i: usize) -> String {
        format!(
            r#"<voice name="v{i}">  Turn {i} &amp; more<break time="750ms"/>  </voice>"#,
            i = i
        )
    }

    fn document(turns: usize) -> String {
        let body: Vec<String> = (0..turns).map(turn).collect();
        format!("{}\n  {}\n</speak>\n", OPEN, body.join("\n  "))
    }

    #[test]
    fn test_five_turns_in_chunks_of_two() {
        let chunks = chunk(&document(5), 2).unwrap();
        let counts: Vec<usize> = chunks.iter().map(|c| c.turns).collect();
        assert_eq!(counts, vec![2, 2, 1]);

        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
            assert!(check_well_formed(&c.document).is_ok());
            assert!(c.document.starts_with(OPEN));
            assert!(c.document.ends_with("</speak>"));
            assert_eq!(voice_turns(&c.document).unwrap().len(), c.turns);
        }
        assert_eq!(voice_turns(&chunks[2].document).unwrap(), vec![turn(4)]);
    }

    #[test]
    fn test_exact_and_larger_limits_give_one_chunk() {
        assert_eq!(chunk(&document(3), 3).unwrap().len(), 1);
        let chunks = chunk(&document(3), 45).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].turns, 3);
    }

    #[test]
    fn test_turn_contents_preserved_verbatim() {
        let doc = format!(
            "{}<voice name=\"a\">\n  <prosody rate=\"slow\">Yavaş  konuş</prosody>\n</voice><voice name='b'/></speak>",
            OPEN
        );
        let turns = voice_turns(&doc).unwrap();
        assert_eq!(
            turns,
            vec![
                "<voice name=\"a\">\n  <prosody rate=\"slow\">Yavaş  konuş</prosody>\n</voice>",
                "<voice name='b'/>",
            ]
        );
    }

    #[test]
    fn test_prolog_and_comments_are_tolerated() {
        let doc = format!(
            "<?xml version=\"1.0\"?>\n{}<!-- intro -->{}</speak>",
            OPEN,
            turn(0)
        );
        let chunks = chunk(&doc, 1).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].document, format!("{}\n{}\n</speak>", OPEN, turn(0)));
    }

    #[test]
    fn test_missing_root_tags() {
        let err = chunk(&turn(0), 2).unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(_)));

        let err = chunk(&format!("{}{}", OPEN, turn(0)), 2).unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(_)));

        let err = chunk("<speech><voice name=\"a\">x</voice></speech>", 2).unwrap_err();
        assert!(err.to_string().contains("expected <speak>"));
    }

    #[test]
    fn test_content_outside_turns_is_rejected() {
        let doc = format!("{}Hello{}</speak>", OPEN, turn(0));
        assert!(matches!(chunk(&doc, 2), Err(Error::MalformedMarkup(_))));

        let doc = format!("{}<break time=\"1s\"/>{}</speak>", OPEN, turn(0));
        let err = chunk(&doc, 2).unwrap_err();
        assert!(err.to_string().contains("<break> outside a <voice> turn"));
    }

    #[test]
    fn test_bad_attributes_and_references_are_rejected() {
        let cases = [
            format!("{}<voice name=v>x</voice></speak>", OPEN),
            format!("{}<voice name=\"a\" name=\"b\">x</voice></speak>", OPEN),
            format!("{}<voice name=\"v\">Tom & Jerry</voice></speak>", OPEN),
            format!("{}<voice name=\"v\">x &bogus; y</voice></speak>", OPEN),
        ];
        for doc in &cases {
            assert!(
                matches!(chunk(doc, 2), Err(Error::MalformedMarkup(_))),
                "accepted {:?}",
                doc
            );
        }
    }

    #[test]
    fn test_no_turns() {
        assert!(matches!(chunk(&document(0), 2), Err(Error::NoVoiceTurns)));
        assert!(matches!(chunk(&format!("{}</speak>", OPEN), 2), Err(Error::NoVoiceTurns)));
        let empty_root = r#"<?xml version="1.0"?><speak version="1.0" xml:lang="en-US"/>"#;
        assert!(matches!(chunk(empty_root, 2), Err(Error::NoVoiceTurns)));
        assert!(voice_turns(empty_root).unwrap().is_empty());
    }

    #[test]
    fn test_zero_limit() {
        assert!(matches!(chunk(&document(2), 0), Err(Error::InvalidTurnLimit)));
    }

    proptest! {
        #[test]
        fn prop_chunks_reassemble_turns(
            texts in prop::collection::vec("[a-zA-Z0-9 .,!?]{0,30}", 1..40),
            max_turns in 1usize..12,
        ) {
            let turns: Vec<String> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| format!("<voice name=\"v{}\">{}</voice>", i % 3, t))
                .collect();
            let doc = format!("{}{}</speak>", OPEN, turns.join("\n"));

            let chunks = chunk(&doc, max_turns).unwrap();
            prop_assert_eq!(chunks.len(), turns.len().div_ceil(max_turns));

            let mut reassembled = Vec::new();
            for c in &chunks {
                prop_assert!(check_well_formed(&c.document).is_ok());
                prop_assert!(c.turns >= 1 && c.turns <= max_turns);
                reassembled.extend(voice_turns(&c.document).unwrap().into_iter().map(String::from));
            }
            prop_assert_eq!(reassembled, turns);
        }
    }
}
