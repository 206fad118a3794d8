use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{SpnParser, TrinavParser};
use crate::model::{NavSystemKind, NavigationLog};

/// One navigation log dialect. `parse` must return
/// [`ParserError::FormatMismatch`] when the file is simply not its format so
/// detection can try the next one.
pub trait NavLogParser {
    fn name(&self) -> &'static str;
    fn kind(&self) -> NavSystemKind;
    fn parse(&self, content: &str) -> Result<NavigationLog, ParserError>;
}

const KNOWN_FORMATS: [&dyn NavLogParser; 2] = [&TrinavParser, &SpnParser];

/// Parses a navigation log. With `kind` set only that format is tried;
/// otherwise every known format is tried in order and the first one that
/// recognises the header wins.
pub fn parse_navigation_log(
    content: &str,
    kind: Option<NavSystemKind>,
) -> Result<NavigationLog, ParserError> {
    let candidates = KNOWN_FORMATS
        .iter()
        .copied()
        .filter(|candidate| kind.map_or(true, |kind| candidate.kind() == kind));
    detect_format(content, candidates)
}

/// Runs `candidates` against `content`. A mismatch is recorded and the next
/// candidate tried; any other failure means the format matched but the data
/// is broken, so it is returned as is.
pub fn parse_with_parsers(
    content: &str,
    parsers: &[&dyn NavLogParser],
) -> Result<NavigationLog, ParserError> {
    detect_format(content, parsers.iter().copied())
}

fn detect_format<'a>(
    content: &str,
    candidates: impl IntoIterator<Item = &'a dyn NavLogParser>,
) -> Result<NavigationLog, ParserError> {
    let mut attempts = Vec::new();
    for candidate in candidates {
        let reason = match candidate.parse(content) {
            Err(ParserError::FormatMismatch { reason, .. }) => reason,
            outcome => return outcome,
        };
        attempts.push(ParserAttempt::new(candidate.name(), reason));
    }
    Err(ParserError::NoMatchingParser { attempts })
}
