use crate::api::models::RawRound;
use crate::error::AppError;

/// Length of the label in front of the number, as in `"Round 12"`.
const ROUND_PREFIX_LEN: usize = 6;

/// Integer matchweek from the raw `general.round` value.
///
/// Strings longer than the prefix are read after the first six characters,
/// anything shorter is parsed whole. Surrounding whitespace is ignored and a
/// leading sign is accepted.
pub fn parse_matchweek(raw: &RawRound) -> Result<i64, AppError> {
    match raw {
        RawRound::Number(n) => Ok(*n),
        RawRound::Text(text) => {
            let digits = if text.chars().count() > ROUND_PREFIX_LEN {
                text.char_indices()
                    .nth(ROUND_PREFIX_LEN)
                    .map(|(idx, _)| &text[idx..])
                    .unwrap_or("")
            } else {
                text.as_str()
            };
            digits
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::MatchweekParse(text.clone()))
        }
    }
}
