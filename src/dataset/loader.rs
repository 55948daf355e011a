use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::store::RatingDataset;
use super::types::RawRating;
use crate::config::settings::LoaderSettings;
use crate::errors::{EvalError, EvalResult, load_context};

/// Reads a delimited `user,item,rating[,timestamp]` file into a dataset
pub fn load_ratings_file<P: AsRef<Path>>(path: P, settings: &LoaderSettings) -> Result<RatingDataset> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let text = fs::read_to_string(path).with_context(|| load_context(&display))?;
    let dataset = parse_ratings(&text, settings).with_context(|| load_context(&display))?;

    info!(
        "Loaded {} ratings for {} users and {} items from {}",
        dataset.len(),
        dataset.n_users(),
        dataset.n_items(),
        display
    );
    Ok(dataset)
}

/// Parses file contents; errors carry 1-based line numbers
pub fn parse_ratings(text: &str, settings: &LoaderSettings) -> EvalResult<RatingDataset> {
    let (records, line_numbers) = split_records(text, settings)?;

    RatingDataset::load(records).map_err(|err| match err {
        EvalError::Format { record, reason } => EvalError::Format {
            record: line_numbers[record - 1],
            reason,
        },
        other => other,
    })
}

fn split_records(text: &str, settings: &LoaderSettings) -> EvalResult<(Vec<RawRating>, Vec<usize>)> {
    let mut records = Vec::new();
    let mut line_numbers = Vec::new();

    for (idx, line) in text.lines().enumerate().skip(settings.skip_lines) {
        if is_blank(line) {
            continue;
        }

        let line_no = idx + 1;
        records.push(split_line(line, settings.separator, line_no)?);
        line_numbers.push(line_no);
    }

    Ok((records, line_numbers))
}

fn split_line(line: &str, separator: char, line_no: usize) -> EvalResult<RawRating> {
    let fields: Vec<&str> = line.split(separator).map(str::trim).collect();

    match fields.as_slice() {
        [user, item, rating] => Ok(RawRating::new(*user, *item, *rating, None)),
        [user, item, rating, timestamp] => Ok(RawRating::new(
            *user,
            *item,
            *rating,
            Some(timestamp.to_string()),
        )),
        _ => Err(EvalError::format(
            line_no,
            format!("expected 3 or 4 fields, found {}", fields.len()),
        )),
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "userId,movieId,rating,timestamp\n\
                          1,31,2.5,1260759144\n\
                          1,1029,3.0,1260759179\n\
                          \n\
                          2,31,4.0,835355493\n";

    #[test]
    fn test_parse_skips_header_and_blank_lines() {
        let data = parse_ratings(SAMPLE, &LoaderSettings::default()).unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(data.n_users(), 2);
        assert_eq!(data.n_items(), 2);
        assert_eq!(data.ratings()[2].timestamp, Some(835355493));
    }

    #[test]
    fn test_parse_reports_line_number() {
        let text = "userId,movieId,rating,timestamp\n1,31,2.5,1\n1,32,good,2\n";
        let err = parse_ratings(text, &LoaderSettings::default()).unwrap_err();

        assert!(matches!(err, EvalError::Format { record: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let text = "header\n1,31\n";
        let err = parse_ratings(text, &LoaderSettings::default()).unwrap_err();

        assert!(matches!(err, EvalError::Format { record: 2, .. }));
    }

    #[test]
    fn test_parse_custom_separator_without_header() {
        let settings = LoaderSettings {
            separator: '\t',
            skip_lines: 0,
        };
        let data = parse_ratings("a\tx\t5\nb\tx\t1\n", &settings).unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.ratings()[0].timestamp, None);
    }
}
