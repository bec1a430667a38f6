//! Placeholder results shown when a remote search fails

use core_library::{MediaRecord, MediaSource};

/// Number of placeholder records substituted for a failed search.
pub const FALLBACK_RESULT_COUNT: usize = 4;

/// Fixed placeholder records, each titled with `query`.
///
/// Ids are `fallback-{source}-{n}` with `n` starting at 1.
pub fn placeholder_results(source: MediaSource, query: &str) -> Vec<MediaRecord> {
    (1..=FALLBACK_RESULT_COUNT)
        .map(|n| {
            let id = format!("fallback-{}-{}", source.as_str(), n);
            match source {
                MediaSource::Spotify => {
                    MediaRecord::track(id, format!("{} - Sample Track {}", query, n), None, None)
                        .with_subtitle("Sample Artist")
                }
                MediaSource::YouTube => {
                    MediaRecord::video(id, format!("{} - Sample Video {}", query, n))
                        .with_subtitle("Sample Channel")
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_for_each_source() {
        for source in MediaSource::ALL {
            let records = placeholder_results(source, "test");

            assert_eq!(records.len(), FALLBACK_RESULT_COUNT);
            for (index, record) in records.iter().enumerate() {
                assert!(record.title().contains("test"));
                assert_eq!(record.source(), source);
                assert_eq!(
                    record.id(),
                    format!("fallback-{}-{}", source.as_str(), index + 1)
                );
                assert!(record.validate().is_ok());
            }
        }
    }

    #[test]
    fn test_titles() {
        let records = placeholder_results(MediaSource::YouTube, "jazz");
        assert_eq!(records[0].title(), "jazz - Sample Video 1");

        let records = placeholder_results(MediaSource::Spotify, "jazz");
        assert_eq!(records[3].title(), "jazz - Sample Track 4");
    }
}
