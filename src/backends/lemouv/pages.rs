//! Now-playing feed handler for le mouv'.

use crate::capabilities::Emission;
use crate::config::OnMissing;
use crate::error::AdapterError;

/// Parses the station's RSS ticker into the current emission.
///
/// The first entry's title carries `Artist - Title`. Malformed or empty
/// feeds follow the configured policy: substitute the placeholder, or
/// report the missing data as an extraction error.
pub fn parse_now_playing(
    body: &str,
    on_missing: OnMissing,
    placeholder: &str,
) -> Result<Emission, AdapterError> {
    let feed = feed_rs::parser::parse(body.as_bytes())
        .map_err(|e| AdapterError::Parse(format!("now-playing feed: {}", e)))?;

    let title = feed
        .entries
        .first()
        .and_then(|entry| entry.title.as_ref())
        .map(|text| text.content.trim().to_string())
        .filter(|text| !text.is_empty());

    let Some(title) = title else {
        return missing(on_missing, placeholder, "now-playing entry");
    };

    match title.split_once(" - ") {
        Some((artist, song)) => Ok(Emission {
            artist: artist.trim().to_string(),
            title: song.trim().to_string(),
        }),
        None => match on_missing {
            OnMissing::Placeholder => Ok(Emission {
                artist: placeholder.to_string(),
                title,
            }),
            OnMissing::Error => Err(AdapterError::Extraction(
                "artist in now-playing title".to_string(),
            )),
        },
    }
}

fn missing(
    on_missing: OnMissing,
    placeholder: &str,
    what: &str,
) -> Result<Emission, AdapterError> {
    match on_missing {
        OnMissing::Placeholder => Ok(Emission {
            artist: placeholder.to_string(),
            title: placeholder.to_string(),
        }),
        OnMissing::Error => Err(AdapterError::Extraction(what.to_string())),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const FEED_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>le mouv' - en direct</title>
    <item>
      <title>Daft Punk - Around the World</title>
    </item>
    <item>
      <title>Justice - D.A.N.C.E.</title>
    </item>
  </channel>
</rss>
"#;

    pub const BROKEN_FEED_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>le mouv' - en direct</title>
  </channel>
</rss>
"#;

    #[test]
    fn test_parse_now_playing() {
        let emission =
            parse_now_playing(FEED_FIXTURE, OnMissing::Error, "Not defined").unwrap();
        assert_eq!(emission.artist, "Daft Punk");
        assert_eq!(emission.title, "Around the World");
    }

    #[test]
    fn test_empty_feed_policies() {
        let emission =
            parse_now_playing(BROKEN_FEED_FIXTURE, OnMissing::Placeholder, "Not defined")
                .unwrap();
        assert_eq!(emission.artist, "Not defined");

        let err =
            parse_now_playing(BROKEN_FEED_FIXTURE, OnMissing::Error, "Not defined").unwrap_err();
        assert!(matches!(err, AdapterError::Extraction(_)));
    }

    #[test]
    fn test_title_without_separator() {
        let feed = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>x</title>
<item><title>Station jingle</title></item></channel></rss>"#;

        let emission = parse_now_playing(feed, OnMissing::Placeholder, "Not defined").unwrap();
        assert_eq!(emission.artist, "Not defined");
        assert_eq!(emission.title, "Station jingle");

        assert!(parse_now_playing(feed, OnMissing::Error, "Not defined").is_err());
    }

    #[test]
    fn test_unparsable_feed_is_parse_error() {
        let err = parse_now_playing("not xml at all", OnMissing::Placeholder, "Not defined")
            .unwrap_err();
        assert!(matches!(err, AdapterError::Parse(_)));
    }
}
