//! Request path arguments.
//!
//! The dispatcher only ever looks at the first path segment, but the
//! arguments type keeps all of them so views and hooks can read the rest.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes escaped when a segment is written back into a path.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Positional access to the segments of the current request path.
pub trait UrlArguments: Send + Sync {
    /// The segment at `index`, or `""` if there is none.
    fn get(&self, index: usize) -> &str;
}

/// [`UrlArguments`] parsed from a request path like `/about/team?x=1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathArguments {
    segments: Vec<String>,
}

impl PathArguments {
    /// Splits a request path into segments.
    ///
    /// Query string and fragment are dropped; empty segments (leading,
    /// trailing, or doubled slashes) are skipped. Each segment is
    /// percent-decoded after splitting, so `%2F` stays inside its segment.
    /// Invalid UTF-8 decodes lossily.
    ///
    /// ```rust
    /// use sitewise_dispatch::{PathArguments, UrlArguments};
    ///
    /// let args = PathArguments::parse("/about//team/?tab=2");
    /// assert_eq!(args.get(0), "about");
    /// assert_eq!(args.get(1), "team");
    /// assert_eq!(args.get(2), "");
    /// assert_eq!(PathArguments::parse("/%41bout").get(0), "About");
    /// ```
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Joins the segments back into a normalized, percent-encoded path
    /// (`/about/team`).
    pub fn to_path(&self) -> String {
        let encoded: Vec<String> = self
            .segments
            .iter()
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        format!("/{}", encoded.join("/"))
    }
}

impl UrlArguments for PathArguments {
    fn get(&self, index: usize) -> &str {
        self.segments
            .get(index)
            .map(String::as_str)
            .unwrap_or("")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parse_never_yields_empty_segments(path in "[a-z/?#=]{0,24}") {
            let args = PathArguments::parse(&path);
            prop_assert!(args.segments().iter().all(|s| !s.is_empty()));
            prop_assert!(args.segments().iter().all(|s| !s.contains(['/', '?', '#'])));
        }

        #[test]
        fn to_path_is_a_fixed_point(path in "[a-z/%0-9A-F ]{0,24}") {
            let normalized = PathArguments::parse(&path).to_path();
            prop_assert_eq!(PathArguments::parse(&normalized).to_path(), normalized);
        }
    }
}
