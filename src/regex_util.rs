use std::borrow::Cow;

use regex::{Captures, Regex};

pub trait RegexFullMatch {
    /// Eq of C fullMatch
    fn full_match(&self, s: &str) -> bool;
}

pub trait RegexMatchStart {
    /// Eq of looking_at
    fn matches_start(&self, s: &str) -> bool;
}

pub trait RegexConsume {
    /// Eq of C Consume
    fn consume_start<'a>(&self, s: &'a str) -> Option<Cow<'a, str>> {
        self.consume_start_capturing(s).map(|res| res.0)
    }

    fn consume_start_capturing<'a>(&self, s: &'a str) -> Option<(Cow<'a, str>, Captures<'a>)>;
}

impl RegexFullMatch for Regex {
    fn full_match(&self, s: &str) -> bool {
        let found = self.find(s);
        if let Some(matched) = found {
            return matched.start() == 0 && matched.end() == s.len();
        }
        false
    }
}

impl RegexMatchStart for Regex {
    fn matches_start(&self, s: &str) -> bool {
        let found = self.find(s);
        if let Some(matched) = found {
            return matched.start() == 0;
        }
        false
    }
}

impl RegexConsume for Regex {
    fn consume_start_capturing<'a>(&self, s: &'a str) -> Option<(Cow<'a, str>, Captures<'a>)> {
        let captures = self.captures(s)?;
        let full_capture = captures.get(0)?;
        if full_capture.start() != 0 {
            return None;
        }

        Some((Cow::Borrowed(&s[full_capture.end()..]), captures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_match_requires_whole_string() {
        let regex = Regex::new(r"\d{3}").unwrap();
        assert!(regex.full_match("123"));
        assert!(!regex.full_match("1234"));
        assert!(!regex.full_match("a123"));
    }

    #[test]
    fn consume_start_strips_anchored_prefix() {
        let regex = Regex::new(r"0(1)?").unwrap();
        assert_eq!(regex.consume_start("015"), Some(Cow::Borrowed("5")));
        assert_eq!(regex.consume_start("50"), None);
    }
}
