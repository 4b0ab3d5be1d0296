// Copyright (C) 2009 The Libphonenumber Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Cow;

/// Strips prefix of given string Cow. Returns option with `Some` if
/// prefix found and stripped.
///
/// Calls `drain` if string is owned and returns slice if string is borrowed
pub fn strip_cow_prefix<'a>(cow: Cow<'a, str>, prefix: &str) -> Option<Cow<'a, str>> {
    match cow {
        Cow::Borrowed(s) => s.strip_prefix(prefix).map(|s| Cow::Borrowed(s)),
        Cow::Owned(mut s) => {
            if s.starts_with(prefix) {
                s.drain(0..prefix.len());
                return Some(Cow::Owned(s));
            }
            None
        }
    }
}

/// Returns the numeric value of a Unicode decimal digit, covering the digit
/// scripts phone numbers are written in: ASCII, fullwidth, Arabic-Indic,
/// extended Arabic-Indic, Devanagari and Bengali.
pub fn decimal_digit_value(c: char) -> Option<u32> {
    let code = c as u32;
    let zero = match code {
        0x0030..=0x0039 => 0x0030, // ASCII
        0xFF10..=0xFF19 => 0xFF10, // fullwidth
        0x0660..=0x0669 => 0x0660, // Arabic-Indic
        0x06F0..=0x06F9 => 0x06F0, // extended Arabic-Indic
        0x0966..=0x096F => 0x0966, // Devanagari
        0x09E6..=0x09EF => 0x09E6, // Bengali
        _ => return None,
    };
    Some(code - zero)
}

/// Maps a Unicode decimal digit to its ASCII form, if it is one.
pub fn to_ascii_digit(c: char) -> Option<char> {
    decimal_digit_value(c).and_then(|value| char::from_digit(value, 10))
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{decimal_digit_value, strip_cow_prefix, to_ascii_digit};

    #[test]
    fn test_usage() {
        let str_to_strip = Cow::Owned("test0:test".to_owned());
        let stripped = strip_cow_prefix(str_to_strip, "test0");
        assert_eq!(stripped, Some(Cow::Owned(":test".to_owned())));

        let str_to_strip = Cow::Owned("test:test0".to_owned());
        let stripped = strip_cow_prefix(str_to_strip, "test0");
        assert_eq!(stripped, None)
    }

    #[test]
    fn digit_values() {
        assert_eq!(decimal_digit_value('7'), Some(7));
        assert_eq!(decimal_digit_value('\u{FF17}'), Some(7)); // fullwidth seven
        assert_eq!(decimal_digit_value('\u{0667}'), Some(7)); // Arabic-Indic seven
        assert_eq!(decimal_digit_value('x'), None);

        assert_eq!(to_ascii_digit('\u{FF10}'), Some('0'));
        assert_eq!(to_ascii_digit('-'), None);
    }
}
