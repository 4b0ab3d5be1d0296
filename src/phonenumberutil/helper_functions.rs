use std::collections::{HashMap, HashSet};

use regex::Regex;
use strum::IntoEnumIterator;

use crate::{
    metadata::{PhoneMetadata, PhoneNumberDesc},
    phonenumber::PhoneNumber,
    regex_util::{RegexFullMatch, RegexMatchStart},
};

use super::{
    errors::ValidationError,
    helper_constants::{DIGITS, PLUS_SIGN, RFC3966_EXTN_PREFIX, RFC3966_PREFIX},
    PhoneNumberFormat, PhoneNumberType,
};

/// Returns a reference to the description inside the metadata of the
/// appropriate type.
pub(super) fn get_number_desc_by_type(
    metadata: &PhoneMetadata,
    phone_number_type: PhoneNumberType,
) -> &PhoneNumberDesc {
    match phone_number_type {
        PhoneNumberType::PremiumRate => &metadata.premium_rate,
        PhoneNumberType::TollFree => &metadata.toll_free,
        PhoneNumberType::Mobile => &metadata.mobile,
        PhoneNumberType::FixedLine | PhoneNumberType::FixedLineOrMobile => &metadata.fixed_line,
        PhoneNumberType::SharedCost => &metadata.shared_cost,
        PhoneNumberType::VoIP => &metadata.voip,
        PhoneNumberType::PersonalNumber => &metadata.personal_number,
        PhoneNumberType::Pager => &metadata.pager,
        PhoneNumberType::UAN => &metadata.uan,
        PhoneNumberType::VoiceMail => &metadata.voicemail,
        // Instead of the default case, we only match `Unknown`
        PhoneNumberType::Unknown => &metadata.general_desc,
    }
}

/// A helper function that is used by Format and FormatByPattern.
pub(super) fn prefix_number_with_country_calling_code(
    country_calling_code: i32,
    number_format: PhoneNumberFormat,
    formatted_number: &mut String,
) {
    let mut buf = itoa::Buffer::new();
    let country_calling_code_str = buf.format(country_calling_code);

    match number_format {
        PhoneNumberFormat::E164 => {
            formatted_number.insert_str(0, &format!("{PLUS_SIGN}{country_calling_code_str}"));
        }
        PhoneNumberFormat::International => {
            formatted_number.insert_str(0, &format!("{PLUS_SIGN}{country_calling_code_str} "));
        }
        PhoneNumberFormat::RFC3966 => {
            formatted_number.insert_str(
                0,
                &format!("{RFC3966_PREFIX}{PLUS_SIGN}{country_calling_code_str}-"),
            );
        }
        PhoneNumberFormat::National => {}
    }
}

// Returns true when one national number is the suffix of the other or both are
// the same.
pub(super) fn is_national_number_suffix_of_the_other(
    first_number: &PhoneNumber,
    second_number: &PhoneNumber,
) -> bool {
    let mut buf = itoa::Buffer::new();
    let first_number_national_number = buf.format(first_number.national_number()).to_owned();
    let mut buf = itoa::Buffer::new();
    let second_number_national_number = buf.format(second_number.national_number());
    // Note that ends_with returns true if the numbers are equal.
    first_number_national_number.ends_with(second_number_national_number)
        || second_number_national_number.ends_with(&first_number_national_number)
}

// Helper initialiser method to create the regular-expression pattern to match
// extensions. Note that there are currently three capturing groups for the
// extension itself - if this number is changed, MaybeStripExtension needs to
// be updated.
pub(super) fn create_extn_pattern(for_parsing: bool) -> String {
    // Extension limit of 7 digits after explicit labels; a shorter cap of 5
    // applies to the bare "- 1234#" American style, where the label is weak
    // evidence that the digits are an extension at all.
    let capturing_extn_digits = format!("({DIGITS}{{1,7}})");

    // One-character symbols that can be used to indicate an extension. When
    // parsing we are slightly more lenient and also accept "," and ";" as
    // possible extension indicators; when matching these are hardly ever
    // used to indicate this.
    let single_extn_symbols = if for_parsing {
        ",;x\u{FF58}#\u{FF03}~\u{FF5E}"
    } else {
        "x\u{FF58}#\u{FF03}~\u{FF5E}"
    };

    // The first alternative covers RFC 3966 format, where the extension is
    // added using ";ext=". The second covers explicit and one-character
    // labels ("ext.", "x", "#", "anexo", "int" and their fullwidth
    // versions), with optional punctuation after the label. The third covers
    // the special case of American numbers where the extension is written
    // with a hash at the end, such as "- 503#". Non-ASCII labels are given
    // both precomposed and combining-accent spellings.
    format!(
        "{RFC3966_EXTN_PREFIX}{capturing_extn_digits}|\
         [ \u{00A0}\\t,]*\
         (?:e?xt(?:ensi(?:o\u{0301}?|\u{00F3}))?n?|\
         \u{FF45}?\u{FF58}\u{FF54}\u{FF4E}?|\
         [{single_extn_symbols}]|int|anexo|\u{FF49}\u{FF4E}\u{FF54})\
         [:\\.\u{FF0E}]?[ \u{00A0}\\t,-]*{capturing_extn_digits}#?|\
         [- ]+({DIGITS}{{1,5}})#"
    )
}

/// Normalizes a string of characters representing a phone number by replacing
/// all characters found in the accompanying map with the values therein, and
/// stripping all other characters if remove_non_matches is true.
///
/// Parameters:
/// * `normalization_replacements` - a mapping of characters to what they should be
///   replaced by in the normalized version of the phone number
/// * `remove_non_matches` - indicates whether characters that are not able to be
///   replaced should be stripped from the number. If this is false, they will be
///   left unchanged in the number.
pub(super) fn normalize_helper(
    normalization_replacements: &HashMap<char, char>,
    remove_non_matches: bool,
    phone_number: &str,
) -> String {
    let mut normalized_number = String::with_capacity(phone_number.len());
    for phone_char in phone_number.chars() {
        if let Some(replacement) = normalization_replacements.get(&phone_char.to_ascii_uppercase())
        {
            normalized_number.push(*replacement);
        } else if !remove_non_matches {
            normalized_number.push(phone_char);
        }
        // If neither of the above are true, we remove this character.
    }

    normalized_number
}

/// Returns `true` if there is any data set for a particular PhoneNumberDesc.
pub(super) fn desc_has_data(desc: &PhoneNumberDesc) -> bool {
    desc.has_national_number_pattern() || desc.has_example_number()
}

/// Returns the types we have metadata for based on the PhoneMetadata object
/// passed in.
pub(super) fn get_supported_types_for_metadata(
    metadata: &PhoneMetadata,
) -> HashSet<PhoneNumberType> {
    PhoneNumberType::iter()
        // Never return FIXED_LINE_OR_MOBILE (it is a convenience type, and
        // represents that a particular number type can't be
        // determined) or UNKNOWN (the non-type).
        .filter(|number_type| {
            !matches!(
                number_type,
                PhoneNumberType::FixedLineOrMobile | PhoneNumberType::Unknown
            )
        })
        .filter(|number_type| desc_has_data(get_number_desc_by_type(metadata, *number_type)))
        .collect()
}

/// Helper method to check a number against a particular pattern and
/// determine whether it matches, or is too short or too long. A prefix
/// match on a non-full match means the number carries more digits than the
/// pattern allows.
pub(super) fn test_number_length_against_pattern(
    number_pattern: &Regex,
    number: &str,
) -> Result<(), ValidationError> {
    if number_pattern.full_match(number) {
        return Ok(());
    }
    if number_pattern.matches_start(number) {
        Err(ValidationError::TooLong)
    } else {
        Err(ValidationError::TooShort)
    }
}

/// A helper function to set the values related to leading zeros in a
/// PhoneNumber.
pub(super) fn set_italian_leading_zeros_for_phone_number(
    national_number: &str,
    phone_number: &mut PhoneNumber,
) {
    if national_number.len() > 1 && national_number.starts_with('0') {
        phone_number.set_italian_leading_zero(true);
        let mut number_of_leading_zeros = 1;
        // Note that if the national number is all "0"s, the last "0" is not
        // counted as a leading zero.
        let digits = national_number.as_bytes();
        while number_of_leading_zeros < national_number.len() - 1
            && digits[number_of_leading_zeros] == b'0'
        {
            number_of_leading_zeros += 1;
        }
        if number_of_leading_zeros != 1 {
            phone_number.set_number_of_leading_zeros(number_of_leading_zeros as i32);
        }
    }
}

/// Returns a new phone number containing only the fields needed to uniquely
/// identify a phone number, rather than any fields that capture the context in
/// which the phone number was created.
/// These fields correspond to those set in `parse()` rather than
/// `parse_and_keep_raw_input()`.
pub(crate) fn copy_core_fields_only(from_number: &PhoneNumber) -> PhoneNumber {
    let mut to_number = PhoneNumber::new();
    to_number.set_country_code(from_number.country_code());
    to_number.set_national_number(from_number.national_number());
    if from_number.has_extension() && !from_number.extension().is_empty() {
        to_number.set_extension(from_number.extension().to_owned());
    }
    if from_number.italian_leading_zero() {
        to_number.set_italian_leading_zero(true);
        // This field is only relevant if there are leading zeros at all.
        if from_number.has_number_of_leading_zeros() {
            to_number.set_number_of_leading_zeros(from_number.number_of_leading_zeros());
        }
    }
    to_number
}
