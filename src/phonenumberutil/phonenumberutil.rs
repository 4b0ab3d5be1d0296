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

use std::{
    borrow::Cow,
    collections::{hash_map::Entry, HashMap, HashSet, VecDeque},
};

use log::{trace, warn};

use super::phone_number_regexps_and_mappings::PhoneNumberRegExpsAndMappings;
use crate::{
    i18n::RegionCode,
    interfaces::MatcherApi,
    macros::{expect_metadata_regex, owned_from_cow_or},
    metadata::{load_compiled_metadata, NumberFormat, PhoneMetadata, PhoneMetadataCollection, PhoneNumberDesc},
    phonenumber::{CountryCodeSource, PhoneNumber},
    phonenumberutil::{
        errors::{
            GetExampleNumberError, GetExampleNumberErrorInternal, NotANumberError, ParseError,
            ParseErrorInternal, ValidationError,
        },
        helper_constants::{
            COLOMBIA_MOBILE_TO_FIXED_LINE_PREFIX, DEFAULT_EXTN_PREFIX, MAX_INPUT_STRING_LENGTH,
            MAX_LENGTH_COUNTRY_CODE, MAX_LENGTH_FOR_NSN, MIN_LENGTH_FOR_NSN, NANPA_COUNTRY_CODE,
            PLUS_SIGN, REGION_CODE_FOR_NON_GEO_ENTITY, RFC3966_EXTN_PREFIX,
            RFC3966_ISDN_SUBADDRESS, RFC3966_PHONE_CONTEXT, RFC3966_PREFIX,
        },
        helper_functions::{
            copy_core_fields_only, get_number_desc_by_type, get_supported_types_for_metadata,
            is_national_number_suffix_of_the_other, normalize_helper,
            prefix_number_with_country_calling_code, set_italian_leading_zeros_for_phone_number,
            test_number_length_against_pattern,
        },
        helper_types::{PhoneNumberAndCarrierCode, PhoneNumberWithCountryCodeSource},
        MatchType, PhoneNumberFormat, PhoneNumberType,
    },
    regex_based_matcher::RegexBasedMatcher,
    regex_util::{RegexConsume, RegexFullMatch, RegexMatchStart},
    regexp_cache::InvalidRegexError,
    string_util::{self, strip_cow_prefix},
};

// Helper type for Result of the formatting family, whose only internal
// failure is a metadata pattern that does not compile.
pub type Result<T> = std::result::Result<T, InvalidRegexError>;

pub struct PhoneNumberUtil {
    /// An API for validation checking.
    matcher_api: Box<dyn MatcherApi + Send + Sync>,

    /// Helper class holding useful regular expressions and character mappings.
    reg_exps: PhoneNumberRegExpsAndMappings,

    /// A mapping from a country calling code to the region codes which
    /// denote the regions represented by that country calling code. Note
    /// regions under NANPA share the country calling code 1 and Russia and
    /// Kazakhstan share the country calling code 7. Under this map, 1 is
    /// mapped to region code "US" first. This is implemented as a sorted
    /// vector to achieve better performance.
    country_calling_code_to_region_code_map: Vec<(i32, Vec<String>)>,

    /// The set of regions that share country calling code 1.
    nanpa_regions: HashSet<String>,

    /// A mapping from a region code to a PhoneMetadata for that region.
    region_to_metadata_map: HashMap<String, PhoneMetadata>,

    /// A mapping from a country calling code for a non-geographical entity to the
    /// PhoneMetadata for that country calling code. Examples of the country
    /// calling codes include 800 (International Toll Free Service) and 808
    /// (International Shared Cost Service).
    country_code_to_non_geographical_metadata_map: HashMap<i32, PhoneMetadata>,
}

impl PhoneNumberUtil {
    pub(crate) fn new() -> Self {
        let metadata_collection = match load_compiled_metadata() {
            Err(err) => {
                let err_message = format!("Could not parse compiled-in metadata: {}", err);
                log::error!("{}", err_message);
                panic!("{}", err_message);
            }
            Ok(metadata) => metadata,
        };
        Self::new_for_metadata(metadata_collection)
    }

    pub(crate) fn new_for_metadata(metadata_collection: PhoneMetadataCollection) -> Self {
        let mut instance = Self {
            matcher_api: Box::new(RegexBasedMatcher::new()),
            reg_exps: PhoneNumberRegExpsAndMappings::new(),
            country_calling_code_to_region_code_map: Default::default(),
            nanpa_regions: Default::default(),
            region_to_metadata_map: Default::default(),
            country_code_to_non_geographical_metadata_map: Default::default(),
        };
        // Storing data in a temporary map to make it easier to find other regions
        // that share a country calling code when inserting data.
        let mut country_calling_code_to_region_map = HashMap::<i32, VecDeque<String>>::new();
        for metadata in metadata_collection.metadata {
            let region_code = metadata.id().to_owned();
            if region_code == RegionCode::get_unknown() {
                continue;
            }

            let country_calling_code = metadata.country_code();
            let main_country_for_code = metadata.main_country_for_code();
            if region_code == REGION_CODE_FOR_NON_GEO_ENTITY {
                instance
                    .country_code_to_non_geographical_metadata_map
                    .insert(country_calling_code, metadata);
            } else {
                instance
                    .region_to_metadata_map
                    .insert(region_code.clone(), metadata);
            }

            match country_calling_code_to_region_map.entry(country_calling_code) {
                Entry::Occupied(mut regions) => {
                    if main_country_for_code {
                        regions.get_mut().push_front(region_code.clone());
                    } else {
                        regions.get_mut().push_back(region_code.clone());
                    }
                }
                Entry::Vacant(entry) => {
                    // For most country calling codes, there will be only one
                    // region code.
                    entry.insert(VecDeque::from([region_code.clone()]));
                }
            }
            if country_calling_code == NANPA_COUNTRY_CODE {
                instance.nanpa_regions.insert(region_code);
            }
        }

        instance.country_calling_code_to_region_code_map.extend(
            country_calling_code_to_region_map
                .into_iter()
                .map(|(code, regions)| (code, Vec::from(regions))),
        );
        // Sort all the pairs in ascending order according to country calling code.
        instance
            .country_calling_code_to_region_code_map
            .sort_by_key(|(code, _)| *code);
        instance
    }

    pub fn get_supported_regions(&self) -> Vec<&str> {
        self.region_to_metadata_map
            .keys()
            .map(|region| region.as_str())
            .collect()
    }

    pub fn get_supported_global_network_calling_codes(&self) -> Vec<i32> {
        self.country_code_to_non_geographical_metadata_map
            .keys()
            .copied()
            .collect()
    }

    pub fn get_supported_calling_codes(&self) -> Vec<i32> {
        self.country_calling_code_to_region_code_map
            .iter()
            .map(|(code, _)| *code)
            .collect()
    }

    pub fn get_supported_types_for_region(
        &self,
        region_code: &str,
    ) -> Option<HashSet<PhoneNumberType>> {
        self.region_to_metadata_map
            .get(region_code)
            .map(get_supported_types_for_metadata)
            .or_else(|| {
                warn!("Invalid or unknown region code provided: {}", region_code);
                None
            })
    }

    pub fn get_supported_types_for_non_geo_entity(
        &self,
        country_calling_code: i32,
    ) -> Option<HashSet<PhoneNumberType>> {
        self.country_code_to_non_geographical_metadata_map
            .get(&country_calling_code)
            .map(get_supported_types_for_metadata)
            .or_else(|| {
                warn!(
                    "Unknown country calling code for a non-geographical entity provided: {}",
                    country_calling_code
                );
                None
            })
    }

    fn is_valid_region_code(&self, region_code: &str) -> bool {
        self.region_to_metadata_map.contains_key(region_code)
    }

    fn has_valid_country_calling_code(&self, country_calling_code: i32) -> bool {
        self.country_calling_code_to_region_code_map
            .binary_search_by_key(&country_calling_code, |(code, _)| *code)
            .is_ok()
    }

    pub(crate) fn get_metadata_for_region(&self, region_code: &str) -> Option<&PhoneMetadata> {
        self.region_to_metadata_map.get(region_code)
    }

    fn get_metadata_for_region_or_calling_code(
        &self,
        country_calling_code: i32,
        region_code: &str,
    ) -> Option<&PhoneMetadata> {
        if region_code == REGION_CODE_FOR_NON_GEO_ENTITY {
            self.country_code_to_non_geographical_metadata_map
                .get(&country_calling_code)
        } else {
            self.region_to_metadata_map.get(region_code)
        }
    }

    /// Returns the region codes that match the specific country calling code.
    /// For non-geographical country calling codes, the region code "001" is
    /// returned. In the case of no region code being found, the list is empty.
    pub fn get_region_codes_for_country_calling_code(
        &self,
        country_calling_code: i32,
    ) -> Vec<&str> {
        self.country_calling_code_to_region_code_map
            .binary_search_by_key(&country_calling_code, |(code, _)| *code)
            .map(|index| {
                self.country_calling_code_to_region_code_map[index]
                    .1
                    .iter()
                    .map(|region| region.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the region code that matches the specific country calling code. In
    /// the case of no region code being found, the unknown region code will be
    /// returned. In the case of multiple regions, the one designated in the
    /// metadata as the "main" region for this calling code will be returned.
    pub fn get_region_code_for_country_code(&self, country_calling_code: i32) -> &str {
        let region_codes = self.get_region_codes_for_country_calling_code(country_calling_code);
        region_codes
            .first()
            .copied()
            .unwrap_or(RegionCode::get_unknown())
    }

    /// Returns the region where a phone number is from. This could be used for
    /// geocoding at the region level.
    pub fn get_region_code_for_number(&self, phone_number: &PhoneNumber) -> &str {
        let country_calling_code = phone_number.country_code();
        let region_codes = self.get_region_codes_for_country_calling_code(country_calling_code);
        if region_codes.is_empty() {
            trace!(
                "Missing/invalid country calling code ({})",
                country_calling_code
            );
            return RegionCode::get_unknown();
        }
        if region_codes.len() == 1 {
            region_codes[0]
        } else {
            self.get_region_code_for_number_from_region_list(phone_number, &region_codes)
        }
    }

    fn get_region_code_for_number_from_region_list<'b>(
        &self,
        phone_number: &PhoneNumber,
        region_codes: &[&'b str],
    ) -> &'b str {
        let national_number = Self::get_national_significant_number(phone_number);
        for code in region_codes {
            // Metadata cannot be null because the region codes come from the
            // country calling code map.
            let Some(metadata) = self.region_to_metadata_map.get(*code) else {
                continue;
            };
            if metadata.has_leading_digits() {
                let leading_digits_pattern = expect_metadata_regex!(self
                    .reg_exps
                    .regexp_cache
                    .get_regex(metadata.leading_digits()));
                if leading_digits_pattern
                    .consume_start(&national_number)
                    .is_some()
                {
                    return code;
                }
            } else if self.get_number_type_helper(&national_number, metadata)
                != PhoneNumberType::Unknown
            {
                return code;
            }
        }
        RegionCode::get_unknown()
    }

    /// Returns the country calling code for a specific region. For example, this
    /// would be 1 for the United States, and 64 for New Zealand.
    pub fn get_country_code_for_region(&self, region_code: &str) -> i32 {
        if !self.is_valid_region_code(region_code) {
            warn!(
                "Invalid or missing region code ({}) provided.",
                if region_code.is_empty() { "null" } else { region_code }
            );
            return 0;
        }
        self.get_country_code_for_valid_region(region_code)
    }

    fn get_country_code_for_valid_region(&self, region_code: &str) -> i32 {
        self.region_to_metadata_map
            .get(region_code)
            .map(|metadata| metadata.country_code())
            .unwrap_or(0)
    }

    /// Returns the national dialling prefix for a specific region. For example,
    /// this would be 1 for the United States, and 0 for New Zealand. Set
    /// strip_non_digits to true to strip symbols like "~" (which indicates a
    /// wait for a dialling tone) from the prefix returned.
    pub fn get_ndd_prefix_for_region(
        &self,
        region_code: &str,
        strip_non_digits: bool,
    ) -> Option<String> {
        self.region_to_metadata_map
            .get(region_code)
            .map(|metadata| {
                let mut prefix = metadata.national_prefix().to_owned();
                if strip_non_digits {
                    // Note: if any other non-numeric symbols are ever used in
                    // national prefixes, these would have to be removed here
                    // as well.
                    prefix = prefix.replace('~', "");
                }
                prefix
            })
            .or_else(|| {
                warn!("Invalid or unknown region code ({}) provided.", region_code);
                None
            })
    }

    /// Checks if this is a region under the North American Numbering Plan
    /// Administration (NANPA).
    pub fn is_nanpa_country(&self, region_code: &str) -> bool {
        self.nanpa_regions.contains(region_code)
    }

    /// Returns the mobile token for the provided country calling code if it
    /// has one. A mobile token is a number inserted before the area code when
    /// dialing a mobile number from that country from abroad.
    pub fn get_country_mobile_token(&self, country_calling_code: i32) -> Option<char> {
        self.reg_exps
            .mobile_token_mappings
            .get(&country_calling_code)
            .copied()
    }

    /// Returns true if the supplied region supports mobile number portability.
    /// Returns false for invalid, unknown or regions that don't support mobile
    /// number portability.
    pub fn is_mobile_number_portable_region(&self, region_code: &str) -> bool {
        let Some(metadata) = self.get_metadata_for_region(region_code) else {
            warn!("Invalid or unknown region code provided: {}", region_code);
            return false;
        };
        metadata.mobile_number_portable_region()
    }

    /// Checks whether the country calling code is from a region whose national
    /// significant number could contain a leading zero. An example of such a
    /// region is Italy.
    pub fn is_leading_zero_possible(&self, country_calling_code: i32) -> bool {
        self.get_metadata_for_region_or_calling_code(
            country_calling_code,
            self.get_region_code_for_country_code(country_calling_code),
        )
        .map(|metadata| metadata.leading_zero_possible())
        .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Text normalization.
    // ------------------------------------------------------------------

    /// Normalizes a string of characters representing a phone number.
    ///
    /// Punctuation is stripped. For ALPHA/VANITY numbers the letters are
    /// converted to their numeric representation on a telephone keypad (the
    /// keypad defined in ITU Recommendation E.161); this is only done if
    /// there are 3 or more letters in the number, to lessen the risk that
    /// such letters are typos. For other numbers, wide-ascii and
    /// arabic-indic numerals are converted to European numerals, and
    /// spurious alpha characters are stripped.
    pub fn normalize(&self, number: &str) -> String {
        if self.reg_exps.valid_alpha_phone_pattern.full_match(number) {
            normalize_helper(&self.reg_exps.alpha_phone_mappings, true, number)
        } else {
            Self::normalize_digits_only(number)
        }
    }

    /// Normalizes a string of characters representing a phone number. This
    /// converts wide-ascii and arabic-indic numerals to European numerals,
    /// and strips punctuation and alpha characters.
    pub fn normalize_digits_only(number: &str) -> String {
        number
            .chars()
            .filter_map(string_util::to_ascii_digit)
            .collect()
    }

    /// Normalizes a string of characters representing a phone number. This
    /// strips all characters which are not diallable on a mobile phone keypad
    /// (including all non-ASCII digits).
    pub fn normalize_diallable_chars_only(&self, number: &str) -> String {
        normalize_helper(&self.reg_exps.diallable_char_mappings, true, number)
    }

    /// Converts all alpha characters in a number to their respective digits on
    /// a keypad, but retains existing formatting.
    pub fn convert_alpha_characters_in_number(&self, number: &str) -> String {
        normalize_helper(&self.reg_exps.alpha_phone_mappings, false, number)
    }

    /// Attempts to extract a possible number from the string passed in.
    ///
    /// This starts at the first digit or plus sign (in any supported digit
    /// script), removes trailing non-alphanumeric characters (keeping `#`,
    /// which may mark the previous block as an extension), and cuts before
    /// any marker of a second number such as the second extension in
    /// "x302/x2303".
    pub fn extract_possible_number<'a>(&self, number: &'a str) -> &'a str {
        let Some(start) = self.reg_exps.valid_start_char_pattern.find(number) else {
            return "";
        };
        let mut number = &number[start.start()..];
        // Remove trailing non-alpha non-numerical characters.
        let mut end = number.len();
        for trailing_char in number.chars().rev() {
            if !self
                .reg_exps
                .unwanted_end_char_pattern
                .full_match(&trailing_char.to_string())
            {
                break;
            }
            end -= trailing_char.len_utf8();
        }
        number = &number[..end];
        // Check for extra numbers at the end.
        if let Some(second_number) = self.reg_exps.second_number_start_pattern.find(number) {
            number = &number[..second_number.start()];
        }
        number
    }

    /// Checks to see if the string of characters could possibly be a phone
    /// number at all. At the moment, checks to see that the string begins
    /// with at least 2 digits, ignoring any punctuation commonly found in
    /// phone numbers. This method does not require the number to be
    /// normalized in advance, but does assume that leading non-number symbols
    /// have been removed, such as by `extract_possible_number`.
    pub fn is_viable_phone_number(&self, number: &str) -> bool {
        if number.chars().count() < MIN_LENGTH_FOR_NSN {
            return false;
        }
        self.reg_exps.valid_phone_number_pattern.full_match(number)
    }

    /// Checks if the number is a valid vanity (alpha) number such as
    /// "800 MICROSOFT". A valid vanity number will start with at least 3
    /// digits and will have three or more alpha characters. This does not do
    /// region-specific checks.
    pub fn is_alpha_number(&self, number: &str) -> bool {
        if !self.is_viable_phone_number(number) {
            // Number is too short, or doesn't match the basic phone number
            // pattern.
            return false;
        }
        let mut stripped_number = number.to_owned();
        self.maybe_strip_extension(&mut stripped_number);
        self.reg_exps
            .valid_alpha_phone_pattern
            .full_match(&stripped_number)
    }

    /// Strips any extension (as in, the part of the number dialled after the
    /// call is connected, usually indicated with extn, ext, x or similar)
    /// from the end of the number, and returns it.
    pub fn maybe_strip_extension(&self, number: &mut String) -> Option<String> {
        let (start, extension) = {
            let captures = self.reg_exps.extn_pattern.captures(number)?;
            let whole_match = captures.get(0)?;
            // If we find a potential extension, and the number preceding this
            // is a viable number, we assume it is an extension.
            if !self.is_viable_phone_number(&number[..whole_match.start()]) {
                return None;
            }
            // The numbers are captured into groups in the regular expression.
            // We go through the capturing groups until we find one that
            // captured some digits.
            let mut extension = None;
            for group in 1..captures.len() {
                if let Some(digits) = captures.get(group) {
                    extension = Some(Self::normalize_digits_only(digits.as_str()));
                    break;
                }
            }
            (whole_match.start(), extension?)
        };
        number.truncate(start);
        Some(extension)
    }

    // ------------------------------------------------------------------
    // Prefix stripping.
    // ------------------------------------------------------------------

    fn starts_with_plus_chars_pattern(&self, number: &str) -> bool {
        self.reg_exps.plus_chars_pattern.matches_start(number)
    }

    /// Strips the IDD from the start of the number if present. Helper function
    /// used by `maybe_strip_international_prefix_and_normalize`.
    fn parse_prefix_as_idd(&self, idd_pattern: &regex::Regex, number: &str) -> Option<String> {
        let (rest, _) = idd_pattern.consume_start_capturing(number)?;
        // Only strip this if the first digit after the match is not a 0,
        // since country calling codes cannot begin with 0.
        if let Some(captures) = self.reg_exps.capturing_digit_pattern.captures(&rest) {
            let normalized_group = Self::normalize_digits_only(captures.get(1)?.as_str());
            if normalized_group == "0" {
                return None;
            }
        }
        Some(rest.into_owned())
    }

    /// Strips any international prefix (such as +, 00, 011) present in the
    /// number provided, normalizes the resulting number, and indicates how
    /// the country calling code is embedded in the input.
    pub(crate) fn maybe_strip_international_prefix_and_normalize<'a>(
        &self,
        number: &'a str,
        possible_idd_prefix: &str,
    ) -> Result<PhoneNumberWithCountryCodeSource<'a>> {
        if number.is_empty() {
            return Ok(PhoneNumberWithCountryCodeSource::new(
                Cow::Borrowed(number),
                CountryCodeSource::FromDefaultCountry,
            ));
        }
        // Check to see if the number begins with one or more plus signs.
        if let Some(rest) = self.reg_exps.plus_chars_pattern.consume_start(number) {
            // Can now normalize the rest of the number since we've consumed
            // the "+" sign at the start.
            return Ok(PhoneNumberWithCountryCodeSource::new(
                Cow::Owned(self.normalize(&rest)),
                CountryCodeSource::FromNumberWithPlusSign,
            ));
        }
        // Attempt to parse the first digits as an international prefix.
        let idd_pattern = self.reg_exps.regexp_cache.get_regex(possible_idd_prefix)?;
        let normalized_number = self.normalize(number);
        Ok(match self.parse_prefix_as_idd(&idd_pattern, &normalized_number) {
            Some(rest) => PhoneNumberWithCountryCodeSource::new(
                Cow::Owned(rest),
                CountryCodeSource::FromNumberWithIdd,
            ),
            None => PhoneNumberWithCountryCodeSource::new(
                Cow::Owned(normalized_number),
                CountryCodeSource::FromDefaultCountry,
            ),
        })
    }

    /// Strips any national prefix (such as 0, 1) present in the number
    /// provided, together with an optional carrier code, applying the
    /// region's transform rule when it has one. Returns `None` when no
    /// stripping took place.
    pub(crate) fn maybe_strip_national_prefix_and_carrier_code<'a>(
        &self,
        number: &'a str,
        metadata: &PhoneMetadata,
    ) -> Result<Option<PhoneNumberAndCarrierCode<'a>>> {
        let possible_national_prefix = metadata.national_prefix_for_parsing();
        if number.is_empty() || possible_national_prefix.is_empty() {
            // Early return for numbers of zero length or regions without a
            // national prefix.
            return Ok(None);
        }
        // Attempt to parse the first digits as a national prefix.
        let prefix_matcher = self
            .reg_exps
            .regexp_cache
            .get_regex(possible_national_prefix)?;
        let Some((rest, captures)) = prefix_matcher.consume_start_capturing(number) else {
            return Ok(None);
        };

        let national_number_rule = self
            .reg_exps
            .regexp_cache
            .get_regex(metadata.general_desc.national_number_pattern())?;
        // Check if the original number is viable.
        let is_viable_original_number = national_number_rule.full_match(number);
        // If the last capturing group didn't participate, nothing was captured
        // by the capturing groups in possible_national_prefix; therefore, no
        // transformation is necessary, and we just remove the national prefix.
        let num_of_groups = captures.len() - 1;
        let transform_rule = metadata.national_prefix_transform_rule();
        let last_group_participated = captures.get(num_of_groups).is_some();
        if transform_rule.is_empty() || !last_group_participated {
            // If the original number was viable, and the resultant number is
            // not, we return.
            if is_viable_original_number && !national_number_rule.full_match(&rest) {
                return Ok(None);
            }
            let carrier_code = if num_of_groups > 0 && last_group_participated {
                captures.get(1).map(|group| group.as_str().to_owned())
            } else {
                None
            };
            Ok(Some(PhoneNumberAndCarrierCode::new(carrier_code, rest)))
        } else {
            // Check that the resultant number is still viable. If not, return.
            // Check this by applying the transformation on a copy first.
            let transformed_number = prefix_matcher.replace(number, transform_rule);
            if is_viable_original_number && !national_number_rule.full_match(&transformed_number) {
                return Ok(None);
            }
            let carrier_code = if num_of_groups > 1 {
                captures.get(1).map(|group| group.as_str().to_owned())
            } else {
                None
            };
            Ok(Some(PhoneNumberAndCarrierCode::new(
                carrier_code,
                transformed_number,
            )))
        }
    }

    // ------------------------------------------------------------------
    // Parsing.
    // ------------------------------------------------------------------

    /// Parses a string and returns it as a structured phone number. This
    /// method will return an error if the number is not considered to be a
    /// possible number. Note that validation of whether the number is
    /// actually a valid number for a particular region is not performed; this
    /// can be done separately with [`Self::is_valid_number`].
    pub fn parse(
        &self,
        number_to_parse: &str,
        default_region: &str,
    ) -> std::result::Result<PhoneNumber, ParseError> {
        self.parse_helper(number_to_parse, default_region, false, true)
            .map_err(|err| err.into_public())
    }

    /// Same as [`Self::parse`], but populates the `raw_input` field with
    /// `number_to_parse` as well as the `country_code_source` and
    /// `preferred_domestic_carrier_code` fields.
    pub fn parse_and_keep_raw_input(
        &self,
        number_to_parse: &str,
        default_region: &str,
    ) -> std::result::Result<PhoneNumber, ParseError> {
        self.parse_helper(number_to_parse, default_region, true, true)
            .map_err(|err| err.into_public())
    }

    /// Checks to see that the region code used is valid, or if it is not
    /// valid, that the number to parse starts with a + symbol so that we can
    /// attempt to infer the region from the number.
    fn check_region_for_parsing(&self, number_to_parse: &str, default_region: &str) -> bool {
        if !self.is_valid_region_code(default_region) {
            // If the number is empty, we can't infer the region.
            if number_to_parse.is_empty() || !self.starts_with_plus_chars_pattern(number_to_parse) {
                return false;
            }
        }
        true
    }

    /// Converts number_to_parse to a form that we can parse. The number is
    /// either taken from the RFC 3966 `tel:` syntax, resolving the
    /// `;phone-context=` parameter, or a possible number is extracted from
    /// free text.
    fn build_national_number_for_parsing(
        &self,
        number_to_parse: &str,
    ) -> std::result::Result<String, NotANumberError> {
        let mut national_number = String::with_capacity(number_to_parse.len());
        match number_to_parse.find(RFC3966_PHONE_CONTEXT) {
            Some(index_of_phone_context) if index_of_phone_context > 0 => {
                let phone_context_start = index_of_phone_context + RFC3966_PHONE_CONTEXT.len();
                let phone_context = &number_to_parse[phone_context_start..];
                let phone_context = match phone_context.find(';') {
                    Some(end) => &phone_context[..end],
                    None => phone_context,
                };
                // The phone-context is either a domain or a global number
                // prefix; anything else invalidates the whole input.
                if phone_context.starts_with(PLUS_SIGN) {
                    if !self
                        .reg_exps
                        .rfc3966_global_number_digits_pattern
                        .is_match(phone_context)
                    {
                        return Err(NotANumberError::InvalidPhoneContext);
                    }
                    // If the phone context contains a phone number prefix, we
                    // need to capture it, whereas domains will be ignored.
                    national_number.push_str(phone_context);
                } else if !self.reg_exps.rfc3966_domainname_pattern.is_match(phone_context) {
                    return Err(NotANumberError::InvalidPhoneContext);
                }
                // Now append everything between the "tel:" prefix and the
                // phone-context. This should include the national number, an
                // optional extension or isdn-subaddress component. Note we
                // also handle the case when "tel:" is missing, as we have
                // seen in some of the phone number inputs. In that case, we
                // append everything from the beginning.
                let index_of_national_number = match number_to_parse.find(RFC3966_PREFIX) {
                    Some(index_of_rfc_prefix) => index_of_rfc_prefix + RFC3966_PREFIX.len(),
                    None => 0,
                };
                national_number
                    .push_str(&number_to_parse[index_of_national_number..index_of_phone_context]);
            }
            _ => {
                // Extract a possible number from the string passed in (this
                // strips leading characters that could not be the start of a
                // phone number.)
                national_number.push_str(self.extract_possible_number(number_to_parse));
            }
        }

        // Delete the isdn-subaddress and everything after it if it is present.
        // Note extension won't appear at the same time with isdn-subaddress
        // according to paragraph 5.3 of the RFC 3966 spec.
        if let Some(index_of_isdn) = national_number.find(RFC3966_ISDN_SUBADDRESS) {
            if index_of_isdn > 0 {
                national_number.truncate(index_of_isdn);
            }
        }
        // If both phone context and isdn-subaddress are absent but other
        // parameters are present, the parameters are left in national_number.
        // This is because we are concerned about deleting content from a
        // potential number string when there is no strong evidence that the
        // number is actually written in RFC 3966.
        Ok(national_number)
    }

    /// Extracts country calling code from full_number, returning it together
    /// with the remaining national number. It assumes that the leading plus
    /// sign or IDD has already been removed.
    fn extract_country_code<'a>(&self, full_number: &'a str) -> Option<(i32, &'a str)> {
        if full_number.is_empty() || full_number.starts_with('0') {
            // Country codes do not begin with a '0'.
            return None;
        }
        for length in 1..=MAX_LENGTH_COUNTRY_CODE.min(full_number.len()) {
            let potential_country_code: i32 = full_number[..length].parse().ok()?;
            if self.has_valid_country_calling_code(potential_country_code) {
                return Some((potential_country_code, &full_number[length..]));
            }
        }
        None
    }

    /// Tries to extract a country calling code from a number.
    ///
    /// Country calling codes are extracted by stripping the international
    /// dialing prefix of the default region when present, by stripping a
    /// leading '+', or by comparing the start of the number with the country
    /// calling code of the default region: if the number was not considered
    /// possible for the numbering plan of the default region but becomes so
    /// (or was too long) once its country calling code is removed, the code
    /// is considered present.
    pub(crate) fn maybe_extract_country_code(
        &self,
        number: &str,
        default_region_metadata: Option<&PhoneMetadata>,
        keep_raw_input: bool,
        phone_number: &mut PhoneNumber,
    ) -> std::result::Result<(i32, String), ParseErrorInternal> {
        if number.is_empty() {
            return Ok((0, String::new()));
        }
        // Set the default prefix to be something that will never match.
        let possible_country_idd_prefix = default_region_metadata
            .map(|metadata| metadata.international_prefix())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or("NonMatch");

        let PhoneNumberWithCountryCodeSource {
            phone_number: full_number,
            country_code_source,
        } = self.maybe_strip_international_prefix_and_normalize(number, possible_country_idd_prefix)?;
        if keep_raw_input {
            phone_number.set_country_code_source(country_code_source);
        }
        if !matches!(country_code_source, CountryCodeSource::FromDefaultCountry) {
            if full_number.chars().count() <= MIN_LENGTH_FOR_NSN {
                // The number had an IDD, but after this was not long enough
                // to be a viable phone number.
                return Err(ParseError::TooShortAfterIdd.into());
            }
            if let Some((potential_country_code, national_number)) =
                self.extract_country_code(&full_number)
            {
                phone_number.set_country_code(potential_country_code);
                return Ok((potential_country_code, national_number.to_owned()));
            }
            // If this fails, they must be using a strange country calling code
            // that we don't recognize, or that doesn't exist.
            return Err(ParseError::InvalidCountryCode.into());
        }
        if let Some(metadata) = default_region_metadata {
            // Check to see if the number starts with the country calling code
            // for the default region. If so, we remove the country calling
            // code, and do some checks on the validity of the number before
            // and after.
            let default_country_code = metadata.country_code();
            let mut buf = itoa::Buffer::new();
            let default_country_code_string = buf.format(default_country_code);
            if let Some(potential_national_number) =
                full_number.strip_prefix(default_country_code_string)
            {
                let general_desc = &metadata.general_desc;
                let valid_number_pattern = self
                    .reg_exps
                    .regexp_cache
                    .get_regex(general_desc.national_number_pattern())?;
                let stripped =
                    self.maybe_strip_national_prefix_and_carrier_code(potential_national_number, metadata)?;
                let potential_national_number = match &stripped {
                    Some(result) => &*result.phone_number,
                    None => potential_national_number,
                };
                let possible_number_pattern = self
                    .reg_exps
                    .regexp_cache
                    .get_regex(general_desc.possible_number_pattern())?;
                // If the number was not valid before but is valid now, or if
                // it was too long before, we consider the number with the
                // country calling code stripped to be a better result and
                // keep that instead.
                if (!valid_number_pattern.full_match(&full_number)
                    && valid_number_pattern.full_match(potential_national_number))
                    || matches!(
                        test_number_length_against_pattern(&possible_number_pattern, &full_number),
                        Err(ValidationError::TooLong)
                    )
                {
                    if keep_raw_input {
                        phone_number
                            .set_country_code_source(CountryCodeSource::FromNumberWithoutPlusSign);
                    }
                    phone_number.set_country_code(default_country_code);
                    return Ok((default_country_code, potential_national_number.to_owned()));
                }
            }
        }
        // No country calling code present.
        phone_number.set_country_code(0);
        Ok((0, full_number.into_owned()))
    }

    /// Helper method to check whether a number is too short to be a regular
    /// length phone number in a region.
    fn is_shorter_than_possible_normal_number(
        &self,
        metadata: &PhoneMetadata,
        number: &str,
    ) -> Result<bool> {
        let possible_number_pattern = self
            .reg_exps
            .regexp_cache
            .get_regex(metadata.general_desc.possible_number_pattern())?;
        Ok(matches!(
            test_number_length_against_pattern(&possible_number_pattern, number),
            Err(ValidationError::TooShort)
        ))
    }

    /// Parses a string and fills up the phone number. This method is the same
    /// as the public `parse()` method, with the exception that it allows the
    /// default region to be unknown ("ZZ"), for use by the matcher.
    /// check_region should be set to false if it is permitted for the default
    /// region to be unknown.
    fn parse_helper(
        &self,
        number_to_parse: &str,
        default_region: &str,
        keep_raw_input: bool,
        check_region: bool,
    ) -> std::result::Result<PhoneNumber, ParseErrorInternal> {
        if number_to_parse.is_empty() {
            return Err(ParseError::EmptyInput.into());
        }
        if number_to_parse.chars().count() > MAX_INPUT_STRING_LENGTH {
            return Err(ParseError::InputTooLong.into());
        }

        let mut national_number = self.build_national_number_for_parsing(number_to_parse)?;

        if !self.is_viable_phone_number(&national_number) {
            return Err(NotANumberError::NotMatchedValidNumberPattern.into());
        }
        // Check the region supplied is valid, or that the extracted number
        // starts with some sort of + sign so the number's region can be
        // determined.
        if check_region && !self.check_region_for_parsing(&national_number, default_region) {
            return Err(ParseError::MissingOrInvalidDefaultRegion.into());
        }

        let mut phone_number = PhoneNumber::new();
        if keep_raw_input {
            phone_number.set_raw_input(number_to_parse.to_owned());
        }
        // Attempt to parse extension first, since it doesn't require
        // region-specific data and we want to have the non-normalised number
        // here.
        if let Some(extension) = self.maybe_strip_extension(&mut national_number) {
            phone_number.set_extension(extension);
        }

        let mut region_metadata = self.get_metadata_for_region(default_region);
        // Check to see if the number is given in international format so we
        // know whether this number is from the default region or not.
        let (country_code, mut normalized_national_number) = self.maybe_extract_country_code(
            &national_number,
            region_metadata,
            keep_raw_input,
            &mut phone_number,
        )?;
        if country_code != 0 {
            let phone_number_region = self.get_region_code_for_country_code(country_code);
            if phone_number_region != default_region {
                // Metadata cannot be null because the country calling code is
                // valid.
                region_metadata =
                    self.get_metadata_for_region_or_calling_code(country_code, phone_number_region);
            }
        } else {
            // If no extracted country calling code, use the region supplied
            // instead. The national number is just the normalized version of
            // the number we were given to parse.
            if let Some(metadata) = region_metadata {
                phone_number.set_country_code(metadata.country_code());
            } else if keep_raw_input {
                phone_number.clear_country_code_source();
            }
        }
        if normalized_national_number.chars().count() < MIN_LENGTH_FOR_NSN {
            return Err(ParseError::TooShortNsn.into());
        }
        if let Some(metadata) = region_metadata {
            let mut adopted = None;
            {
                let strip_result = self
                    .maybe_strip_national_prefix_and_carrier_code(&normalized_national_number, metadata)?;
                let (potential_national_number, carrier_code) = match &strip_result {
                    Some(result) => (
                        &*result.phone_number,
                        result.carrier_code.clone().unwrap_or_default(),
                    ),
                    None => (normalized_national_number.as_str(), String::new()),
                };
                // We require that the NSN remaining after stripping the
                // national prefix and carrier code be of a possible length
                // for the region. Otherwise, we don't do the stripping, since
                // the original number could be a valid short number.
                if !self.is_shorter_than_possible_normal_number(metadata, potential_national_number)? {
                    adopted = Some((potential_national_number.to_owned(), carrier_code));
                }
            }
            if let Some((potential_national_number, carrier_code)) = adopted {
                if keep_raw_input {
                    phone_number.set_preferred_domestic_carrier_code(carrier_code);
                }
                normalized_national_number = potential_national_number;
            }
        }
        let length_of_national_number = normalized_national_number.chars().count();
        if length_of_national_number < MIN_LENGTH_FOR_NSN {
            return Err(ParseError::TooShortNsn.into());
        }
        if length_of_national_number > MAX_LENGTH_FOR_NSN {
            return Err(ParseError::TooLongNsn.into());
        }
        set_italian_leading_zeros_for_phone_number(&normalized_national_number, &mut phone_number);
        let national_number_value: u64 = normalized_national_number
            .parse()
            .map_err(NotANumberError::from)?;
        phone_number.set_national_number(national_number_value);
        Ok(phone_number)
    }

    // ------------------------------------------------------------------
    // Formatting.
    // ------------------------------------------------------------------

    /// Returns the national significant number of a phone number: the number
    /// following the country calling code, with any legitimate leading zeros
    /// prefixed back.
    pub fn get_national_significant_number(phone_number: &PhoneNumber) -> String {
        // If leading zero(s) have been set, we prefix this now. Note this is
        // not a national prefix. Ensure the number of leading zeros is at
        // least 0 so we don't panic in the case of malicious input.
        let zeros_start = if phone_number.italian_leading_zero() {
            "0".repeat(phone_number.number_of_leading_zeros().max(0) as usize)
        } else {
            String::new()
        };

        let mut buf = itoa::Buffer::new();
        let national_number = buf.format(phone_number.national_number());
        format!("{}{}", zeros_start, national_number)
    }

    /// Formats a phone number in the specified format using default rules.
    ///
    /// Note that this does not promise to produce a phone number that the
    /// user can dial; the standard format contains separators that must be
    /// stripped first.
    pub fn format<'b>(
        &self,
        phone_number: &'b PhoneNumber,
        number_format: PhoneNumberFormat,
    ) -> Result<Cow<'b, str>> {
        if phone_number.national_number() == 0 {
            let raw_input = phone_number.raw_input();
            if !raw_input.is_empty() {
                // Unparseable numbers that kept their raw input just use that.
                // This is the only case where a number can be formatted as
                // E164 without a leading '+' symbol (but the original number
                // wasn't parseable anyway).
                return Ok(Cow::Borrowed(raw_input));
            }
        }
        let country_calling_code = phone_number.country_code();
        let mut formatted_number = Self::get_national_significant_number(phone_number);

        if matches!(number_format, PhoneNumberFormat::E164) {
            // Early exit for E164 case (even if the country calling code is
            // invalid) since no formatting of the national number needs to be
            // applied. Extensions are not formatted.
            prefix_number_with_country_calling_code(
                country_calling_code,
                PhoneNumberFormat::E164,
                &mut formatted_number,
            );
            return Ok(Cow::Owned(formatted_number));
        }
        if !self.has_valid_country_calling_code(country_calling_code) {
            return Ok(Cow::Owned(formatted_number));
        }
        // Note here that all NANPA formatting rules are contained by US, so
        // we use that to format NANPA numbers. The same applies to Russian
        // Fed regions - rules are contained by Russia.
        let region_code = self.get_region_code_for_country_code(country_calling_code);
        let Some(metadata) =
            self.get_metadata_for_region_or_calling_code(country_calling_code, region_code)
        else {
            return Ok(Cow::Owned(formatted_number));
        };
        if let Cow::Owned(formatted) =
            self.format_nsn(&formatted_number, metadata, number_format)?
        {
            formatted_number = formatted;
        }
        if let Some(formatted_extension) =
            Self::get_formatted_extension(phone_number, metadata, number_format)
        {
            formatted_number.push_str(&formatted_extension);
        }
        prefix_number_with_country_calling_code(
            country_calling_code,
            number_format,
            &mut formatted_number,
        );
        Ok(Cow::Owned(formatted_number))
    }

    /// Formats a phone number in the specified format using client-defined
    /// formatting rules. Note that if the phone number has a country calling
    /// code of zero or an otherwise invalid country calling code, we cannot
    /// work out things like whether there should be a national prefix
    /// applied, or how to format extensions, so we return the national
    /// significant number with no formatting applied.
    pub fn format_by_pattern(
        &self,
        phone_number: &PhoneNumber,
        number_format: PhoneNumberFormat,
        user_defined_formats: &[NumberFormat],
    ) -> Result<String> {
        let country_calling_code = phone_number.country_code();
        let national_significant_number = Self::get_national_significant_number(phone_number);
        // Note get_region_code_for_country_code() is used because formatting
        // information for regions which share a country calling code is
        // contained by only one region for performance reasons. For example,
        // for NANPA regions it will be contained in the metadata for US.
        let region_code = self.get_region_code_for_country_code(country_calling_code);
        let Some(metadata) =
            self.get_metadata_for_region_or_calling_code(country_calling_code, region_code)
        else {
            return Ok(national_significant_number);
        };

        let formatting_pattern = self
            .choose_formatting_pattern_for_number(user_defined_formats, &national_significant_number)?;

        let mut formatted_number = if let Some(formatting_pattern) = formatting_pattern {
            // Before we do a replacement of the national prefix pattern $NP
            // with the national prefix, we need to copy the rule so that
            // subsequent replacements for different numbers have the
            // appropriate national prefix.
            let mut num_format_copy = formatting_pattern.clone();

            let national_prefix_formatting_rule =
                formatting_pattern.national_prefix_formatting_rule();
            if !national_prefix_formatting_rule.is_empty() {
                let national_prefix = metadata.national_prefix();
                if !national_prefix.is_empty() {
                    // Replace $NP with national prefix and $FG with the first
                    // group ($1).
                    let rule = national_prefix_formatting_rule
                        .replace("$NP", national_prefix)
                        .replace("$FG", "$1");
                    num_format_copy.set_national_prefix_formatting_rule(rule);
                } else {
                    // We don't want to have a rule for how to format the
                    // national prefix if there isn't one.
                    num_format_copy.clear_national_prefix_formatting_rule();
                }
            }
            self.format_nsn_using_pattern(&national_significant_number, &num_format_copy, number_format)?
                .into_owned()
        } else {
            national_significant_number
        };
        if let Some(formatted_extension) =
            Self::get_formatted_extension(phone_number, metadata, number_format)
        {
            formatted_number.push_str(&formatted_extension);
        }
        prefix_number_with_country_calling_code(
            country_calling_code,
            number_format,
            &mut formatted_number,
        );
        Ok(formatted_number)
    }

    /// Formats a phone number in national format for dialing using the
    /// carrier as specified in the carrier_code. The carrier_code will always
    /// be used regardless of whether the phone number already has a preferred
    /// domestic carrier code stored. If carrier_code contains an empty
    /// string, returns the number in national format without any carrier
    /// code.
    pub fn format_national_number_with_carrier_code(
        &self,
        phone_number: &PhoneNumber,
        carrier_code: &str,
    ) -> Result<String> {
        let country_calling_code = phone_number.country_code();
        let national_significant_number = Self::get_national_significant_number(phone_number);
        if !self.has_valid_country_calling_code(country_calling_code) {
            return Ok(national_significant_number);
        }
        // Note get_region_code_for_country_code() is used because formatting
        // information for regions which share a country calling code is
        // contained by only one region for performance reasons. For example,
        // for NANPA regions it will be contained in the metadata for US.
        let region_code = self.get_region_code_for_country_code(country_calling_code);
        let Some(metadata) =
            self.get_metadata_for_region_or_calling_code(country_calling_code, region_code)
        else {
            return Ok(national_significant_number);
        };

        let mut formatted_number = self
            .format_nsn_with_carrier(
                &national_significant_number,
                metadata,
                PhoneNumberFormat::National,
                carrier_code,
            )?
            .into_owned();
        if let Some(formatted_extension) =
            Self::get_formatted_extension(phone_number, metadata, PhoneNumberFormat::National)
        {
            formatted_number.push_str(&formatted_extension);
        }
        prefix_number_with_country_calling_code(
            country_calling_code,
            PhoneNumberFormat::National,
            &mut formatted_number,
        );
        Ok(formatted_number)
    }

    /// Formats a phone number in national format for dialing using the
    /// carrier as specified in the `preferred_domestic_carrier_code` field of
    /// the number. If that is missing or empty, uses the fallback passed in
    /// instead.
    pub fn format_national_number_with_preferred_carrier_code(
        &self,
        phone_number: &PhoneNumber,
        fallback_carrier_code: &str,
    ) -> Result<String> {
        let carrier_code = if !phone_number.preferred_domestic_carrier_code().is_empty() {
            phone_number.preferred_domestic_carrier_code()
        } else {
            fallback_carrier_code
        };
        self.format_national_number_with_carrier_code(phone_number, carrier_code)
    }

    /// Returns a number formatted in such a way that it can be dialed from a
    /// mobile phone in a specific region. If the number cannot be reached
    /// from the region (e.g. some countries block toll-free numbers from
    /// being called outside of the country), the method returns an empty
    /// string.
    pub fn format_number_for_mobile_dialing<'b>(
        &self,
        phone_number: &'b PhoneNumber,
        region_calling_from: &str,
        with_formatting: bool,
    ) -> Result<Cow<'b, str>> {
        let country_calling_code = phone_number.country_code();
        if !self.has_valid_country_calling_code(country_calling_code) {
            return Ok(Cow::Borrowed(phone_number.raw_input()));
        }

        let mut formatted_number = String::new();
        // Clear the extension, as that part cannot normally be dialed
        // together with the main number.
        let mut number_no_extension = phone_number.clone();
        number_no_extension.clear_extension();
        let region_code = self.get_region_code_for_country_code(country_calling_code);
        let number_type = self.get_number_type(&number_no_extension);
        let is_valid_number = !matches!(number_type, PhoneNumberType::Unknown);
        if region_calling_from == region_code {
            let is_fixed_line_or_mobile = matches!(
                number_type,
                PhoneNumberType::FixedLine
                    | PhoneNumberType::FixedLineOrMobile
                    | PhoneNumberType::Mobile
            );
            // Carrier codes may be needed in some countries. We handle this
            // here.
            if region_code == "CO" && matches!(number_type, PhoneNumberType::FixedLine) {
                // Colombian fixed line numbers need to be dialed with a "3"
                // carrier prefix from mobile phones.
                formatted_number = self.format_national_number_with_carrier_code(
                    &number_no_extension,
                    COLOMBIA_MOBILE_TO_FIXED_LINE_PREFIX,
                )?;
            } else if region_code == "BR" && is_fixed_line_or_mobile {
                if !number_no_extension.preferred_domestic_carrier_code().is_empty() {
                    formatted_number = self
                        .format_national_number_with_preferred_carrier_code(&number_no_extension, "")?;
                } else {
                    // Brazilian fixed line and mobile numbers need to be
                    // dialed with a carrier code when called within Brazil.
                    // Without that, most of the carriers won't connect the
                    // call, so we return an empty string here.
                    formatted_number.clear();
                }
            } else if is_valid_number && region_code == "HU" {
                // The national format for HU numbers doesn't contain the
                // national prefix, because that is how numbers are normally
                // written down. However, the national prefix is obligatory
                // when dialing from a mobile phone, except for short numbers.
                // As a result, we add it back here if it is a valid regular
                // length phone number.
                let ndd_prefix = self
                    .get_ndd_prefix_for_region(region_code, true /* strip non-digits */)
                    .unwrap_or_default();
                formatted_number = format!(
                    "{} {}",
                    ndd_prefix,
                    self.format(&number_no_extension, PhoneNumberFormat::National)?
                );
            } else if country_calling_code == NANPA_COUNTRY_CODE {
                // For NANPA countries, we output international format for
                // numbers that can be dialed internationally, since that
                // always works, except for numbers which might potentially be
                // short numbers, which are always dialled in national format.
                let national_number = Self::get_national_significant_number(&number_no_extension);
                let format = match self.get_metadata_for_region(region_calling_from) {
                    Some(region_metadata)
                        if self.can_be_internationally_dialled(&number_no_extension)?
                            && !self.is_shorter_than_possible_normal_number(
                                region_metadata,
                                &national_number,
                            )? =>
                    {
                        PhoneNumberFormat::International
                    }
                    _ => PhoneNumberFormat::National,
                };
                formatted_number =
                    owned_from_cow_or!(self.format(&number_no_extension, format)?, formatted_number);
            } else {
                // For non-geographical countries, and Mexican and Chilean
                // fixed line and mobile numbers, we output international
                // format for numbers that can be dialed internationally as
                // that always works.
                //
                // MX fixed line and mobile numbers should always be formatted
                // in international format, even when dialed within MX. For
                // national format to work, a carrier code needs to be used,
                // and the correct carrier code depends on if the caller and
                // callee are from the same local area. It is trickier to get
                // that to work correctly than using international format,
                // which is tested to work fine on all carriers.
                // CL fixed line numbers need the national prefix when dialing
                // in the national format, but don't have it when used for
                // display. The reverse is true for mobile numbers.
                let format = if (region_code == REGION_CODE_FOR_NON_GEO_ENTITY
                    || ((region_code == "MX" || region_code == "CL") && is_fixed_line_or_mobile))
                    && self.can_be_internationally_dialled(&number_no_extension)?
                {
                    PhoneNumberFormat::International
                } else {
                    PhoneNumberFormat::National
                };
                formatted_number =
                    owned_from_cow_or!(self.format(&number_no_extension, format)?, formatted_number);
            }
        } else if is_valid_number && self.can_be_internationally_dialled(&number_no_extension)? {
            // We assume that short numbers are not diallable from outside
            // their region, so if a number is not a valid regular length
            // phone number, we treat it as if it cannot be internationally
            // dialled.
            return Ok(Cow::Owned(if with_formatting {
                self.format(&number_no_extension, PhoneNumberFormat::International)?
                    .into_owned()
            } else {
                self.format(&number_no_extension, PhoneNumberFormat::E164)?
                    .into_owned()
            }));
        }
        if !with_formatting {
            return Ok(Cow::Owned(
                self.normalize_diallable_chars_only(&formatted_number),
            ));
        }
        Ok(Cow::Owned(formatted_number))
    }

    /// Formats a phone number for out-of-country dialing purposes. If no
    /// region_calling_from is supplied, we format the number in its
    /// INTERNATIONAL format. If the country calling code is the same as that
    /// of the region where the number is from, then NATIONAL formatting will
    /// be applied.
    ///
    /// Note this function takes care of the case for calling inside of NANPA
    /// and between Russia and Kazakhstan (who share the same country calling
    /// code). In those cases, no international prefix is used. For regions
    /// which have multiple international prefixes, the number in its
    /// INTERNATIONAL format will be returned instead.
    pub fn format_out_of_country_calling_number(
        &self,
        phone_number: &PhoneNumber,
        region_calling_from: &str,
    ) -> Result<String> {
        if !self.is_valid_region_code(region_calling_from) {
            warn!(
                "Trying to format number from invalid region {}. International formatting applied.",
                region_calling_from
            );
            return Ok(self
                .format(phone_number, PhoneNumberFormat::International)?
                .into_owned());
        }
        let country_calling_code = phone_number.country_code();
        let national_significant_number = Self::get_national_significant_number(phone_number);
        if !self.has_valid_country_calling_code(country_calling_code) {
            return Ok(national_significant_number);
        }
        if country_calling_code == NANPA_COUNTRY_CODE {
            if self.is_nanpa_country(region_calling_from) {
                // For NANPA regions, return the national format for these
                // regions but prefix it with the country calling code.
                let mut buf = itoa::Buffer::new();
                return Ok(format!(
                    "{} {}",
                    buf.format(country_calling_code),
                    self.format(phone_number, PhoneNumberFormat::National)?
                ));
            }
        } else if country_calling_code == self.get_country_code_for_valid_region(region_calling_from)
        {
            // If regions share a country calling code, the country calling
            // code need not be dialled. This also applies when dialling
            // within a region, so this if clause covers both these cases.
            // Technically this is the case for dialling from La Reunion to
            // other overseas departments of France (French Guiana,
            // Martinique, Guadeloupe), but not vice versa - so we don't cover
            // this edge case for now and for those cases return the version
            // including country calling code.
            return Ok(self
                .format(phone_number, PhoneNumberFormat::National)?
                .into_owned());
        }
        // Metadata cannot be null because we checked is_valid_region_code
        // above.
        let Some(metadata_for_region_calling_from) =
            self.get_metadata_for_region(region_calling_from)
        else {
            return Ok(self
                .format(phone_number, PhoneNumberFormat::International)?
                .into_owned());
        };
        let international_prefix = metadata_for_region_calling_from.international_prefix();

        // For regions that have multiple international prefixes, the
        // international format of the number is returned, unless there is a
        // preferred international prefix.
        let international_prefix_for_formatting = if self
            .reg_exps
            .single_international_prefix
            .full_match(international_prefix)
        {
            international_prefix
        } else if metadata_for_region_calling_from.has_preferred_international_prefix() {
            metadata_for_region_calling_from.preferred_international_prefix()
        } else {
            ""
        };

        let region_code = self.get_region_code_for_country_code(country_calling_code);
        // Metadata cannot be null because the country calling code is valid.
        let Some(metadata_for_region) =
            self.get_metadata_for_region_or_calling_code(country_calling_code, region_code)
        else {
            return Ok(national_significant_number);
        };
        let mut formatted_number = self
            .format_nsn(
                &national_significant_number,
                metadata_for_region,
                PhoneNumberFormat::International,
            )?
            .into_owned();
        if let Some(formatted_extension) = Self::get_formatted_extension(
            phone_number,
            metadata_for_region,
            PhoneNumberFormat::International,
        ) {
            formatted_number.push_str(&formatted_extension);
        }
        if !international_prefix_for_formatting.is_empty() {
            let mut buf = itoa::Buffer::new();
            formatted_number.insert_str(
                0,
                &format!(
                    "{} {} ",
                    international_prefix_for_formatting,
                    buf.format(country_calling_code)
                ),
            );
        } else {
            prefix_number_with_country_calling_code(
                country_calling_code,
                PhoneNumberFormat::International,
                &mut formatted_number,
            );
        }
        Ok(formatted_number)
    }

    /// Formats a phone number using the original phone number format that the
    /// number is parsed from. The original format is embedded in the
    /// `country_code_source` field of the number. If such information is
    /// missing, the number will be formatted into the NATIONAL format by
    /// default. When the number contains a leading zero and this is
    /// unexpected for this country, or we don't have a formatting pattern for
    /// the number, the method returns the raw input when it is available.
    ///
    /// Note this method guarantees no digit will be inserted, removed or
    /// modified as a result of formatting.
    pub fn format_in_original_format(
        &self,
        phone_number: &PhoneNumber,
        region_calling_from: &str,
    ) -> Result<String> {
        if phone_number.has_raw_input()
            && (self.has_unexpected_italian_leading_zero(phone_number)
                || !self.has_formatting_pattern_for_number(phone_number)?)
        {
            // We check if we have the formatting pattern because without
            // that, we might format the number as a group without national
            // prefix.
            return Ok(phone_number.raw_input().to_owned());
        }
        let formatted_number = match phone_number.country_code_source() {
            None => self
                .format(phone_number, PhoneNumberFormat::National)?
                .into_owned(),
            Some(CountryCodeSource::FromNumberWithPlusSign) => self
                .format(phone_number, PhoneNumberFormat::International)?
                .into_owned(),
            Some(CountryCodeSource::FromNumberWithIdd) => {
                self.format_out_of_country_calling_number(phone_number, region_calling_from)?
            }
            Some(CountryCodeSource::FromNumberWithoutPlusSign) => {
                let formatted = self.format(phone_number, PhoneNumberFormat::International)?;
                match strip_cow_prefix(formatted, PLUS_SIGN) {
                    Some(stripped) => stripped.into_owned(),
                    // Without a leading plus the country calling code was
                    // invalid, and format() already fell back to the NSN.
                    None => Self::get_national_significant_number(phone_number),
                }
            }
            Some(CountryCodeSource::FromDefaultCountry) => {
                self.format_from_default_country(phone_number)?
            }
        };
        // If no digit is inserted/removed/modified as a result of our
        // formatting, we return the formatted phone number; otherwise we
        // return the raw input the user entered.
        let raw_input = phone_number.raw_input();
        if !formatted_number.is_empty() && !raw_input.is_empty() {
            let normalized_formatted_number =
                self.normalize_diallable_chars_only(&formatted_number);
            let normalized_raw_input = self.normalize_diallable_chars_only(raw_input);
            if normalized_formatted_number != normalized_raw_input {
                return Ok(raw_input.to_owned());
            }
        }
        Ok(formatted_number)
    }

    fn format_from_default_country(&self, phone_number: &PhoneNumber) -> Result<String> {
        let region_code = self.get_region_code_for_country_code(phone_number.country_code());
        // We strip non-digits from the NDD here, and from the raw input
        // later, so that we can compare them easily.
        let national_prefix = self
            .get_ndd_prefix_for_region(region_code, true /* strip non-digits */)
            .unwrap_or_default();
        let national_format = self
            .format(phone_number, PhoneNumberFormat::National)?
            .into_owned();
        if national_prefix.is_empty() {
            // If the region doesn't have a national prefix at all, we can
            // safely return the national format without worrying about a
            // national prefix being added.
            return Ok(national_format);
        }
        // Otherwise, we check if the original number was entered with a
        // national prefix.
        if self.raw_input_contains_national_prefix(
            phone_number.raw_input(),
            &national_prefix,
            region_code,
        ) {
            // If so, we can safely return the national format.
            return Ok(national_format);
        }
        let Some(metadata) = self.get_metadata_for_region(region_code) else {
            return Ok(national_format);
        };
        let national_number = Self::get_national_significant_number(phone_number);
        // The format rule could still be missing here if the national number
        // was 0 and there was no raw input (this should not be possible for
        // numbers generated by this library as they would also not have a
        // country calling code and we would have exited earlier).
        let Some(format_rule) =
            self.choose_formatting_pattern_for_number(&metadata.number_format, &national_number)?
        else {
            return Ok(national_format);
        };
        // When the format we apply to this number doesn't contain national
        // prefix, we can just return the national format.
        let candidate_national_prefix_rule = format_rule.national_prefix_formatting_rule();
        // We assume that the first-group symbol will never be _before_ the
        // national prefix.
        let Some(index_of_first_group) = candidate_national_prefix_rule.find("$1") else {
            return Ok(national_format);
        };
        if index_of_first_group == 0 || format_rule.national_prefix_optional_when_formatting {
            return Ok(national_format);
        }
        let candidate_national_prefix_rule =
            Self::normalize_digits_only(&candidate_national_prefix_rule[..index_of_first_group]);
        if candidate_national_prefix_rule.is_empty() {
            // National prefix not used when formatting this number.
            return Ok(national_format);
        }
        // Otherwise, we need to remove the national prefix from our output.
        let mut num_format_copy = format_rule.clone();
        num_format_copy.clear_national_prefix_formatting_rule();
        self.format_by_pattern(
            phone_number,
            PhoneNumberFormat::National,
            std::slice::from_ref(&num_format_copy),
        )
    }

    /// Check if raw_input, which is assumed to be in the national format, has
    /// a national prefix. The national prefix is assumed to be in digits-only
    /// form.
    fn raw_input_contains_national_prefix(
        &self,
        raw_input: &str,
        national_prefix: &str,
        region_code: &str,
    ) -> bool {
        let normalized_national_number = Self::normalize_digits_only(raw_input);
        if let Some(remainder) = normalized_national_number.strip_prefix(national_prefix) {
            // Some Japanese numbers (e.g. 00777123) might be mistaken to
            // contain the national prefix when written without it
            // (e.g. 0777123) if we just do prefix matching. To tackle that,
            // we check the validity of the number if the assumed national
            // prefix is removed (777123 won't be valid in Japan).
            match self.parse(remainder, region_code) {
                Ok(number_without_national_prefix) => {
                    self.is_valid_number(&number_without_national_prefix)
                }
                Err(_) => false,
            }
        } else {
            false
        }
    }

    /// Returns true if a number is from a region whose national significant
    /// number couldn't contain a leading zero, but has the
    /// `italian_leading_zero` field set to true.
    fn has_unexpected_italian_leading_zero(&self, phone_number: &PhoneNumber) -> bool {
        phone_number.italian_leading_zero()
            && !self.is_leading_zero_possible(phone_number.country_code())
    }

    fn has_formatting_pattern_for_number(&self, phone_number: &PhoneNumber) -> Result<bool> {
        let country_calling_code = phone_number.country_code();
        let phone_number_region = self.get_region_code_for_country_code(country_calling_code);
        let Some(metadata) =
            self.get_metadata_for_region_or_calling_code(country_calling_code, phone_number_region)
        else {
            return Ok(false);
        };
        let national_number = Self::get_national_significant_number(phone_number);
        Ok(self
            .choose_formatting_pattern_for_number(&metadata.number_format, &national_number)?
            .is_some())
    }

    fn format_nsn<'b>(
        &self,
        number: &'b str,
        metadata: &PhoneMetadata,
        number_format: PhoneNumberFormat,
    ) -> Result<Cow<'b, str>> {
        self.format_nsn_with_carrier(number, metadata, number_format, "")
    }

    // Note that carrier_code is optional - if an empty string, no carrier
    // code replacement will take place.
    fn format_nsn_with_carrier<'b>(
        &self,
        number: &'b str,
        metadata: &PhoneMetadata,
        number_format: PhoneNumberFormat,
        carrier_code: &str,
    ) -> Result<Cow<'b, str>> {
        // When the intl_number_format exists, we use that to format national
        // number for the INTERNATIONAL format instead of using the
        // number_format.
        let available_formats = if metadata.intl_number_format.is_empty()
            || number_format == PhoneNumberFormat::National
        {
            &metadata.number_format
        } else {
            &metadata.intl_number_format
        };
        let formatting_pattern = self.choose_formatting_pattern_for_number(available_formats, number)?;
        if let Some(formatting_pattern) = formatting_pattern {
            self.format_nsn_using_pattern_with_carrier(
                number,
                formatting_pattern,
                number_format,
                carrier_code,
            )
        } else {
            Ok(Cow::Borrowed(number))
        }
    }

    fn choose_formatting_pattern_for_number<'b>(
        &self,
        available_formats: &'b [NumberFormat],
        national_number: &str,
    ) -> Result<Option<&'b NumberFormat>> {
        for format in available_formats {
            // We always use the last leading_digits_pattern, as it is the
            // most detailed.
            if let Some(leading_digits) = format.leading_digits_pattern.last() {
                let leading_digits_pattern =
                    self.reg_exps.regexp_cache.get_regex(leading_digits)?;
                if leading_digits_pattern.consume_start(national_number).is_none() {
                    continue;
                }
            }
            let pattern_to_match = self.reg_exps.regexp_cache.get_regex(format.pattern())?;
            if pattern_to_match.full_match(national_number) {
                return Ok(Some(format));
            }
        }
        Ok(None)
    }

    // Note that carrier_code is optional - if an empty string, no carrier
    // code replacement will take place.
    fn format_nsn_using_pattern_with_carrier<'b>(
        &self,
        national_number: &'b str,
        formatting_pattern: &NumberFormat,
        number_format: PhoneNumberFormat,
        carrier_code: &str,
    ) -> Result<Cow<'b, str>> {
        let mut number_format_rule = Cow::Borrowed(formatting_pattern.format());
        if matches!(number_format, PhoneNumberFormat::National)
            && !carrier_code.is_empty()
            && !formatting_pattern
                .domestic_carrier_code_formatting_rule()
                .is_empty()
        {
            // Replace the $CC in the formatting rule with the desired carrier
            // code.
            let mut carrier_code_formatting_rule =
                Cow::Borrowed(formatting_pattern.domestic_carrier_code_formatting_rule());
            if let Cow::Owned(rule) = self
                .reg_exps
                .carrier_code_pattern
                .replace(&carrier_code_formatting_rule, carrier_code)
            {
                carrier_code_formatting_rule = Cow::Owned(rule);
            }
            if let Cow::Owned(rule) = self
                .reg_exps
                .first_group_capturing_pattern
                .replace(&number_format_rule, &*carrier_code_formatting_rule)
            {
                number_format_rule = Cow::Owned(rule);
            }
        } else {
            // Use the national prefix formatting rule instead.
            let national_prefix_formatting_rule =
                formatting_pattern.national_prefix_formatting_rule();
            if matches!(number_format, PhoneNumberFormat::National)
                && !national_prefix_formatting_rule.is_empty()
            {
                // Apply the national_prefix_formatting_rule as the
                // formatting_pattern contains only information on how the
                // national significant number should be formatted at this
                // point.
                if let Cow::Owned(rule) = self
                    .reg_exps
                    .first_group_capturing_pattern
                    .replace(&number_format_rule, national_prefix_formatting_rule)
                {
                    number_format_rule = Cow::Owned(rule);
                }
            }
        }

        let pattern_to_match = self
            .reg_exps
            .regexp_cache
            .get_regex(formatting_pattern.pattern())?;

        let mut formatted_number =
            pattern_to_match.replace_all(national_number, &*number_format_rule);

        if matches!(number_format, PhoneNumberFormat::RFC3966) {
            // First consume any leading punctuation, if any was present.
            let leading_stripped = self
                .reg_exps
                .separator_pattern
                .consume_start(&formatted_number)
                .map(|rest| rest.into_owned());
            if let Some(stripped) = leading_stripped {
                formatted_number = Cow::Owned(stripped);
            }
            // Then replace all separators with a "-".
            if let Cow::Owned(replaced) = self
                .reg_exps
                .separator_pattern
                .replace_all(&formatted_number, "-")
            {
                formatted_number = Cow::Owned(replaced);
            }
        }
        Ok(formatted_number)
    }

    /// Simple wrapper of format_nsn_using_pattern_with_carrier for the common
    /// case of no carrier code.
    fn format_nsn_using_pattern<'b>(
        &self,
        national_number: &'b str,
        formatting_pattern: &NumberFormat,
        number_format: PhoneNumberFormat,
    ) -> Result<Cow<'b, str>> {
        self.format_nsn_using_pattern_with_carrier(national_number, formatting_pattern, number_format, "")
    }

    // Returns the formatted extension of a phone number, if the phone number
    // had an extension specified.
    fn get_formatted_extension(
        phone_number: &PhoneNumber,
        metadata: &PhoneMetadata,
        number_format: PhoneNumberFormat,
    ) -> Option<String> {
        if !phone_number.has_extension() || phone_number.extension().is_empty() {
            return None;
        }

        let prefix = if matches!(number_format, PhoneNumberFormat::RFC3966) {
            RFC3966_EXTN_PREFIX
        } else if metadata.has_preferred_extn_prefix() {
            metadata.preferred_extn_prefix()
        } else {
            DEFAULT_EXTN_PREFIX
        };
        Some(format!("{}{}", prefix, phone_number.extension()))
    }

    // ------------------------------------------------------------------
    // Classification and validation.
    // ------------------------------------------------------------------

    /// Returns the type of the number: fixed line, mobile, toll free, and so
    /// on, based on the regular-expression patterns of the region the number
    /// belongs to.
    pub fn get_number_type(&self, phone_number: &PhoneNumber) -> PhoneNumberType {
        let region_code = self.get_region_code_for_number(phone_number);
        let Some(metadata) =
            self.get_metadata_for_region_or_calling_code(phone_number.country_code(), region_code)
        else {
            return PhoneNumberType::Unknown;
        };
        let national_significant_number = Self::get_national_significant_number(phone_number);
        self.get_number_type_helper(&national_significant_number, metadata)
    }

    fn get_number_type_helper(
        &self,
        national_number: &str,
        metadata: &PhoneMetadata,
    ) -> PhoneNumberType {
        if !self.is_number_matching_desc(national_number, &metadata.general_desc) {
            trace!(
                "Number '{national_number}' type unknown - doesn't match general national number pattern"
            );
            return PhoneNumberType::Unknown;
        }
        if self.is_number_matching_desc(national_number, &metadata.premium_rate) {
            trace!("Number '{national_number}' is a premium number.");
            return PhoneNumberType::PremiumRate;
        }
        if self.is_number_matching_desc(national_number, &metadata.toll_free) {
            trace!("Number '{national_number}' is a toll-free number.");
            return PhoneNumberType::TollFree;
        }
        if self.is_number_matching_desc(national_number, &metadata.shared_cost) {
            trace!("Number '{national_number}' is a shared cost number.");
            return PhoneNumberType::SharedCost;
        }
        if self.is_number_matching_desc(national_number, &metadata.voip) {
            trace!("Number '{national_number}' is a VOIP (Voice over IP) number.");
            return PhoneNumberType::VoIP;
        }
        if self.is_number_matching_desc(national_number, &metadata.personal_number) {
            trace!("Number '{national_number}' is a personal number.");
            return PhoneNumberType::PersonalNumber;
        }
        if self.is_number_matching_desc(national_number, &metadata.pager) {
            trace!("Number '{national_number}' is a pager number.");
            return PhoneNumberType::Pager;
        }
        if self.is_number_matching_desc(national_number, &metadata.uan) {
            trace!("Number '{national_number}' is a UAN.");
            return PhoneNumberType::UAN;
        }
        if self.is_number_matching_desc(national_number, &metadata.voicemail) {
            trace!("Number '{national_number}' is a voicemail number.");
            return PhoneNumberType::VoiceMail;
        }

        let is_fixed_line = self.is_number_matching_desc(national_number, &metadata.fixed_line);
        if is_fixed_line {
            if metadata.same_mobile_and_fixed_line_pattern() {
                trace!(
                    "Number '{national_number}': fixed-line and mobile patterns equal, \
                     number is fixed-line or mobile"
                );
                return PhoneNumberType::FixedLineOrMobile;
            } else if self.is_number_matching_desc(national_number, &metadata.mobile) {
                trace!(
                    "Number '{national_number}': fixed-line and mobile patterns differ, but number is \
                     still fixed-line or mobile"
                );
                return PhoneNumberType::FixedLineOrMobile;
            }
            trace!("Number '{national_number}' is a fixed line number.");
            return PhoneNumberType::FixedLine;
        }
        // Otherwise, test to see if the number is mobile. Only do this if
        // certain that the patterns for mobile and fixed line aren't the same.
        if !metadata.same_mobile_and_fixed_line_pattern()
            && self.is_number_matching_desc(national_number, &metadata.mobile)
        {
            trace!("Number '{national_number}' is a mobile number.");
            return PhoneNumberType::Mobile;
        }
        trace!(
            "Number '{national_number}' type unknown - doesn't match any specific number type pattern."
        );
        PhoneNumberType::Unknown
    }

    fn is_number_matching_desc(&self, national_number: &str, number_desc: &PhoneNumberDesc) -> bool {
        // The possible-number pattern is a cheap length filter; a desc
        // without one inherits the general description, which the caller has
        // already checked.
        if number_desc.has_possible_number_pattern() {
            match self
                .reg_exps
                .regexp_cache
                .get_regex(number_desc.possible_number_pattern())
            {
                Ok(possible_pattern) => {
                    if !possible_pattern.full_match(national_number) {
                        return false;
                    }
                }
                Err(_) => {
                    log::error!("Invalid regex! {}", number_desc.possible_number_pattern());
                    return false;
                }
            }
        }
        self.matcher_api
            .match_national_number(national_number, number_desc, false)
    }

    /// Tests whether a phone number matches a valid pattern. Note this
    /// doesn't verify the number is actually in use, which is impossible to
    /// tell by just looking at a number itself.
    pub fn is_valid_number(&self, phone_number: &PhoneNumber) -> bool {
        let region_code = self.get_region_code_for_number(phone_number);
        self.is_valid_number_for_region(phone_number, region_code)
    }

    /// Tests whether a phone number is valid for a certain region. If the
    /// country calling code is not the same as the country calling code for
    /// the region, this immediately exits with false.
    pub fn is_valid_number_for_region(&self, phone_number: &PhoneNumber, region_code: &str) -> bool {
        let country_code = phone_number.country_code();
        let Some(metadata) = self.get_metadata_for_region_or_calling_code(country_code, region_code)
        else {
            return false;
        };
        if region_code != REGION_CODE_FOR_NON_GEO_ENTITY
            && country_code != self.get_country_code_for_valid_region(region_code)
        {
            // Either the region code was invalid, or the country calling code
            // for this number does not match that of the region code.
            return false;
        }
        let general_desc = &metadata.general_desc;
        let national_significant_number = Self::get_national_significant_number(phone_number);
        // For regions where we don't have metadata for PhoneNumberDesc, we
        // treat any number passed in as a valid number if its national
        // significant number is between the minimum and maximum lengths
        // defined by ITU for a national significant number.
        if !general_desc.has_national_number_pattern() {
            let number_length = national_significant_number.chars().count();
            return number_length > MIN_LENGTH_FOR_NSN && number_length <= MAX_LENGTH_FOR_NSN;
        }
        self.get_number_type_helper(&national_significant_number, metadata) != PhoneNumberType::Unknown
    }

    /// Convenience wrapper around [`Self::is_possible_number_with_reason`].
    pub fn is_possible_number(&self, phone_number: &PhoneNumber) -> bool {
        self.is_possible_number_with_reason(phone_number).is_ok()
    }

    /// Checks whether a phone number is a possible number. It provides a more
    /// lenient check than [`Self::is_valid_number`]: it only checks the
    /// length of the number, not its starting digits or type.
    pub fn is_possible_number_with_reason(
        &self,
        phone_number: &PhoneNumber,
    ) -> std::result::Result<(), ValidationError> {
        let national_number = Self::get_national_significant_number(phone_number);
        let country_code = phone_number.country_code();
        // Note: For Russian Fed and NANPA numbers, we just use the rules from
        // the default region (US or Russia) since the region code will not
        // resolve if the number is possible but not valid.
        if !self.has_valid_country_calling_code(country_code) {
            return Err(ValidationError::InvalidCountryCode);
        }
        let region_code = self.get_region_code_for_country_code(country_code);
        let Some(metadata) = self.get_metadata_for_region_or_calling_code(country_code, region_code)
        else {
            return Err(ValidationError::InvalidCountryCode);
        };
        let general_desc = &metadata.general_desc;
        // Handling case of numbers with no metadata.
        if !general_desc.has_national_number_pattern() {
            trace!("Checking if number is possible with incomplete metadata.");
            let number_length = national_number.chars().count();
            return if number_length < MIN_LENGTH_FOR_NSN {
                Err(ValidationError::TooShort)
            } else if number_length > MAX_LENGTH_FOR_NSN {
                Err(ValidationError::TooLong)
            } else {
                Ok(())
            };
        }
        let possible_number_pattern = expect_metadata_regex!(self
            .reg_exps
            .regexp_cache
            .get_regex(general_desc.possible_number_pattern()));
        test_number_length_against_pattern(&possible_number_pattern, &national_number)
    }

    /// Checks whether a phone number is possible given a number in the form
    /// of a string, and the region where the number could be dialed from.
    pub fn is_possible_number_for_string(&self, number: &str, region_dialing_from: &str) -> bool {
        match self.parse(number, region_dialing_from) {
            Ok(phone_number) => self.is_possible_number(&phone_number),
            Err(_) => false,
        }
    }

    /// Attempts to extract a valid number from a phone number that is too
    /// long to be valid, and resets the number to that valid version. If no
    /// valid number could be extracted, the number is not modified.
    pub fn truncate_too_long_number(&self, phone_number: &mut PhoneNumber) -> bool {
        if self.is_valid_number(phone_number) {
            return true;
        }
        let mut number_copy = phone_number.clone();
        let mut national_number = phone_number.national_number();
        loop {
            national_number /= 10;
            number_copy.set_national_number(national_number);
            if national_number == 0
                || matches!(
                    self.is_possible_number_with_reason(&number_copy),
                    Err(ValidationError::TooShort)
                )
            {
                return false;
            }
            if self.is_valid_number(&number_copy) {
                break;
            }
        }
        phone_number.set_national_number(national_number);
        true
    }

    /// Returns true if the number can be dialled from outside the region, or
    /// unknown. If the number can only be dialled from within the region,
    /// returns false. Does not check the number is a valid number.
    pub fn can_be_internationally_dialled(&self, phone_number: &PhoneNumber) -> Result<bool> {
        let region_code = self.get_region_code_for_number(phone_number);
        let Some(metadata) = self.get_metadata_for_region(region_code) else {
            // Note numbers belonging to non-geographical entities (e.g. +800
            // numbers) are always internationally diallable, and will be
            // caught here.
            return Ok(true);
        };
        let national_significant_number = Self::get_national_significant_number(phone_number);
        Ok(!self.is_number_matching_desc(
            &national_significant_number,
            &metadata.no_international_dialling,
        ))
    }

    /// Returns true if the number is assigned to a geographic location:
    /// fixed-line numbers, and numbers that cannot be distinguished from
    /// fixed-line ones.
    pub fn is_number_geographical(&self, phone_number: &PhoneNumber) -> bool {
        matches!(
            self.get_number_type(phone_number),
            PhoneNumberType::FixedLine | PhoneNumberType::FixedLineOrMobile
        )
    }

    /// Gets the length of the geographical area code, so that clients could
    /// use it to split a national significant number into geographical area
    /// code and subscriber number.
    ///
    /// N.B.: area code is a very ambiguous concept; most non-geographical
    /// numbers have no area codes, and so do some geographical ones.
    pub fn get_length_of_geographical_area_code(&self, phone_number: &PhoneNumber) -> Result<usize> {
        let region_code = self.get_region_code_for_number(phone_number);
        let Some(metadata) = self.get_metadata_for_region(region_code) else {
            return Ok(0);
        };
        // If a country doesn't use a national prefix, and this number doesn't
        // have an Italian leading zero, we assume it is a closed dialling
        // plan with no area codes.
        if metadata.national_prefix().is_empty() && !phone_number.italian_leading_zero() {
            return Ok(0);
        }
        if !self.is_number_geographical(phone_number) {
            return Ok(0);
        }
        self.get_length_of_national_destination_code(phone_number)
    }

    /// Gets the length of the national destination code (NDC), so that
    /// clients could use it to split a national significant number into NDC
    /// and subscriber number. The NDC of a phone number is normally the first
    /// group of digit(s) right after the country calling code when the number
    /// is formatted in the international format.
    pub fn get_length_of_national_destination_code(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<usize> {
        let copied_proto = if phone_number.has_extension() {
            // We don't want to alter the given number, but we don't want to
            // include the extension when we format it, so we copy it and
            // clear the extension here.
            let mut copy = phone_number.clone();
            copy.clear_extension();
            copy
        } else {
            phone_number.clone()
        };
        let formatted_number = self.format(&copied_proto, PhoneNumberFormat::International)?;
        // The pattern will start with "+COUNTRY_CODE " so the first group
        // will always be the empty string (before the + symbol) and the
        // second group will be the country calling code. The third group will
        // be area code if it is not the last group.
        let number_groups: Vec<&str> = self
            .reg_exps
            .non_digits_pattern
            .split(&formatted_number)
            .collect();
        if number_groups.len() <= 3 {
            return Ok(0);
        }
        if self.get_number_type(phone_number) == PhoneNumberType::Mobile {
            // For example Argentinian mobile numbers, when formatted in the
            // international format, are in the form of +54 9 NDC XXXX... As a
            // result, we take the length of the third group (NDC) and add the
            // length of the second group (which is the mobile token), which
            // also forms part of the national significant number. This
            // assumes that the mobile token is always formatted separately
            // from the rest of the phone number.
            if self.get_country_mobile_token(phone_number.country_code()).is_some() {
                return Ok(number_groups[2].len() + number_groups[3].len());
            }
        }
        Ok(number_groups[2].len())
    }

    // ------------------------------------------------------------------
    // Example numbers.
    // ------------------------------------------------------------------

    /// Gets a valid fixed-line number for the specified region.
    pub fn get_example_number(
        &self,
        region_code: &str,
    ) -> std::result::Result<PhoneNumber, GetExampleNumberError> {
        self.get_example_number_for_type_and_region_code(region_code, PhoneNumberType::FixedLine)
    }

    /// Gets a valid number of the specified type for the specified region.
    pub fn get_example_number_for_type_and_region_code(
        &self,
        region_code: &str,
        phone_number_type: PhoneNumberType,
    ) -> std::result::Result<PhoneNumber, GetExampleNumberError> {
        let Some(metadata) = self.get_metadata_for_region(region_code) else {
            warn!("Invalid or unknown region code provided: {}", region_code);
            return Err(GetExampleNumberError::InvalidRegionCode);
        };
        let desc = get_number_desc_by_type(metadata, phone_number_type);
        if !desc.has_example_number() {
            return Err(GetExampleNumberError::NoExampleNumber);
        }
        self.parse(desc.example_number(), region_code)
            .map_err(GetExampleNumberError::FailedToParse)
    }

    /// Gets a valid number for the specified non-geographical country calling
    /// code, such as 800.
    pub fn get_example_number_for_non_geo_entity(
        &self,
        country_calling_code: i32,
    ) -> std::result::Result<PhoneNumber, GetExampleNumberError> {
        let result = self.get_example_number_for_non_geo_entity_internal(country_calling_code);
        result.map_err(GetExampleNumberErrorInternal::into_public)
    }

    fn get_example_number_for_non_geo_entity_internal(
        &self,
        country_calling_code: i32,
    ) -> std::result::Result<PhoneNumber, GetExampleNumberErrorInternal> {
        let Some(metadata) = self
            .country_code_to_non_geographical_metadata_map
            .get(&country_calling_code)
        else {
            warn!(
                "Unknown country calling code for a non-geographical entity provided: {}",
                country_calling_code
            );
            return Err(GetExampleNumberError::InvalidRegionCode.into());
        };
        // For geographical entities, fixed-line data is always present.
        // However, for non-geographical entities, this is not the case, so we
        // go through different types until we find one with an example.
        let descriptors = [
            &metadata.general_desc,
            &metadata.toll_free,
            &metadata.shared_cost,
            &metadata.voip,
            &metadata.premium_rate,
            &metadata.uan,
            &metadata.voicemail,
        ];
        for desc in descriptors {
            if desc.has_example_number() {
                let number_to_parse =
                    format!("{}{}{}", PLUS_SIGN, country_calling_code, desc.example_number());
                return self
                    .parse_helper(&number_to_parse, RegionCode::get_unknown(), false, true)
                    .map_err(|err| match err {
                        ParseErrorInternal::FailedToParse(parse_error) => {
                            GetExampleNumberError::FailedToParse(parse_error).into()
                        }
                        ParseErrorInternal::RegexError(regex_error) => {
                            GetExampleNumberErrorInternal::RegexError(regex_error)
                        }
                    });
            }
        }
        Err(GetExampleNumberError::NoExampleNumber.into())
    }

    // ------------------------------------------------------------------
    // Matching.
    // ------------------------------------------------------------------

    /// Takes two phone numbers and compares them for equality.
    ///
    /// Returns `ExactMatch` if the country calling code, NSN, presence of a
    /// leading zero for Italian numbers and any extension present are the
    /// same. Returns `NsnMatch` if either or both has no region specified,
    /// and the NSNs and extensions are the same. Returns `ShortNsnMatch` if
    /// either or both has no region specified, or the region specified is the
    /// same, and one NSN could be a shorter version of the other number.
    ///
    /// For example, the numbers +1 345 657 1234 and 657 1234 are a
    /// `ShortNsnMatch`. The numbers +1 345 657 1234 and 345 657 are a
    /// `NoMatch`.
    pub fn is_number_match(
        &self,
        first_number_in: &PhoneNumber,
        second_number_in: &PhoneNumber,
    ) -> MatchType {
        // We only care about the fields that uniquely define a number, so we
        // copy these across explicitly. This also clears raw_input,
        // country_code_source, preferred_domestic_carrier_code and
        // empty-string extensions, so that structural equality can be used.
        let mut first_number = copy_core_fields_only(first_number_in);
        let second_number = copy_core_fields_only(second_number_in);

        // Early exit if both had extensions and these are different.
        let first_number_extension = first_number.extension().to_owned();
        let second_number_extension = second_number.extension();
        if !first_number_extension.is_empty()
            && !second_number_extension.is_empty()
            && first_number_extension != second_number_extension
        {
            return MatchType::NoMatch;
        }

        let first_number_country_code = first_number.country_code();
        let second_number_country_code = second_number.country_code();
        // Both had country calling code specified.
        if first_number_country_code != 0 && second_number_country_code != 0 {
            if first_number == second_number {
                return MatchType::ExactMatch;
            } else if first_number_country_code == second_number_country_code
                && is_national_number_suffix_of_the_other(&first_number, &second_number)
            {
                // A SHORT_NSN_MATCH occurs if there is a difference because of
                // the presence or absence of an 'Italian leading zero', the
                // presence or absence of an extension, or one NSN being a
                // shorter variant of the other.
                return MatchType::ShortNsnMatch;
            }
            // This is not a match.
            return MatchType::NoMatch;
        }
        // Checks cases where one or both country calling codes were not
        // specified. To make equality checks easier, we first set the country
        // codes to be equal.
        first_number.set_country_code(second_number_country_code);
        // If all else was the same, then this is an NSN_MATCH.
        if first_number == second_number {
            return MatchType::NsnMatch;
        }
        if is_national_number_suffix_of_the_other(&first_number, &second_number) {
            return MatchType::ShortNsnMatch;
        }
        MatchType::NoMatch
    }

    /// Takes two phone numbers as strings and compares them for equality.
    /// This is a convenience wrapper for [`Self::is_number_match`]; no
    /// default region is known.
    pub fn is_number_match_for_strings(
        &self,
        first_number: &str,
        second_number: &str,
    ) -> MatchType {
        match self.parse(first_number, RegionCode::get_unknown()) {
            Ok(first_number_as_proto) => {
                self.is_number_match_with_one_string(&first_number_as_proto, second_number)
            }
            Err(ParseError::InvalidCountryCode | ParseError::MissingOrInvalidDefaultRegion) => {
                match self.parse(second_number, RegionCode::get_unknown()) {
                    Ok(second_number_as_proto) => {
                        self.is_number_match_with_one_string(&second_number_as_proto, first_number)
                    }
                    Err(
                        ParseError::InvalidCountryCode
                        | ParseError::MissingOrInvalidDefaultRegion,
                    ) => {
                        let first_number_parsed = self
                            .parse_helper(first_number, "", false, false)
                            .map_err(|err| err.into_public());
                        let second_number_parsed = self
                            .parse_helper(second_number, "", false, false)
                            .map_err(|err| err.into_public());
                        match (first_number_parsed, second_number_parsed) {
                            (Ok(first), Ok(second)) => self.is_number_match(&first, &second),
                            _ => MatchType::NotANumber,
                        }
                    }
                    Err(_) => MatchType::NotANumber,
                }
            }
            Err(_) => MatchType::NotANumber,
        }
    }

    /// Takes a structured phone number and a string and compares them for
    /// equality. An `ExactMatch` is downgraded to `NsnMatch` when the string
    /// could only be parsed using the other number's region.
    pub fn is_number_match_with_one_string(
        &self,
        first_number: &PhoneNumber,
        second_number: &str,
    ) -> MatchType {
        // First see if the second number has an implicit country calling
        // code, by attempting to parse it.
        match self.parse(second_number, RegionCode::get_unknown()) {
            Ok(second_number_as_proto) => {
                self.is_number_match(first_number, &second_number_as_proto)
            }
            Err(ParseError::InvalidCountryCode | ParseError::MissingOrInvalidDefaultRegion) => {
                // The second number has no country calling code. EXACT_MATCH
                // is no longer possible. We parse it as if the region was the
                // same as that for the first number, and if EXACT_MATCH is
                // returned, we replace this with NSN_MATCH.
                let first_number_region =
                    self.get_region_code_for_country_code(first_number.country_code());
                if first_number_region != RegionCode::get_unknown() {
                    match self.parse(second_number, first_number_region) {
                        Ok(second_number_with_first_number_region) => {
                            let match_type = self.is_number_match(
                                first_number,
                                &second_number_with_first_number_region,
                            );
                            if matches!(match_type, MatchType::ExactMatch) {
                                MatchType::NsnMatch
                            } else {
                                match_type
                            }
                        }
                        Err(_) => MatchType::NotANumber,
                    }
                } else {
                    // If the first number didn't have a valid country calling
                    // code, then we parse the second number without one as
                    // well.
                    match self
                        .parse_helper(second_number, "", false, false)
                        .map_err(|err| err.into_public())
                    {
                        Ok(second_number_parsed) => {
                            self.is_number_match(first_number, &second_number_parsed)
                        }
                        Err(_) => MatchType::NotANumber,
                    }
                }
            }
            Err(_) => MatchType::NotANumber,
        }
    }
}
