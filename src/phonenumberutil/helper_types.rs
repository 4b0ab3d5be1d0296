use std::borrow::Cow;

use crate::phonenumber::CountryCodeSource;

#[derive(Debug)]
pub struct PhoneNumberWithCountryCodeSource<'a> {
    pub phone_number: Cow<'a, str>,
    pub country_code_source: CountryCodeSource,
}

impl<'a> PhoneNumberWithCountryCodeSource<'a> {
    pub fn new(phone_number: Cow<'a, str>, country_code_source: CountryCodeSource) -> Self {
        Self {
            phone_number,
            country_code_source,
        }
    }
}

#[derive(Debug)]
pub struct PhoneNumberAndCarrierCode<'a> {
    pub carrier_code: Option<String>,
    pub phone_number: Cow<'a, str>,
}

impl<'a> PhoneNumberAndCarrierCode<'a> {
    pub fn new<B: Into<Cow<'a, str>>>(carrier_code: Option<String>, phone_number: B) -> Self {
        Self {
            carrier_code,
            phone_number: phone_number.into(),
        }
    }
}
