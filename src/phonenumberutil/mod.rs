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

mod helper_constants;
pub(crate) mod helper_types;
pub mod helper_functions;
pub mod errors;
mod enums;
mod phonenumberutil;
mod phone_number_regexps_and_mappings;

use std::sync::LazyLock;

pub use enums::{MatchType, PhoneNumberFormat, PhoneNumberType};
pub use phonenumberutil::PhoneNumberUtil;

/// Process-wide engine instance. The registry behind it is built once from
/// the compiled-in metadata and is read-only afterwards, so the instance is
/// freely shared between threads.
pub static PHONE_NUMBER_UTIL: LazyLock<PhoneNumberUtil> = LazyLock::new(PhoneNumberUtil::new);
