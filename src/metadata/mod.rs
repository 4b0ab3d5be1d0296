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

mod types;

pub use types::{NumberFormat, PhoneMetadata, PhoneMetadataCollection, PhoneNumberDesc};

use thiserror::Error;

/// Serialized metadata collection, generated offline from the per-region
/// numbering-plan definitions and embedded into the library.
static METADATA: &str = include_str!("../../resources/metadata.json");

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Could not deserialize metadata collection: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Loads the compiled-in metadata collection.
pub(crate) fn load_compiled_metadata() -> Result<PhoneMetadataCollection, MetadataError> {
    let collection = PhoneMetadataCollection::from_json(METADATA)?;
    Ok(collection)
}

#[cfg(test)]
mod tests {
    #[test]
    fn compiled_metadata_deserializes() {
        let collection = super::load_compiled_metadata().expect("Metadata should be valid");
        assert!(!collection.metadata.is_empty());
    }
}
