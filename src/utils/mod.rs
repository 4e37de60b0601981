pub mod address_classifier;
pub mod chain_normalizer;
pub mod string_utils;

// Re-export commonly used functions
pub use address_classifier::{
    checksum_evm_address, has_valid_eip55_checksum, is_well_formed_evm, AddressClassifier,
};
pub use chain_normalizer::normalize_chain_key;
pub use string_utils::shorten_address;
