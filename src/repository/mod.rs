//! 外部协作方的只读/查询接口及内存实现

pub mod contact_book;
pub mod name_service;
pub mod route_support;
pub mod wallet_addresses;

pub use contact_book::{ContactBook, InMemoryContactBook};
pub use name_service::{InMemoryNameService, NameRecord, NameServiceResolver};
pub use route_support::{InMemoryRouteSupportTable, RouteSupportTable};
pub use wallet_addresses::{StaticWalletAddresses, WalletAddressSet};
