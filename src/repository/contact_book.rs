//! 地址簿 Repository
//!
//! 解析阶段同步读取；持久化由外部负责，这里提供内存实现

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use crate::domain::Contact;
use crate::utils::string_utils::is_blank;

/// Repository Trait
pub trait ContactBook: Send + Sync {
    /// 按原始地址精确匹配
    fn find_by_address(&self, address: &str) -> Option<Contact>;

    /// 名称或地址子串匹配（大小写不敏感）
    fn search(&self, query: &str) -> Vec<Contact>;

    /// 保存联系人（同地址覆盖）
    fn save(&self, contact: Contact) -> Result<()>;

    /// 删除联系人，返回是否存在
    fn remove(&self, address: &str) -> Result<bool>;
}

/// 内存实现（按地址排序）
#[derive(Default)]
pub struct InMemoryContactBook {
    contacts: RwLock<BTreeMap<String, Contact>>,
}

impl InMemoryContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let map = contacts
            .into_iter()
            .map(|c| (c.address.clone(), c))
            .collect();
        Self {
            contacts: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.contacts.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContactBook for InMemoryContactBook {
    fn find_by_address(&self, address: &str) -> Option<Contact> {
        let contacts = self.contacts.read().ok()?;
        contacts.get(address).cloned()
    }

    fn search(&self, query: &str) -> Vec<Contact> {
        let query = query.trim().to_lowercase();
        let Ok(contacts) = self.contacts.read() else {
            return Vec::new();
        };
        if query.is_empty() {
            return contacts.values().cloned().collect();
        }
        contacts
            .values()
            .filter(|c| {
                c.name.to_lowercase().contains(&query)
                    || c.address.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    fn save(&self, contact: Contact) -> Result<()> {
        let address = contact.address.trim();
        if address.is_empty() {
            anyhow::bail!("Contact address cannot be empty");
        }
        if is_blank(&contact.name) {
            anyhow::bail!("Contact name cannot be empty");
        }

        let mut contacts = self
            .contacts
            .write()
            .map_err(|_| anyhow!("Contact book lock poisoned"))?;
        let contact = Contact {
            address: address.to_string(),
            ..contact
        };
        contacts.insert(contact.address.clone(), contact);
        Ok(())
    }

    fn remove(&self, address: &str) -> Result<bool> {
        let mut contacts = self
            .contacts
            .write()
            .map_err(|_| anyhow!("Contact book lock poisoned"))?;
        Ok(contacts.remove(address.trim()).is_some())
    }
}
