//! Shared fixtures and an in-memory registry for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use ddi_harvester::client::{ItemEnvelope, ItemTypeCodes, RegistryClient, SetMember};
use ddi_harvester::{HarvesterError, Result};
use serde_json::{json, Map};

pub const AGENCY: &str = "uk.cls.nextsteps";

pub const CODE_LIST_QUESTION_ID: &str = "5f0a3c2e-8b1d-4c7a-9e55-0d3b2a1c4f01";
pub const TEXT_QUESTION_ID: &str = "7e470000-0000-4000-8000-000000000001";
pub const NUMERIC_QUESTION_ID: &str = "0a9e0000-0000-4000-8000-000000000001";
pub const CODE_LIST_ID: &str = "c0de1157-0000-4000-8000-000000000001";
pub const INSTRUCTION_ID: &str = "1a57c0de-0000-4000-8000-000000000009";
pub const CATEGORY_IDS: [&str; 3] = [
    "ca7e0000-0000-4000-8000-00000000000a",
    "ca7e0000-0000-4000-8000-00000000000b",
    "ca7e0000-0000-4000-8000-00000000000c",
];

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load fixture file content.
pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

pub fn type_codes() -> ItemTypeCodes {
    ItemTypeCodes::from_file(&fixture_path("type_codes.json")).unwrap()
}

/// Type code for a label from the fixture table.
pub fn code(label: &str) -> String {
    let table: Map<String, serde_json::Value> =
        serde_json::from_str(&load_fixture("type_codes.json")).unwrap();
    table[label].as_str().unwrap().to_string()
}

pub fn category_xml(id: &str, name: &str, user_id: &str) -> String {
    format!(
        r#"<Fragment xmlns:r="ddi:reusable:3_2" xmlns="ddi:instance:3_2">
  <Category isUniversallyUnique="true" xmlns="ddi:logicalproduct:3_2">
    <r:URN>urn:ddi:{AGENCY}:{id}:1</r:URN>
    <r:UserID typeOfUserID="colectica:sourceId">{user_id}</r:UserID>
    <r:Label><r:Content xml:lang="en-GB">{name}</r:Content></r:Label>
    <CategoryName><r:String xml:lang="en-GB">{name}</r:String></CategoryName>
  </Category>
</Fragment>"#
    )
}

/// In-memory registry keyed by agency and identifier.
#[derive(Default)]
pub struct FakeRegistry {
    items: HashMap<(String, String), ItemEnvelope>,
    sets: HashMap<(String, String, String), Vec<SetMember>>,
    codes: ItemTypeCodes,
    delays: HashMap<String, Duration>,
    fetches: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            codes: type_codes(),
            ..Self::default()
        }
    }

    pub fn with_item(mut self, label: &str, identifier: &str, version: u32, xml: &str) -> Self {
        let envelope: ItemEnvelope = serde_json::from_value(json!({
            "ItemType": code(label),
            "AgencyId": AGENCY,
            "Identifier": identifier,
            "Version": version,
            "Item": xml,
            "VersionDate": "2021-03-04T10:15:00Z",
            "IsDeprecated": false
        }))
        .unwrap();
        let key = (AGENCY.to_string(), identifier.to_string());
        self.items.insert(key, envelope);
        self
    }

    pub fn with_fixture(self, label: &str, identifier: &str, version: u32, fixture: &str) -> Self {
        self.with_item(label, identifier, version, &load_fixture(fixture))
    }

    pub fn with_set(mut self, identifier: &str, version: &str, members: Vec<SetMember>) -> Self {
        self.sets.insert(
            (AGENCY.to_string(), identifier.to_string(), version.to_string()),
            members,
        );
        self
    }

    /// Delay responses for one identifier.
    pub fn with_delay(mut self, identifier: &str, delay: Duration) -> Self {
        self.delays.insert(identifier.to_string(), delay);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Registry holding the code list, text and numeric questions with
    /// everything they reference.
    pub fn standard() -> Self {
        let fixtures = [
            ("Question", CODE_LIST_QUESTION_ID, 2, "question_code_list.xml"),
            ("Question", TEXT_QUESTION_ID, 1, "question_text.xml"),
            ("Question", NUMERIC_QUESTION_ID, 3, "question_numeric.xml"),
            ("Code Set", CODE_LIST_ID, 4, "code_list.xml"),
            ("Interviewer Instruction", INSTRUCTION_ID, 1, "instruction.xml"),
        ];
        let names = [("Own outright", "1"), ("Rent", "2"), ("Other", "3")];

        let mut registry = Self::new();
        for (label, id, version, fixture) in fixtures {
            registry = registry.with_fixture(label, id, version, fixture);
        }
        for (id, (name, user_id)) in CATEGORY_IDS.iter().zip(names) {
            registry = registry.with_item("Category", id, 1, &category_xml(id, name, user_id));
        }
        registry
    }
}

impl RegistryClient for FakeRegistry {
    fn get_an_item(&self, agency: &str, identifier: &str) -> Result<ItemEnvelope> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(identifier) {
            thread::sleep(*delay);
        }
        self.items
            .get(&(agency.to_string(), identifier.to_string()))
            .cloned()
            .ok_or_else(|| HarvesterError::ItemNotFound {
                agency: agency.to_string(),
                identifier: identifier.to_string(),
            })
    }

    fn get_a_set_typed(
        &self,
        agency: &str,
        identifier: &str,
        version: &str,
    ) -> Result<Vec<SetMember>> {
        self.sets
            .get(&(agency.to_string(), identifier.to_string(), version.to_string()))
            .cloned()
            .ok_or_else(|| HarvesterError::ItemNotFound {
                agency: agency.to_string(),
                identifier: identifier.to_string(),
            })
    }

    fn item_type_label(&self, code: &str) -> Result<String> {
        self.codes.label(code).map(str::to_string)
    }
}
