//! Wire shapes of journal events and snapshot files.

use serde::Deserialize;

use crate::models::StorageType;

fn one() -> u32 {
    1
}

/// Name and count of one inventory entry in a snapshot or pool event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InventoryItem {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

/// Contents of a ship locker or backpack, as written to `ShipLocker.json`,
/// `Backpack.json` and the matching journal events.
///
/// The journal also writes bare marker events without any sections when the
/// data went to the snapshot file instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PoolContents {
    pub items: Option<Vec<InventoryItem>>,
    pub components: Option<Vec<InventoryItem>>,
    pub consumables: Option<Vec<InventoryItem>>,
    pub data: Option<Vec<InventoryItem>>,
}

impl PoolContents {
    pub fn has_contents(&self) -> bool {
        self.items.is_some()
            || self.components.is_some()
            || self.consumables.is_some()
            || self.data.is_some()
    }

    pub fn records(&self) -> impl Iterator<Item = (StorageType, &str, u32)> + '_ {
        let sections = [
            (StorageType::Good, &self.items),
            (StorageType::Asset, &self.components),
            (StorageType::Asset, &self.consumables),
            (StorageType::Data, &self.data),
        ];
        sections.into_iter().flat_map(|(category, section)| {
            section
                .iter()
                .flatten()
                .map(move |item| (category, item.name.as_str(), item.count))
        })
    }

    pub fn len(&self) -> usize {
        self.records().count()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CommanderRecord {
    #[serde(rename = "FID")]
    pub fid: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LoadGameRecord {
    #[serde(rename = "FID", default)]
    pub fid: String,
    #[serde(default)]
    pub commander: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct EngineerEntry {
    pub engineer: Option<String>,
    #[serde(rename = "EngineerID")]
    pub engineer_id: Option<u64>,
    pub progress: Option<String>,
}

/// Either the start-of-session bulk form with an `Engineers` list or a
/// single update carrying the entry fields at top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct EngineerProgressRecord {
    #[serde(default)]
    pub engineers: Vec<EngineerEntry>,
    #[serde(flatten)]
    pub single: EngineerEntry,
}

impl EngineerProgressRecord {
    pub fn entries(&self) -> impl Iterator<Item = &EngineerEntry> {
        let single = (self.single.engineer.is_some() || self.single.engineer_id.is_some())
            .then_some(&self.single);
        self.engineers.iter().chain(single)
    }
}

/// `CollectItems`, `DropItems` and `UseConsumable`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ItemRecord {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default = "one")]
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct MicroResource {
    pub name: String,
    pub category: String,
    #[serde(default = "one")]
    pub count: u32,
}

/// Older builds write one resource at top level, newer ones a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BuyRecord {
    pub name: Option<String>,
    pub category: Option<String>,
    pub count: Option<u32>,
    #[serde(default)]
    pub micro_resources: Vec<MicroResource>,
}

impl BuyRecord {
    pub fn resources(&self) -> Vec<MicroResource> {
        if !self.micro_resources.is_empty() {
            return self.micro_resources.clone();
        }
        match (&self.name, &self.category) {
            (Some(name), Some(category)) => vec![MicroResource {
                name: name.clone(),
                category: category.clone(),
                count: self.count.unwrap_or(1),
            }],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SellRecord {
    #[serde(default)]
    pub micro_resources: Vec<MicroResource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TradeRecord {
    #[serde(default)]
    pub offered: Vec<MicroResource>,
    pub received: String,
    pub category: String,
    #[serde(default = "one")]
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Transfer {
    pub name: String,
    pub category: String,
    #[serde(default = "one")]
    pub count: u32,
    pub direction: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TransferRecord {
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// Journal events the engine reacts to, keyed by the `event` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event")]
pub(crate) enum JournalEvent {
    Commander(CommanderRecord),
    LoadGame(LoadGameRecord),
    EngineerProgress(EngineerProgressRecord),
    CollectItems(ItemRecord),
    DropItems(ItemRecord),
    UseConsumable(ItemRecord),
    BuyMicroResources(BuyRecord),
    SellMicroResources(SellRecord),
    TradeMicroResources(TradeRecord),
    TransferMicroResources(TransferRecord),
    #[serde(alias = "ShipLockerMaterials")]
    ShipLocker(PoolContents),
    Backpack(PoolContents),
    #[serde(other)]
    Other,
}
