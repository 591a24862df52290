use crate::item::{Item, ItemPatch};
use log::{debug, error, info, warn};
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};
use ErrorMessage::*;

pub const DEFAULT_INVENTORY_PATH: &str = "./inventory.json";

#[derive(Debug, Clone)]
pub struct Store {
    file_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessage {
    ItemNotFound,
    CouldNotRead,
    CouldNotParse,
    CouldNotWrite,
    IdsExhausted,
    TotalTooLarge,
}

#[derive(Debug)]
pub struct InventoryError {
    pub kind: ErrorMessage,
    message: String,
}

impl ErrorMessage {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ItemNotFound => "Funko Pop not found",
            CouldNotRead => "Error reading inventory file",
            CouldNotParse => "Error parsing inventory file",
            CouldNotWrite => "Error writing to inventory file",
            IdsExhausted => "No IDs left to assign",
            TotalTooLarge => "Cart total is too large to compute",
        }
    }
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for InventoryError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for InventoryError {}

impl InventoryError {
    pub fn boxed(kind: ErrorMessage, details: Option<String>) -> Box<dyn Error> {
        let message = match details {
            Some(details) => format!("{}: {}", kind, details),
            None => kind.to_string(),
        };
        Box::new(InventoryError { kind, message })
    }

    pub fn not_found(id: i64) -> Box<dyn Error> {
        InventoryError::boxed(ItemNotFound, Some(format!("ID {}", id)))
    }

    pub fn is_not_found(error: &(dyn Error + 'static)) -> bool {
        matches!(
            error.downcast_ref::<InventoryError>(),
            Some(InventoryError { kind: ItemNotFound, .. })
        )
    }
}

pub fn next_id(items: &[Item]) -> Result<i64, Box<dyn Error>> {
    match items.iter().map(|item| item.id).max() {
        Some(id) => id
            .checked_add(1)
            .ok_or_else(|| InventoryError::boxed(IdsExhausted, None)),
        None => Ok(1),
    }
}

impl Store {
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Store {
            file_path: file_path.unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY_PATH)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Reads the whole inventory, failing on a missing or malformed file.
    pub fn try_load(&self) -> Result<Vec<Item>, Box<dyn Error>> {
        let file = File::open(&self.file_path)
            .map_err(|e| InventoryError::boxed(CouldNotRead, Some(e.to_string())))?;
        let reader = BufReader::new(file);
        serde_json::from_reader::<_, Vec<Item>>(reader)
            .map_err(|e| InventoryError::boxed(CouldNotParse, Some(e.to_string())))
    }

    /// Reads the whole inventory. Any failure is logged and yields an empty inventory.
    pub fn load(&self) -> Vec<Item> {
        match self.try_load() {
            Ok(items) => {
                debug!("Loaded {} items from {}", items.len(), self.file_path.display());
                items
            }
            Err(e) => {
                match e.downcast_ref::<InventoryError>() {
                    Some(InventoryError { kind: CouldNotRead, .. }) => warn!("{}", e),
                    _ => error!("{}", e),
                }
                Vec::new()
            }
        }
    }

    /// Overwrites the store with `items`. The data goes to a sibling file first and is
    /// renamed into place, so a failed write leaves the previous store intact.
    pub fn try_save(&self, items: &[Item]) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| InventoryError::boxed(CouldNotWrite, Some(e.to_string())))?;
        let staging = self.staging_path();
        let written = File::create(&staging)
            .and_then(|mut file| file.write_all(json.as_bytes()).and_then(|_| file.sync_all()))
            .and_then(|_| fs::rename(&staging, &self.file_path));
        match written {
            Ok(_) => Ok(()),
            Err(e) => {
                let _ = fs::remove_file(&staging);
                Err(InventoryError::boxed(CouldNotWrite, Some(e.to_string())))
            }
        }
    }

    /// Overwrites the store, logging the outcome.
    pub fn save(&self, items: &[Item]) -> Result<(), Box<dyn Error>> {
        match self.try_save(items) {
            Ok(_) => {
                info!("Inventory saved successfully!");
                Ok(())
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    pub fn add(
        &self,
        name: &str,
        price_in_cents: i64,
        in_stock: bool,
        series: &str,
    ) -> Result<Item, Box<dyn Error>> {
        let mut items = self.load();
        let item = Item::new(next_id(&items)?, name, price_in_cents, in_stock, series);
        items.push(item.clone());
        self.save(&items)?;
        info!("Item {} added", item.id);
        Ok(item)
    }

    /// One summary line per item, recomputed from the store on every call.
    pub fn list(&self) -> impl Iterator<Item = String> {
        self.load().into_iter().map(|item| item.summary())
    }

    pub fn find(&self, id: i64) -> Option<Item> {
        self.load().into_iter().find(|item| item.id == id)
    }

    pub fn view(&self, id: i64) -> Result<Item, Box<dyn Error>> {
        self.find(id).ok_or_else(|| InventoryError::not_found(id))
    }

    pub fn update(&self, id: i64, patch: ItemPatch) -> Result<Item, Box<dyn Error>> {
        let mut items = self.load();
        let item = match items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.apply(patch);
                item.clone()
            }
            None => return Err(InventoryError::not_found(id)),
        };
        self.save(&items)?;
        info!("Item {} updated", id);
        Ok(item)
    }

    /// Removes the item with `id` if present and saves regardless.
    /// Returns whether an item was removed.
    pub fn delete(&self, id: i64) -> Result<bool, Box<dyn Error>> {
        let mut items = self.load();
        let before = items.len();
        items.retain(|item| item.id != id);
        let removed = items.len() < before;
        self.save(&items)?;
        if removed {
            info!("Item {} removed", id);
        } else {
            debug!("No item with ID {} to remove", id);
        }
        Ok(removed)
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new(None)
    }
}
