use std::fs;
use std::path::Path;

use society_core::service::SocietyService;
use society_core::store::{SocietyState, SocietyStore};

/// Load the store from the JSON state file; a missing file is an empty store.
pub fn load(path: &str) -> Result<SocietyStore, Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        return Ok(SocietyStore::new());
    }
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{path}': {e}"))?;
    let state: SocietyState =
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse '{path}': {e}"))?;
    Ok(SocietyStore::restore(state))
}

/// Persist the whole store back to the state file.
pub fn save(path: &str, service: &SocietyService) -> Result<(), Box<dyn std::error::Error>> {
    let state = service.store().snapshot()?;
    let contents = serde_json::to_string_pretty(&state)?;
    fs::write(path, contents).map_err(|e| format!("Failed to write '{path}': {e}"))?;
    Ok(())
}
