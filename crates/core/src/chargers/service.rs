//! EV charger service - selection and on/off control

use std::sync::Arc;

use emporia_domain::{EmporiaError, EvCharger, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::ports::ChargerGateway;
use super::selection;

/// Result of an on/off request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "charger", rename_all = "snake_case")]
pub enum ChargerUpdate {
    /// The API accepted the new state; carries the returned charger
    Changed(EvCharger),
    /// The charger was already in the requested state, nothing was sent
    Unchanged(EvCharger),
}

impl ChargerUpdate {
    pub fn charger(&self) -> &EvCharger {
        match self {
            Self::Changed(c) | Self::Unchanged(c) => c,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// EV charger service
pub struct ChargerService {
    gateway: Arc<dyn ChargerGateway>,
}

impl ChargerService {
    /// Create a new charger service
    pub fn new(gateway: Arc<dyn ChargerGateway>) -> Self {
        Self { gateway }
    }

    /// All chargers on the account (empty when the status has none)
    pub async fn ev_chargers(&self) -> Result<Vec<EvCharger>> {
        Ok(self.gateway.devices_status().await?.ev_chargers)
    }

    pub async fn ev_charger_ids(&self) -> Result<Vec<u64>> {
        Ok(selection::ids(&self.ev_chargers().await?))
    }

    /// Charger at `index` in API order
    #[instrument(skip(self))]
    pub async fn ev_charger(&self, index: usize) -> Result<Option<EvCharger>> {
        let chargers = self.ev_chargers().await?;
        let found = selection::by_index(&chargers, index).cloned();
        if found.is_none() {
            warn!(index, available = chargers.len(), "No EV charger at index");
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn ev_charger_by_id(&self, device_gid: u64) -> Result<Option<EvCharger>> {
        let chargers = self.ev_chargers().await?;
        let found = selection::by_id(&chargers, device_gid).cloned();
        if found.is_none() {
            warn!(device_gid, "No EV charger with this device gid");
        }
        Ok(found)
    }

    /// On/off state of the first charger
    pub async fn current_charger_state(&self) -> Result<Option<bool>> {
        Ok(self.ev_charger(0).await?.map(|c| c.charger_on))
    }

    /// Switch the first charger on or off
    ///
    /// # Errors
    /// Returns [`EmporiaError::NotFound`] when the account has no charger.
    #[instrument(skip(self))]
    pub async fn set_ev_charger(&self, on: bool) -> Result<ChargerUpdate> {
        let charger = self
            .ev_charger(0)
            .await?
            .ok_or_else(|| EmporiaError::NotFound("No EV charger on this account".to_string()))?;
        self.apply(charger, on).await
    }

    /// Switch the charger with `device_gid` on or off
    ///
    /// # Errors
    /// Returns [`EmporiaError::NotFound`] when no charger has that gid.
    #[instrument(skip(self))]
    pub async fn set_ev_charger_by_id(&self, device_gid: u64, on: bool) -> Result<ChargerUpdate> {
        let charger = self.ev_charger_by_id(device_gid).await?.ok_or_else(|| {
            EmporiaError::NotFound(format!("No EV charger with device gid {device_gid}"))
        })?;
        self.apply(charger, on).await
    }

    async fn apply(&self, charger: EvCharger, on: bool) -> Result<ChargerUpdate> {
        let state = if on { "on" } else { "off" };
        match selection::plan_toggle(&charger, on) {
            None => {
                info!(device_gid = charger.device_gid, state, "EV charger already in requested state");
                Ok(ChargerUpdate::Unchanged(charger))
            }
            Some(body) => {
                let updated = self.gateway.update_charger(&body).await?;
                info!(device_gid = updated.device_gid, state, "EV charger switched");
                Ok(ChargerUpdate::Changed(updated))
            }
        }
    }
}
