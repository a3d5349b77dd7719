use crate::messages::{ExtensionMessage, MessagePort, PendingReply};
use crate::settings::{
    clear_settings, load_settings, save_settings_patch, ChatSettings, SettingKey, SettingsPatch,
};
use crate::store::KeyValueStore;
use anyhow::{anyhow, Result};

/// Model behind the external settings surface. Edits are written to the
/// shared store first and then broadcast, one message per change.
pub struct SettingsEditor<S: KeyValueStore> {
    store: S,
    port: Option<MessagePort>,
    settings: ChatSettings,
}

impl<S: KeyValueStore> SettingsEditor<S> {
    pub fn load(store: S, port: Option<MessagePort>) -> Self {
        let settings = load_settings(&store);
        Self {
            store,
            port,
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set(&mut self, patch: SettingsPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        save_settings_patch(&mut self.store, &patch)?;
        self.settings.apply(&patch);
        tracing::debug!(keys = ?patch.keys(), "settings changed");
        self.broadcast(patch);
        Ok(())
    }

    pub fn set_toggle(&mut self, key: SettingKey, value: bool) -> Result<()> {
        let mut patch = SettingsPatch::default();
        if !patch.set_toggle(key, value) {
            return Err(anyhow!("{} is not a toggle", key.storage_key()));
        }
        self.set(patch)
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        self.set(SettingsPatch::language(language))
    }

    /// Drops every stored setting and pushes the full default snapshot so
    /// listeners resync all toggles, not only the ones that changed.
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        clear_settings(&mut self.store)?;
        self.settings = ChatSettings::default();
        tracing::info!("settings reset to defaults");
        self.broadcast(SettingsPatch::from_settings(&self.settings));
        Ok(())
    }

    pub fn request_status(&self) -> Result<PendingReply> {
        let port = self
            .port
            .as_ref()
            .ok_or_else(|| anyhow!("no overlay connected"))?;
        port.request(ExtensionMessage::GetStatus)
    }

    fn broadcast(&self, settings: SettingsPatch) {
        let Some(port) = &self.port else {
            return;
        };
        if let Err(err) = port.post(ExtensionMessage::UpdateSettings { settings }) {
            // The overlay context may not be running; the store already has
            // the value and it will be loaded on the next show.
            tracing::warn!(?err, "failed to broadcast settings change");
        }
    }
}
