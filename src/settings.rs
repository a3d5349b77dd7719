use crate::store::{read_json, write_json, JsonRead, KeyValueStore};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ShowHistory,
    ShowChatHeader,
    ShowChatBanner,
    HideSuperChatButtons,
    ShowChatTicker,
    ChatLanguage,
    AutoShowFullscreen,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::ShowHistory,
        SettingKey::ShowChatHeader,
        SettingKey::ShowChatBanner,
        SettingKey::HideSuperChatButtons,
        SettingKey::ShowChatTicker,
        SettingKey::ChatLanguage,
        SettingKey::AutoShowFullscreen,
    ];

    /// Toggles that have a checkbox in the overlay's own settings panel.
    pub const OVERLAY_TOGGLES: [SettingKey; 5] = [
        SettingKey::ShowHistory,
        SettingKey::ShowChatHeader,
        SettingKey::ShowChatBanner,
        SettingKey::HideSuperChatButtons,
        SettingKey::ShowChatTicker,
    ];

    pub fn storage_key(self) -> &'static str {
        match self {
            SettingKey::ShowHistory => "showHistory",
            SettingKey::ShowChatHeader => "showChatHeader",
            SettingKey::ShowChatBanner => "showChatBanner",
            SettingKey::HideSuperChatButtons => "hideSuperChatButtons",
            SettingKey::ShowChatTicker => "showChatTicker",
            SettingKey::ChatLanguage => "chatLanguage",
            SettingKey::AutoShowFullscreen => "autoShowFullscreen",
        }
    }

    pub fn checkbox_id(self) -> Option<&'static str> {
        match self {
            SettingKey::ShowHistory => Some("show-history-checkbox"),
            SettingKey::ShowChatHeader => Some("show-chat-header-checkbox"),
            SettingKey::ShowChatBanner => Some("show-chat-banner-checkbox"),
            SettingKey::HideSuperChatButtons => Some("hide-super-chat-buttons-checkbox"),
            SettingKey::ShowChatTicker => Some("show-chat-ticker-checkbox"),
            SettingKey::ChatLanguage | SettingKey::AutoShowFullscreen => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingKey::ShowHistory => "Show History",
            SettingKey::ShowChatHeader => "Show Chat Header",
            SettingKey::ShowChatBanner => "Show Chat Banner",
            SettingKey::HideSuperChatButtons => "Hide Super Chat Buttons",
            SettingKey::ShowChatTicker => "Show Chat Ticker",
            SettingKey::ChatLanguage => "Chat Language",
            SettingKey::AutoShowFullscreen => "Auto-show in Fullscreen",
        }
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.storage_key() == key)
    }
}

/// Every field has an explicit default, so a key missing from storage never
/// reads as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    /// When false the overlay collapses to the input row.
    #[serde(default = "default_true")]
    pub show_history: bool,
    #[serde(default = "default_true")]
    pub show_chat_header: bool,
    #[serde(default = "default_true")]
    pub show_chat_banner: bool,
    #[serde(default)]
    pub hide_super_chat_buttons: bool,
    #[serde(default = "default_true")]
    pub show_chat_ticker: bool,
    #[serde(default = "default_chat_language")]
    pub chat_language: String,
    /// Create the overlay automatically when a video page enters fullscreen.
    #[serde(default = "default_true")]
    pub auto_show_fullscreen: bool,
}

fn default_true() -> bool {
    true
}

fn default_chat_language() -> String {
    "en".to_string()
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            show_history: true,
            show_chat_header: true,
            show_chat_banner: true,
            hide_super_chat_buttons: false,
            show_chat_ticker: true,
            chat_language: default_chat_language(),
            auto_show_fullscreen: true,
        }
    }
}

impl ChatSettings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(value) = patch.show_history {
            self.show_history = value;
        }
        if let Some(value) = patch.show_chat_header {
            self.show_chat_header = value;
        }
        if let Some(value) = patch.show_chat_banner {
            self.show_chat_banner = value;
        }
        if let Some(value) = patch.hide_super_chat_buttons {
            self.hide_super_chat_buttons = value;
        }
        if let Some(value) = patch.show_chat_ticker {
            self.show_chat_ticker = value;
        }
        if let Some(value) = &patch.chat_language {
            self.chat_language = value.clone();
        }
        if let Some(value) = patch.auto_show_fullscreen {
            self.auto_show_fullscreen = value;
        }
    }

    pub fn toggle(&self, key: SettingKey) -> Option<bool> {
        match key {
            SettingKey::ShowHistory => Some(self.show_history),
            SettingKey::ShowChatHeader => Some(self.show_chat_header),
            SettingKey::ShowChatBanner => Some(self.show_chat_banner),
            SettingKey::HideSuperChatButtons => Some(self.hide_super_chat_buttons),
            SettingKey::ShowChatTicker => Some(self.show_chat_ticker),
            SettingKey::AutoShowFullscreen => Some(self.auto_show_fullscreen),
            SettingKey::ChatLanguage => None,
        }
    }
}

/// Sparse settings change. Absent fields mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_history: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_chat_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_chat_banner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_super_chat_buttons: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_chat_ticker: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_show_fullscreen: Option<bool>,
}

impl SettingsPatch {
    pub fn toggle(key: SettingKey, value: bool) -> Self {
        let mut patch = Self::default();
        patch.set_toggle(key, value);
        patch
    }

    pub fn language(language: impl Into<String>) -> Self {
        Self {
            chat_language: Some(language.into()),
            ..Self::default()
        }
    }

    /// Full snapshot expressed as a patch, used when every listener must
    /// resync (e.g. after a reset).
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            show_history: Some(settings.show_history),
            show_chat_header: Some(settings.show_chat_header),
            show_chat_banner: Some(settings.show_chat_banner),
            hide_super_chat_buttons: Some(settings.hide_super_chat_buttons),
            show_chat_ticker: Some(settings.show_chat_ticker),
            chat_language: Some(settings.chat_language.clone()),
            auto_show_fullscreen: Some(settings.auto_show_fullscreen),
        }
    }

    /// Returns false for keys that are not boolean toggles.
    pub fn set_toggle(&mut self, key: SettingKey, value: bool) -> bool {
        let slot = match key {
            SettingKey::ShowHistory => &mut self.show_history,
            SettingKey::ShowChatHeader => &mut self.show_chat_header,
            SettingKey::ShowChatBanner => &mut self.show_chat_banner,
            SettingKey::HideSuperChatButtons => &mut self.hide_super_chat_buttons,
            SettingKey::ShowChatTicker => &mut self.show_chat_ticker,
            SettingKey::AutoShowFullscreen => &mut self.auto_show_fullscreen,
            SettingKey::ChatLanguage => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn toggle_value(&self, key: SettingKey) -> Option<bool> {
        match key {
            SettingKey::ShowHistory => self.show_history,
            SettingKey::ShowChatHeader => self.show_chat_header,
            SettingKey::ShowChatBanner => self.show_chat_banner,
            SettingKey::HideSuperChatButtons => self.hide_super_chat_buttons,
            SettingKey::ShowChatTicker => self.show_chat_ticker,
            SettingKey::AutoShowFullscreen => self.auto_show_fullscreen,
            SettingKey::ChatLanguage => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn keys(&self) -> Vec<SettingKey> {
        SettingKey::ALL
            .into_iter()
            .filter(|key| match key {
                SettingKey::ChatLanguage => self.chat_language.is_some(),
                _ => self.toggle_value(*key).is_some(),
            })
            .collect()
    }
}

/// Loads each setting key independently and merges what is valid over the
/// defaults. Unreadable or wrongly typed values fall back to the default.
pub fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> ChatSettings {
    let mut patch = SettingsPatch::default();
    for key in SettingKey::ALL {
        match key {
            SettingKey::ChatLanguage => {
                patch.chat_language = read_setting::<String, _>(store, key);
            }
            _ => {
                if let Some(value) = read_setting::<bool, _>(store, key) {
                    patch.set_toggle(key, value);
                }
            }
        }
    }

    let mut settings = ChatSettings::default();
    settings.apply(&patch);
    tracing::debug!(?settings, "loaded chat settings");
    settings
}

fn read_setting<T, S>(store: &S, key: SettingKey) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match read_json::<T, _>(store, key.storage_key()) {
        Ok(JsonRead::Value(value)) => Some(value),
        Ok(JsonRead::Missing) => None,
        Ok(JsonRead::Corrupt(error)) => {
            tracing::warn!(key = key.storage_key(), %error, "ignoring invalid stored setting");
            None
        }
        Err(err) => {
            tracing::warn!(key = key.storage_key(), ?err, "failed to read setting");
            None
        }
    }
}

pub fn save_settings_patch<S: KeyValueStore + ?Sized>(
    store: &mut S,
    patch: &SettingsPatch,
) -> Result<()> {
    for key in patch.keys() {
        match key {
            SettingKey::ChatLanguage => {
                if let Some(language) = &patch.chat_language {
                    write_json(store, key.storage_key(), language)?;
                }
            }
            _ => {
                if let Some(value) = patch.toggle_value(key) {
                    write_json(store, key.storage_key(), &value)?;
                }
            }
        }
    }
    Ok(())
}

/// Removes only the setting keys; persisted geometry is left alone.
pub fn clear_settings<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    for key in SettingKey::ALL {
        store.remove(key.storage_key())?;
    }
    Ok(())
}
