//! Client configuration, supplied by the page as a JSON object.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioConfig {
    /// When false every sound request is dropped.
    pub enabled: bool,
    /// Linear gain applied to every effect.
    pub master_volume: f64,
    /// Fixed seed for the noise generator; unset draws one at unlock time.
    pub seed: Option<u64>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            enabled: true,
            master_volume: 0.3,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputConfig {
    /// Wheel pixels that make up one scrolled line.
    pub wheel_pixels_per_line: f64,
    /// Play the key clack for every mapped key press.
    pub key_click_sound: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            wheel_pixels_per_line: 40.0,
            key_click_sound: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub audio: AudioConfig,
    pub input: InputConfig,
    /// `log` level name: "error", "warn", "info", "debug" or "trace".
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            audio: AudioConfig::default(),
            input: InputConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let volume = self.audio.master_volume;
        if !volume.is_finite() || volume < 0.0 {
            return Err(ClientError::InvalidConfig(format!(
                "masterVolume must be a non-negative number, got {volume}"
            )));
        }
        let divisor = self.input.wheel_pixels_per_line;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(ClientError::InvalidConfig(format!(
                "wheelPixelsPerLine must be positive, got {divisor}"
            )));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| ClientError::InvalidConfig(format!("unknown logLevel '{}'", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let c = ClientConfig::from_json("{}").unwrap();
        assert_eq!(c, ClientConfig::default());
        assert_eq!(c.audio.master_volume, 0.3);
        assert_eq!(c.input.wheel_pixels_per_line, 40.0);
        assert_eq!(c.level_filter().unwrap(), log::LevelFilter::Info);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let c = ClientConfig::from_json(r#"{"audio":{"seed":7},"logLevel":"debug"}"#).unwrap();
        assert_eq!(c.audio.seed, Some(7));
        assert!(c.audio.enabled);
        assert!(c.input.key_click_sound);
        assert_eq!(c.level_filter().unwrap(), log::LevelFilter::Debug);
    }

    #[test]
    fn rejects_negative_volume() {
        let err = ClientConfig::from_json(r#"{"audio":{"masterVolume":-1}}"#).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn rejects_zero_wheel_divisor() {
        let err = ClientConfig::from_json(r#"{"input":{"wheelPixelsPerLine":0}}"#).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = ClientConfig::from_json(r#"{"logLevel":"loud"}"#).unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            ClientConfig::from_json("not json"),
            Err(ClientError::Json(_))
        ));
    }
}
