use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => f.write_str("audio"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// Resolution and frame-rate hints for the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub channels: Option<u16>,
}

/// `audio: bool | {...}`, as accepted by capture APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AudioConstraints {
    Enabled(bool),
    Settings(AudioSettings),
}

impl AudioConstraints {
    pub fn is_enabled(&self) -> bool {
        match self {
            AudioConstraints::Enabled(enabled) => *enabled,
            AudioConstraints::Settings(_) => true,
        }
    }
}

impl Default for AudioConstraints {
    fn default() -> Self {
        AudioConstraints::Enabled(false)
    }
}

/// Capture request: `{video: {width, height, frameRate}, audio: bool|constraints}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConstraints {
    #[serde(deserialize_with = "video_or_flag")]
    pub video: Option<VideoConstraints>,
    pub audio: AudioConstraints,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: Some(VideoConstraints::default()),
            audio: AudioConstraints::default(),
        }
    }
}

/// `video: bool | {...}`; `true` means the default camera settings.
#[derive(Deserialize)]
#[serde(untagged)]
enum VideoSetting {
    Enabled(bool),
    Settings(VideoConstraints),
}

fn video_or_flag<'de, D>(deserializer: D) -> Result<Option<VideoConstraints>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<VideoSetting>::deserialize(deserializer)? {
        Some(VideoSetting::Enabled(true)) => Some(VideoConstraints::default()),
        Some(VideoSetting::Enabled(false)) | None => None,
        Some(VideoSetting::Settings(settings)) => Some(settings),
    })
}

impl MediaConstraints {
    pub fn kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.audio.is_enabled() {
            kinds.push(MediaKind::Audio);
        }
        if self.video.is_some() {
            kinds.push(MediaKind::Video);
        }
        kinds
    }
}
