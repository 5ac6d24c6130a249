//! Per-track metadata for playlist listings.

use std::time::Duration;

use format_nsf::NsfHeader;

/// NSF tunes loop forever; listings give every track this length.
pub const TRACK_DURATION: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInfo {
    /// `<album>:<track>`.
    pub title: String,
    pub artist: String,
    /// The NSF title field.
    pub album: String,
    /// 1-based.
    pub track: u8,
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SongInfo {
    #[must_use]
    pub fn new(header: &NsfHeader, track: u8, sample_rate: u32) -> Self {
        Self {
            title: format!("{}:{track}", header.title),
            artist: header.artist.clone(),
            album: header.title.clone(),
            track,
            duration: TRACK_DURATION,
            sample_rate,
            channels: 1,
        }
    }
}
