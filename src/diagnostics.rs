//! Dismissible message-bar diagnostics for the in-call screen.
//!
//! Each media/network diagnostic maps to one banner. A banner is visible
//! while its diagnostic is active and the user hasn't dismissed it; a
//! dismissal holds until the diagnostic clears and fires again.

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod diagnostics_test;

use std::collections::HashMap;

/// Diagnostics surfaced as message bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaDiagnostic {
    NetworkUnavailable,
    NetworkRelaysUnreachable,
    NetworkReceiveQualityBad,
    NetworkSendQualityBad,
    SpeakingWhileMicrophoneMuted,
    CameraStartFailed,
    CameraStartTimedOut,
}

/// Display order, network issues first.
pub const ALL_DIAGNOSTICS: [MediaDiagnostic; 7] = [
    MediaDiagnostic::NetworkUnavailable,
    MediaDiagnostic::NetworkRelaysUnreachable,
    MediaDiagnostic::NetworkReceiveQualityBad,
    MediaDiagnostic::NetworkSendQualityBad,
    MediaDiagnostic::SpeakingWhileMicrophoneMuted,
    MediaDiagnostic::CameraStartFailed,
    MediaDiagnostic::CameraStartTimedOut,
];

/// Icon identifier the host maps to its asset set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerIcon {
    NetworkWarning,
    MicOff,
    VideoOff,
}

impl MediaDiagnostic {
    #[must_use]
    pub fn icon(self) -> BannerIcon {
        match self {
            Self::NetworkUnavailable
            | Self::NetworkRelaysUnreachable
            | Self::NetworkReceiveQualityBad
            | Self::NetworkSendQualityBad => BannerIcon::NetworkWarning,
            Self::SpeakingWhileMicrophoneMuted => BannerIcon::MicOff,
            Self::CameraStartFailed | Self::CameraStartTimedOut => BannerIcon::VideoOff,
        }
    }

    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::NetworkUnavailable => "You lost your network connection",
            Self::NetworkRelaysUnreachable => "Unable to establish a media connection",
            Self::NetworkReceiveQualityBad => "Network quality is low",
            Self::NetworkSendQualityBad => "Network is causing poor audio quality",
            Self::SpeakingWhileMicrophoneMuted => "You're muted",
            Self::CameraStartFailed => "Unable to start your camera",
            Self::CameraStartTimedOut => "Your camera is taking too long to start",
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BannerState {
    active: bool,
    dismissed: bool,
}

/// Visibility tracking for every diagnostic banner.
#[derive(Debug, Default)]
pub struct MessageBarStack {
    banners: HashMap<MediaDiagnostic, BannerState>,
}

impl MessageBarStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a diagnostic state change from the SDK. A diagnostic clearing
    /// re-arms its banner: the next activation shows it again even if it was
    /// dismissed before.
    pub fn update(&mut self, diagnostic: MediaDiagnostic, active: bool) {
        let banner = self.banners.entry(diagnostic).or_default();
        banner.active = active;
        if !active {
            banner.dismissed = false;
        }
    }

    /// The user dismissed a banner; it stays hidden until the diagnostic
    /// clears and fires again.
    pub fn dismiss(&mut self, diagnostic: MediaDiagnostic) {
        self.banners.entry(diagnostic).or_default().dismissed = true;
    }

    #[must_use]
    pub fn is_visible(&self, diagnostic: MediaDiagnostic) -> bool {
        self.banners
            .get(&diagnostic)
            .is_some_and(|b| b.active && !b.dismissed)
    }

    /// Currently visible banners in display order.
    #[must_use]
    pub fn visible(&self) -> Vec<MediaDiagnostic> {
        ALL_DIAGNOSTICS
            .into_iter()
            .filter(|d| self.is_visible(*d))
            .collect()
    }
}
