//! Player preferences and the explicitly owned background music service.

/// Playable droid models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActorModel {
    /// Red companion droid.
    #[default]
    D42,
    /// Golden companion droid.
    T33,
}

impl ActorModel {
    /// Resource name of the model's sprite set.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::D42 => "D42",
            Self::T33 => "T33",
        }
    }

    /// Parses a model name case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("d42") {
            Some(Self::D42)
        } else if name.eq_ignore_ascii_case("t33") {
            Some(Self::T33)
        } else {
            None
        }
    }
}

/// Choices made on the menu that outlive individual runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preferences {
    /// Droid the player controls.
    pub actor_model: ActorModel,
    /// Whether background music should play.
    pub music_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            actor_model: ActorModel::default(),
            music_enabled: true,
        }
    }
}

/// Device that actually plays the looping background track.
pub trait AudioBackend {
    /// Starts looping the background track.
    fn start_music(&mut self);
    /// Stops the background track.
    fn stop_music(&mut self);
    /// Reports whether the track is currently playing.
    fn is_playing(&self) -> bool;
}

/// Background music service with an explicit start and shutdown.
#[derive(Debug)]
pub struct AudioService<B: AudioBackend> {
    backend: B,
    music_enabled: bool,
    running: bool,
}

impl<B: AudioBackend> AudioService<B> {
    /// Creates a stopped service around the provided backend.
    #[must_use]
    pub fn new(backend: B, music_enabled: bool) -> Self {
        Self {
            backend,
            music_enabled,
            running: false,
        }
    }

    /// Starts the service, playing music when it is enabled.
    pub fn start(&mut self) {
        self.running = true;
        self.sync();
    }

    /// Stops any playing music and shuts the service down.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.sync();
    }

    /// Enables or disables the background music.
    pub fn set_music_enabled(&mut self, enabled: bool) {
        if self.music_enabled != enabled {
            log::info!("background music {}", if enabled { "enabled" } else { "disabled" });
        }
        self.music_enabled = enabled;
        self.sync();
    }

    /// Applies the music choice stored in the preferences.
    pub fn apply(&mut self, preferences: &Preferences) {
        self.set_music_enabled(preferences.music_enabled);
    }

    /// Reports whether music is enabled.
    #[must_use]
    pub const fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    /// Reports whether the service has been started and not shut down.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Backend driven by the service.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn sync(&mut self) {
        let should_play = self.running && self.music_enabled;
        if should_play && !self.backend.is_playing() {
            self.backend.start_music();
        } else if !should_play && self.backend.is_playing() {
            self.backend.stop_music();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingBackend {
        playing: bool,
        starts: usize,
        stops: usize,
    }

    impl AudioBackend for RecordingBackend {
        fn start_music(&mut self) {
            self.playing = true;
            self.starts += 1;
        }

        fn stop_music(&mut self) {
            self.playing = false;
            self.stops += 1;
        }

        fn is_playing(&self) -> bool {
            self.playing
        }
    }

    #[test]
    fn music_plays_only_while_running() {
        let mut audio = AudioService::new(RecordingBackend::default(), true);
        assert!(!audio.backend().is_playing());

        audio.start();
        audio.start();
        assert!(audio.backend().is_playing());
        assert_eq!(audio.backend().starts, 1);

        audio.shutdown();
        assert!(!audio.backend().is_playing());
        assert_eq!(audio.backend().stops, 1);
    }

    #[test]
    fn toggling_music_follows_preferences() {
        let mut audio = AudioService::new(RecordingBackend::default(), false);
        audio.start();
        assert!(!audio.backend().is_playing());

        audio.apply(&Preferences::default());
        assert!(audio.music_enabled());
        assert!(audio.backend().is_playing());

        audio.set_music_enabled(false);
        assert!(!audio.backend().is_playing());
    }

    #[test]
    fn actor_models_parse_by_name() {
        assert_eq!(ActorModel::from_name("t33"), Some(ActorModel::T33));
        assert_eq!(ActorModel::from_name("D42"), Some(ActorModel::D42));
        assert_eq!(ActorModel::from_name("R2"), None);
        assert_eq!(ActorModel::default().name(), "D42");
    }
}
