/// Player state reported by the embedded widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Buffering,
}

/// Contract of the third-party video widget driven by the controller.
///
/// Implementations must tolerate being torn down and recreated whenever the
/// loaded video changes.
pub trait PlaybackAdapter: Send {
    /// Tear down any current player and create one for `video_id`
    fn load_video(&mut self, video_id: &str);

    /// Tear down the current player, leaving nothing loaded
    fn unload(&mut self);

    fn play(&mut self);

    fn pause(&mut self);

    fn seek_to(&mut self, seconds: f64);

    fn current_time(&self) -> f64;

    fn playback_state(&self) -> PlaybackState;
}
