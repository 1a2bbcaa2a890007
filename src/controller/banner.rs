use std::time::{Duration, Instant};

/// Self-dismissing connectivity banner
#[derive(Clone, Debug)]
pub struct Banner {
    shown_at: Option<Instant>,
    duration: Duration,
}

impl Banner {
    pub fn new(duration: Duration) -> Self {
        Self {
            shown_at: None,
            duration,
        }
    }

    /// Show (or re-arm) the banner from `now`
    pub fn show(&mut self, now: Instant) {
        self.shown_at = Some(now);
    }

    pub fn dismiss(&mut self) {
        self.shown_at = None;
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|shown| now.saturating_duration_since(shown) < self.duration)
    }

    /// Drop the banner once its time is up. Returns true if it was dismissed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.shown_at.is_some() && !self.is_visible(now) {
            self.shown_at = None;
            true
        } else {
            false
        }
    }

    pub fn shown_at(&self) -> Option<Instant> {
        self.shown_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_for_duration() {
        let start = Instant::now();
        let mut banner = Banner::new(Duration::from_secs(5));
        assert!(!banner.is_visible(start));

        banner.show(start);
        assert!(banner.is_visible(start + Duration::from_millis(4_999)));
        assert!(!banner.tick(start + Duration::from_secs(4)));
        assert!(!banner.is_visible(start + Duration::from_secs(5)));
        assert!(banner.tick(start + Duration::from_secs(5)));
        assert_eq!(banner.shown_at(), None);
    }

    #[test]
    fn test_reshow_extends() {
        let start = Instant::now();
        let mut banner = Banner::new(Duration::from_secs(5));
        banner.show(start);
        banner.show(start + Duration::from_secs(3));
        assert!(banner.is_visible(start + Duration::from_secs(7)));
    }
}
