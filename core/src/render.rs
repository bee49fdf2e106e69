use std::time::{Duration, Instant};

/// Slår sammen raske mutasjoner til én render.
///
/// Hvert `schedule` kansellerer en ventende frist og setter en ny
/// (`now + window`). `poll` gir `true` nøyaktig én gang når fristen er
/// passert. Ingen timere: eieren poller fra sin egen event-loop.
#[derive(Debug, Clone)]
pub struct ComparisonRenderTrigger {
    window: Duration,
    deadline: Option<Instant>,
    requests: u64,
    renders: u64,
}

impl ComparisonRenderTrigger {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            requests: 0,
            renders: 0,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn schedule(&mut self) {
        self.schedule_at(Instant::now());
    }

    pub fn schedule_at(&mut self, now: Instant) {
        self.requests += 1;
        self.deadline = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Tid igjen til fristen, for eiere som vil sove frem til den.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                self.renders += 1;
                true
            }
            _ => false,
        }
    }

    /// Tvinger en ventende render nå.
    pub fn flush(&mut self) -> bool {
        if self.deadline.take().is_some() {
            self.renders += 1;
            true
        } else {
            false
        }
    }

    /// Forkaster ventende render uten å kjøre den.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }
}

impl Default for ComparisonRenderTrigger {
    fn default() -> Self {
        Self::from_millis(100)
    }
}
