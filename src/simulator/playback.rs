use crate::model::Waypoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
    Finished,
}

/// Observable progress of one carrier's playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub state: PlaybackState,
    /// Waypoints played so far.
    pub steps: usize,
    pub total: usize,
}

/// Cursor over a route: `Idle -> Running -> Finished`.
///
/// Each [`tick`](RoutePlayback::tick) yields the next waypoint. After the last one the
/// playback is finished, so a route of N waypoints yields exactly N positions.
#[derive(Debug, Clone)]
pub struct RoutePlayback {
    route: Vec<Waypoint>,
    cursor: usize,
    state: PlaybackState,
}

impl RoutePlayback {
    pub fn new(route: Vec<Waypoint>) -> Self {
        Self {
            route,
            cursor: 0,
            state: PlaybackState::Idle,
        }
    }

    /// Starts an idle playback. An empty route finishes immediately.
    pub fn start(&mut self) {
        if self.state == PlaybackState::Idle {
            self.state = if self.route.is_empty() {
                PlaybackState::Finished
            } else {
                PlaybackState::Running
            };
        }
    }

    pub fn tick(&mut self) -> Option<Waypoint> {
        if self.state != PlaybackState::Running {
            return None;
        }
        let waypoint = self.route.get(self.cursor).copied()?;
        self.cursor += 1;
        if self.cursor >= self.route.len() {
            self.state = PlaybackState::Finished;
        }
        Some(waypoint)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn progress(&self) -> Progress {
        Progress {
            state: self.state,
            steps: self.cursor,
            total: self.route.len(),
        }
    }
}
