use std::time::{Duration, Instant};

const FLUSH_EVERY: Duration = Duration::from_secs(1);

// Per-second counters become the displayed rate once a full second has passed.
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    pub generation_count: u64,
    pub total_cells: usize,
    pub active_cells: usize,
    pub births_this_second: u64,
    pub deaths_this_second: u64,
    pub birth_rate: f64,
    pub death_rate: f64,
    pub frames_this_second: u64,
    pub actual_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub avg_fps: f64,
    pub total_frames: u64,
    fps_samples: u64,
    last_stats_flush: Instant,
    last_fps_flush: Instant,
}

impl Metrics {
    pub fn new(now: Instant) -> Self {
        Self {
            generation_count: 0,
            total_cells: 0,
            active_cells: 0,
            births_this_second: 0,
            deaths_this_second: 0,
            birth_rate: 0.0,
            death_rate: 0.0,
            frames_this_second: 0,
            actual_fps: 0.0,
            min_fps: 0.0,
            max_fps: 0.0,
            avg_fps: 0.0,
            total_frames: 0,
            fps_samples: 0,
            last_stats_flush: now,
            last_fps_flush: now,
        }
    }

    pub fn with_generation(self, generation_count: u64) -> Self {
        Self {
            generation_count,
            ..self
        }
    }

    pub fn record_cells(
        mut self,
        now: Instant,
        total_cells: usize,
        active_cells: usize,
        births: u64,
        deaths: u64,
    ) -> Self {
        self.total_cells = total_cells;
        self.active_cells = active_cells;
        self.births_this_second += births;
        self.deaths_this_second += deaths;

        if now.saturating_duration_since(self.last_stats_flush) >= FLUSH_EVERY {
            self.birth_rate = self.births_this_second as f64;
            self.death_rate = self.deaths_this_second as f64;
            self.births_this_second = 0;
            self.deaths_this_second = 0;
            self.last_stats_flush = now;
        }
        self
    }

    pub fn record_frame(mut self, now: Instant) -> Self {
        self.frames_this_second += 1;
        self.total_frames += 1;

        if now.saturating_duration_since(self.last_fps_flush) >= FLUSH_EVERY {
            let fps = self.frames_this_second as f64;
            self.actual_fps = fps;
            self.fps_samples += 1;
            if self.fps_samples == 1 {
                self.min_fps = fps;
                self.max_fps = fps;
            } else {
                self.min_fps = self.min_fps.min(fps);
                self.max_fps = self.max_fps.max(fps);
            }
            self.avg_fps += (fps - self.avg_fps) / self.fps_samples as f64;
            self.frames_this_second = 0;
            self.last_fps_flush = now;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_flush_once_per_second() {
        let t0 = Instant::now();
        let mut m = Metrics::new(t0);
        m = m.record_cells(t0 + Duration::from_millis(200), 100, 10, 3, 1);
        m = m.record_cells(t0 + Duration::from_millis(600), 100, 12, 4, 2);
        assert_eq!(m.births_this_second, 7);
        assert_eq!(m.birth_rate, 0.0);

        m = m.record_cells(t0 + Duration::from_millis(1000), 100, 12, 1, 0);
        assert_eq!(m.birth_rate, 8.0);
        assert_eq!(m.death_rate, 3.0);
        assert_eq!(m.births_this_second, 0);
        assert_eq!(m.active_cells, 12);

        m = m.record_cells(t0 + Duration::from_millis(1500), 100, 9, 0, 3);
        assert_eq!(m.birth_rate, 8.0);
        assert_eq!(m.deaths_this_second, 3);
    }

    #[test]
    fn fps_tracks_min_max_avg() {
        let t0 = Instant::now();
        let mut m = Metrics::new(t0);
        for i in 1..=30 {
            m = m.record_frame(t0 + Duration::from_millis(i * 33));
        }
        // 30 * 33ms = 990ms: not yet a second.
        assert_eq!(m.actual_fps, 0.0);
        m = m.record_frame(t0 + Duration::from_millis(1000));
        assert_eq!(m.actual_fps, 31.0);
        assert_eq!(m.frames_this_second, 0);

        let t1 = t0 + Duration::from_millis(1000);
        for i in 1..=10 {
            m = m.record_frame(t1 + Duration::from_millis(i * 100));
        }
        assert_eq!(m.actual_fps, 10.0);
        assert_eq!(m.min_fps, 10.0);
        assert_eq!(m.max_fps, 31.0);
        assert_eq!(m.avg_fps, 20.5);
        assert_eq!(m.total_frames, 41);
    }

    #[test]
    fn stats_and_fps_clocks_are_independent() {
        let t0 = Instant::now();
        let m = Metrics::new(t0)
            .record_frame(t0 + Duration::from_millis(1100))
            .record_cells(t0 + Duration::from_millis(900), 10, 1, 1, 0);
        assert_eq!(m.actual_fps, 1.0);
        assert_eq!(m.birth_rate, 0.0);
        assert_eq!(m.births_this_second, 1);
    }
}
