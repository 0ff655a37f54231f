//! FFmpeg progress parsing.
//!
//! FFmpeg reports encode position on its error stream as `time=HH:MM:SS.ms`
//! tokens interleaved with the rest of the log. [`ProgressScanner`] extracts
//! those tokens from arbitrarily chunked reads, converts them to an integer
//! percentage of the probed duration and throttles updates so downstream
//! sinks only see the percent when it advances.

/// Longest tail kept between chunks while waiting for a token terminator.
const CARRY_LIMIT: usize = 64;

/// Incremental scanner over FFmpeg's error stream.
#[derive(Debug)]
pub struct ProgressScanner {
    duration_seconds: f64,
    last_percent: Option<u32>,
    carry: String,
}

impl ProgressScanner {
    /// Create a scanner for a stream encoding `duration_seconds` of media.
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            duration_seconds,
            last_percent: None,
            carry: String::new(),
        }
    }

    /// Feed one chunk of stderr output; returns the percent updates to emit.
    ///
    /// Updates are strictly increasing except for 100, which may repeat.
    pub fn push(&mut self, chunk: &str) -> Vec<u32> {
        let mut updates = Vec::new();
        if self.duration_seconds <= 0.0 {
            return updates;
        }

        let buf = format!("{}{}", self.carry, chunk);
        self.carry.clear();

        let mut rest = buf.as_str();
        while let Some(idx) = rest.find("time=") {
            let token_start = idx + "time=".len();
            let after = &rest[token_start..];
            match after.find(|c: char| c == ' ' || c == '\r' || c == '\n') {
                Some(end) => {
                    if let Some(seconds) = parse_ffmpeg_time(&after[..end]) {
                        if let Some(percent) = self.percent_for(seconds) {
                            updates.push(percent);
                        }
                    }
                    rest = &after[end..];
                }
                None => {
                    // Token may continue in the next chunk.
                    self.carry = format!("time={}", after);
                    if self.carry.len() > CARRY_LIMIT {
                        self.carry.clear();
                    }
                    return updates;
                }
            }
        }

        // Keep a short tail in case "time=" itself is split across chunks.
        let mut tail_start = rest.len().saturating_sub("time=".len() - 1);
        while !rest.is_char_boundary(tail_start) {
            tail_start -= 1;
        }
        self.carry = rest[tail_start..].to_string();

        updates
    }

    /// Force the terminal 100% update after a successful run.
    pub fn finish(&mut self) -> Option<u32> {
        if self.last_percent == Some(100) {
            None
        } else {
            self.last_percent = Some(100);
            Some(100)
        }
    }

    fn percent_for(&mut self, seconds: f64) -> Option<u32> {
        let percent = ((seconds / self.duration_seconds) * 100.0) as u32;
        let percent = percent.min(100);
        let advanced = match self.last_percent {
            Some(last) => percent > last,
            None => true,
        };
        if advanced || percent == 100 {
            self.last_percent = Some(percent);
            Some(percent)
        } else {
            None
        }
    }
}

/// Parse an FFmpeg `HH:MM:SS.ms` time token to seconds.
///
/// Fractions longer than two decimals are truncated, matching the precision
/// FFmpeg itself reports in its status line.
pub fn parse_ffmpeg_time(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.len() < 8 {
        return None;
    }

    let mut parts = token.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let mut seconds_str = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if let Some(dot) = seconds_str.find('.') {
        let end = (dot + 3).min(seconds_str.len());
        if !seconds_str.is_char_boundary(end) {
            return None;
        }
        seconds_str = &seconds_str[..end];
    }
    let seconds: f64 = seconds_str.parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
