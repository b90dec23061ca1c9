/// Recorder clock, `mm:ss`. Minutes keep growing past 99.
pub fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Feed duration label, `m:ss`; empty for unknown or zero durations.
pub fn duration_label(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) if secs >= 1.0 => {
            let whole = secs.floor() as u64;
            format!("{}:{:02}", whole / 60, whole % 60)
        }
        _ => String::new(),
    }
}
