/// Percent of the video part handed to the transport. Held below 100 so
/// completion is only ever signalled by the server's answer.
pub fn transfer_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = sent.min(total).saturating_mul(100) / total;
    percent.min(99) as u8
}

/// One step of the cosmetic timer: advance by `step`, never past `cap`.
/// This value says nothing about bytes actually sent.
pub fn next_simulated(current: u8, step: u8, cap: u8) -> u8 {
    current.saturating_add(step).min(cap.min(99))
}
