use chrono::{DateTime, Local};
use log::info;

/// Decide how the process ends.
///
/// With no watch handles the run is complete: report elapsed wall-clock time
/// and return, letting the process exit normally. With any handle alive we
/// must keep its filesystem subscription delivering events, so this blocks
/// until an external signal kills the process. There is no in-process
/// shutdown path.
pub fn finish<H>(handles: Vec<H>, started_at: DateTime<Local>) {
  if handles.is_empty() {
    let elapsed = Local::now().signed_duration_since(started_at);
    info!("finished in {:.2}s", elapsed.num_milliseconds() as f64 / 1000.0);
    return;
  }

  info!(
    "{} watch subscription(s) active; waiting for changes (Ctrl-C to stop)",
    handles.len()
  );
  // The handles must stay owned here: dropping them would cancel the watchers.
  let _handles = handles;
  loop {
    // park() can wake spuriously; nothing ever unparks us on purpose.
    std::thread::park();
  }
}
