use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use signal_hook::{consts::signal::*, low_level};

use crate::utils::cancel::CancelToken;

/// Make SIGINT and SIGTERM flip the token instead of killing the process, so
/// a run stops at the next frame boundary with the disk in a consistent
/// state. A repeated signal falls through to the default handler.
pub fn install_signal_cancel(token: &CancelToken) -> Result<(), std::io::Error> {
    let count = Arc::new(AtomicUsize::new(0));

    for flag in [SIGINT, SIGTERM] {
        let token = token.clone();
        let count = Arc::clone(&count);
        // SAFETY: this only uses atomic stuff and functions the crate itself
        // is using in signal handlers
        unsafe {
            low_level::register(flag, move || {
                token.cancel();
                let prev = count.fetch_add(1, Ordering::SeqCst);
                if prev >= 1 {
                    let _ = low_level::emulate_default_handler(flag);
                }
            })?;
        };
    }

    Ok(())
}
