//! A console progress bar for headless runs.
//!
//! A scenario has no fixed length, so progress is measured by how much of the population has
//! recovered. The bar is labeled "Recovered", its maximum is the population size, and the
//! runner updates it with the recovered count after every tick. When the `progress_bar`
//! feature is disabled these functions do nothing.
#[cfg(feature = "progress_bar")]
use progress_bar::{
    finalize_progress_bar, init_progress_bar, set_progress_bar_action, set_progress_bar_progress,
    Color, Style,
};

use crate::log::trace;

pub const RECOVERED_LABEL: &str = "Recovered";

/// Initializes a custom progress bar with the given label and max value.
///
/// Note: If you attempt to set two progress bars, the second progress bar will replace the first.
pub fn init_custom_progress_bar(label: &str, max_value: usize) {
    trace!(
        "initializing custom progress bar with label {} and max value {}",
        label,
        max_value
    );
    #[cfg(feature = "progress_bar")]
    {
        init_progress_bar(max_value);
        set_progress_bar_action(label, Color::Blue, Style::Bold);
    }
}

/// Updates the current value of the custom progress bar.
pub fn update_custom_progress(current_value: usize) {
    #[cfg(feature = "progress_bar")]
    set_progress_bar_progress(current_value);
    #[cfg(not(feature = "progress_bar"))]
    let _ = current_value;
}

/// Completes the progress bar and moves the cursor past it.
pub fn finalize_custom_progress() {
    trace!("finalizing custom progress bar");
    #[cfg(feature = "progress_bar")]
    finalize_progress_bar();
}
