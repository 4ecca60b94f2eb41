use log::Record;
use log4rs::encode::{Encode, Write};

// Erase the line, then return to column zero.
const CLEAR_LINE: &[u8] = b"\x1b[2K\r";

/// Starts every message on a blank line so it does not mix with a partly drawn progress bar.
#[derive(Debug)]
pub(super) struct ClearLine<E>(pub(super) E);

impl<E: Encode> Encode for ClearLine<E> {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        w.write_all(CLEAR_LINE)?;
        self.0.encode(w, record)
    }
}
