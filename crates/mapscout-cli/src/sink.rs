use std::io::Write;

use mapscout_core::BusinessCollection;

/// Writes records as JSON lines, one object per business.
pub(crate) struct JsonLinesSink<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Writes every record and flushes.
    pub(crate) fn write_all(&mut self, businesses: &BusinessCollection) -> anyhow::Result<()> {
        for business in businesses {
            serde_json::to_writer(&mut self.out, business)?;
            self.out.write_all(b"\n")?;
            self.written += 1;
        }
        self.out.flush()?;
        Ok(())
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
