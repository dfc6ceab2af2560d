use std::path::PathBuf;

use clap::Args;
use eyre::WrapErr;
use pakket_bit_buf::BitReader;

use super::Command;
use crate::{
    cli::{read_input, HYPHEN},
    layout::Layout,
};

/// Subcommand for decoding bit-packed data according to a layout.
#[derive(Debug, Args)]
pub struct Decode {
    /// The comma-separated field layout of the data.
    ///
    /// Supported fields are bool, u1..u64, i1..i64, f32, f64,
    /// bytes:N, str and str:N.
    layout: Layout,

    /// The input file to decode, or "-" to read from stdin.
    #[clap(default_value = HYPHEN)]
    input: PathBuf,

    /// Bit offset in the input to start decoding at.
    #[clap(short, long, default_value_t = 0)]
    offset: usize,
}

impl Command for Decode {
    fn handle(self) -> eyre::Result<()> {
        let data = read_input(&self.input)?;
        log::debug!("Decoding {} fields from {} bytes", self.layout.0.len(), data.len());

        let mut reader = BitReader::new(data);
        reader.seek(self.offset);

        for (idx, field) in self.layout.0.iter().enumerate() {
            let value = field
                .decode(&mut reader)
                .wrap_err_with(|| format!("failed to decode field {idx} ({field})"))?;

            println!("{idx} {field} = {value}");
        }

        let remaining = reader.remaining_bits();
        if remaining > 0 {
            log::info!("{remaining} trailing bits were left undecoded");
        }

        Ok(())
    }
}
