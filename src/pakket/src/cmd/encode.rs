use std::path::PathBuf;

use clap::Args;
use eyre::WrapErr;
use pakket_bit_buf::BitWriter;

use super::Command;
use crate::{
    cli::{write_output, HYPHEN},
    layout::{Layout, Value},
};

/// Subcommand for encoding values into bit-packed data.
#[derive(Debug, Args)]
pub struct Encode {
    /// The comma-separated field layout of the data.
    ///
    /// Supported fields are bool, u1..u64, i1..i64, f32, f64,
    /// bytes:N, str and str:N.
    layout: Layout,

    /// One value per layout field.
    ///
    /// Byte runs are given as hex strings.
    #[clap(allow_hyphen_values = true)]
    values: Vec<String>,

    /// The output file, or "-" to write to stdout.
    #[clap(short, default_value = HYPHEN)]
    output: PathBuf,
}

impl Command for Encode {
    fn handle(self) -> eyre::Result<()> {
        let values = self.layout.parse_values(&self.values)?;

        let nbits: usize = values.iter().map(Value::bit_len).sum();
        log::debug!("Encoding {} fields into {nbits} bits", values.len());

        let mut writer = BitWriter::new(nbits.div_ceil(8));
        for (idx, value) in values.iter().enumerate() {
            value
                .encode(&mut writer)
                .wrap_err_with(|| format!("failed to encode field {idx}"))?;
        }

        write_output(&self.output, writer.data())
    }
}
