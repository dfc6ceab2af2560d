pub mod decode;
pub mod encode;

/// A command which can be executed from the command line.
pub trait Command {
    /// Runs the command to completion.
    fn handle(self) -> eyre::Result<()>;
}
