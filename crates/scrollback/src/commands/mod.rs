use eyre::Result;

pub mod preferences;
pub mod render;

pub trait Command {
    fn execute(&self) -> Result<()>;
}
