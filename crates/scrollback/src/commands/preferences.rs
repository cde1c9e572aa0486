use super::Command;
use crate::error::Error;
use eyre::Result;
use scrollback_core::config::ViewPreferences;
use std::io::Write;
use std::path::PathBuf;

pub struct PreferencesCommand {
    pub action: PreferencesAction,
    /// Overrides the default location
    pub path: Option<PathBuf>,
}

pub enum PreferencesAction {
    Show,
    Reset,
    Path,
}

impl Command for PreferencesCommand {
    fn execute(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        self.run(&mut stdout).map_err(Into::into)
    }
}

impl PreferencesCommand {
    pub fn run(&self, out: &mut impl Write) -> std::result::Result<(), Error> {
        match &self.action {
            PreferencesAction::Show => self.show(out),
            PreferencesAction::Reset => self.reset(out),
            PreferencesAction::Path => {
                writeln!(out, "{}", self.path()?.display())?;
                Ok(())
            }
        }
    }

    fn path(&self) -> std::result::Result<PathBuf, Error> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(ViewPreferences::config_path()?),
        }
    }

    fn show(&self, out: &mut impl Write) -> std::result::Result<(), Error> {
        let path = self.path()?;
        let prefs = ViewPreferences::load_from(&path)?;

        writeln!(out, "Preferences file: {}", path.display())?;
        writeln!(out, "\n{}", toml::to_string_pretty(&prefs)?)?;
        Ok(())
    }

    fn reset(&self, out: &mut impl Write) -> std::result::Result<(), Error> {
        let path = self.path()?;

        if path.exists() {
            std::fs::remove_file(&path)?;
            writeln!(out, "Preferences reset to defaults")?;
        } else {
            writeln!(out, "No preferences file found")?;
        }
        Ok(())
    }
}
