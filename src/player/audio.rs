use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::foundation::error::{SuperzoomError, SuperzoomResult};

/// Soundtrack that shares a run's lifecycle: restarted at each run start, paused at the end.
pub trait AudioTrack {
    /// Rewind and start playing. Failures are [`SuperzoomError::Playback`].
    fn play_from_start(&mut self) -> SuperzoomResult<()>;
    /// Stop playing. Pausing an idle track is a no-op.
    fn pause(&mut self);
}

/// Plays an audio file through a headless `ffplay` process.
#[derive(Debug)]
pub struct ExternalPlayerTrack {
    path: PathBuf,
    program: String,
    child: Option<Child>,
}

impl ExternalPlayerTrack {
    /// Play `path` with `ffplay`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            program: "ffplay".to_string(),
            child: None,
        }
    }

    /// Use a different player binary accepting ffplay's flags.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Audio file played by this track.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a player process is currently alive.
    pub fn is_playing(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl AudioTrack for ExternalPlayerTrack {
    fn play_from_start(&mut self) -> SuperzoomResult<()> {
        self.pause();
        if !self.path.is_file() {
            return Err(SuperzoomError::playback(format!(
                "audio file '{}' does not exist",
                self.path.display()
            )));
        }
        let child = Command::new(&self.program)
            .args(["-nodisp", "-autoexit", "-loglevel", "quiet"])
            .arg(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SuperzoomError::playback(format!("failed to spawn '{}': {e}", self.program))
            })?;
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for ExternalPlayerTrack {
    fn drop(&mut self) {
        self.pause();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/audio.rs"]
mod tests;
