//! Frame-by-frame preview stepping

use crate::renderer::{PreviewError, PreviewRenderer};
use gcodehatch_camtools::{emit_gcode, EmitterParams};
use gcodehatch_core::{Command, GcodeLine};
use image::RgbImage;
use std::path::Path;

/// Steps through a command list one command at a time.
///
/// The current frame is the index of the last command shown. A session owns
/// its copy of the commands and is never shared with the engine.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    renderer: PreviewRenderer,
    commands: Vec<Command>,
    lines: Vec<GcodeLine>,
    frame: usize,
}

impl PreviewSession {
    pub fn new(renderer: PreviewRenderer, commands: Vec<Command>) -> Self {
        Self::with_emitter_params(renderer, commands, &EmitterParams::default())
    }

    /// Status lines use `params` for their extrusion amounts
    pub fn with_emitter_params(
        renderer: PreviewRenderer,
        commands: Vec<Command>,
        params: &EmitterParams,
    ) -> Self {
        let lines = emit_gcode(&commands, params);
        Self {
            renderer,
            commands,
            lines,
            frame: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn last_frame(&self) -> usize {
        self.commands.len().saturating_sub(1)
    }

    /// Advance one command, stopping at the last
    pub fn step_forward(&mut self) -> usize {
        self.frame = (self.frame + 1).min(self.last_frame());
        self.frame
    }

    /// Go back one command, stopping at the first
    pub fn step_back(&mut self) -> usize {
        self.frame = self.frame.saturating_sub(1);
        self.frame
    }

    /// Jump to a frame, clamped to the program
    pub fn seek(&mut self, frame: usize) -> usize {
        self.frame = frame.min(self.last_frame());
        self.frame
    }

    pub fn current_command(&self) -> Option<&Command> {
        self.commands.get(self.frame)
    }

    /// Progress and motion line of the current head position, e.g.
    /// `Step 2/5: G1 X105.00 Y95.00 E1.00`
    pub fn status_line(&self) -> String {
        match self.lines.get(self.frame) {
            Some(line) => format!("Step {}/{}: {}", self.frame + 1, self.lines.len(), line),
            None => "No commands".to_string(),
        }
    }

    /// Render commands up to and including the current frame
    pub fn render(&self) -> RgbImage {
        self.renderer.render_frame(&self.commands, self.frame)
    }

    /// Write the current frame as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), PreviewError> {
        self.render()
            .save_with_format(path.as_ref(), image::ImageFormat::Png)?;
        Ok(())
    }
}
