//! G-code emission
//!
//! Converts the ordered move/draw command list into `G1` motion lines. Draw
//! moves carry a deposition amount proportional to the segment length.

use gcodehatch_core::{Command, GcodeLine, MoveMode};
use serde::{Deserialize, Serialize};

/// Segment length per unit of deposited material
pub const DEFAULT_EXTRUSION_DIVISOR: f64 = 10.0;

/// Emitter parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmitterParams {
    /// Deposition amount = segment length / extrusion_divisor
    pub extrusion_divisor: f64,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self {
            extrusion_divisor: DEFAULT_EXTRUSION_DIVISOR,
        }
    }
}

/// Emit one motion line per command.
///
/// The first command is always a plain positioning move whatever its mode.
/// Every later draw command gets `distance / extrusion_divisor` from the
/// previous position; move commands carry no deposition value.
pub fn emit_gcode(commands: &[Command], params: &EmitterParams) -> Vec<GcodeLine> {
    let Some((first, rest)) = commands.split_first() else {
        return Vec::new();
    };

    let mut lines = Vec::with_capacity(commands.len());
    lines.push(GcodeLine::travel(first.x, first.y));

    let mut previous = first.position();
    for command in rest {
        let target = command.position();
        let line = match command.mode {
            MoveMode::Move => GcodeLine::travel(target.x, target.y),
            MoveMode::Draw => {
                let distance = previous.distance_to(&target);
                GcodeLine::extrude(target.x, target.y, distance / params.extrusion_divisor)
            }
        };
        lines.push(line);
        previous = target;
    }

    lines
}

/// Join motion lines into a newline-separated program
pub fn render_program(lines: &[GcodeLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
