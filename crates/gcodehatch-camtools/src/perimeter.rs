//! Perimeter path builder

use gcodehatch_core::{Command, Polygon};

/// Trace the polygon boundary once.
///
/// The polygon is closed first when its endpoints differ. Emits a move to
/// the first vertex and a draw to every following vertex, in order.
pub fn perimeter_path(polygon: &Polygon) -> Vec<Command> {
    let closed = polygon.closed();
    let mut points = closed.iter();

    let Some(start) = points.next() else {
        return Vec::new();
    };

    let mut commands = Vec::with_capacity(closed.len());
    commands.push(Command::move_to(start.x, start.y));
    commands.extend(points.map(|p| Command::draw_to(p.x, p.y)));
    commands
}
