use gcodehatch_camtools::{
    emit_gcode, generate_toolpath, normalize_primitives, render_program, EmitterParams,
    ToolpathInput, ToolpathParams,
};
use gcodehatch_core::{Command, MoveMode, Point, Polygon, Primitive, DEFAULT_POINT_TOLERANCE};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn assert_near(cmd: &Command, expected: Command) {
    assert_eq!(cmd.mode, expected.mode);
    assert!(
        cmd.position().approx_eq(&expected.position(), 1e-3),
        "{cmd:?} != {expected:?}"
    );
}

#[test]
fn test_square_is_centered_and_hatched() {
    let square = Polygon::new(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
    let params = ToolpathParams {
        spacing: 10.0,
        ..Default::default()
    };

    let toolpath = generate_toolpath(ToolpathInput::Polygon(square), &params).unwrap();

    let bounds = toolpath.polygon.bounds().unwrap();
    assert_eq!(bounds.center(), p(100.0, 100.0));
    assert_eq!(toolpath.polygon.points[0], p(95.0, 95.0));

    assert_eq!(toolpath.perimeter.len(), 5);
    assert_eq!(toolpath.perimeter[0], Command::move_to(95.0, 95.0));
    assert_eq!(toolpath.perimeter[4], Command::draw_to(95.0, 95.0));

    // x+y family first: the corner touch at c = 190, then one full span;
    // y-x family: the corner touch at c = -10, then one full span
    let expected = [
        Command::move_to(95.0, 95.0),
        Command::draw_to(95.0, 95.0),
        Command::move_to(99.142, 105.0),
        Command::draw_to(105.0, 99.142),
        Command::move_to(105.0, 95.0),
        Command::draw_to(105.0, 95.0),
        Command::move_to(95.0, 99.142),
        Command::draw_to(100.858, 105.0),
    ];
    assert_eq!(toolpath.infill.len(), expected.len());
    for (cmd, want) in toolpath.infill.iter().zip(expected) {
        assert_near(cmd, want);
    }

    let lines = emit_gcode(&toolpath.commands(), &EmitterParams::default());
    assert_eq!(lines.len(), toolpath.len());
    let program = render_program(&lines);
    let program_lines: Vec<&str> = program.lines().collect();
    assert_eq!(program_lines.len(), 13);
    assert_eq!(program_lines[0], "G1 X95.00 Y95.00");
    assert_eq!(program_lines[1], "G1 X105.00 Y95.00 E1.00");
    assert_eq!(program_lines[5], "G1 X95.00 Y95.00");
    assert_eq!(program_lines[6], "G1 X95.00 Y95.00 E0.00");
}

#[test]
fn test_infill_stays_inside_square() {
    let square = Polygon::new(vec![p(0.0, 0.0), p(60.0, 0.0), p(60.0, 30.0), p(0.0, 30.0)]);
    let toolpath = generate_toolpath(square.into(), &ToolpathParams::default()).unwrap();
    let bounds = toolpath.polygon.bounds().unwrap();

    for cmd in &toolpath.infill {
        assert!(cmd.x >= bounds.min_x - 1e-9 && cmd.x <= bounds.max_x + 1e-9);
        assert!(cmd.y >= bounds.min_y - 1e-9 && cmd.y <= bounds.max_y + 1e-9);
    }
    for pair in toolpath.infill.chunks_exact(2) {
        assert_eq!(pair[0].mode, MoveMode::Move);
        assert_eq!(pair[1].mode, MoveMode::Draw);
    }
}

#[test]
fn test_closed_polyline_bypasses_stitching() {
    let outline = vec![p(0.0, 0.0), p(40.0, 0.0), p(40.0, 20.0), p(0.0, 20.0)];
    let primitives = vec![
        Primitive::open(vec![p(-5.0, -5.0), p(-6.0, -6.0)]).with_source("LINE"),
        Primitive::closed(outline.clone()).with_source("LWPOLYLINE"),
    ];

    let stitched = normalize_primitives(primitives.clone(), DEFAULT_POINT_TOLERANCE).unwrap();
    assert_eq!(stitched.polygon.points, outline);
    assert!(stitched.fully_closed);

    let toolpath = generate_toolpath(primitives.into(), &ToolpathParams::default()).unwrap();
    assert!(toolpath.fully_closed);
    assert_eq!(toolpath.polygon.len(), 4);
    // Translated only: the shape is unchanged
    assert_eq!(toolpath.polygon.points[0], p(80.0, 90.0));
    assert_eq!(toolpath.polygon.points[2], p(120.0, 110.0));
}

#[test]
fn test_open_chain_is_placed_and_closed_by_perimeter() {
    let primitives = vec![
        Primitive::open(vec![p(0.0, 0.0), p(10.0, 0.0)]),
        // Needs reversing to attach
        Primitive::open(vec![p(10.0, 10.0), p(10.0, 0.0)]),
    ];

    let stitched = normalize_primitives(primitives.clone(), DEFAULT_POINT_TOLERANCE).unwrap();
    assert_eq!(
        stitched.polygon.points,
        vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]
    );
    assert!(!stitched.fully_closed);

    let toolpath = generate_toolpath(primitives.into(), &ToolpathParams::default()).unwrap();
    assert!(!toolpath.fully_closed);
    assert_eq!(
        toolpath.polygon.points,
        vec![p(95.0, 95.0), p(105.0, 95.0), p(105.0, 105.0)]
    );
    assert_eq!(toolpath.perimeter.len(), 4);
    assert_eq!(toolpath.perimeter[3], Command::draw_to(95.0, 95.0));
}

#[test]
fn test_inch_drawing_scales_before_centering() {
    let square = Polygon::new(vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)]);
    let params = ToolpathParams {
        scale_factor: 25.4,
        ..Default::default()
    };
    let toolpath = generate_toolpath(square.into(), &params).unwrap();
    let bounds = toolpath.polygon.bounds().unwrap();
    assert!((bounds.width() - 50.8).abs() < 1e-9);
    assert!((bounds.min_x - 74.6).abs() < 1e-9);
}
