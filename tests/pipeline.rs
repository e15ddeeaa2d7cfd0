//! End-to-end: mesh in, program text out, points parsed back.

use meshcam::engine::{generate_program, GenerationObserver, LayerReport, NoopObserver};
use meshcam::geometry::{Mesh, Vec3};
use meshcam::preview::parse_toolpath;
use meshcam::{load_inputs, CamError, CamSettings, PostProcessor, Strategy};

/// Side walls of a 10 mm cube, outward winding, open top and bottom.
fn open_box() -> Mesh {
    let verts = box_vertices();
    Mesh::new(verts, box_triangles()).unwrap()
}

fn box_vertices() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(10.0, 10.0, 0.0),
        Vec3::new(0.0, 10.0, 0.0),
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(10.0, 0.0, 10.0),
        Vec3::new(10.0, 10.0, 10.0),
        Vec3::new(0.0, 10.0, 10.0),
    ]
}

fn box_triangles() -> Vec<[usize; 3]> {
    vec![
        [0, 1, 5],
        [0, 5, 4],
        [1, 2, 6],
        [1, 6, 5],
        [2, 3, 7],
        [2, 7, 6],
        [3, 0, 4],
        [3, 4, 7],
    ]
}

/// The same box as the loader hands it over: metres, Y up, wound so each
/// face's normal points out of the box in that frame.
const OPEN_BOX_SOURCE: &str = r#"{
    "vertices": [
        [0, 0, 0], [0.01, 0, 0], [0.01, 0, 0.01], [0, 0, 0.01],
        [0, 0.01, 0], [0.01, 0.01, 0], [0.01, 0.01, 0.01], [0, 0.01, 0.01]
    ],
    "triangles": [
        [0, 5, 1], [0, 4, 5], [1, 6, 2], [1, 5, 6],
        [2, 7, 3], [2, 6, 7], [3, 4, 0], [3, 7, 4]
    ]
}"#;

fn open_box_json() -> String {
    OPEN_BOX_SOURCE.to_string()
}

fn plain_settings() -> CamSettings {
    CamSettings {
        step_down: 2.5,
        tool_compensation: false,
        ..Default::default()
    }
}

fn on_box_wall(p: &Vec3) -> bool {
    let near = |a: f64, b: f64| (a - b).abs() < 0.011;
    let inside = |a: f64| (-0.01..=10.01).contains(&a);
    ((near(p.x, 0.0) || near(p.x, 10.0)) && inside(p.y))
        || ((near(p.y, 0.0) || near(p.y, 10.0)) && inside(p.x))
}

#[test]
fn box_slices_into_closed_loops() {
    let program = generate_program(&open_box(), &plain_settings(), &mut NoopObserver).unwrap();

    // z = 0 only touches the bottom edges, so three layers remain
    assert_eq!(program.layer_count, 3);
    // 8 crossings per loop, plus the closing point
    assert_eq!(program.cut_points, 27);

    let points = parse_toolpath(&program.text());
    assert_eq!(points.len(), 27);
    assert!(points.iter().all(on_box_wall));
    for layer in points.chunks(9) {
        assert_eq!(layer[0], layer[8]);
    }
}

#[test]
fn layers_are_emitted_bottom_up() {
    let program = generate_program(&open_box(), &plain_settings(), &mut NoopObserver).unwrap();
    let heights: Vec<&str> = program
        .lines
        .iter()
        .filter_map(|l| l.strip_prefix("; Layer Z="))
        .collect();
    assert_eq!(heights, vec!["2.50", "5.00", "7.50"]);

    let plunges: Vec<&str> = program
        .lines
        .iter()
        .map(String::as_str)
        .filter(|l| l.starts_with("G1 Z"))
        .collect();
    assert_eq!(plunges, vec!["G1 Z-2.50 F300", "G1 Z-5.00 F300", "G1 Z-7.50 F300"]);
}

#[test]
fn compensated_loop_lies_outside_the_box() {
    let settings = CamSettings {
        tool_compensation: true,
        ..plain_settings()
    };
    let program = generate_program(&open_box(), &settings, &mut NoopObserver).unwrap();
    let points = parse_toolpath(&program.text());
    assert_eq!(points.len(), 27);
    for p in &points {
        let outside = p.x < -1.0 || p.x > 11.0 || p.y < -1.0 || p.y > 11.0;
        assert!(outside, "{p:?} is not outside the box");
    }
}

#[test]
fn loader_mesh_compensates_away_from_the_part() {
    let source: serde_json::Value = serde_json::from_str(OPEN_BOX_SOURCE).unwrap();
    let verts: Vec<[f64; 3]> = serde_json::from_value(source["vertices"].clone()).unwrap();
    let tris: Vec<[usize; 3]> = serde_json::from_value(source["triangles"].clone()).unwrap();
    let sub = |a: [f64; 3], b: [f64; 3]| [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    let center = [0.005, 0.005, 0.005];
    for [a, b, c] in &tris {
        let (a, b, c) = (verts[*a], verts[*b], verts[*c]);
        let (u, v) = (sub(b, a), sub(c, a));
        let n = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        let out = sub(a, center);
        let facing = n[0] * out[0] + n[1] * out[1] + n[2] * out[2];
        assert!(facing > 0.0, "triangle {a:?} {b:?} {c:?} faces inward");
    }

    let settings_json = r#"{"step_down": 2.5, "tool_diameter": 2.0}"#;
    let (mesh, settings) = load_inputs(OPEN_BOX_SOURCE, settings_json).unwrap();
    let program = generate_program(&mesh, &settings, &mut NoopObserver).unwrap();
    let points = parse_toolpath(&program.text());
    assert_eq!(points.len(), 27);
    for p in &points {
        let inside = p.x > 0.0 && p.x < 10.0 && p.y > 0.0 && p.y < 10.0;
        assert!(!inside, "{p:?} cuts into the part");
    }
    // front wall midpoint moves one tool radius toward -Y
    assert!(points.iter().any(|p| (p.y + 1.0).abs() < 0.01));
}

#[test]
fn mach3_terminates_motion_lines_only() {
    let settings = CamSettings {
        post_processor: PostProcessor::Mach3,
        ..plain_settings()
    };
    let program = generate_program(&open_box(), &settings, &mut NoopObserver).unwrap();
    for line in &program.lines {
        let motion = (line.starts_with("G0 Z") && !line.contains("Safe height"))
            || (line.starts_with("G0 X") && !line.contains("Return home"))
            || line.starts_with("G1");
        assert_eq!(line.ends_with(';'), motion, "{line}");
    }
    assert_eq!(parse_toolpath(&program.text()).len(), 27);
}

#[test]
fn json_round_trip_through_loader() {
    let settings_json = r#"{"step_down": 2.5, "tool_compensation": false}"#;
    let (mesh, settings) = load_inputs(&open_box_json(), settings_json).unwrap();
    let from_json = generate_program(&mesh, &settings, &mut NoopObserver).unwrap();
    let direct = generate_program(&open_box(), &plain_settings(), &mut NoopObserver).unwrap();
    assert_eq!(from_json.text(), direct.text());
}

#[test]
fn spiral_grows_per_layer() {
    #[derive(Default)]
    struct Counts(Vec<usize>);
    impl GenerationObserver for Counts {
        fn on_layer_complete(&mut self, report: &LayerReport) {
            self.0.push(report.points);
        }
    }

    let settings = CamSettings {
        strategy: Strategy::Spiral,
        step_over: 0.5,
        ..plain_settings()
    };
    let mut counts = Counts::default();
    let program = generate_program(&open_box(), &settings, &mut counts).unwrap();
    // radius 0 on the first layer emits nothing
    assert_eq!(counts.0, vec![360, 720, 1080]);
    assert_eq!(program.layer_count, 3);
    assert!(program.lines.contains(&"; Spiral layer Z=2.50".to_string()));

    let first = parse_toolpath(&program.text())[0];
    assert!((first.x - 5.5).abs() < 0.01);
    assert!((first.y - 5.0).abs() < 0.01);
}

#[test]
fn invalid_settings_produce_no_program() {
    #[derive(Default)]
    struct Failures(usize);
    impl GenerationObserver for Failures {
        fn on_validation_failure(&mut self, _error: &CamError) {
            self.0 += 1;
        }
    }

    for json in [
        r#"{"tool_diameter": 0}"#,
        r#"{"tool_diameter": -3}"#,
        r#"{"step_over": 0.05}"#,
        r#"{"step_over": 0.95}"#,
    ] {
        let (mesh, settings) = load_inputs(&open_box_json(), json).unwrap();
        let mut failures = Failures::default();
        let result = generate_program(&mesh, &settings, &mut failures);
        assert!(matches!(result, Err(CamError::InvalidSettings(_))), "{json}");
        assert_eq!(failures.0, 1);
    }
}

#[test]
fn generation_is_deterministic() {
    let settings = CamSettings {
        step_down: 0.7,
        ..Default::default()
    };
    let a = generate_program(&open_box(), &settings, &mut NoopObserver).unwrap();
    let b = generate_program(&open_box(), &settings, &mut NoopObserver).unwrap();
    assert_eq!(a, b);
}
