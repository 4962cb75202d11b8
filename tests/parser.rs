use diagsvg::{
    BaselineShift, Element, FontMetrics, Node, Options, Point, Position, Size, Transform,
    TransformOp, Tree,
};

fn parse(svg: &str) -> Tree {
    Tree::from_str(svg, &Options::default()).unwrap()
}

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

fn find<'a>(tree: &'a Tree, id: &str) -> &'a Node {
    tree.root()
        .descendants()
        .find(|n| n.info.id.as_deref() == Some(id))
        .unwrap()
}

#[test]
fn size_detection() {
    let tree = parse("<svg viewBox='0 0 10 20' xmlns='http://www.w3.org/2000/svg'/>");
    assert_eq!(tree.size(), Some(Size::new(10.0, 20.0)));

    let tree = parse("<svg width='30' height='40' viewBox='0 0 10 20'/>");
    assert_eq!(tree.size(), Some(Size::new(30.0, 40.0)));
    assert_eq!(tree.view_box().map(|r| r.height), Some(20.0));

    let tree = parse("<svg width='30'/>");
    assert_eq!(tree.size(), None);
}

#[test]
fn path_data() {
    let tree = parse("<svg><path id='p' d='M 10 10 L 90 10 C 1 2, 3 4, 5 6 Q 1 1 2 2 A 4 4 0 1 0 8 8 Z'/></svg>");
    match find(&tree, "p").kind {
        Element::Path(ref path) => {
            assert_eq!(
                path.data.to_string(),
                "[M 10.0 10.0, L 90.0 10.0, C 1.0 2.0, 3.0 4.0, 5.0 6.0, \
                 Q 1.0 1.0, 2.0 2.0, A 4.0 4.0 0.0 1 0 8.0 8.0, Z]"
            );
        }
        _ => unreachable!(),
    }
}

#[test]
fn id_beats_class() {
    for css in [
        "#n { fill: red } .c { fill: blue }",
        ".c { fill: blue } #n { fill: red }",
    ] {
        let svg = format!("<svg><style>{}</style><rect id='n' class='c'/></svg>", css);
        let tree = parse(&svg);
        let rect = find(&tree, "n");
        assert_eq!(rect.info.style("fill", tree.styles()).as_deref(), Some("red"));
    }
}

#[test]
fn same_specificity_last_wins() {
    let tree = parse("<svg><style>.a { fill: red } .b { fill: blue }</style><rect id='r' class='a b'/></svg>");
    let rect = find(&tree, "r");
    assert_eq!(rect.info.style("fill", tree.styles()).as_deref(), Some("blue"));
}

#[test]
fn inline_style_beats_cascade() {
    let tree = parse(
        "<svg><style>rect { fill: red !important }</style>
              <rect id='a' style='fill: blue'/>
              <rect id='b' fill='green'/></svg>",
    );

    let styles = tree.styles();
    let a = find(&tree, "a");
    assert_eq!(a.info.style("fill", styles).as_deref(), Some("blue"));
    assert_eq!(a.info.property("fill", styles).as_deref(), Some("red"));

    let b = find(&tree, "b");
    assert_eq!(b.info.style("fill", styles).as_deref(), Some("red"));
    assert_eq!(b.info.property("fill", styles).as_deref(), Some("green"));
}

#[test]
fn inheritance() {
    let tree = parse(
        "<svg><style>#graph .node { stroke: red }</style>
              <g id='graph' font-size='12'>
                  <g class='node' style='fill: blue'><circle id='c'/></g>
              </g></svg>",
    );

    let styles = tree.styles();
    let circle = find(&tree, "c");
    assert_eq!(circle.info.style("stroke", styles).as_deref(), Some("red"));
    assert_eq!(circle.info.style("fill", styles).as_deref(), Some("blue"));
    assert_eq!(circle.info.property("font-size", styles).as_deref(), Some("12"));
}

#[test]
fn user_style_sheet() {
    let opt = Options {
        style_sheet: Some(".a { fill: green }".to_string()),
        ..Options::default()
    };

    let svg = "<svg><style>.a { fill: red }</style><rect id='r' class='a'/></svg>";
    let tree = Tree::from_str(svg, &opt).unwrap();
    let rect = find(&tree, "r");
    assert_eq!(rect.info.style("fill", tree.styles()).as_deref(), Some("green"));
}

#[test]
fn invalid_style_is_skipped() {
    let tree = parse("<svg><style>.a { fill: red }</style><style>{</style><rect id='r' class='a'/></svg>");
    let rect = find(&tree, "r");
    assert_eq!(rect.info.style("fill", tree.styles()).as_deref(), Some("red"));
}

#[test]
fn nested_transforms() {
    let tree = parse(
        "<svg><g transform='translate(10, 20)'>
              <rect id='r' width='10' height='10' transform='scale(2)'/>
              <circle id='c' cx='1' cy='1' r='5' transform='scale(2, 3)'/>
          </g></svg>",
    );

    let group = &tree.root().children()[0];
    assert_eq!(group.info.transform, None);

    match find(&tree, "r").kind {
        Element::Rect(ref r) => assert_eq!((r.x, r.y, r.width, r.height), (10.0, 20.0, 20.0, 20.0)),
        _ => unreachable!(),
    }

    match find(&tree, "c").kind {
        Element::Circle(ref c) => assert_eq!((c.cx, c.cy, c.r), (12.0, 23.0, 10.0)),
        _ => unreachable!(),
    }
}

#[test]
fn polygon_points() {
    let tree = parse("<svg><polygon id='p' points='0,0 10,0 10,10 5' transform='translate(1 1)'/></svg>");
    match find(&tree, "p").kind {
        Element::Polygon(ref p) => assert_eq!(
            p.points,
            vec![Point::new(1.0, 1.0), Point::new(11.0, 1.0), Point::new(11.0, 11.0)]
        ),
        _ => unreachable!(),
    }
}

#[test]
fn line_marker() {
    let tree = parse(
        "<svg><defs>
              <marker id='arrow' refX='5' refY='2'><path id='head' d='M 0 0 L 10 2' fill='black'/></marker>
          </defs>
          <line id='l' x1='0' y1='0' x2='10' y2='0' marker-end='url(#arrow)' stroke='red' fill='blue'/></svg>",
    );

    assert!(tree.marker("url(#arrow)").is_some());

    let head = find(&tree, "head");
    let line = match find(&tree, "l").kind {
        Element::Line(ref l) => l,
        _ => unreachable!(),
    };

    assert_eq!(line.markers.len(), 1);
    let instance = &line.markers[0];
    assert_ne!(instance.info.node_id(), head.info.node_id());
    assert_eq!(instance.info.property("stroke", tree.styles()).as_deref(), Some("red"));
    assert_eq!(instance.info.property("fill", tree.styles()).as_deref(), Some("black"));

    match instance.kind {
        Element::Path(ref path) => {
            let points: Vec<Point> = path
                .data
                .segments
                .iter()
                .filter_map(|s| s.end_anchor().map(|(p, _)| p))
                .collect();
            assert!(approx(points[0], Point::new(5.0, -2.0)));
            assert!(approx(points[1], Point::new(15.0, 0.0)));
        }
        _ => unreachable!(),
    }
}

#[test]
fn rotated_marker() {
    let tree = parse(
        "<svg><marker id='m'><path d='M 0 0 L 1 0'/></marker>
          <path id='p' d='M 0 0 L 0 10' marker-end='url(#m)' marker-start='url(#m)'/></svg>",
    );

    let path = match find(&tree, "p").kind {
        Element::Path(ref p) => p,
        _ => unreachable!(),
    };

    // End first, then start.
    assert_eq!(path.markers.len(), 2);
    let end = match path.markers[0].kind {
        Element::Path(ref p) => p.data.segments[1].end_anchor().map(|(p, _)| p),
        _ => unreachable!(),
    };
    assert!(approx(end.unwrap(), Point::new(0.0, 11.0)));

    let start = match path.markers[1].kind {
        Element::Path(ref p) => p.data.segments[1].end_anchor().map(|(p, _)| p),
        _ => unreachable!(),
    };
    assert!(approx(start.unwrap(), Point::new(0.0, 1.0)));
}

#[test]
fn missing_marker() {
    let tree = parse("<svg><line id='l' x2='10' marker-end='url(#none)'/></svg>");
    match find(&tree, "l").kind {
        Element::Line(ref l) => assert!(l.markers.is_empty()),
        _ => unreachable!(),
    }
}

#[test]
fn resolving_is_idempotent() {
    let tree = parse(
        "<svg><style>.edge { stroke: red }</style>
          <marker id='m' refX='1'><path d='M 0 0 L 2 1'/></marker>
          <g transform='translate(5 5) rotate(30)'>
              <rect width='4' height='2' transform='scale(2)'/>
              <ellipse rx='4' ry='2'/>
              <path class='edge' d='M 0 0 L 10 10' marker-end='url(#m)'/>
              <text x='1' transform='matrix(1 0 0 1 2 2)'>A</text>
              <foreignObject width='10' height='10'><div>B</div></foreignObject>
          </g></svg>",
    );

    assert_eq!(tree.resolved(&[]), tree);
}

#[test]
fn resolve_detached_node() {
    let mut tree = parse("<svg><rect id='r' x='1' y='1' width='2' height='2'/></svg>");
    let rect = find(&tree, "r").clone();
    let ts = Transform::from(TransformOp::Translate { tx: 10.0, ty: 0.0 });
    let node = tree.resolve_node(&rect, &[ts]);
    match node.kind {
        Element::Rect(ref r) => assert_eq!((r.x, r.y), (11.0, 1.0)),
        _ => unreachable!(),
    }
}

#[test]
fn text_runs() {
    let tree = parse(
        "<svg><text id='t' x='10' style='font-size: 10px'>
              <tspan x='10' dy='0.5em'>Hello</tspan>
              <tspan x='10' dy='1.5em'><tspan>big</tspan><tspan>world</tspan></tspan>
          </text></svg>",
    );

    let text = match find(&tree, "t").kind {
        Element::Text(ref t) => t,
        _ => unreachable!(),
    };

    let runs = text.runs(&tree);
    assert_eq!(runs.len(), 2);

    let info = &runs[0].info;
    let first = match runs[0].kind {
        Element::Text(ref t) => t.run(&tree, info),
        _ => unreachable!(),
    };
    assert_eq!(first.text, "Hello");
    assert_eq!(first.start, Point::new(10.0, 0.0));
    assert_eq!(first.font_size, Some(10.0));
    assert_eq!(info.baseline_shift, Some(BaselineShift { em: 0.5, px: 0.0 }));

    let info = &runs[1].info;
    let second = match runs[1].kind {
        Element::Text(ref t) => t.run(&tree, info),
        _ => unreachable!(),
    };
    assert_eq!(second.text, "big world");
    assert_eq!(info.baseline_shift.map(|s| s.resolve(10.0)), Some(20.0));
}

#[test]
fn text_layout() {
    let tree = parse(
        "<svg><text id='t' x='1em' y='2' text-anchor='middle' style='font-size: 10px'>Label</text></svg>",
    );

    let node = find(&tree, "t");
    let text = match node.kind {
        Element::Text(ref t) => t,
        _ => unreachable!(),
    };

    let run = text.run(&tree, &node.info);
    assert_eq!(run.text, "Label");
    assert_eq!(run.start, Point::new(10.0, 2.0));

    let metrics = FontMetrics::new(8.0, -2.0, 0.0);
    let placed = text.layout(&tree, Size::new(40.0, 10.0), &metrics, &run);
    match placed.kind {
        Element::Text(ref t) => assert!(approx(t.start, Point::new(-10.0, -6.0))),
        _ => unreachable!(),
    }

    let provider = |_: Option<&str>, _: f64| Some(metrics);
    assert_eq!(text.layout_with(&tree, Size::new(40.0, 10.0), &provider, &run), Some(placed));
}

#[test]
fn foreign_object_label() {
    let tree = parse(
        "<svg><foreignObject id='fo' x='10' y='20' width='100' height='30' transform='translate(5,5)'>
              <div xmlns='http://www.w3.org/1999/xhtml'>
                  <span style='color: red; background-color: white'><br>Label</span>
              </div>
          </foreignObject></svg>",
    );

    let node = find(&tree, "fo");
    let object = match node.kind {
        Element::ForeignObject(ref o) => o,
        _ => unreachable!(),
    };

    let run = object.text_run(&tree, &node.info).unwrap();
    assert_eq!(run.text, "Label");
    assert_eq!(run.start, Point::new(15.0, 25.0));
    assert_eq!(run.color.as_deref(), Some("red"));
    assert_eq!(run.fill.as_deref(), Some("white"));
    assert_eq!(run.info.rotation, Some(0.0));
}

#[test]
fn scaled_foreign_object_label() {
    let tree = parse(
        "<svg><g transform='scale(2)'>
              <foreignObject id='fo' x='10' y='20' width='100' height='30'><div>Label</div></foreignObject>
          </g></svg>",
    );

    let node = find(&tree, "fo");
    let run = match node.kind {
        Element::ForeignObject(ref o) => o.text_run(&tree, &node.info).unwrap(),
        _ => unreachable!(),
    };

    assert_eq!(run.start, Point::new(20.0, 40.0));
}

#[test]
fn linear_gradient() {
    let tree = parse(
        "<svg><defs><linearGradient id='g' x1='0%' x2='100%' y2='5'>
              <stop offset='0%' stop-color='#fff'/>
              <stop offset='100%' stop-color='#000'/>
          </linearGradient></defs></svg>",
    );

    let gradient = tree.gradient("url(#g)").unwrap().gradient().unwrap();
    assert_eq!(gradient.x1, Position::Percent(0.0));
    assert_eq!(gradient.x2, Position::Percent(1.0));
    assert_eq!(gradient.y1, Position::Absolute(0.0));
    assert_eq!(gradient.y2, Position::Absolute(5.0));
    assert_eq!(gradient.offsets, vec![0.0, 1.0]);
    assert_eq!(gradient.colors, vec!["#fff".to_string(), "#000".to_string()]);
}

#[test]
fn switch_prefers_text() {
    let tree = parse("<svg><switch id='s'><foreignObject/><text>Fallback</text></switch></svg>");
    match find(&tree, "s").kind {
        Element::Switch(ref s) => match s.determine().map(|n| &n.kind) {
            Some(Element::Text(t)) => assert_eq!(t.content, "Fallback"),
            _ => unreachable!(),
        },
        _ => unreachable!(),
    }
}

#[test]
fn stroke_accessors() {
    let tree = parse(
        "<svg><path id='a' stroke-dasharray='4 2' style='stroke-width: 2px'/>
              <path id='b' stroke-dasharray='0,0'/>
              <path id='c' stroke-dasharray='3,1'/></svg>",
    );

    let styles = tree.styles();
    let a = find(&tree, "a");
    assert_eq!(a.info.stroke_dash_array(styles), Some(vec![4.0, 2.0]));
    assert_eq!(a.info.stroke_width(styles), Some(2.0));
    assert_eq!(find(&tree, "b").info.stroke_dash_array(styles), None);
    assert_eq!(find(&tree, "c").info.stroke_dash_array(styles), Some(vec![3.0, 1.0]));
}

#[test]
fn line_breaks_are_sanitized() {
    let svg = "<svg><foreignObject><div>a<br>b</div></foreignObject></svg>";
    assert!(Tree::from_str(svg, &Options::default()).is_ok());

    let opt = Options {
        sanitize_line_breaks: false,
        ..Options::default()
    };
    assert!(matches!(
        Tree::from_str(svg, &opt),
        Err(diagsvg::Error::ParsingFailed(_))
    ));
}

#[test]
fn malformed_xml() {
    let result = Tree::from_str("<svg><g></svg>", &Options::default());
    assert!(matches!(result, Err(diagsvg::Error::ParsingFailed(_))));
}

#[test]
fn not_utf8() {
    let result = Tree::from_data(&[0x3c, 0xff, 0xfe], &Options::default());
    assert!(matches!(result, Err(diagsvg::Error::NotAnUtf8Str)));
}

#[test]
fn invalid_root() {
    let result = Tree::from_str("<g/>", &Options::default());
    assert!(matches!(result, Err(diagsvg::Error::InvalidRoot)));
}

#[test]
fn nodes_limit() {
    let opt = Options {
        nodes_limit: 3,
        ..Options::default()
    };

    let result = Tree::from_str("<svg><g/><g/><g/></svg>", &opt);
    assert!(matches!(result, Err(diagsvg::Error::ElementsLimitReached)));
}
