use layerforge_geometry::{Point2D, Polygon, PolygonList, SOLID_FLAG};

fn polygon(coords: &[(f64, f64)]) -> Polygon {
    Polygon::from_points(coords.iter().map(|&(x, y)| Point2D::new(x, y)), SOLID_FLAG)
}

#[test]
fn test_svg_golden() {
    let list: PolygonList = [
        polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
        polygon(&[(2.5, 2.5), (7.25, 2.5), (5.0, 8.125)]),
    ]
    .into_iter()
    .collect();

    let expected = concat!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">"#,
        "\n",
        r#"  <polygon points="0,0 10,0 10,10 0,10" fill="none" stroke="black" stroke-width="0.1"/>"#,
        "\n",
        r#"  <polygon points="2.5,2.5 7.25,2.5 5,8.125" fill="none" stroke="black" stroke-width="0.1"/>"#,
        "\n",
        "</svg>\n",
    );
    assert_eq!(list.to_svg(), expected);
}

#[test]
fn test_svg_negative_coordinates() {
    let list: PolygonList = std::iter::once(polygon(&[(-1.5, -0.0004), (2.0, -0.0004), (2.0, 3.0)]))
        .collect();
    let svg = list.to_svg();
    assert!(svg.contains(r#"viewBox="-1.5 0 3.5 3""#));
    assert!(svg.contains(r#"points="-1.5,0 2,0 2,3""#));
}

#[test]
fn test_svg_empty_list() {
    let svg = PolygonList::new().to_svg();
    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains("<polygon"));
    assert!(svg.ends_with("</svg>\n"));
}
