//! Initial contents of a world: sphere files, random sphere generation and the pit layout.

use crate::config::GenerationParams;
use crate::math as m;
use crate::physics::Rectangle;

use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// A sphere as read from a scene file or generated at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereDef {
    pub radius: f64,
    pub centre: m::Vec3,
}

/// Error when reading spheres.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("Failed to read sphere file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("Line {line}: radius must be positive, got {radius}")]
    InvalidRadius { line: usize, radius: f64 },
}

/// Parse spheres from text with one sphere per line, given as `radius x y z`.
///
/// Commas and parentheses around the centre are allowed, so `0.1 (0.5, 0, 1)` works too.
/// Blank lines and anything after a `#` are ignored.
pub fn parse_spheres(text: &str) -> Result<Vec<SphereDef>, SceneError> {
    let mut spheres = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default();
        let numbers: Vec<&str> = content
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')'))
            .filter(|tok| !tok.is_empty())
            .collect();
        if numbers.is_empty() {
            continue;
        }
        if numbers.len() != 4 {
            return Err(SceneError::Parse {
                line,
                reason: format!("expected 4 numbers, found {}", numbers.len()),
            });
        }

        let mut values = [0.0f64; 4];
        for (val, tok) in values.iter_mut().zip(&numbers) {
            *val = tok.parse().map_err(|_| SceneError::Parse {
                line,
                reason: format!("{:?} is not a number", tok),
            })?;
        }
        let [radius, x, y, z] = values;
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SceneError::InvalidRadius { line, radius });
        }
        spheres.push(SphereDef {
            radius,
            centre: m::Vec3::new(x, y, z),
        });
    }
    Ok(spheres)
}

pub fn read_sphere_file(path: &Path) -> Result<Vec<SphereDef>, SceneError> {
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_spheres(&text)
}

/// Write spheres in the format [`parse_spheres`] reads.
pub fn write_spheres(out: &mut impl std::io::Write, spheres: &[SphereDef]) -> std::io::Result<()> {
    for s in spheres {
        writeln!(
            out,
            "{} {} {} {}",
            s.radius, s.centre.x, s.centre.y, s.centre.z
        )?;
    }
    Ok(())
}

/// Place random spheres in a box, keeping them apart from each other.
///
/// Each sphere gets a limited number of attempts at finding a free spot.
/// Spheres that don't find one are left out, so crowded settings produce fewer
/// spheres than asked for. The same parameters always produce the same spheres.
pub fn generate_spheres(params: &GenerationParams) -> Vec<SphereDef> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(params.seed);
    let lo = m::Vec3::from(params.volume_min);
    let hi = m::Vec3::from(params.volume_max);
    let mut spheres: Vec<SphereDef> = Vec::with_capacity(params.count);

    for _ in 0..params.count {
        for _ in 0..params.max_attempts {
            let t = m::Vec3::new(rng.gen(), rng.gen(), rng.gen());
            let candidate = SphereDef {
                centre: lo + t * (hi - lo),
                radius: params.min_radius + rng.gen::<f64>() * (params.max_radius - params.min_radius),
            };
            let fits = spheres.iter().all(|other| {
                (candidate.centre - other.centre).mag() - other.radius - candidate.radius
                    >= params.min_separation
            });
            if fits {
                spheres.push(candidate);
                break;
            }
        }
    }

    if spheres.len() < params.count {
        log::warn!(
            "Only generated {} spheres instead of {}, the generation volume is too crowded",
            spheres.len(),
            params.count
        );
    } else {
        log::info!("Generated {} spheres", spheres.len());
    }
    spheres
}

/// A rectangle in a compiled-in layout.
#[derive(Clone, Copy, Debug)]
pub struct RectangleDef {
    pub x_dim: f64,
    pub y_dim: f64,
    pub normal: [f64; 3],
    pub centre: [f64; 3],
}

impl From<RectangleDef> for Rectangle {
    fn from(def: RectangleDef) -> Self {
        Rectangle::new(
            def.x_dim,
            def.y_dim,
            m::Vec3::from(def.normal),
            m::Vec3::from(def.centre),
        )
    }
}

pub const PIT_DEPTH: f64 = 0.2;

/// A 3 x 2 pit with walls facing inwards, surrounded by flat ground at z = 0.
pub const PIT_LAYOUT: [RectangleDef; 9] = [
    // floor
    RectangleDef {
        x_dim: 3.02,
        y_dim: 2.02,
        normal: [0.0, 0.0, 1.0],
        centre: [0.0, 0.0, -PIT_DEPTH],
    },
    // walls
    RectangleDef {
        x_dim: 3.0,
        y_dim: PIT_DEPTH,
        normal: [0.0, -1.0, 0.0],
        centre: [0.0, 1.0, -PIT_DEPTH / 2.0],
    },
    RectangleDef {
        x_dim: 3.0,
        y_dim: PIT_DEPTH,
        normal: [0.0, 1.0, 0.0],
        centre: [0.0, -1.0, -PIT_DEPTH / 2.0],
    },
    RectangleDef {
        x_dim: PIT_DEPTH,
        y_dim: 2.02,
        normal: [-1.0, 0.0, 0.0],
        centre: [-1.5, 0.0, -PIT_DEPTH / 2.0],
    },
    RectangleDef {
        x_dim: PIT_DEPTH,
        y_dim: 2.02,
        normal: [1.0, 0.0, 0.0],
        centre: [1.5, 0.0, -PIT_DEPTH / 2.0],
    },
    // ground around the pit
    RectangleDef {
        x_dim: 9.02,
        y_dim: 3.52,
        normal: [0.0, 0.0, 1.0],
        centre: [0.0, -2.75, 0.0],
    },
    RectangleDef {
        x_dim: 9.02,
        y_dim: 3.52,
        normal: [0.0, 0.0, 1.0],
        centre: [0.0, 2.75, 0.0],
    },
    RectangleDef {
        x_dim: 3.02,
        y_dim: 2.02,
        normal: [0.0, 0.0, 1.0],
        centre: [-3.0, 0.0, 0.0],
    },
    RectangleDef {
        x_dim: 3.02,
        y_dim: 2.02,
        normal: [0.0, 0.0, 1.0],
        centre: [3.0, 0.0, 0.0],
    },
];

pub fn pit_rectangles() -> Vec<Rectangle> {
    PIT_LAYOUT.iter().copied().map(Rectangle::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_and_bracketed_lines() {
        let text = "\
# radius centre
0.1 0.5 -0.25 1

0.12 (1.0, 2.0, 3.5)   # with a comment
";
        let spheres = parse_spheres(text).expect("valid file");
        assert_eq!(
            spheres,
            vec![
                SphereDef {
                    radius: 0.1,
                    centre: m::Vec3::new(0.5, -0.25, 1.0)
                },
                SphereDef {
                    radius: 0.12,
                    centre: m::Vec3::new(1.0, 2.0, 3.5)
                },
            ]
        );
    }

    #[test]
    fn parse_reports_line_of_error() {
        match parse_spheres("0.1 0 0 1\n0.1 0 zero 1\n") {
            Err(SceneError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
        match parse_spheres("0.1 0 0\n") {
            Err(SceneError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected parse error, got {:?}", other),
        }
        match parse_spheres("0.1 0 0 1\n\n-0.2 0 0 1\n") {
            Err(SceneError::InvalidRadius { line, radius }) => {
                assert_eq!((line, radius), (3, -0.2))
            }
            other => panic!("expected radius error, got {:?}", other),
        }
    }

    #[test]
    fn written_spheres_read_back() {
        let spheres = generate_spheres(&GenerationParams::default());
        let mut buf = Vec::new();
        write_spheres(&mut buf, &spheres).expect("writing to a vec");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(parse_spheres(&text).expect("valid"), spheres);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = Path::new("/definitely/not/a/sphere/file.txt");
        assert!(matches!(read_sphere_file(path), Err(SceneError::Io { .. })));
    }

    #[test]
    fn generated_spheres_are_separated_and_in_bounds() {
        let params = GenerationParams::default();
        let spheres = generate_spheres(&params);
        assert!(!spheres.is_empty());
        assert!(spheres.len() <= params.count);
        assert_eq!(spheres, generate_spheres(&params));

        for (i, a) in spheres.iter().enumerate() {
            assert!((params.min_radius..=params.max_radius).contains(&a.radius));
            let centre = [a.centre.x, a.centre.y, a.centre.z];
            for axis in 0..3 {
                assert!(centre[axis] >= params.volume_min[axis]);
                assert!(centre[axis] <= params.volume_max[axis]);
            }
            for b in &spheres[i + 1..] {
                let gap = (a.centre - b.centre).mag() - a.radius - b.radius;
                assert!(gap >= params.min_separation);
            }
        }
    }

    #[test]
    fn crowded_volume_gives_fewer_spheres() {
        let params = GenerationParams {
            count: 50,
            volume_min: [0.0; 3],
            volume_max: [0.5; 3],
            ..Default::default()
        };
        let spheres = generate_spheres(&params);
        assert!(spheres.len() < 50);
    }

    #[test]
    fn pit_has_vertical_walls_and_flat_ground() {
        let rects = pit_rectangles();
        assert_eq!(rects.len(), 9);
        assert!((rects[0].centre().z + PIT_DEPTH).abs() < 1e-12);

        let inside = m::Vec3::new(0.0, 0.0, -0.1);
        for (wall, dist) in rects[1..5].iter().zip([1.0, 1.0, 1.5, 1.5]) {
            assert!(wall.normal().z.abs() < 1e-12);
            assert!((wall.height_above(inside).abs() - dist).abs() < 1e-12);
        }
        for ground in &rects[5..] {
            assert!((*ground.normal() - m::Vec3::unit_z()).mag() < 1e-12);
            assert_eq!(ground.centre().z, 0.0);
        }
    }
}
