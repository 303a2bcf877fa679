//! SVG serializer for a rendered scene: one `<path>` per country and one
//! legend group. Pure apart from [`write_svg`].

use crate::error::ExportError;
use crate::map::projection::PathCommand;
use crate::map::scene::Scene;
use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

/// Gap between a legend swatch and its label baseline
const LABEL_OFFSET: f64 = 10.0;
const LABEL_FONT_SIZE: f64 = 10.0;

fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Path data (`M x,y L x,y ... Z`), two decimals per coordinate
pub fn write_path_data<W: Write>(out: &mut W, commands: impl Iterator<Item = PathCommand>) -> fmt::Result {
    for command in commands {
        match command {
            PathCommand::MoveTo(p) => write!(out, "M{:.2},{:.2}", p.x, p.y)?,
            PathCommand::LineTo(p) => write!(out, "L{:.2},{:.2}", p.x, p.y)?,
            PathCommand::ClosePath => out.write_char('Z')?,
        }
    }
    Ok(())
}

/// Serialize `scene` into any formatter sink
pub fn write_scene<W: Write>(out: &mut W, scene: &Scene) -> fmt::Result {
    let (w, h) = (scene.viewport.width, scene.viewport.height);

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    )?;

    for shape in &scene.shapes {
        out.write_str(r#"  <path d=""#)?;
        write_path_data(out, shape.path.commands())?;
        writeln!(
            out,
            r#"" fill="{}" stroke="{}" stroke-width="{}"><title>{}</title></path>"#,
            shape.fill,
            scene.stroke,
            scene.stroke_width,
            xml_escape(&shape.name),
        )?;
    }

    let legend = &scene.legend;
    writeln!(
        out,
        r#"  <g class="legendSequential" transform="translate({:.2},{:.2})">"#,
        legend.origin.x, legend.origin.y
    )?;
    for cell in &legend.cells {
        let local = cell.origin - legend.origin;
        writeln!(
            out,
            r#"    <rect x="{:.2}" y="{:.2}" width="{}" height="{}" fill="{}"/>"#,
            local.x, local.y, cell.size.x, cell.size.y, cell.color
        )?;
        writeln!(
            out,
            r#"    <text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="middle">{}</text>"#,
            local.x + cell.size.x / 2.0,
            local.y + cell.size.y + LABEL_OFFSET + LABEL_FONT_SIZE / 2.0,
            LABEL_FONT_SIZE,
            xml_escape(&cell.label)
        )?;
    }
    writeln!(out, "  </g>")?;
    writeln!(out, "</svg>")
}

pub fn scene_to_svg(scene: &Scene) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_scene(&mut out, scene)?;
    Ok(out)
}

pub fn write_svg(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    let svg = scene_to_svg(scene)?;
    fs::write(path, svg).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
