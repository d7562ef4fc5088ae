//! SVG line chart of a price series and its two EMAs.

use crate::error::{BotError, BotResult};
use crate::sinks::ChartSink;
use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN: f64 = 56.0;

const PRICE_COLOR: &str = "#1f77b4";
const SHORT_COLOR: &str = "#ff7f0e";
const LONG_COLOR: &str = "#2ca02c";

/// Writes `{symbol}_for_{last_price}.svg` into a fixed directory.
pub struct SvgChartWriter {
    dir: PathBuf,
}

impl SvgChartWriter {
    pub fn new(dir: impl Into<PathBuf>) -> BotResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(symbol: &str, last_price: f64) -> String {
        format!("{}_for_{:?}.svg", symbol, last_price)
    }
}

impl ChartSink for SvgChartWriter {
    fn emit(
        &mut self,
        symbol: &str,
        prices: &[f64],
        short_ema: &[f64],
        long_ema: &[f64],
    ) -> BotResult<PathBuf> {
        let last_price = prices
            .last()
            .copied()
            .ok_or(BotError::InsufficientData { needed: 1, got: 0 })?;

        let svg = render_svg(symbol, prices, short_ema, long_ema)
            .map_err(|e| BotError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        let path = self.dir.join(Self::file_name(symbol, last_price));
        fs::write(&path, svg)?;
        Ok(path)
    }
}

pub fn render_svg(
    symbol: &str,
    prices: &[f64],
    short_ema: &[f64],
    long_ema: &[f64],
) -> Result<String, fmt::Error> {
    let series = [
        ("Stock Values", PRICE_COLOR, prices),
        ("Short EMA", SHORT_COLOR, short_ema),
        ("Long EMA", LONG_COLOR, long_ema),
    ];

    let (mut lo, mut hi) = series
        .iter()
        .flat_map(|(_, _, values)| values.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        lo = 0.0;
        hi = 1.0;
    } else if hi - lo < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let points = series.iter().map(|(_, _, v)| v.len()).max().unwrap_or(0);
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let x_at = |i: usize| {
        if points <= 1 {
            MARGIN + plot_w / 2.0
        } else {
            MARGIN + plot_w * i as f64 / (points - 1) as f64
        }
    };
    let y_at = |v: f64| MARGIN + plot_h * (hi - v) / (hi - lo);

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="16" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        MARGIN / 2.0,
        escape(symbol)
    )?;
    writeln!(
        svg,
        r#"<path d="M{l} {t} L{l} {b} L{r} {b}" stroke="black" fill="none"/>"#,
        l = MARGIN,
        t = MARGIN,
        b = HEIGHT - MARGIN,
        r = WIDTH - MARGIN
    )?;
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="12" text-anchor="middle">Candles</text>"#,
        WIDTH / 2.0,
        HEIGHT - MARGIN / 3.0
    )?;
    writeln!(
        svg,
        r#"<text x="14" y="{y}" font-size="12" text-anchor="middle" transform="rotate(-90 14 {y})">Price</text>"#,
        y = HEIGHT / 2.0
    )?;
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="10" text-anchor="end">{:.6}</text>"#,
        MARGIN - 4.0,
        MARGIN + 4.0,
        hi
    )?;
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="10" text-anchor="end">{:.6}</text>"#,
        MARGIN - 4.0,
        HEIGHT - MARGIN,
        lo
    )?;

    for (idx, (label, color, values)) in series.iter().enumerate() {
        let coords: Vec<String> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| format!("{:.2},{:.2}", x_at(i), y_at(*v)))
            .collect();
        if !coords.is_empty() {
            writeln!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                color,
                coords.join(" ")
            )?;
        }

        let legend_y = MARGIN + 14.0 + idx as f64 * 16.0;
        writeln!(
            svg,
            r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{c}" stroke-width="2"/><text x="{tx}" y="{ty}" font-size="11">{label}</text>"#,
            x1 = MARGIN + 10.0,
            x2 = MARGIN + 30.0,
            y = legend_y,
            c = color,
            tx = MARGIN + 36.0,
            ty = legend_y + 4.0,
            label = label
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
